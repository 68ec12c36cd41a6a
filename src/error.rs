//! Panel error types
//!
//! Only render setup can fail. Clicks and checkbox changes that cannot be
//! interpreted are ignored rather than reported.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("render destination not found: #{0}")]
    DestinationNotFound(String),

    #[error("diff renderer failed: {0}")]
    Render(#[source] anyhow::Error),
}
