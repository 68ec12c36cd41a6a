//! Wire types exchanged with the host
//!
//! The host sends one `RenderRequest` per render; the panel answers with
//! `openFile` and `reportFileViewed` commands.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Inbound render message
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    #[serde(default)]
    pub config: RenderConfig,
    #[serde(default)]
    pub diff_files: Vec<DiffFile>,
    pub destination: String,
    /// Initial viewed flags, positionally aligned with `diff_files`
    #[serde(default)]
    pub viewed_files: Vec<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    LineByLine,
    SideBySide,
}

/// Renderer configuration. Only the keys the panel reads are typed; the rest
/// pass through to the renderer untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<OutputFormat>,
    /// Whether each file header carries a "viewed" checkbox
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_content_toggle: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RenderConfig {
    pub fn output_format(&self) -> OutputFormat {
        self.output_format.unwrap_or_default()
    }

    pub fn file_content_toggle(&self) -> bool {
        self.file_content_toggle.unwrap_or(true)
    }
}

/// A file patch in diff2html's JSON shape
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffFile {
    #[serde(default)]
    pub old_name: String,
    #[serde(default)]
    pub new_name: String,
    #[serde(default)]
    pub is_rename: bool,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub blocks: Vec<DiffBlock>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffBlock {
    #[serde(default)]
    pub header: String,
    #[serde(default)]
    pub lines: Vec<DiffLine>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffLine {
    #[serde(rename = "type")]
    pub kind: LineType,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_number: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    Insert,
    Delete,
    Context,
}

/// Outbound command to the host
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum OutboundMessage {
    /// Open `path`, optionally at a 1-based `line`
    OpenFile {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line: Option<u32>,
    },
    /// The checkbox of the file at `index` in render order changed
    ReportFileViewed { index: usize, viewed: bool },
}
