//! JSON-lines panel session
//!
//! Reads host messages and user events from an input stream, one JSON object
//! per line, and writes the panel's outbound messages to an output stream.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::{BufRead, Write};

use crate::channel::JsonLinesChannel;
use crate::config::Config;
use crate::dom::{Document, NodeId};
use crate::messages::RenderRequest;
use crate::panel::Panel;
use crate::render::StructuralRenderer;

/// One input line
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SessionEvent {
    /// Message from the host
    Message { data: RenderRequest },
    /// User click on a node
    Click { node: NodeId },
    /// Dump the document outline
    Outline,
}

/// Builds the page the panel mounts into
pub fn page(config: &Config) -> Document {
    let mut doc = Document::new();
    let body = doc.body();
    let container = doc.append(body, "div", &[]);
    doc.set_id(container, &config.destination);
    if config.footer {
        doc.append(body, "footer", &[]);
    }
    doc
}

/// A panel fed one JSON line at a time.
///
/// Outlines go to `diagnostics` so that `output` only carries host messages.
pub struct Session<'c, O: Write, D: Write> {
    config: &'c Config,
    panel: Panel<StructuralRenderer, JsonLinesChannel<O>>,
    diagnostics: D,
}

impl<'c, O: Write, D: Write> Session<'c, O, D> {
    pub fn new(config: &'c Config, output: O, diagnostics: D) -> Self {
        Self {
            config,
            panel: Panel::new(page(config), StructuralRenderer, JsonLinesChannel::new(output)),
            diagnostics,
        }
    }

    /// Handles one input line. Malformed lines are skipped; a failed render
    /// is fatal.
    pub fn handle_line(&mut self, line: &str) -> Result<()> {
        if line.trim().is_empty() {
            return Ok(());
        }
        let event: SessionEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(err) => {
                log::warn!("skipping malformed input: {}", err);
                return Ok(());
            }
        };

        match event {
            SessionEvent::Message { mut data } => {
                self.config.render.apply(&mut data.config);
                self.panel.render(&data)?;
            }
            SessionEvent::Click { node } => self.panel.click(node),
            SessionEvent::Outline => {
                let doc = self.panel.document();
                write!(self.diagnostics, "{}", doc.outline(doc.body()))
                    .context("Failed to write outline")?;
            }
        }

        for (node, _) in self.panel.document_mut().take_scroll_requests() {
            log::debug!("scrolled #{} into view", node);
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn document(&self) -> &Document {
        self.panel.document()
    }
}

/// Runs a session until `input` is exhausted
pub fn run<I: BufRead, O: Write, D: Write>(
    config: &Config,
    input: I,
    output: O,
    diagnostics: D,
) -> Result<()> {
    let mut session = Session::new(config, output, diagnostics);
    for (n, line) in input.lines().enumerate() {
        let line = line.context("Failed to read session input")?;
        session
            .handle_line(&line)
            .with_context(|| format!("Session failed at input line {}", n + 1))?;
    }
    Ok(())
}
