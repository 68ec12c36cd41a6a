//! Click-to-location resolution
//!
//! A click anywhere in the rendered diff is classified once into a line-number
//! cell, a file-name header or anything else, and only then interpreted.

use crate::dom::{Document, NodeId};
use crate::names::resolve_renamed_path;
use crate::render::class;

/// Where a click should take the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickLocation {
    pub file_path: String,
    pub line: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelSide {
    /// Old version of the file
    Left,
    /// New version of the file
    Right,
}

/// Row kind of a unified-mode line-number cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnifiedRow {
    Deletion,
    Info,
    Code,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCell {
    Unified { cell: NodeId, row: UnifiedRow },
    SideBySide { cell: NodeId, side: PanelSide },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    LineNumber(LineCell),
    FileName(NodeId),
    Other,
}

/// Classifies the element under a click
pub fn classify(doc: &Document, target: NodeId) -> ClickTarget {
    if let Some(cell) = doc.closest(target, class::LINE_NUMBER) {
        let row = if doc.has_class(cell, class::DEL) {
            UnifiedRow::Deletion
        } else if doc.has_class(cell, class::INFO) {
            UnifiedRow::Info
        } else {
            UnifiedRow::Code
        };
        return ClickTarget::LineNumber(LineCell::Unified { cell, row });
    }

    if let Some(cell) = doc.closest(target, class::SIDE_LINE_NUMBER) {
        let on_left = doc
            .closest_where(cell, |n| {
                doc.has_class(n, class::FILE_SIDE_DIFF) && doc.is_first_element_child(n)
            })
            .is_some();
        let side = if on_left {
            PanelSide::Left
        } else {
            PanelSide::Right
        };
        return ClickTarget::LineNumber(LineCell::SideBySide { cell, side });
    }

    match doc.closest(target, class::FILE_NAME) {
        Some(name) => ClickTarget::FileName(name),
        None => ClickTarget::Other,
    }
}

/// Line number a cell links to, if it links to one at all
pub fn line_number(doc: &Document, cell: LineCell) -> Option<u32> {
    match cell {
        // may refer to lines that no longer exist in the working tree
        LineCell::SideBySide {
            side: PanelSide::Left,
            ..
        } => None,
        LineCell::SideBySide {
            cell,
            side: PanelSide::Right,
        } => parse_line_number(&doc.text_content(cell)?),
        LineCell::Unified {
            row: UnifiedRow::Deletion | UnifiedRow::Info,
            ..
        } => None,
        LineCell::Unified {
            cell,
            row: UnifiedRow::Code,
        } => {
            let new_number = doc.query(cell, class::NEW_NUMBER)?;
            parse_line_number(&doc.text_content(new_number)?)
        }
    }
}

/// Current path of the file whose wrapper encloses `node`
pub fn file_name(doc: &Document, node: NodeId) -> Option<String> {
    let wrapper = doc.closest(node, class::FILE_WRAPPER)?;
    let name = doc.query(wrapper, class::FILE_NAME)?;
    let text = doc.text_content(name)?;
    if text.is_empty() {
        return None;
    }
    Some(resolve_renamed_path(&text).into_owned())
}

/// Parses the leading integer of trimmed cell text. Empty, non-numeric,
/// negative and zero values are not line numbers.
pub fn parse_line_number(text: &str) -> Option<u32> {
    let trimmed = text.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    match unsigned[..end].parse::<u32>() {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(n),
    }
}

/// Resolves a click to a location, or `None` when the click is not actionable
pub fn resolve(doc: &Document, target: NodeId) -> Option<ClickLocation> {
    match classify(doc, target) {
        ClickTarget::LineNumber(cell) => {
            let line = line_number(doc, cell)?;
            let file_path = file_name(doc, target)?;
            log::debug!("clicked {}:{}", file_path, line);
            Some(ClickLocation {
                file_path,
                line: Some(line),
            })
        }
        ClickTarget::FileName(name) => {
            let file_path = file_name(doc, name)?;
            log::debug!("clicked {} without line", file_path);
            Some(ClickLocation {
                file_path,
                line: None,
            })
        }
        ClickTarget::Other => None,
    }
}
