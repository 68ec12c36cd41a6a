//! Diff renderer seam and the structural diff2html layout
//!
//! The panel never builds diff markup itself; it hands a container to a
//! [`DiffRenderer`]. [`StructuralRenderer`] reproduces the element/class
//! structure diff2html emits (no styling or highlighting), which is all the
//! panel's click and toggle handling depends on.

use crate::dom::{Document, NodeId};
use crate::messages::{DiffFile, DiffLine, LineType, OutputFormat, RenderConfig};
use crate::names::rename_display_name;
use anyhow::Result;

/// Class names of the rendered diff layout
pub mod class {
    pub const FILE_WRAPPER: &str = "d2h-file-wrapper";
    pub const FILE_HEADER: &str = "d2h-file-header";
    pub const FILE_NAME_WRAPPER: &str = "d2h-file-name-wrapper";
    pub const FILE_NAME: &str = "d2h-file-name";
    pub const FILE_COLLAPSE: &str = "d2h-file-collapse";
    pub const VIEWED_TOGGLE: &str = "d2h-file-collapse-input";
    pub const FILE_DIFF: &str = "d2h-file-diff";
    pub const FILES_DIFF: &str = "d2h-files-diff";
    pub const FILE_SIDE_DIFF: &str = "d2h-file-side-diff";
    pub const LINE_NUMBER: &str = "d2h-code-linenumber";
    pub const SIDE_LINE_NUMBER: &str = "d2h-code-side-linenumber";
    pub const OLD_NUMBER: &str = "line-num1";
    pub const NEW_NUMBER: &str = "line-num2";
    pub const DEL: &str = "d2h-del";
    pub const INS: &str = "d2h-ins";
    pub const CNTX: &str = "d2h-cntx";
    pub const INFO: &str = "d2h-info";
    pub const EMPTY_PLACEHOLDER: &str = "d2h-emptyplaceholder";
    pub const SELECTED: &str = "d2h-selected";
    pub const HIDDEN: &str = "d2h-d-none";
}

pub trait DiffRenderer {
    /// Populates `container` with the rendered `files`
    fn render(
        &mut self,
        doc: &mut Document,
        container: NodeId,
        files: &[DiffFile],
        config: &RenderConfig,
    ) -> Result<()>;

    /// The renderer's own reaction to a viewed checkbox changing state
    fn file_viewed_changed(&mut self, _doc: &mut Document, _toggle: NodeId) {}
}

/// Renders the diff2html element layout
#[derive(Debug, Default)]
pub struct StructuralRenderer;

impl DiffRenderer for StructuralRenderer {
    fn render(
        &mut self,
        doc: &mut Document,
        container: NodeId,
        files: &[DiffFile],
        config: &RenderConfig,
    ) -> Result<()> {
        let files_root = doc.append(container, "div", &["d2h-wrapper"]);
        for (i, file) in files.iter().enumerate() {
            let wrapper = doc.append(files_root, "div", &[class::FILE_WRAPPER]);
            doc.set_id(wrapper, &format!("d2h-file-{}", i));
            render_header(doc, wrapper, file, config.file_content_toggle());
            match config.output_format() {
                OutputFormat::LineByLine => render_line_by_line(doc, wrapper, file),
                OutputFormat::SideBySide => render_side_by_side(doc, wrapper, file),
            }
        }
        log::debug!("rendered {} files ({:?})", files.len(), config.output_format());
        Ok(())
    }

    /// Collapses the file body while viewed and marks the toggle label
    fn file_viewed_changed(&mut self, doc: &mut Document, toggle: NodeId) {
        let viewed = doc.is_checked(toggle);
        if let Some(label) = doc.closest(toggle, class::FILE_COLLAPSE) {
            doc.set_class(label, class::SELECTED, viewed);
        }
        let Some(wrapper) = doc.closest(toggle, class::FILE_WRAPPER) else {
            return;
        };
        for body_class in [class::FILE_DIFF, class::FILES_DIFF] {
            if let Some(body) = doc.query(wrapper, body_class) {
                doc.set_class(body, class::HIDDEN, viewed);
            }
        }
    }
}

/// Name shown in the file header
pub fn display_name(file: &DiffFile) -> String {
    const DEV_NULL: &str = "/dev/null";
    let old = file.old_name.as_str();
    let new = file.new_name.as_str();
    if file.is_new || old.is_empty() || old == DEV_NULL {
        new.to_string()
    } else if file.is_deleted || new.is_empty() || new == DEV_NULL {
        old.to_string()
    } else {
        rename_display_name(old, new)
    }
}

fn render_header(doc: &mut Document, wrapper: NodeId, file: &DiffFile, with_toggle: bool) {
    let header = doc.append(wrapper, "div", &[class::FILE_HEADER]);
    let name_wrapper = doc.append(header, "span", &[class::FILE_NAME_WRAPPER]);
    doc.append_text(name_wrapper, "span", &[class::FILE_NAME], &display_name(file));

    let tag = if file.is_new {
        Some(("d2h-added-tag", "ADDED"))
    } else if file.is_deleted {
        Some(("d2h-deleted-tag", "DELETED"))
    } else if file.is_rename {
        Some(("d2h-moved-tag", "RENAMED"))
    } else {
        None
    };
    if let Some((tag_class, label)) = tag {
        doc.append_text(name_wrapper, "span", &["d2h-tag", tag_class], label);
    }

    if with_toggle {
        let label = doc.append(header, "label", &[class::FILE_COLLAPSE]);
        let input = doc.append(label, "input", &[class::VIEWED_TOGGLE]);
        doc.set_attr(input, "type", "checkbox");
        doc.set_attr(input, "name", "viewed");
        doc.append_text(label, "span", &[], "Viewed");
    }
}

fn line_class(kind: LineType) -> &'static str {
    match kind {
        LineType::Insert => class::INS,
        LineType::Delete => class::DEL,
        LineType::Context => class::CNTX,
    }
}

fn number_text(n: Option<u32>) -> String {
    n.map(|n| n.to_string()).unwrap_or_default()
}

fn render_line_by_line(doc: &mut Document, wrapper: NodeId, file: &DiffFile) {
    let body = doc.append(wrapper, "div", &[class::FILE_DIFF]);
    let tbody = table_body(doc, body);

    for block in &file.blocks {
        let row = doc.append(tbody, "tr", &[]);
        doc.append(row, "td", &[class::LINE_NUMBER, class::INFO]);
        let code = doc.append(row, "td", &[class::INFO]);
        doc.append_text(code, "div", &["d2h-code-line"], &block.header);

        for line in &block.lines {
            let kind = line_class(line.kind);
            let row = doc.append(tbody, "tr", &[]);
            let cell = doc.append(row, "td", &[class::LINE_NUMBER, kind]);
            doc.append_text(cell, "div", &[class::OLD_NUMBER], &number_text(line.old_number));
            doc.append_text(cell, "div", &[class::NEW_NUMBER], &number_text(line.new_number));
            let code = doc.append(row, "td", &[kind]);
            doc.append_text(code, "div", &["d2h-code-line"], &line.content);
        }
    }
}

fn render_side_by_side(doc: &mut Document, wrapper: NodeId, file: &DiffFile) {
    let files_diff = doc.append(wrapper, "div", &[class::FILES_DIFF]);
    let left_panel = doc.append(files_diff, "div", &[class::FILE_SIDE_DIFF]);
    let right_panel = doc.append(files_diff, "div", &[class::FILE_SIDE_DIFF]);
    let left = table_body(doc, left_panel);
    let right = table_body(doc, right_panel);

    for block in &file.blocks {
        for tbody in [left, right] {
            let row = doc.append(tbody, "tr", &[]);
            doc.append(row, "td", &[class::SIDE_LINE_NUMBER, class::INFO]);
            let code = doc.append(row, "td", &[class::INFO]);
            doc.append_text(code, "div", &["d2h-code-side-line"], &block.header);
        }

        for (old, new) in pair_rows(&block.lines) {
            side_row(doc, left, old, |l| l.old_number);
            side_row(doc, right, new, |l| l.new_number);
        }
    }
}

fn side_row(
    doc: &mut Document,
    tbody: NodeId,
    line: Option<&DiffLine>,
    number: impl Fn(&DiffLine) -> Option<u32>,
) {
    let row = doc.append(tbody, "tr", &[]);
    match line {
        Some(line) => {
            let kind = line_class(line.kind);
            doc.append_text(row, "td", &[class::SIDE_LINE_NUMBER, kind], &number_text(number(line)));
            let code = doc.append(row, "td", &[kind]);
            doc.append_text(code, "div", &["d2h-code-side-line"], &line.content);
        }
        None => {
            doc.append(row, "td", &[class::SIDE_LINE_NUMBER, class::EMPTY_PLACEHOLDER]);
            doc.append(row, "td", &[class::CNTX, class::EMPTY_PLACEHOLDER]);
        }
    }
}

/// Pairs deletions with the insertions that follow them; context lines
/// appear on both sides
fn pair_rows(lines: &[DiffLine]) -> Vec<(Option<&DiffLine>, Option<&DiffLine>)> {
    let mut rows = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if lines[i].kind == LineType::Context {
            rows.push((Some(&lines[i]), Some(&lines[i])));
            i += 1;
            continue;
        }
        let dels: Vec<&DiffLine> = lines[i..]
            .iter()
            .take_while(|l| l.kind == LineType::Delete)
            .collect();
        i += dels.len();
        let inss: Vec<&DiffLine> = lines[i..]
            .iter()
            .take_while(|l| l.kind == LineType::Insert)
            .collect();
        i += inss.len();
        for k in 0..dels.len().max(inss.len()) {
            rows.push((dels.get(k).copied(), inss.get(k).copied()));
        }
    }
    rows
}

fn table_body(doc: &mut Document, parent: NodeId) -> NodeId {
    let code_wrapper = doc.append(parent, "div", &["d2h-code-wrapper"]);
    let table = doc.append(code_wrapper, "table", &["d2h-diff-table"]);
    doc.append(table, "tbody", &["d2h-diff-tbody"])
}
