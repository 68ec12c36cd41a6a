//! Viewed-state synchronisation
//!
//! The rendered checkboxes are the source of truth for which files have been
//! viewed. This module applies the host's initial flags, derives the footer
//! counter from the checkboxes and turns a checkbox change into a report for
//! the host.

use crate::dom::{Document, NodeId, ScrollBlock};
use crate::messages::OutboundMessage;
use crate::render::class;

/// Attribute carrying a checkbox's position in render order
pub const FILE_INDEX_ATTR: &str = "data-file-index";

/// Viewed checkboxes under `root`, in document order
pub fn toggles(doc: &Document, root: NodeId) -> Vec<NodeId> {
    doc.query_all(root, class::VIEWED_TOGGLE)
}

/// Checkboxes that must be activated so that checkbox `i` ends up checked
/// iff `viewed[i]`. Positions past the end of `viewed` keep their default.
pub fn initial_activations(doc: &Document, root: NodeId, viewed: &[bool]) -> Vec<NodeId> {
    toggles(doc, root)
        .into_iter()
        .zip(viewed.iter().copied().chain(std::iter::repeat(false)))
        .filter(|(toggle, want)| *want && !doc.is_checked(*toggle))
        .map(|(toggle, _)| toggle)
        .collect()
}

/// Stamps every checkbox under `root` with its render-order index
pub fn stamp_file_indices(doc: &mut Document, root: NodeId) {
    for (i, toggle) in toggles(doc, root).into_iter().enumerate() {
        doc.set_attr(toggle, FILE_INDEX_ATTR, &i.to_string());
    }
}

/// Render-order index of a checkbox still attached under `root`
pub fn file_index(doc: &Document, root: NodeId, toggle: NodeId) -> Option<usize> {
    if !doc.contains(root, toggle) || !doc.has_class(toggle, class::VIEWED_TOGGLE) {
        return None;
    }
    doc.attr(toggle, FILE_INDEX_ATTR)?.parse().ok()
}

/// Footer text derived from the current checkbox state
pub fn footer_text(doc: &Document) -> String {
    let all = toggles(doc, doc.body());
    let viewed = all.iter().filter(|t| doc.is_checked(**t)).count();
    format!("viewed {}/{}", viewed, all.len())
}

/// Redraws the document's footer, if it has one
pub fn update_footer(doc: &mut Document) {
    if let Some(footer) = doc.query_tag("footer") {
        let text = footer_text(doc);
        doc.set_text(footer, &text);
    }
}

/// Brings the header of the toggled file into view
pub fn scroll_header_into_view(doc: &mut Document, toggle: NodeId) {
    if let Some(header) = doc.closest(toggle, class::FILE_HEADER) {
        doc.scroll_into_view(header, ScrollBlock::Nearest);
    }
}

/// Handles a checkbox change under the listeners attached to `root`.
/// Returns the report for the host, or `None` for a checkbox that is no
/// longer part of the current render.
pub fn on_toggle(doc: &mut Document, root: NodeId, toggle: NodeId) -> Option<OutboundMessage> {
    scroll_header_into_view(doc, toggle);
    update_footer(doc);

    let Some(index) = file_index(doc, root, toggle) else {
        log::trace!("ignoring change from stale checkbox #{}", toggle.index());
        return None;
    };
    Some(OutboundMessage::ReportFileViewed {
        index,
        viewed: doc.is_checked(toggle),
    })
}
