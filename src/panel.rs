//! Panel controller
//!
//! Owns the document and drives a full re-render for every render request.
//! Nothing survives a re-render except what the new request carries.

use crate::channel::MessageChannel;
use crate::dom::{Document, NodeId};
use crate::error::PanelError;
use crate::messages::{OutboundMessage, RenderRequest};
use crate::render::{class, DiffRenderer};
use crate::resolver;
use crate::viewed;

pub struct Panel<R, C> {
    doc: Document,
    renderer: R,
    channel: C,
    /// Container the click and change listeners are attached to
    mounted: Option<NodeId>,
}

impl<R: DiffRenderer, C: MessageChannel> Panel<R, C> {
    pub fn new(doc: Document, renderer: R, channel: C) -> Self {
        Self {
            doc,
            renderer,
            channel,
            mounted: None,
        }
    }

    /// Replaces the destination's content with a fresh render of `request`
    pub fn render(&mut self, request: &RenderRequest) -> Result<(), PanelError> {
        let container = self
            .doc
            .get_element_by_id(&request.destination)
            .ok_or_else(|| PanelError::DestinationNotFound(request.destination.clone()))?;

        self.mounted = None;
        self.doc.clear_children(container);
        self.renderer
            .render(
                &mut self.doc,
                container,
                &request.diff_files,
                &request.config,
            )
            .map_err(PanelError::Render)?;

        // listeners are not attached yet, so this only runs the renderer's side effects
        for toggle in viewed::initial_activations(&self.doc, container, &request.viewed_files) {
            self.activate(toggle);
        }

        viewed::stamp_file_indices(&mut self.doc, container);
        self.mounted = Some(container);
        viewed::update_footer(&mut self.doc);

        log::info!(
            "rendered {} files into #{} ({})",
            request.diff_files.len(),
            request.destination,
            viewed::footer_text(&self.doc)
        );
        log::debug!(
            "document holds {} live elements in {} slots",
            self.doc.live_count(),
            self.doc.slot_count()
        );
        Ok(())
    }

    /// Delivers a user click on `target`
    pub fn click(&mut self, target: NodeId) {
        if !self.doc.is_alive(target) {
            log::trace!("click on removed node #{}", target.index());
            return;
        }

        if let Some(toggle) = self.activation_target(target) {
            self.activate(toggle);
        }

        let Some(root) = self.mounted else {
            return;
        };
        if !self.doc.contains(root, target) {
            return;
        }
        if let Some(location) = resolver::resolve(&self.doc, target) {
            self.channel.post_message(OutboundMessage::OpenFile {
                path: location.file_path,
                line: location.line,
            });
        }
    }

    /// Checkbox a click on `target` flips: the checkbox itself or the one
    /// inside a clicked label
    fn activation_target(&self, target: NodeId) -> Option<NodeId> {
        if self.doc.has_class(target, class::VIEWED_TOGGLE) {
            return Some(target);
        }
        let label = self.doc.closest(target, class::FILE_COLLAPSE)?;
        self.doc.query(label, class::VIEWED_TOGGLE)
    }

    /// Flips a checkbox and fires its change handlers
    fn activate(&mut self, toggle: NodeId) {
        let checked = self.doc.is_checked(toggle);
        self.doc.set_checked(toggle, !checked);
        self.renderer.file_viewed_changed(&mut self.doc, toggle);

        let Some(root) = self.mounted else {
            return;
        };
        if let Some(report) = viewed::on_toggle(&mut self.doc, root, toggle) {
            self.channel.post_message(report);
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    #[cfg(test)]
    pub fn channel(&self) -> &C {
        &self.channel
    }

    #[cfg(test)]
    pub fn mounted(&self) -> Option<NodeId> {
        self.mounted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ScrollBlock;
    use crate::messages::{OutputFormat, RenderConfig};
    use crate::render::tests::sample_file;
    use crate::render::StructuralRenderer;

    type TestPanel = Panel<StructuralRenderer, Vec<OutboundMessage>>;

    fn panel() -> TestPanel {
        let mut doc = Document::new();
        let body = doc.body();
        let container = doc.append(body, "div", &[]);
        doc.set_id(container, "diff");
        doc.append(body, "footer", &[]);
        Panel::new(doc, StructuralRenderer, Vec::new())
    }

    fn request(format: OutputFormat, names: &[(&str, &str)], viewed: &[bool]) -> RenderRequest {
        RenderRequest {
            config: RenderConfig {
                output_format: Some(format),
                ..Default::default()
            },
            diff_files: names.iter().map(|(o, n)| sample_file(o, n)).collect(),
            destination: "diff".into(),
            viewed_files: viewed.to_vec(),
        }
    }

    fn toggles(panel: &TestPanel) -> Vec<NodeId> {
        let doc = panel.document();
        doc.query_all(doc.body(), class::VIEWED_TOGGLE)
    }

    fn footer(panel: &TestPanel) -> String {
        let doc = panel.document();
        doc.query_tag("footer")
            .and_then(|f| doc.text_content(f))
            .unwrap_or_default()
    }

    const THREE: [(&str, &str); 3] = [("a.rs", "a.rs"), ("src/b.rs", "lib/b.rs"), ("c.rs", "c.rs")];

    #[test]
    fn test_render_applies_initial_viewed_state() {
        let mut panel = panel();
        panel
            .render(&request(OutputFormat::LineByLine, &THREE, &[true, false]))
            .unwrap();

        let toggles = toggles(&panel);
        assert_eq!(toggles.len(), 3);
        let states: Vec<bool> = toggles
            .iter()
            .map(|t| panel.document().is_checked(*t))
            .collect();
        assert_eq!(states, vec![true, false, false]);
        assert_eq!(footer(&panel), "viewed 1/3");

        // initial state is not echoed back to the host
        assert!(panel.channel().is_empty());
        assert!(panel.document_mut().take_scroll_requests().is_empty());

        // but the renderer still collapsed the viewed file
        let doc = panel.document();
        let bodies = doc.query_all(doc.body(), class::FILE_DIFF);
        assert!(doc.has_class(bodies[0], class::HIDDEN));
        assert!(!doc.has_class(bodies[1], class::HIDDEN));
    }

    #[test]
    fn test_initial_viewed_state_collapses_side_by_side_body() {
        let mut panel = panel();
        panel
            .render(&request(OutputFormat::SideBySide, &THREE, &[false, true]))
            .unwrap();

        let doc = panel.document();
        assert!(doc.query_all(doc.body(), class::FILE_DIFF).is_empty());
        let bodies = doc.query_all(doc.body(), class::FILES_DIFF);
        assert_eq!(bodies.len(), 3);
        let hidden: Vec<bool> = bodies
            .iter()
            .map(|b| doc.has_class(*b, class::HIDDEN))
            .collect();
        assert_eq!(hidden, vec![false, true, false]);

        let labels = doc.query_all(doc.body(), class::FILE_COLLAPSE);
        assert!(doc.has_class(labels[1], class::SELECTED));
        assert_eq!(footer(&panel), "viewed 1/3");
        assert!(panel.channel().is_empty());
    }

    #[test]
    fn test_toggle_reports_index_and_updates_footer() {
        let mut panel = panel();
        panel
            .render(&request(OutputFormat::LineByLine, &THREE, &[]))
            .unwrap();

        for (k, toggle) in toggles(&panel).into_iter().enumerate() {
            panel.click(toggle);
            assert_eq!(
                panel.channel().last(),
                Some(&OutboundMessage::ReportFileViewed {
                    index: k,
                    viewed: true
                })
            );
            assert_eq!(footer(&panel), format!("viewed {}/3", k + 1));
        }
        assert_eq!(panel.channel().len(), 3);

        let first = toggles(&panel)[0];
        panel.click(first);
        assert_eq!(
            panel.channel().last(),
            Some(&OutboundMessage::ReportFileViewed {
                index: 0,
                viewed: false
            })
        );
        assert_eq!(footer(&panel), "viewed 2/3");
    }

    #[test]
    fn test_toggle_scrolls_its_header() {
        let mut panel = panel();
        panel
            .render(&request(OutputFormat::SideBySide, &THREE, &[]))
            .unwrap();
        panel.document_mut().take_scroll_requests();

        let toggle = toggles(&panel)[1];
        panel.click(toggle);
        let header = panel.document().closest(toggle, class::FILE_HEADER).unwrap();
        assert_eq!(
            panel.document_mut().take_scroll_requests(),
            vec![(header, ScrollBlock::Nearest)]
        );
    }

    #[test]
    fn test_label_click_activates_checkbox() {
        let mut panel = panel();
        panel
            .render(&request(OutputFormat::LineByLine, &THREE, &[]))
            .unwrap();
        let doc = panel.document();
        let label = doc.query_all(doc.body(), class::FILE_COLLAPSE)[2];

        panel.click(label);
        assert_eq!(
            panel.channel().as_slice(),
            &[OutboundMessage::ReportFileViewed {
                index: 2,
                viewed: true
            }]
        );
    }

    #[test]
    fn test_unknown_destination_is_fatal() {
        let mut panel = panel();
        let mut req = request(OutputFormat::LineByLine, &THREE, &[]);
        req.destination = "elsewhere".into();
        let err = panel.render(&req).unwrap_err();
        assert!(matches!(err, PanelError::DestinationNotFound(ref d) if d == "elsewhere"));
        assert_eq!(panel.mounted(), None);
    }

    #[test]
    fn test_rerender_discards_previous_render() {
        let mut panel = panel();
        panel
            .render(&request(OutputFormat::LineByLine, &THREE, &[true, true, true]))
            .unwrap();
        let stale = toggles(&panel);

        panel
            .render(&request(OutputFormat::LineByLine, &THREE[..1], &[]))
            .unwrap();
        assert_eq!(toggles(&panel).len(), 1);
        assert_eq!(footer(&panel), "viewed 0/1");

        for toggle in stale {
            panel.click(toggle);
        }
        assert!(panel.channel().is_empty());
    }

    #[test]
    fn test_rerender_reuses_document_slots() {
        let mut panel = panel();
        let req = request(OutputFormat::SideBySide, &THREE, &[true]);
        panel.render(&req).unwrap();
        let live = panel.document().live_count();
        let slots = panel.document().slot_count();
        let first_toggles = toggles(&panel);

        for _ in 0..4 {
            panel.render(&req).unwrap();
            assert_eq!(panel.document().live_count(), live);
            assert_eq!(panel.document().slot_count(), slots);
        }

        // old handles stay dead even though their slots were refilled
        for toggle in first_toggles {
            assert!(!panel.document().is_alive(toggle));
            panel.click(toggle);
        }
        assert!(panel.channel().is_empty());
        assert_eq!(footer(&panel), "viewed 1/3");
    }

    #[test]
    fn test_unified_line_click_opens_file_at_line() {
        let mut panel = panel();
        panel
            .render(&request(OutputFormat::LineByLine, &THREE, &[]))
            .unwrap();
        let doc = panel.document();
        let wrapper = doc.query_all(doc.body(), class::FILE_WRAPPER)[1];
        let cells = doc.query_all(wrapper, class::LINE_NUMBER);

        // deletion row
        panel.click(cells[2]);
        assert!(panel.channel().is_empty());

        panel.click(cells[4]);
        assert_eq!(
            panel.channel().as_slice(),
            &[OutboundMessage::OpenFile {
                path: "lib/b.rs".into(),
                line: Some(3)
            }]
        );
    }

    #[test]
    fn test_side_by_side_left_click_is_ignored() {
        let mut panel = panel();
        panel
            .render(&request(OutputFormat::SideBySide, &THREE, &[]))
            .unwrap();
        let doc = panel.document();
        let panels = doc.query_all(doc.body(), class::FILE_SIDE_DIFF);
        let left_cells = doc.query_all(panels[0], class::SIDE_LINE_NUMBER);
        let right_cells = doc.query_all(panels[1], class::SIDE_LINE_NUMBER);

        for cell in left_cells {
            panel.click(cell);
        }
        assert!(panel.channel().is_empty());

        panel.click(right_cells[1]);
        assert_eq!(
            panel.channel().as_slice(),
            &[OutboundMessage::OpenFile {
                path: "a.rs".into(),
                line: Some(1)
            }]
        );
    }

    #[test]
    fn test_file_name_click_opens_without_line() {
        let mut panel = panel();
        panel
            .render(&request(OutputFormat::LineByLine, &THREE, &[]))
            .unwrap();
        let doc = panel.document();
        let name = doc.query_all(doc.body(), class::FILE_NAME)[1];

        panel.click(name);
        assert_eq!(
            panel.channel().as_slice(),
            &[OutboundMessage::OpenFile {
                path: "lib/b.rs".into(),
                line: None
            }]
        );
    }

    #[test]
    fn test_clicks_outside_container_are_ignored() {
        let mut panel = panel();
        panel
            .render(&request(OutputFormat::LineByLine, &THREE, &[]))
            .unwrap();
        let body = panel.document().body();
        let stray = panel
            .document_mut()
            .append(body, "div", &[class::FILE_WRAPPER]);
        let name = panel
            .document_mut()
            .append_text(stray, "span", &[class::FILE_NAME], "x.rs");

        panel.click(name);
        assert!(panel.channel().is_empty());
    }
}
