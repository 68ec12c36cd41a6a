//! In-memory element tree hosting the rendered diff
//!
//! Models the subset of the webview DOM the panel relies on: class lists,
//! text, checkbox state, ancestor lookup and document-order queries. Elements
//! live in a generational arena: removed slots are reused, and a handle to a
//! removed element never resolves again, even after its slot is refilled.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Handle to an element in a [`Document`], written as `index.generation`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.index, self.generation)
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.to_string()
    }
}

impl FromStr for NodeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (index, generation) = s
            .split_once('.')
            .ok_or_else(|| format!("node handle {:?} is not index.generation", s))?;
        let parse = |part: &str| {
            part.parse::<u32>()
                .map_err(|err| format!("node handle {:?}: {}", s, err))
        };
        Ok(Self {
            index: parse(index)?,
            generation: parse(generation)?,
        })
    }
}

impl TryFrom<String> for NodeId {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    text: String,
    checked: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            id: None,
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            text: String::new(),
            checked: false,
            parent: None,
            children: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    element: Option<Element>,
}

/// Block alignment requested by a scroll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBlock {
    Nearest,
}

pub struct Document {
    slots: Vec<Slot>,
    /// Indices of empty slots, reused before the arena grows
    free: Vec<u32>,
    body: NodeId,
    scroll_requests: Vec<(NodeId, ScrollBlock)>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document with a `body` root
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                element: Some(Element::new("body")),
            }],
            free: Vec::new(),
            body: NodeId {
                index: 0,
                generation: 0,
            },
            scroll_requests: Vec::new(),
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    fn get(&self, node: NodeId) -> Option<&Element> {
        self.slots
            .get(node.index())
            .filter(|slot| slot.generation == node.generation)
            .and_then(|slot| slot.element.as_ref())
    }

    fn get_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.slots
            .get_mut(node.index())
            .filter(|slot| slot.generation == node.generation)
            .and_then(|slot| slot.element.as_mut())
    }

    /// Whether the handle still refers to a live element
    pub fn is_alive(&self, node: NodeId) -> bool {
        self.get(node).is_some()
    }

    /// Number of live elements
    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Number of arena slots, live or free
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Creates a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let element = Some(Element::new(tag));
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.element = element;
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            element,
        });
        NodeId {
            index: (self.slots.len() - 1) as u32,
            generation: 0,
        }
    }

    /// Empties the slot behind `node` and retires its handle
    fn release(&mut self, node: NodeId) {
        let Some(slot) = self.slots.get_mut(node.index()) else {
            return;
        };
        if slot.generation != node.generation || slot.element.take().is_none() {
            return;
        }
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(node.index);
    }

    /// Appends `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if !self.is_alive(parent) || !self.is_alive(child) {
            return;
        }
        if let Some(old_parent) = self.get(child).and_then(|e| e.parent) {
            if let Some(p) = self.get_mut(old_parent) {
                p.children.retain(|c| *c != child);
            }
        }
        if let Some(c) = self.get_mut(child) {
            c.parent = Some(parent);
        }
        if let Some(p) = self.get_mut(parent) {
            p.children.push(child);
        }
    }

    /// Creates an element with the given classes and appends it to `parent`
    pub fn append(&mut self, parent: NodeId, tag: &str, classes: &[&str]) -> NodeId {
        let node = self.create_element(tag);
        for class in classes {
            self.add_class(node, class);
        }
        self.append_child(parent, node);
        node
    }

    /// Like [`Document::append`] but also sets the element's own text
    pub fn append_text(&mut self, parent: NodeId, tag: &str, classes: &[&str], text: &str) -> NodeId {
        let node = self.append(parent, tag, classes);
        self.set_text(node, text);
        node
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.get(node).map(|e| e.tag.as_str())
    }

    pub fn set_id(&mut self, node: NodeId, id: &str) {
        if let Some(e) = self.get_mut(node) {
            e.id = Some(id.to_string());
        }
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(e) = self.get_mut(node) {
            if !e.classes.iter().any(|c| c == class) {
                e.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(e) = self.get_mut(node) {
            e.classes.retain(|c| c != class);
        }
    }

    /// Adds or removes `class` so that its presence equals `on`
    pub fn set_class(&mut self, node: NodeId, class: &str, on: bool) {
        if on {
            self.add_class(node, class);
        } else {
            self.remove_class(node, class);
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.get(node)
            .is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(e) = self.get_mut(node) {
            e.attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.get(node)
            .and_then(|e| e.attrs.get(name))
            .map(String::as_str)
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(e) = self.get_mut(node) {
            e.text = text.to_string();
        }
    }

    /// Own text followed by the text of all descendants, in document order
    pub fn text_content(&self, node: NodeId) -> Option<String> {
        self.get(node)?;
        let mut out = String::new();
        for n in self.subtree(node) {
            if let Some(e) = self.get(n) {
                out.push_str(&e.text);
            }
        }
        Some(out)
    }

    pub fn is_checked(&self, node: NodeId) -> bool {
        self.get(node).is_some_and(|e| e.checked)
    }

    pub fn set_checked(&mut self, node: NodeId, checked: bool) {
        if let Some(e) = self.get_mut(node) {
            e.checked = checked;
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(|e| e.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.get(node).map(|e| e.children.as_slice()).unwrap_or(&[])
    }

    /// Whether `node` is the first child of its parent
    pub fn is_first_element_child(&self, node: NodeId) -> bool {
        self.parent(node)
            .and_then(|p| self.children(p).first().copied())
            == Some(node)
    }

    /// Nearest inclusive ancestor carrying `class`
    pub fn closest(&self, node: NodeId, class: &str) -> Option<NodeId> {
        self.closest_where(node, |n| self.has_class(n, class))
    }

    /// Nearest inclusive ancestor satisfying `pred`
    pub fn closest_where(&self, node: NodeId, pred: impl Fn(NodeId) -> bool) -> Option<NodeId> {
        let mut current = self.get(node).map(|_| node);
        while let Some(n) = current {
            if pred(n) {
                return Some(n);
            }
            current = self.parent(n);
        }
        None
    }

    /// Whether `node` is `ancestor` or lies beneath it
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.closest_where(node, |n| n == ancestor).is_some()
    }

    /// `node` and all its descendants in document order
    pub fn subtree(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.get(node).is_none() {
            return out;
        }
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }

    /// Descendants of `root` (excluding `root`) carrying `class`, in document order
    pub fn query_all(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.subtree(root)
            .into_iter()
            .skip(1)
            .filter(|n| self.has_class(*n, class))
            .collect()
    }

    /// First descendant of `root` carrying `class`
    pub fn query(&self, root: NodeId, class: &str) -> Option<NodeId> {
        self.subtree(root)
            .into_iter()
            .skip(1)
            .find(|n| self.has_class(*n, class))
    }

    /// First element in the document with the given tag name
    pub fn query_tag(&self, tag: &str) -> Option<NodeId> {
        self.subtree(self.body)
            .into_iter()
            .find(|n| self.tag(*n) == Some(tag))
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.subtree(self.body)
            .into_iter()
            .find(|n| self.get(*n).and_then(|e| e.id.as_deref()) == Some(id))
    }

    /// Removes every descendant of `node`; their handles become dead
    pub fn clear_children(&mut self, node: NodeId) {
        let children = match self.get_mut(node) {
            Some(e) => std::mem::take(&mut e.children),
            None => return,
        };
        for child in children {
            for n in self.subtree(child) {
                self.release(n);
            }
        }
        if let Some(e) = self.get_mut(node) {
            e.text.clear();
        }
    }

    /// Records a request to bring `node` into view
    pub fn scroll_into_view(&mut self, node: NodeId, block: ScrollBlock) {
        if self.is_alive(node) {
            self.scroll_requests.push((node, block));
        }
    }

    /// Drains the scroll requests recorded so far
    pub fn take_scroll_requests(&mut self) -> Vec<(NodeId, ScrollBlock)> {
        std::mem::take(&mut self.scroll_requests)
    }

    /// Indented outline of the subtree at `node`, one element per line
    pub fn outline(&self, node: NodeId) -> Outline<'_> {
        Outline { doc: self, node }
    }
}

/// Display adapter returned by [`Document::outline`]
pub struct Outline<'a> {
    doc: &'a Document,
    node: NodeId,
}

impl Outline<'_> {
    fn write_node(&self, f: &mut fmt::Formatter<'_>, node: NodeId, depth: usize) -> fmt::Result {
        let Some(e) = self.doc.get(node) else {
            return Ok(());
        };
        write!(f, "{:indent$}#{} <{}", "", node, e.tag, indent = depth * 2)?;
        if let Some(id) = &e.id {
            write!(f, " id={}", id)?;
        }
        if !e.classes.is_empty() {
            write!(f, " class=\"{}\"", e.classes.join(" "))?;
        }
        if e.checked {
            f.write_str(" checked")?;
        }
        f.write_str(">")?;
        if !e.text.is_empty() {
            write!(f, " {:?}", e.text)?;
        }
        f.write_str("\n")?;
        for child in &e.children {
            self.write_node(f, *child, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Outline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_node(f, self.node, 0)
    }
}
