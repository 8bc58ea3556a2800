use html5ever::interface::QuirksMode;
use html5ever::{LocalName, Namespace, QualName};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

pub mod dom_tree {
    use super::*;
    use crate::observer::PendingRecords;
    use log::warn;

    const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

    pub type NodeRef = Rc<RefCell<Node>>;

    #[derive(Debug)]
    pub struct Node {
        pub data: NodeData,
        pub parent: Option<Weak<RefCell<Node>>>,
        pub children: Vec<NodeRef>,
    }

    #[derive(Debug, Clone)]
    pub enum NodeData {
        DocumentRoot,
        Element(ElementNode),
        Text(String),
        Comment(String),
    }

    #[derive(Debug, Clone)]
    pub struct ElementNode {
        pub tag: String,
        pub qual_name: QualName,
        pub attributes: Vec<(String, String)>,
    }

    #[derive(Debug)]
    pub struct Doctype {
        pub name: String,
        pub public_id: String,
        pub system_id: String,
    }

    /// Mirrors `document.readyState`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum ReadyState {
        #[default]
        Loading,
        Interactive,
        Complete,
    }

    /// A document tree plus the observer registrations watching it.
    ///
    /// Every tree mutation made through the `Document` methods queues
    /// mutation records for interested observers. Editing `Node` fields
    /// directly bypasses that.
    #[derive(Debug)]
    pub struct Document {
        pub root: NodeRef,
        pub doctype: RefCell<Option<Doctype>>,
        pub quirks_mode: Cell<QuirksMode>,
        ready_state: Cell<ReadyState>,
        pub(crate) observers: Rc<PendingRecords>,
    }

    impl Node {
        pub fn new(data: NodeData) -> NodeRef {
            Rc::new(RefCell::new(Node {
                data,
                parent: None,
                children: Vec::new(),
            }))
        }

        pub fn element(&self) -> Option<&ElementNode> {
            match &self.data {
                NodeData::Element(elem) => Some(elem),
                _ => None,
            }
        }

        pub fn is_element(&self) -> bool {
            matches!(self.data, NodeData::Element(_))
        }

        /// True if this is an element with the given (lowercase) tag.
        pub fn has_tag(&self, tag: &str) -> bool {
            self.element().is_some_and(|elem| elem.tag == tag)
        }
    }

    impl ElementNode {
        pub fn new(tag: String, qual_name: QualName) -> Self {
            ElementNode {
                tag,
                qual_name,
                attributes: Vec::new(),
            }
        }

        /// Builds an element in the HTML namespace.
        pub fn html(tag: &str) -> Self {
            let tag = tag.to_ascii_lowercase();
            let qual_name = QualName::new(
                None,
                Namespace::from(HTML_NAMESPACE),
                LocalName::from(tag.as_str()),
            );
            ElementNode::new(tag, qual_name)
        }

        pub fn attribute(&self, name: &str) -> Option<&str> {
            self.attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        }

        pub fn set_attribute(&mut self, name: &str, value: &str) {
            match self.attributes.iter_mut().find(|(key, _)| key == name) {
                Some((_, existing)) => *existing = value.to_string(),
                None => self.attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    impl Default for Document {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Document {
        /// An empty document that is still loading.
        pub fn new() -> Self {
            Document {
                root: Node::new(NodeData::DocumentRoot),
                doctype: RefCell::new(None),
                quirks_mode: Cell::new(QuirksMode::NoQuirks),
                ready_state: Cell::new(ReadyState::Loading),
                observers: Rc::default(),
            }
        }

        pub fn ready_state(&self) -> ReadyState {
            self.ready_state.get()
        }

        pub fn set_ready_state(&self, state: ReadyState) {
            self.ready_state.set(state);
        }

        pub fn create_element(&self, tag: &str) -> NodeRef {
            Node::new(NodeData::Element(ElementNode::html(tag)))
        }

        pub fn create_text(&self, text: &str) -> NodeRef {
            Node::new(NodeData::Text(text.to_string()))
        }

        pub fn create_comment(&self, text: &str) -> NodeRef {
            Node::new(NodeData::Comment(text.to_string()))
        }

        pub fn parent_node(&self, node: &NodeRef) -> Option<NodeRef> {
            node.borrow().parent.as_ref().and_then(Weak::upgrade)
        }

        /// The parent, if it is an element. A node directly under the
        /// document root has a parent node but no parent element.
        pub fn parent_element(&self, node: &NodeRef) -> Option<NodeRef> {
            self.parent_node(node)
                .filter(|parent| parent.borrow().is_element())
        }

        pub fn previous_sibling(&self, node: &NodeRef) -> Option<NodeRef> {
            let parent = self.parent_node(node)?;
            let parent = parent.borrow();
            let index = parent
                .children
                .iter()
                .position(|child| Rc::ptr_eq(child, node))?;
            index
                .checked_sub(1)
                .map(|prev| Rc::clone(&parent.children[prev]))
        }

        /// Appends `child` as the last child of `parent`, moving it out of
        /// its current parent first.
        pub fn append_child(&self, parent: &NodeRef, child: NodeRef) {
            if is_inclusive_ancestor(&child, parent) {
                warn!("refusing to append a node into its own subtree");
                return;
            }
            self.remove_child(&child);
            child.borrow_mut().parent = Some(Rc::downgrade(parent));
            parent.borrow_mut().children.push(Rc::clone(&child));
            self.queue_child_list(parent, vec![child], Vec::new());
        }

        /// Inserts `child` right before `reference`. Does nothing when
        /// `reference` is detached.
        pub fn insert_before(&self, reference: &NodeRef, child: NodeRef) {
            let Some(parent) = self.parent_node(reference) else {
                return;
            };
            if is_inclusive_ancestor(&child, &parent) {
                warn!("refusing to insert a node into its own subtree");
                return;
            }
            self.remove_child(&child);
            let index = parent
                .borrow()
                .children
                .iter()
                .position(|sibling| Rc::ptr_eq(sibling, reference));
            let Some(index) = index else {
                return;
            };
            child.borrow_mut().parent = Some(Rc::downgrade(&parent));
            parent.borrow_mut().children.insert(index, Rc::clone(&child));
            self.queue_child_list(&parent, vec![child], Vec::new());
        }

        /// Detaches `node` from its parent. Returns false if it had none.
        pub fn remove_child(&self, node: &NodeRef) -> bool {
            let Some(parent) = self.parent_node(node) else {
                return false;
            };
            parent
                .borrow_mut()
                .children
                .retain(|child| !Rc::ptr_eq(child, node));
            node.borrow_mut().parent = None;
            self.queue_child_list(&parent, Vec::new(), vec![Rc::clone(node)]);
            true
        }

        /// Concatenated text of all descendant text nodes.
        pub fn text_content(&self, node: &NodeRef) -> String {
            let mut text = String::new();
            collect_text(node, &mut text);
            text
        }

        /// Replaces every child of `node` with a single text node (or with
        /// nothing when `text` is empty).
        pub fn set_text_content(&self, node: &NodeRef, text: String) {
            let removed = std::mem::take(&mut node.borrow_mut().children);
            for child in &removed {
                child.borrow_mut().parent = None;
            }

            let mut added = Vec::new();
            if !text.is_empty() {
                let text_node = Node::new(NodeData::Text(text));
                text_node.borrow_mut().parent = Some(Rc::downgrade(node));
                node.borrow_mut().children.push(Rc::clone(&text_node));
                added.push(text_node);
            }

            if !(removed.is_empty() && added.is_empty()) {
                self.queue_child_list(node, added, removed);
            }
        }

        pub fn get_attribute(&self, node: &NodeRef, name: &str) -> Option<String> {
            node.borrow()
                .element()
                .and_then(|elem| elem.attribute(name))
                .map(str::to_string)
        }

        pub fn has_attribute(&self, node: &NodeRef, name: &str) -> bool {
            node.borrow()
                .element()
                .is_some_and(|elem| elem.attribute(name).is_some())
        }

        /// Sets an attribute on an element. Non-element nodes are ignored.
        pub fn set_attribute(&self, node: &NodeRef, name: &str, value: &str) {
            {
                let mut node_mut = node.borrow_mut();
                let NodeData::Element(elem) = &mut node_mut.data else {
                    return;
                };
                elem.set_attribute(name, value);
            }
            self.queue_attribute(node, name);
        }

        /// `classList.add`: appends `class` unless already present, and
        /// normalizes the attribute to single-space separated tokens.
        /// Returns false if the class was already there.
        pub fn add_class(&self, node: &NodeRef, class: &str) -> bool {
            let current = self.get_attribute(node, "class").unwrap_or_default();
            let mut tokens: Vec<&str> = Vec::new();
            for token in current.split_ascii_whitespace() {
                if !tokens.contains(&token) {
                    tokens.push(token);
                }
            }
            let added = !tokens.contains(&class);
            if added {
                tokens.push(class);
            }
            let value = tokens.join(" ");
            self.set_attribute(node, "class", &value);
            added
        }

        pub fn has_class(&self, node: &NodeRef, class: &str) -> bool {
            self.get_attribute(node, "class")
                .is_some_and(|value| value.split_ascii_whitespace().any(|token| token == class))
        }

        /// The `<html>` element.
        pub fn document_element(&self) -> Option<NodeRef> {
            self.root
                .borrow()
                .children
                .iter()
                .find(|child| child.borrow().is_element())
                .cloned()
        }

        pub fn body(&self) -> Option<NodeRef> {
            let html = self.document_element()?;
            let html = html.borrow();
            html.children
                .iter()
                .find(|child| child.borrow().has_tag("body"))
                .cloned()
        }

        /// Descendants of `scope` (excluding `scope` itself) with the given
        /// tag, in document order.
        pub fn elements_by_tag(&self, scope: &NodeRef, tag: &str) -> Vec<NodeRef> {
            let tag = tag.to_ascii_lowercase();
            let mut found = Vec::new();
            for child in &scope.borrow().children {
                collect_elements(child, &tag, &mut found);
            }
            found
        }

        /// Style elements not yet carrying `marker`, searched under `<body>`.
        ///
        /// An `<html>` element without a body yet (a document still being
        /// built) has nothing to scope. Only a document with no `<html>`
        /// element at all is searched from the root.
        pub fn unprocessed_styles(&self, marker: &str) -> Vec<NodeRef> {
            let search_root = match (self.body(), self.document_element()) {
                (Some(body), _) => body,
                (None, Some(html)) if html.borrow().has_tag("html") => return Vec::new(),
                (None, _) => Rc::clone(&self.root),
            };
            self.elements_by_tag(&search_root, "style")
                .into_iter()
                .filter(|style| !self.has_attribute(style, marker))
                .collect()
        }
    }

    /// True if `ancestor` is `node` or one of its ancestors.
    pub fn is_inclusive_ancestor(ancestor: &NodeRef, node: &NodeRef) -> bool {
        let mut current = Some(Rc::clone(node));
        while let Some(candidate) = current {
            if Rc::ptr_eq(&candidate, ancestor) {
                return true;
            }
            current = candidate.borrow().parent.as_ref().and_then(Weak::upgrade);
        }
        false
    }

    fn collect_text(node: &NodeRef, text: &mut String) {
        let node = node.borrow();
        match &node.data {
            NodeData::Text(value) => text.push_str(value),
            NodeData::Comment(_) => {}
            NodeData::DocumentRoot | NodeData::Element(_) => {
                for child in &node.children {
                    collect_text(child, text);
                }
            }
        }
    }

    fn collect_elements(node: &NodeRef, tag: &str, found: &mut Vec<NodeRef>) {
        if node.borrow().has_tag(tag) {
            found.push(Rc::clone(node));
        }
        for child in &node.borrow().children {
            collect_elements(child, tag, found);
        }
    }
}
