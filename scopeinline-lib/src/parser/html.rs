//! This module builds the `crate::dom::dom_tree` DOM from HTML using
//! html5ever.

use crate::dom::dom_tree::{self, Document, ElementNode, Node, NodeData, NodeRef, ReadyState};
use html5ever::interface::{ElemName, ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{Attribute, LocalName, Namespace, QualName};
use log::debug;
use std::borrow::Cow;
use std::rc::Rc;

/// Parses a complete HTML document.
///
/// The whole input is available, so the returned document is already
/// `Complete`.
///
/// # Arguments
///
/// * `html_content` - A string slice containing the HTML to parse.
///
/// # Returns
///
/// A `Document` with no observers registered and no style processed yet.
pub fn create_dom_tree(html_content: &str) -> Document {
    let tree_sink = ScopeTreeSink::new();
    let document =
        html5ever::parse_document(tree_sink, Default::default()).one(html_content.to_string());
    document.set_ready_state(ReadyState::Complete);
    document
}

/// A `TreeSink` that builds a [`Document`] through its own mutation
/// methods, so parent pointers stay consistent.
pub struct ScopeTreeSink {
    document: Document,
}

impl ScopeTreeSink {
    pub fn new() -> Self {
        Self {
            document: Document::new(),
        }
    }

    /// Appends text to `node` if it is a text node. Adjacent text coming
    /// from the parser is merged this way, like a browser does.
    fn extend_text(node: Option<NodeRef>, text: &str) -> bool {
        let Some(node) = node else {
            return false;
        };
        let mut node = node.borrow_mut();
        match &mut node.data {
            NodeData::Text(existing) => {
                existing.push_str(text);
                true
            }
            _ => false,
        }
    }
}

impl Default for ScopeTreeSink {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct SinkElemName {
    ns: Namespace,
    local: LocalName,
}

impl ElemName for SinkElemName {
    fn local_name(&self) -> &LocalName {
        &self.local
    }

    fn ns(&self) -> &Namespace {
        &self.ns
    }
}

impl TreeSink for ScopeTreeSink {
    type Handle = NodeRef;
    type Output = Document;
    type ElemName<'a>
        = SinkElemName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self.document
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        debug!("html parse error: {msg}");
    }

    fn get_document(&self) -> Self::Handle {
        Rc::clone(&self.document.root)
    }

    /// html5ever only asks for names of elements; anything else gets an
    /// empty name that matches nothing.
    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        match &target.borrow().data {
            NodeData::Element(elem) => SinkElemName {
                ns: elem.qual_name.ns.clone(),
                local: elem.qual_name.local.clone(),
            },
            _ => SinkElemName {
                ns: Namespace::from(""),
                local: LocalName::from(""),
            },
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let mut element = ElementNode::new(name.local.to_string(), name);
        element.attributes = attrs
            .into_iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect();
        Node::new(NodeData::Element(element))
    }

    fn create_comment(&self, text: StrTendril) -> Self::Handle {
        Node::new(NodeData::Comment(text.to_string()))
    }

    /// Processing instructions only appear in XML; keep them as comments.
    fn create_pi(&self, target: StrTendril, data: StrTendril) -> Self::Handle {
        Node::new(NodeData::Comment(format!("?{} {}", target, data)))
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        match child {
            NodeOrText::AppendNode(node) => self.document.append_child(parent, node),
            NodeOrText::AppendText(text) => {
                let last = parent.borrow().children.last().cloned();
                if !Self::extend_text(last, &text) {
                    self.document
                        .append_child(parent, Node::new(NodeData::Text(text.to_string())));
                }
            }
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        if self.document.parent_node(element).is_some() {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        *self.document.doctype.borrow_mut() = Some(dom_tree::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        });
    }

    /// Template contents are kept as the template's own children.
    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        Rc::clone(target)
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        Rc::ptr_eq(x, y)
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        self.document.quirks_mode.set(mode);
    }

    fn append_before_sibling(&self, sibling: &Self::Handle, child: NodeOrText<Self::Handle>) {
        match child {
            NodeOrText::AppendNode(node) => self.document.insert_before(sibling, node),
            NodeOrText::AppendText(text) => {
                let previous = self.document.previous_sibling(sibling);
                if !Self::extend_text(previous, &text) {
                    self.document
                        .insert_before(sibling, Node::new(NodeData::Text(text.to_string())));
                }
            }
        }
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Attribute>) {
        let mut target_node = target.borrow_mut();
        if let NodeData::Element(elem) = &mut target_node.data {
            for attr in attrs {
                let key = attr.name.local.to_string();
                if elem.attribute(&key).is_none() {
                    elem.attributes.push((key, attr.value.to_string()));
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        self.document.remove_child(target);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let children = std::mem::take(&mut node.borrow_mut().children);
        for child in children {
            child.borrow_mut().parent = None;
            self.document.append_child(new_parent, child);
        }
    }
}
