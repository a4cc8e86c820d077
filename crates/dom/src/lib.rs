//! Arena-backed document tree that compiled selectors run against.
//!
//! The tree is built with the `append_*` methods and queried either through
//! [`Document::select`] or by handing the document to any
//! [`css_selectors::Selector`] as its [`ElementAdapter`].

mod printing;

use anyhow::{Error, bail};
use css_selectors::{ElementAdapter, ParseError, compile};
use indextree::{Arena, Node, NodeId};
use log::{debug, trace};
use smallvec::SmallVec;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeKind {
    #[default]
    Document,
    Element {
        tag: String,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct DomNode {
    pub kind: NodeKind,
    /// Attributes in insertion order. Names are lowercased; duplicates are kept.
    pub attrs: SmallVec<(String, String), 4>,
}

#[derive(Debug)]
pub struct Document {
    dom: Arena<DomNode>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document holding only its document node.
    pub fn new() -> Self {
        let mut dom = Arena::new();
        Self {
            root: dom.new_node(DomNode::default()),
            dom,
        }
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Live node data, `None` for unknown or removed ids.
    pub fn node(&self, id: NodeId) -> Option<&DomNode> {
        self.entry(id).map(Node::get)
    }

    fn entry(&self, id: NodeId) -> Option<&Node<DomNode>> {
        self.dom.get(id).filter(|entry| !entry.is_removed())
    }

    /// Append an element under `parent`. The tag is stored lowercased.
    ///
    /// # Errors
    /// Fails if `parent` is not a live node.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> Result<NodeId, Error> {
        self.append(
            parent,
            NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
            },
        )
    }

    /// # Errors
    /// Fails if `parent` is not a live node.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId, Error> {
        self.append(
            parent,
            NodeKind::Text {
                text: text.to_owned(),
            },
        )
    }

    /// # Errors
    /// Fails if `parent` is not a live node.
    pub fn append_comment(&mut self, parent: NodeId, text: &str) -> Result<NodeId, Error> {
        self.append(
            parent,
            NodeKind::Comment {
                text: text.to_owned(),
            },
        )
    }

    fn append(&mut self, parent: NodeId, kind: NodeKind) -> Result<NodeId, Error> {
        if self.entry(parent).is_none() {
            bail!("cannot append to missing node {parent:?}");
        }
        trace!("append {kind:?} under {parent:?}");
        let node = self.dom.new_node(DomNode {
            kind,
            attrs: SmallVec::new(),
        });
        parent.checked_append(node, &mut self.dom)?;
        Ok(node)
    }

    /// Add an attribute to an element. Existing attributes with the same
    /// name are kept, so lookups see every occurrence.
    ///
    /// # Errors
    /// Fails if `node` is missing or is not an element.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), Error> {
        let Some(entry) = self.dom.get_mut(node).filter(|entry| !entry.is_removed()) else {
            bail!("cannot set attribute {name:?} on missing node {node:?}");
        };
        let data = entry.get_mut();
        if !matches!(data.kind, NodeKind::Element { .. }) {
            bail!("cannot set attribute {name:?} on non-element {node:?}");
        }
        data.attrs
            .push((name.to_ascii_lowercase(), value.to_owned()));
        Ok(())
    }

    /// Detach and drop `node` with its whole subtree.
    ///
    /// # Errors
    /// Fails for the document node or a node that is already gone.
    pub fn remove(&mut self, node: NodeId) -> Result<(), Error> {
        if node == self.root {
            bail!("cannot remove the document node");
        }
        if self.entry(node).is_none() {
            bail!("cannot remove missing node {node:?}");
        }
        node.remove_subtree(&mut self.dom);
        Ok(())
    }

    /// Every node matching `selector`, in document order.
    ///
    /// # Errors
    /// Returns the [`ParseError`] if `selector` does not compile.
    pub fn select(&self, selector: &str) -> Result<Vec<NodeId>, ParseError> {
        let compiled = compile(selector)?;
        let found = compiled.match_all(self, self.root);
        debug!("select {selector:?}: {} nodes", found.len());
        Ok(found)
    }

    /// The first node matching `selector` in document order.
    ///
    /// # Errors
    /// Returns the [`ParseError`] if `selector` does not compile.
    pub fn select_first(&self, selector: &str) -> Result<Option<NodeId>, ParseError> {
        Ok(compile(selector)?.match_first(self, self.root))
    }
}

impl ElementAdapter for Document {
    type Handle = NodeId;

    fn is_element(&self, node: NodeId) -> bool {
        matches!(
            self.node(node).map(|data| &data.kind),
            Some(NodeKind::Element { .. })
        )
    }

    fn tag_name(&self, node: NodeId) -> &str {
        match self.node(node).map(|data| &data.kind) {
            Some(NodeKind::Element { tag }) => tag.as_str(),
            _ => "",
        }
    }

    fn attributes(&self, node: NodeId) -> &[(String, String)] {
        match self.node(node) {
            Some(data) => data.attrs.as_slice(),
            None => &[],
        }
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        match self.node(node).map(|data| &data.kind) {
            Some(NodeKind::Text { text }) => Some(text.as_str()),
            _ => None,
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.entry(node)?.parent()
    }

    fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.entry(node)
            .map(|_| node.children(&self.dom))
            .into_iter()
            .flatten()
    }
}
