//! Minimal vector-backed tree for unit tests.

use crate::ElementAdapter;

#[derive(Debug, Default)]
struct TestNode {
    tag: Option<String>,
    text: Option<String>,
    attrs: Vec<(String, String)>,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Node 0 is a document node; everything else is appended below it.
#[derive(Debug)]
pub struct TestTree {
    nodes: Vec<TestNode>,
}

impl TestTree {
    pub const DOCUMENT: usize = 0;

    pub fn new() -> Self {
        Self {
            nodes: vec![TestNode::default()],
        }
    }

    fn push(&mut self, parent: Option<usize>, node: TestNode) -> usize {
        let id = self.nodes.len();
        self.nodes.push(TestNode { parent, ..node });
        if let Some(parent_node) = parent.and_then(|index| self.nodes.get_mut(index)) {
            parent_node.children.push(id);
        }
        id
    }

    pub fn element(&mut self, parent: usize, tag: &str, attrs: &[(&str, &str)]) -> usize {
        let node = TestNode {
            tag: Some(tag.to_owned()),
            attrs: attrs
                .iter()
                .map(|&(key, value)| (key.to_owned(), value.to_owned()))
                .collect(),
            ..TestNode::default()
        };
        self.push(Some(parent), node)
    }

    /// An element with no parent at all.
    pub fn detached(&mut self, tag: &str) -> usize {
        let node = TestNode {
            tag: Some(tag.to_owned()),
            ..TestNode::default()
        };
        self.push(None, node)
    }

    pub fn append_text(&mut self, parent: usize, text: &str) -> usize {
        let node = TestNode {
            text: Some(text.to_owned()),
            ..TestNode::default()
        };
        self.push(Some(parent), node)
    }

    /// A comment: neither element nor text.
    pub fn comment(&mut self, parent: usize) -> usize {
        self.push(Some(parent), TestNode::default())
    }

    /// Every node id, in creation order.
    pub fn all(&self) -> impl Iterator<Item = usize> {
        0..self.nodes.len()
    }
}

impl ElementAdapter for TestTree {
    type Handle = usize;

    fn is_element(&self, node: usize) -> bool {
        self.nodes.get(node).is_some_and(|entry| entry.tag.is_some())
    }

    fn tag_name(&self, node: usize) -> &str {
        self.nodes
            .get(node)
            .and_then(|entry| entry.tag.as_deref())
            .unwrap_or_default()
    }

    fn attributes(&self, node: usize) -> &[(String, String)] {
        match self.nodes.get(node) {
            Some(entry) => &entry.attrs,
            None => &[],
        }
    }

    fn text(&self, node: usize) -> Option<&str> {
        self.nodes.get(node).and_then(|entry| entry.text.as_deref())
    }

    fn parent(&self, node: usize) -> Option<usize> {
        self.nodes.get(node).and_then(|entry| entry.parent)
    }

    fn children(&self, node: usize) -> impl Iterator<Item = usize> {
        self.nodes
            .get(node)
            .into_iter()
            .flat_map(|entry| entry.children.iter().copied())
    }
}
