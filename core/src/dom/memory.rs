//! In-memory document
//!
//! A small element tree implementing [`HostDom`], used by tests and the CLI to
//! run decoration passes without a browser. Nodes can be detached to mimic the
//! host application replacing parts of its DOM between passes.

use std::cell::RefCell;
use std::rc::Rc;

use super::error::SelectorError;
use super::selector::{AttributeMatch, Selector, SelectorTarget};
use super::HostDom;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug)]
struct NodeData {
    tag: String,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
struct Tree {
    nodes: Vec<NodeData>,
    path: String,
}

impl Tree {
    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Pre-order descendants of `scope`, excluding `scope` itself
    fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(scope).children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }
}

#[derive(Clone, Copy)]
struct ElementRef<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl SelectorTarget for ElementRef<'_> {
    fn local_name(&self) -> &str {
        &self.tree.node(self.id).tag
    }

    fn has_class(&self, class: &str) -> bool {
        self.tree.node(self.id).classes.iter().any(|c| c == class)
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        if name == "class" {
            return None;
        }
        self.tree.attribute(self.id, name)
    }

    fn parent_element(&self) -> Option<Self> {
        self.tree.node(self.id).parent.map(|id| ElementRef {
            tree: self.tree,
            id,
        })
    }
}

/// Shared handle to an in-memory document. Clones see the same tree.
#[derive(Debug, Clone)]
pub struct MemoryDom {
    tree: Rc<RefCell<Tree>>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// An empty `<html><body></body></html>` document at path `/`
    pub fn new() -> Self {
        let html = NodeData {
            tag: "html".to_string(),
            classes: Vec::new(),
            attributes: Vec::new(),
            parent: None,
            children: vec![NodeId(1)],
        };
        let body = NodeData {
            tag: "body".to_string(),
            classes: Vec::new(),
            attributes: Vec::new(),
            parent: Some(NodeId(0)),
            children: Vec::new(),
        };
        Self {
            tree: Rc::new(RefCell::new(Tree {
                nodes: vec![html, body],
                path: "/".to_string(),
            })),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn body(&self) -> NodeId {
        NodeId(1)
    }

    pub fn set_path(&self, path: &str) {
        self.tree.borrow_mut().path = path.to_string();
    }

    /// Append an element described by a compound selector, e.g.
    /// `div.grid.w-full` or `header[role="banner"]`.
    pub fn append(&self, parent: NodeId, element: &str) -> Result<NodeId, SelectorError> {
        let compound = Selector::parse_compound(element)?;
        let mut tree = self.tree.borrow_mut();
        let id = NodeId(tree.nodes.len());
        let mut attributes: Vec<(String, String)> = compound
            .attributes
            .into_iter()
            .map(|a| match a {
                AttributeMatch::Exists(name) => (name, String::new()),
                AttributeMatch::Equals(name, value) => (name, value),
            })
            .collect();
        if let Some(node_id) = compound.id {
            attributes.push(("id".to_string(), node_id));
        }
        tree.nodes.push(NodeData {
            tag: compound.tag.unwrap_or_else(|| "div".to_string()),
            classes: compound.classes,
            attributes,
            parent: Some(parent),
            children: Vec::new(),
        });
        tree.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Append a chain of nested elements, returning the innermost
    pub fn append_path(&self, parent: NodeId, elements: &[&str]) -> Result<NodeId, SelectorError> {
        elements
            .iter()
            .try_fold(parent, |parent, element| self.append(parent, element))
    }

    /// Detach a node (and its subtree) from the document
    pub fn remove(&self, node: NodeId) {
        let mut tree = self.tree.borrow_mut();
        if let Some(parent) = tree.nodes[node.0].parent.take() {
            tree.nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        let mut tree = self.tree.borrow_mut();
        let attributes = &mut tree.nodes[node.0].attributes;
        match attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => attributes.push((name.to_string(), value.to_string())),
        }
    }

    /// Current `style` attribute
    pub fn style(&self, node: NodeId) -> Option<String> {
        self.tree.borrow().attribute(node, "style").map(String::from)
    }

    /// Every attached node carrying a `style` attribute, in document order
    pub fn styled_nodes(&self) -> Vec<(NodeId, String)> {
        let tree = self.tree.borrow();
        std::iter::once(self.root())
            .chain(tree.descendants(self.root()))
            .filter_map(|id| tree.attribute(id, "style").map(|s| (id, s.to_string())))
            .collect()
    }

    fn select(&self, scope: Option<&NodeId>, selector: &str, first_only: bool) -> Vec<NodeId> {
        let Ok(selector) = Selector::parse(selector) else {
            return Vec::new();
        };
        let tree = self.tree.borrow();
        let scope = scope.copied().unwrap_or(self.root());
        let mut found = Vec::new();
        for id in tree.descendants(scope) {
            if selector.matches(&ElementRef { tree: &tree, id }) {
                found.push(id);
                if first_only {
                    break;
                }
            }
        }
        found
    }
}

impl HostDom for MemoryDom {
    type Node = NodeId;

    fn query(&self, scope: Option<&NodeId>, selector: &str) -> Option<NodeId> {
        self.select(scope, selector, true).into_iter().next()
    }

    fn query_all(&self, scope: Option<&NodeId>, selector: &str) -> Vec<NodeId> {
        self.select(scope, selector, false)
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.tree.borrow().node(*node).parent
    }

    fn first_child(&self, node: &NodeId) -> Option<NodeId> {
        self.tree.borrow().node(*node).children.first().copied()
    }

    fn inline_style(&self, node: &NodeId) -> Option<String> {
        self.style(*node)
    }

    fn set_inline_style(&self, node: &NodeId, style: &str) {
        self.set_attribute(*node, "style", style);
    }

    fn location_path(&self) -> String {
        self.tree.borrow().path.clone()
    }
}
