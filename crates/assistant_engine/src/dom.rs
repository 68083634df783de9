//! Arena model of the host page region the assistant watches.
//!
//! Nodes are never freed: a removed node is detached but keeps its subtree,
//! so cached handles stay valid for cloning. Child-list changes are journaled
//! the way a subtree mutation observer would report them; class changes are
//! not.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use ego_tree::{NodeId, NodeRef, Tree};
use scraper::node::Node;
use scraper::Html;
use thiserror::Error;

pub type NodeHandle = NodeId;

pub const CLASS_HIDDEN: &str = "qrq-hidden-by-plugin";
pub const CLASS_WHITELISTED: &str = "qrq-whitelisted-original";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeHandle),
    #[error("reference node {reference:?} is not a child of {parent:?}")]
    NotAChild {
        parent: NodeHandle,
        reference: NodeHandle,
    },
    #[error("cannot insert {node:?}: it contains the target parent")]
    Hierarchy { node: NodeHandle },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomElement {
    pub tag: String,
    pub id: Option<String>,
    classes: BTreeSet<String>,
    attrs: BTreeMap<String, String>,
    pub text: String,
}

impl DomElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.insert(class.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn id_starts_with(&self, prefix: &str) -> bool {
        self.id.as_deref().is_some_and(|id| id.starts_with(prefix))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    ChildAdded,
    ChildRemoved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationRecord {
    pub parent: NodeHandle,
    pub node: NodeHandle,
    pub kind: MutationKind,
}

#[derive(Debug, Clone)]
pub struct Dom {
    tree: Tree<DomElement>,
    journal: Vec<MutationRecord>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    pub fn new() -> Self {
        Self {
            tree: Tree::new(DomElement::new("#document")),
            journal: Vec::new(),
        }
    }

    /// Builds a document from markup. Parsing is lenient; broken markup yields
    /// whatever structure the HTML parser recovers.
    pub fn parse_html(markup: &str) -> Self {
        let html = Html::parse_fragment(markup);
        let mut dom = Self::new();
        let document = dom.document();
        copy_children(&mut dom, document, *html.root_element());
        dom.journal.clear();
        dom
    }

    pub fn document(&self) -> NodeHandle {
        self.tree.root().id()
    }

    pub fn element(&self, node: NodeHandle) -> Option<&DomElement> {
        self.tree.get(node).map(|n| n.value())
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, element: DomElement) -> NodeHandle {
        self.tree.orphan(element).id()
    }

    /// Creates `element` and appends it under `parent`.
    pub fn append_new(
        &mut self,
        parent: NodeHandle,
        element: DomElement,
    ) -> Result<NodeHandle, DomError> {
        let node = self.create_element(element);
        self.append_child(parent, node)?;
        Ok(node)
    }

    pub fn append_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<(), DomError> {
        self.check_insertable(parent, child)?;
        self.record_detach(child);
        let mut parent_mut = self
            .tree
            .get_mut(parent)
            .ok_or(DomError::UnknownNode(parent))?;
        parent_mut.append_id(child);
        self.journal.push(MutationRecord {
            parent,
            node: child,
            kind: MutationKind::ChildAdded,
        });
        Ok(())
    }

    /// Inserts `child` under `parent` right before `reference`.
    pub fn insert_before(
        &mut self,
        parent: NodeHandle,
        child: NodeHandle,
        reference: NodeHandle,
    ) -> Result<(), DomError> {
        self.check_insertable(parent, child)?;
        if self.parent(reference) != Some(parent) {
            return Err(DomError::NotAChild { parent, reference });
        }
        if child == reference {
            return Ok(());
        }
        self.record_detach(child);
        let mut reference_mut = self
            .tree
            .get_mut(reference)
            .ok_or(DomError::UnknownNode(reference))?;
        reference_mut.insert_id_before(child);
        self.journal.push(MutationRecord {
            parent,
            node: child,
            kind: MutationKind::ChildAdded,
        });
        Ok(())
    }

    /// Detaches `node` from its parent; the node and its subtree stay alive.
    pub fn remove(&mut self, node: NodeHandle) -> Result<(), DomError> {
        if self.tree.get(node).is_none() {
            return Err(DomError::UnknownNode(node));
        }
        self.record_detach(node);
        if let Some(mut node_mut) = self.tree.get_mut(node) {
            node_mut.detach();
        }
        Ok(())
    }

    /// Detached deep copy of `node` and its subtree.
    pub fn deep_clone(&mut self, node: NodeHandle) -> Result<NodeHandle, DomError> {
        let value = self
            .element(node)
            .cloned()
            .ok_or(DomError::UnknownNode(node))?;
        let copy = self.create_element(value);
        for child in self.children(node) {
            let child_copy = self.deep_clone(child)?;
            if let Some(mut copy_mut) = self.tree.get_mut(copy) {
                copy_mut.append_id(child_copy);
            }
        }
        Ok(copy)
    }

    pub fn parent(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.tree.get(node)?.parent().map(|p| p.id())
    }

    pub fn children(&self, node: NodeHandle) -> Vec<NodeHandle> {
        self.tree
            .get(node)
            .map(|n| n.children().map(|c| c.id()).collect())
            .unwrap_or_default()
    }

    /// All descendants of `node` in document order, excluding `node` itself.
    pub fn descendants(&self, node: NodeHandle) -> Vec<NodeHandle> {
        self.tree
            .get(node)
            .map(|n| n.descendants().skip(1).map(|d| d.id()).collect())
            .unwrap_or_default()
    }

    pub fn next_sibling(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.tree.get(node)?.next_sibling().map(|s| s.id())
    }

    /// True when `node` is reachable from the document root.
    pub fn is_attached(&self, node: NodeHandle) -> bool {
        let document = self.document();
        match self.tree.get(node) {
            Some(n) => n.id() == document || n.ancestors().any(|a| a.id() == document),
            None => false,
        }
    }

    /// True when `node` is `ancestor` or lies inside it.
    pub fn contains(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        match self.tree.get(node) {
            Some(n) => n.id() == ancestor || n.ancestors().any(|a| a.id() == ancestor),
            None => false,
        }
    }

    /// First attached element with this id, in document order.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeHandle> {
        self.tree
            .root()
            .descendants()
            .find(|n| n.value().id.as_deref() == Some(id))
            .map(|n| n.id())
    }

    /// Every element with this id under `scope`; hosts do not keep ids unique.
    pub fn find_all_by_id(&self, scope: NodeHandle, id: &str) -> Vec<NodeHandle> {
        self.descendants(scope)
            .into_iter()
            .filter(|&n| self.element(n).and_then(|e| e.id.as_deref()) == Some(id))
            .collect()
    }

    pub fn has_class(&self, node: NodeHandle, class: &str) -> bool {
        self.element(node).is_some_and(|e| e.has_class(class))
    }

    pub fn add_class(&mut self, node: NodeHandle, class: &str) {
        if let Some(mut n) = self.tree.get_mut(node) {
            n.value().classes.insert(class.to_string());
        }
    }

    pub fn remove_class(&mut self, node: NodeHandle, class: &str) {
        if let Some(mut n) = self.tree.get_mut(node) {
            n.value().classes.remove(class);
        }
    }

    pub fn text(&self, node: NodeHandle) -> Option<&str> {
        self.element(node).map(|e| e.text.trim())
    }

    /// Drains pending child-list mutation records.
    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.journal)
    }

    /// Sorted class list of every element under `scope`, for comparing passes.
    pub fn class_snapshot(&self, scope: NodeHandle) -> Vec<(NodeHandle, Vec<String>)> {
        std::iter::once(scope)
            .chain(self.descendants(scope))
            .filter_map(|n| {
                self.element(n)
                    .map(|e| (n, e.classes().map(str::to_string).collect()))
            })
            .collect()
    }

    /// Indented outline of `scope` with reconciliation markers, for logs.
    pub fn structure(&self, scope: NodeHandle) -> String {
        let Some(root) = self.tree.get(scope) else {
            return format!("[{scope:?} not found]");
        };
        let mut out = String::new();
        write_structure(&mut out, root, 0);
        out
    }

    fn check_insertable(&self, parent: NodeHandle, child: NodeHandle) -> Result<(), DomError> {
        if self.tree.get(parent).is_none() {
            return Err(DomError::UnknownNode(parent));
        }
        if self.tree.get(child).is_none() {
            return Err(DomError::UnknownNode(child));
        }
        if self.contains(child, parent) {
            return Err(DomError::Hierarchy { node: child });
        }
        Ok(())
    }

    fn record_detach(&mut self, node: NodeHandle) {
        if let Some(parent) = self.parent(node) {
            self.journal.push(MutationRecord {
                parent,
                node,
                kind: MutationKind::ChildRemoved,
            });
        }
    }
}

fn write_structure(out: &mut String, node: NodeRef<'_, DomElement>, depth: usize) {
    let element = node.value();
    let _ = write!(out, "{}<{}", "  ".repeat(depth), element.tag);
    if let Some(id) = &element.id {
        let _ = write!(out, " id=\"{id}\"");
    }
    if !element.classes.is_empty() {
        let classes: Vec<_> = element.classes().collect();
        let _ = write!(out, " class=\"{}\"", classes.join(" "));
    }
    if element.has_class(CLASS_HIDDEN) {
        out.push_str(" [HIDDEN]");
    }
    if element.has_class(CLASS_WHITELISTED) {
        out.push_str(" [WHITELISTED]");
    }
    out.push('>');
    for child in node.children() {
        out.push('\n');
        write_structure(out, child, depth + 1);
    }
}

fn copy_children(dom: &mut Dom, parent: NodeHandle, source: NodeRef<'_, Node>) {
    for child in source.children() {
        match child.value() {
            Node::Element(element) => {
                let mut copy = DomElement::new(element.name());
                copy.id = element.id().map(str::to_string);
                for class in element.classes() {
                    copy.classes.insert(class.to_string());
                }
                for (name, value) in element.attrs() {
                    if name != "id" && name != "class" {
                        copy.attrs.insert(name.to_string(), value.to_string());
                    }
                }
                let node = dom.create_element(copy);
                if let Some(mut parent_mut) = dom.tree.get_mut(parent) {
                    parent_mut.append_id(node);
                }
                copy_children(dom, node, child);
            }
            Node::Text(text) => {
                if let Some(mut parent_mut) = dom.tree.get_mut(parent) {
                    parent_mut.value().text.push_str(text);
                }
            }
            _ => copy_children(dom, parent, child),
        }
    }
}
