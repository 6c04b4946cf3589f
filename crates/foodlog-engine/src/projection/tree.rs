//! An arena-backed presentation tree: the document as displayed.
//!
//! Nodes are addressed by [`NodeId`]. Detached nodes stay in the arena but are
//! unreachable from the root; [`PresentationTree::is_attached`] tells them
//! apart.

use std::fmt;

use crate::parsing::log::HighlightKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A generic structural element such as `p`, `li` or `em`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            classes: vec![],
        }
    }
}

/// The closed set of presentation node kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A run of literal text.
    Text(String),
    /// Any other element; only its children carry content.
    Element(Element),
    /// A rendered wikilink. Its children hold the visible text.
    LinkedReference { target: Option<String> },
    /// A rendered `#tag`. Its children hold the visible text.
    Tag,
    /// A hard line break.
    LineBreak,
    /// A previously inserted computed-value hint.
    Hint(String),
    /// A wrapper created around a highlighted range.
    Highlight(HighlightKind),
}

/// How a node contributes to the logical text reconstructed from the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contribution {
    /// Its own literal text.
    Literal,
    /// `[[target]]`, from the stored target or else the visible text.
    Wikilink,
    /// Its visible text, verbatim.
    VisibleText,
    /// A single `\n`.
    Newline,
    /// Nothing; its subtree is skipped.
    Nothing,
    /// Nothing itself; its children are visited.
    Children,
}

impl NodeKind {
    pub fn contribution(&self) -> Contribution {
        match self {
            NodeKind::Text(_) => Contribution::Literal,
            NodeKind::LinkedReference { .. } => Contribution::Wikilink,
            NodeKind::Tag => Contribution::VisibleText,
            NodeKind::LineBreak => Contribution::Newline,
            NodeKind::Hint(_) => Contribution::Nothing,
            NodeKind::Element(_) | NodeKind::Highlight(_) => Contribution::Children,
        }
    }

    pub fn element(tag: &str) -> Self {
        NodeKind::Element(Element::new(tag))
    }

    pub fn text(s: impl Into<String>) -> Self {
        NodeKind::Text(s.into())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("Node {0} has no parent")]
    Detached(NodeId),
    #[error("Node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
    #[error("Node {0} is not a text node")]
    NotText(NodeId),
    #[error("Offset {offset} is not a character boundary of text node {node}")]
    BadOffset { node: NodeId, offset: usize },
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct PresentationTree {
    nodes: Vec<NodeData>,
    root: NodeId,
    /// Slots released by [`PresentationTree::reclaim_detached`], reused by
    /// [`PresentationTree::create`].
    free: Vec<NodeId>,
}

impl PresentationTree {
    pub fn new(root: NodeKind) -> Self {
        Self {
            nodes: vec![NodeData {
                kind: root,
                parent: None,
                children: vec![],
            }],
            root: NodeId(0),
            free: vec![],
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Allocates a detached node, reusing a reclaimed slot when one is free.
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        let data = NodeData {
            kind,
            parent: None,
            children: vec![],
        };
        if let Some(id) = self.free.pop() {
            self.nodes[id.0] = data;
            return id;
        }
        self.nodes.push(data);
        NodeId(self.nodes.len() - 1)
    }

    /// Number of arena slots, live or free.
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Releases every node unreachable from the root so later calls to
    /// [`PresentationTree::create`] reuse its slot. Ids of detached nodes
    /// must not be used after this call. Returns the number of free slots.
    pub fn reclaim_detached(&mut self) -> usize {
        let mut reachable = vec![false; self.nodes.len()];
        for id in self.descendants(self.root) {
            reachable[id.0] = true;
        }
        self.free.clear();
        for (index, live) in reachable.into_iter().enumerate().rev() {
            if live {
                continue;
            }
            self.nodes[index] = NodeData {
                kind: NodeKind::Text(String::new()),
                parent: None,
                children: vec![],
            };
            self.free.push(NodeId(index));
        }
        self.free.len()
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<(), TreeError> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Text(s) => {
                *s = text.into();
                Ok(())
            }
            _ => Err(TreeError::NotText(id)),
        }
    }

    /// True when `id` is the root or reachable from it.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cur = id;
        loop {
            if cur == self.root {
                return true;
            }
            match self.parent(cur) {
                Some(p) => cur = p,
                None => return false,
            }
        }
    }

    fn index_in_parent(&self, id: NodeId) -> Result<(NodeId, usize), TreeError> {
        let parent = self.parent(id).ok_or(TreeError::Detached(id))?;
        let index = self
            .children(parent)
            .iter()
            .position(|&c| c == id)
            .ok_or(TreeError::NotAChild { parent, child: id })?;
        Ok((parent, index))
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.index_in_parent(id).ok()?;
        self.children(parent).get(index + 1).copied()
    }

    fn insert_at(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<(), TreeError> {
        if self.parent(child).is_some() {
            self.detach(child)?;
        }
        self.nodes[parent.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let index = self.children(parent).len();
        self.insert_at(parent, index, child)
    }

    pub fn insert_before(&mut self, anchor: NodeId, node: NodeId) -> Result<(), TreeError> {
        let (parent, index) = self.index_in_parent(anchor)?;
        self.insert_at(parent, index, node)
    }

    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) -> Result<(), TreeError> {
        let (parent, index) = self.index_in_parent(anchor)?;
        self.insert_at(parent, index + 1, node)
    }

    /// Removes `id` from its parent. The subtree stays intact but detached.
    pub fn detach(&mut self, id: NodeId) -> Result<(), TreeError> {
        let (parent, index) = self.index_in_parent(id)?;
        self.nodes[parent.0].children.remove(index);
        self.nodes[id.0].parent = None;
        Ok(())
    }

    /// Replaces `id` by its children, in place.
    pub fn unwrap(&mut self, id: NodeId) -> Result<(), TreeError> {
        let (parent, index) = self.index_in_parent(id)?;
        let children = std::mem::take(&mut self.nodes[id.0].children);
        self.nodes[parent.0].children.remove(index);
        self.nodes[id.0].parent = None;
        for (offset, child) in children.into_iter().enumerate() {
            self.nodes[child.0].parent = None;
            self.insert_at(parent, index + offset, child)?;
        }
        Ok(())
    }

    /// Splits text node `id` at byte `offset`. `id` keeps the prefix; the
    /// suffix becomes a new following sibling, which is returned.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Result<NodeId, TreeError> {
        let text = self.text(id).ok_or(TreeError::NotText(id))?;
        let (prefix, suffix) = match (text.get(..offset), text.get(offset..)) {
            (Some(p), Some(s)) => (p.to_string(), s.to_string()),
            _ => return Err(TreeError::BadOffset { node: id, offset }),
        };
        let tail = self.create(NodeKind::Text(suffix));
        self.insert_after(id, tail)?;
        self.set_text(id, prefix)?;
        Ok(tail)
    }

    /// Preorder list of `id` and its descendants.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = vec![];
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev());
        }
        out
    }

    /// Concatenated text of every text node under `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    /// Merges adjacent text siblings and drops empty text nodes under `id`.
    pub fn normalize(&mut self, id: NodeId) {
        for parent in self.descendants(id) {
            let children = std::mem::take(&mut self.nodes[parent.0].children);
            let mut kept: Vec<NodeId> = Vec::with_capacity(children.len());
            for child in children {
                let NodeKind::Text(s) = &self.nodes[child.0].kind else {
                    kept.push(child);
                    continue;
                };
                if s.is_empty() {
                    self.nodes[child.0].parent = None;
                    continue;
                }
                if let Some(&last) = kept.last()
                    && let NodeKind::Text(_) = self.nodes[last.0].kind
                {
                    let s = s.clone();
                    if let NodeKind::Text(prev) = &mut self.nodes[last.0].kind {
                        prev.push_str(&s);
                    }
                    self.nodes[child.0].parent = None;
                    continue;
                }
                kept.push(child);
            }
            self.nodes[parent.0].children = kept;
        }
    }

    /// Nodes under `id` (inclusive) whose kind matches `pred`, in preorder.
    pub fn find_all(&self, id: NodeId, pred: impl Fn(&NodeKind) -> bool) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&n| pred(self.kind(n)))
            .collect()
    }
}

impl PresentationTree {
    /// Creates a node and appends it under `parent`, returning its id.
    pub fn build(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.create(kind);
        self.nodes[id.0].parent = Some(parent);
        self.nodes[parent.0].children.push(id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn paragraph() -> (PresentationTree, NodeId) {
        let mut tree = PresentationTree::new(NodeKind::element("div"));
        let p = tree.build(tree.root(), NodeKind::element("p"));
        (tree, p)
    }

    #[test]
    fn split_text_keeps_identity_of_prefix() {
        let (mut tree, p) = paragraph();
        let t = tree.build(p, NodeKind::text("Breakfast 300kcal"));
        let tail = tree.split_text(t, 10).unwrap();
        assert_eq!(tree.text(t), Some("Breakfast "));
        assert_eq!(tree.text(tail), Some("300kcal"));
        assert_eq!(tree.children(p), &[t, tail]);
    }

    #[test]
    fn split_text_rejects_non_boundaries() {
        let (mut tree, p) = paragraph();
        let t = tree.build(p, NodeKind::text("crème"));
        assert_eq!(
            tree.split_text(t, 3),
            Err(TreeError::BadOffset { node: t, offset: 3 })
        );
    }

    #[test]
    fn unwrap_moves_children_into_place() {
        let (mut tree, p) = paragraph();
        let a = tree.build(p, NodeKind::text("a"));
        let w = tree.build(p, NodeKind::Highlight(HighlightKind::Amount));
        let inner = tree.build(w, NodeKind::text("b"));
        let c = tree.build(p, NodeKind::text("c"));
        tree.unwrap(w).unwrap();
        assert_eq!(tree.children(p), &[a, inner, c]);
        assert_eq!(tree.parent(inner), Some(p));
        assert!(!tree.is_attached(w));
    }

    #[test]
    fn reclaimed_slots_are_reused() {
        let (mut tree, p) = paragraph();
        let keep = tree.build(p, NodeKind::text("keep"));
        let gone = tree.build(p, NodeKind::Hint("78kcal".into()));
        tree.build(gone, NodeKind::text("inner"));
        tree.detach(gone).unwrap();
        let before = tree.arena_len();

        assert_eq!(tree.reclaim_detached(), 2);
        let a = tree.create(NodeKind::text("a"));
        let b = tree.create(NodeKind::text("b"));
        tree.append_child(p, a).unwrap();
        tree.append_child(p, b).unwrap();

        assert_eq!(tree.arena_len(), before);
        assert_eq!(tree.text_content(p), "keepab");
        assert_eq!(tree.children(p), &[keep, a, b]);
    }

    #[test]
    fn normalize_merges_adjacent_text() {
        let (mut tree, p) = paragraph();
        let a = tree.build(p, NodeKind::text("a"));
        tree.build(p, NodeKind::text(""));
        tree.build(p, NodeKind::text("b"));
        let br = tree.build(p, NodeKind::LineBreak);
        let c = tree.build(p, NodeKind::text("c"));
        tree.normalize(tree.root());
        assert_eq!(tree.children(p), &[a, br, c]);
        assert_eq!(tree.text(a), Some("ab"));
    }

    #[test]
    fn detached_nodes_cannot_anchor_insertions() {
        let (mut tree, p) = paragraph();
        let t = tree.build(p, NodeKind::text("x"));
        tree.detach(t).unwrap();
        let n = tree.create(NodeKind::LineBreak);
        assert_eq!(tree.insert_after(t, n), Err(TreeError::Detached(t)));
    }

    #[test]
    fn text_content_and_siblings() {
        let (mut tree, p) = paragraph();
        let link = tree.build(
            p,
            NodeKind::LinkedReference {
                target: Some("apple".into()),
            },
        );
        tree.build(link, NodeKind::text("Apple"));
        let t = tree.build(p, NodeKind::text(" 150g"));
        assert_eq!(tree.text_content(p), "Apple 150g");
        assert_eq!(tree.next_sibling(link), Some(t));
        assert_eq!(tree.next_sibling(t), None);
    }
}
