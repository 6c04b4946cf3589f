//! Reduction of a presentation subtree to logical text, with an offset map
//! back onto the nodes that produced each part of it.

use crate::parsing::rope::Span;

use super::tree::{Contribution, NodeId, NodeKind, PresentationTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// A text node; every byte maps to a byte of the node.
    Text,
    /// A linked reference or tag, contributing a fixed rendering.
    Atomic,
    /// A line break, contributing `\n`.
    Break,
}

/// The half-open interval of logical text produced by one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub node: NodeId,
    pub span: Span,
    pub kind: SegmentKind,
}

/// A position inside a node: a byte offset into a text node, or into the
/// rendering of an atomic node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub node: NodeId,
    pub offset: usize,
}

/// Logical text of a subtree plus the offset map that produced it.
///
/// Built fresh for every pass; any mutation of the tree may invalidate it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogicalText {
    pub text: String,
    pub segments: Vec<Segment>,
}

impl LogicalText {
    /// The node covering logical offset `p` (`start <= p < end`). Zero-width
    /// segments match at their boundary. An offset past every segment maps
    /// to the end of the last one.
    pub fn locate(&self, p: usize) -> Option<Location> {
        let hit = self.segments.iter().find(|s| {
            let Span { start, end } = s.span;
            (start <= p && p < end) || (start == end && p == start)
        });
        match hit {
            Some(s) => Some(Location {
                node: s.node,
                offset: p - s.span.start,
            }),
            None => self.end_location(p),
        }
    }

    /// The node whose content ends at or contains `p` (`start < p <= end`),
    /// i.e. the content immediately before an insertion point. Falls back to
    /// [`LogicalText::locate`].
    pub fn locate_anchor(&self, p: usize) -> Option<Location> {
        self.segments
            .iter()
            .find(|s| s.span.start < p && p <= s.span.end)
            .map(|s| Location {
                node: s.node,
                offset: p - s.span.start,
            })
            .or_else(|| self.locate(p))
    }

    fn end_location(&self, p: usize) -> Option<Location> {
        let last = self.segments.last()?;
        (p >= last.span.end).then_some(Location {
            node: last.node,
            offset: last.span.len(),
        })
    }

    /// Segments sharing at least one byte with `span`, in order.
    pub fn overlapping(&self, span: Span) -> impl Iterator<Item = &Segment> + '_ {
        self.segments.iter().filter(move |s| s.span.overlaps(span))
    }
}

/// Reconstructs the logical text of the subtree rooted at `root`.
pub fn reconstruct(tree: &PresentationTree, root: NodeId) -> LogicalText {
    reconstruct_within(tree, root, |_| false)
}

/// Like [`reconstruct`], but descendants matching `boundary` (other than
/// `root` itself) are skipped entirely.
pub fn reconstruct_within(
    tree: &PresentationTree,
    root: NodeId,
    boundary: impl Fn(&NodeKind) -> bool,
) -> LogicalText {
    let mut out = LogicalText::default();
    visit(tree, root, root, &boundary, &mut out);
    out
}

fn visit(
    tree: &PresentationTree,
    root: NodeId,
    node: NodeId,
    boundary: &dyn Fn(&NodeKind) -> bool,
    out: &mut LogicalText,
) {
    let kind = tree.kind(node);
    if node != root && boundary(kind) {
        return;
    }
    let (piece, segment) = match kind.contribution() {
        Contribution::Nothing => return,
        Contribution::Children => {
            for &child in tree.children(node) {
                visit(tree, root, child, boundary, out);
            }
            return;
        }
        Contribution::Literal => (tree.text(node).unwrap_or_default().to_string(), SegmentKind::Text),
        Contribution::Newline => ("\n".to_string(), SegmentKind::Break),
        Contribution::VisibleText => (tree.text_content(node), SegmentKind::Atomic),
        Contribution::Wikilink => (wikilink_form(tree, node, kind), SegmentKind::Atomic),
    };
    let start = out.text.len();
    out.text.push_str(&piece);
    out.segments.push(Segment {
        node,
        span: Span::new(start, out.text.len()),
        kind: segment,
    });
}

fn wikilink_form(tree: &PresentationTree, node: NodeId, kind: &NodeKind) -> String {
    let target = match kind {
        NodeKind::LinkedReference {
            target: Some(target),
        } if !target.is_empty() => target.clone(),
        _ => tree.text_content(node),
    };
    format!("[[{target}]]")
}
