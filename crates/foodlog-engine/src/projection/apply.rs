//! In-place mutation of the presentation tree: wrapping highlighted ranges
//! and inserting computed hints.
//!
//! Ranges and positions are logical offsets from a [`LogicalText`] built
//! before mutation. Ranges are applied by descending start and hints by
//! descending position, and a split text node always keeps its prefix, so
//! every offset not yet applied still names the same node and start.

use crate::parsing::log::{Annotation, HighlightRange};

use super::reconstruct::{LogicalText, Segment, SegmentKind};
use super::tree::{NodeId, NodeKind, PresentationTree, TreeError};

/// Removes every hint and unwraps every highlight under `root`, then merges
/// the resulting adjacent text runs.
pub fn clear_previous(tree: &mut PresentationTree, root: NodeId) -> Result<(), TreeError> {
    for hint in tree.find_all(root, |k| matches!(k, NodeKind::Hint(_))) {
        tree.detach(hint)?;
    }
    for wrapper in tree.find_all(root, |k| matches!(k, NodeKind::Highlight(_))) {
        tree.unwrap(wrapper)?;
    }
    tree.normalize(root);
    Ok(())
}

/// Wraps each range in a highlight element, latest start first. Returns the
/// number of ranges applied; ranges that no longer map onto text are dropped.
pub fn apply_ranges(
    tree: &mut PresentationTree,
    logical: &LogicalText,
    ranges: &[HighlightRange],
) -> Result<usize, TreeError> {
    let mut ordered = ranges.to_vec();
    ordered.sort_by(|a, b| b.span.start.cmp(&a.span.start));

    let mut applied = 0;
    for range in &ordered {
        if apply_range(tree, logical, range)? {
            applied += 1;
        }
    }
    Ok(applied)
}

/// Wraps one range. Returns `Ok(false)` when the range is dropped.
///
/// The first spanned node keeps its prefix, the wrapper follows it holding
/// the matched text of every spanned node, and the last node keeps whatever
/// follows the range. Nodes fully inside the range are removed.
pub fn apply_range(
    tree: &mut PresentationTree,
    logical: &LogicalText,
    range: &HighlightRange,
) -> Result<bool, TreeError> {
    let span = range.span;
    let segments: Vec<Segment> = logical.overlapping(span).copied().collect();
    let (Some(first), Some(last)) = (segments.first().copied(), segments.last().copied()) else {
        log::debug!("dropping highlight {span:?}: no matching node");
        return Ok(false);
    };
    if segments
        .iter()
        .any(|s| s.kind != SegmentKind::Text || !tree.is_attached(s.node))
    {
        log::debug!("dropping highlight {span:?}: not backed by live text");
        return Ok(false);
    }

    let mut content = String::new();
    for s in &segments {
        let from = span.start.saturating_sub(s.span.start);
        let to = span.end.min(s.span.end) - s.span.start;
        match tree.text(s.node).and_then(|t| t.get(from..to)) {
            Some(part) => content.push_str(part),
            None => {
                log::debug!("dropping highlight {span:?}: node {} changed", s.node);
                return Ok(false);
            }
        }
    }

    let wrapper = tree.create(NodeKind::Highlight(range.kind));
    let inner = tree.create(NodeKind::Text(content));
    tree.append_child(wrapper, inner)?;

    let tail_offset = span.end - last.span.start;
    if first.node == last.node {
        if tail_offset < text_len(tree, last.node) {
            tree.split_text(last.node, tail_offset)?;
        }
    } else {
        let rest = tree
            .text(last.node)
            .and_then(|t| t.get(tail_offset..))
            .map(str::to_string)
            .ok_or(TreeError::BadOffset {
                node: last.node,
                offset: tail_offset,
            })?;
        if rest.is_empty() {
            tree.detach(last.node)?;
        } else {
            tree.set_text(last.node, rest)?;
        }
        for middle in &segments[1..segments.len() - 1] {
            tree.detach(middle.node)?;
        }
    }

    let prefix_len = span.start.saturating_sub(first.span.start);
    if prefix_len == 0 {
        tree.insert_before(first.node, wrapper)?;
        tree.detach(first.node)?;
    } else {
        tree.split_text(first.node, prefix_len)?;
        let matched = tree
            .next_sibling(first.node)
            .ok_or(TreeError::Detached(first.node))?;
        tree.insert_after(first.node, wrapper)?;
        tree.detach(matched)?;
    }
    Ok(true)
}

fn text_len(tree: &PresentationTree, node: NodeId) -> usize {
    tree.text(node).map_or(0, str::len)
}

/// Inserts a hint node for each annotation inside `container`, latest
/// position first. Hints sharing a position keep their input order.
/// Returns the number inserted.
pub fn insert_annotations(
    tree: &mut PresentationTree,
    logical: &LogicalText,
    container: NodeId,
    annotations: &[Annotation],
) -> Result<usize, TreeError> {
    let mut ordered: Vec<&Annotation> = annotations.iter().collect();
    ordered.sort_by(|a, b| b.position.cmp(&a.position));

    let mut inserted = 0;
    let mut previous: Option<(usize, NodeId)> = None;
    for note in ordered {
        let hint = tree.create(NodeKind::Hint(note.text.clone()));

        if let Some((position, prev)) = previous
            && position == note.position
        {
            tree.insert_after(prev, hint)?;
            previous = Some((position, hint));
            inserted += 1;
            continue;
        }

        let Some(location) = logical.locate_anchor(note.position) else {
            log::debug!("dropping hint at {}: no matching node", note.position);
            continue;
        };
        if !tree.is_attached(location.node) {
            continue;
        }
        if location.offset < text_len(tree, location.node) {
            tree.split_text(location.node, location.offset)?;
        }
        let anchor = highlight_ancestor(tree, location.node, container).unwrap_or(location.node);
        tree.insert_after(anchor, hint)?;
        previous = Some((note.position, hint));
        inserted += 1;
    }
    Ok(inserted)
}

/// The nearest highlight wrapper at or above `node`, not looking past
/// `container`.
fn highlight_ancestor(tree: &PresentationTree, node: NodeId, container: NodeId) -> Option<NodeId> {
    let mut cur = node;
    loop {
        if matches!(tree.kind(cur), NodeKind::Highlight(_)) {
            return Some(cur);
        }
        if cur == container {
            return None;
        }
        cur = tree.parent(cur)?;
    }
}
