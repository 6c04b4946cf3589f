//! One reconciliation pass over a rendered document.
//!
//! A pass first strips whatever an earlier pass added, then for every block
//! container of the log section rebuilds the logical text, wraps highlighted
//! ranges and inserts calorie hints. Running it twice leaves the tree as one
//! run would.

use std::cell::Cell;

use crate::nutrition::NutritionLookup;
use crate::parsing::log::{annotations, highlight_ranges};
use crate::parsing::section::{FOOD_LOG_HEADING, Heading, all_lines};

use super::apply::{apply_ranges, clear_previous, insert_annotations};
use super::reconstruct::reconstruct_within;
use super::tree::{NodeId, NodeKind, PresentationTree, TreeError};

/// Elements whose text is treated as one block of log lines.
pub const BLOCK_TAGS: &[&str] = &["p", "li", "h1", "h2", "h3", "h4", "h5", "h6", "td", "th"];

/// Elements whose content is never decorated.
const OPAQUE_TAGS: &[&str] = &["pre", "code"];

pub fn is_block(kind: &NodeKind) -> bool {
    matches!(kind, NodeKind::Element(e) if BLOCK_TAGS.contains(&e.tag.as_str()))
}

fn is_boundary(kind: &NodeKind) -> bool {
    is_block(kind) || matches!(kind, NodeKind::Element(e) if OPAQUE_TAGS.contains(&e.tag.as_str()))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub containers: usize,
    pub ranges: usize,
    pub annotations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The pass ran to completion.
    Applied(PassStats),
    /// The tree holds no block containers; nothing was touched.
    NoContainers,
    /// Another pass was already in flight.
    Skipped,
    /// The tree rejected an edit; it was restored to its state before the pass.
    Failed,
}

/// Runs reconciliation passes against a lookup.
///
/// Only blocks under the level-2 heading element titled like the log heading
/// are decorated, up to the next `h1` or `h2`. At most one pass runs at a
/// time: a pass requested while another is in progress (for instance from a
/// listener fired by the first) is skipped.
pub struct Reconciler<'a> {
    lookup: &'a dyn NutritionLookup,
    heading: String,
    busy: Cell<bool>,
}

struct PassGuard<'g>(&'g Cell<bool>);

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<'a> Reconciler<'a> {
    pub fn new(lookup: &'a dyn NutritionLookup) -> Self {
        Self {
            lookup,
            heading: FOOD_LOG_HEADING.to_string(),
            busy: Cell::new(false),
        }
    }

    #[must_use]
    pub fn with_heading(mut self, heading: &str) -> Self {
        self.heading = heading.to_string();
        self
    }

    pub fn heading(&self) -> &str {
        &self.heading
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    fn begin(&self) -> Option<PassGuard<'_>> {
        if self.busy.replace(true) {
            return None;
        }
        Some(PassGuard(&self.busy))
    }

    pub fn reconcile(&self, tree: &mut PresentationTree) -> PassOutcome {
        let Some(_guard) = self.begin() else {
            log::debug!("reconcile skipped: pass already in flight");
            return PassOutcome::Skipped;
        };

        let backup = tree.clone();
        match self.run(tree) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("reconcile pass failed, restoring tree: {e}");
                *tree = backup;
                PassOutcome::Failed
            }
        }
    }

    fn run(&self, tree: &mut PresentationTree) -> Result<PassOutcome, TreeError> {
        let root = tree.root();
        clear_previous(tree, root)?;
        tree.reclaim_detached();

        let containers = section_blocks(tree, &self.heading);
        if containers.is_empty() {
            return Ok(PassOutcome::NoContainers);
        }

        let mut stats = PassStats {
            containers: containers.len(),
            ..PassStats::default()
        };
        for container in containers {
            if !tree.is_attached(container) || inside_opaque(tree, container) {
                continue;
            }
            let (ranges, notes) = self.decorate_container(tree, container)?;
            stats.ranges += ranges;
            stats.annotations += notes;
        }
        log::debug!(
            "reconcile: {} containers, {} ranges, {} hints",
            stats.containers,
            stats.ranges,
            stats.annotations
        );
        Ok(PassOutcome::Applied(stats))
    }

    fn decorate_container(
        &self,
        tree: &mut PresentationTree,
        container: NodeId,
    ) -> Result<(usize, usize), TreeError> {
        let logical = reconstruct_within(tree, container, is_boundary);
        if logical.text.trim().is_empty() {
            return Ok((0, 0));
        }
        let lines = all_lines(&logical.text);
        let ranges = apply_ranges(tree, &logical, &highlight_ranges(&lines))?;

        // Highlighting changed the node structure; positions are unchanged.
        let logical = reconstruct_within(tree, container, is_boundary);
        let notes = annotations(&lines, self.lookup);
        let inserted = insert_annotations(tree, &logical, container, &notes)?;
        Ok((ranges, inserted))
    }
}

/// Block containers between the first level-2 heading element titled
/// `heading` and the next `h1` / `h2`, in document order.
fn section_blocks(tree: &PresentationTree, heading: &str) -> Vec<NodeId> {
    let mut out = vec![];
    let mut open = false;
    for id in tree.descendants(tree.root()) {
        let Some(level) = heading_level(tree.kind(id)) else {
            if open && is_block(tree.kind(id)) {
                out.push(id);
            }
            continue;
        };
        let title = tree.text_content(id);
        let parsed = Heading {
            level,
            title: title.trim(),
        };
        if open {
            if parsed.closes_section() {
                break;
            }
            out.push(id);
        } else if parsed.opens(heading) {
            open = true;
        }
    }
    out
}

fn heading_level(kind: &NodeKind) -> Option<usize> {
    let NodeKind::Element(e) = kind else {
        return None;
    };
    match e.tag.as_bytes() {
        [b'h', d @ b'1'..=b'6'] => Some(usize::from(d - b'0')),
        _ => None,
    }
}

fn inside_opaque(tree: &PresentationTree, node: NodeId) -> bool {
    let mut cur = tree.parent(node);
    while let Some(id) = cur {
        if matches!(tree.kind(id), NodeKind::Element(e) if OPAQUE_TAGS.contains(&e.tag.as_str())) {
            return true;
        }
        cur = tree.parent(id);
    }
    false
}
