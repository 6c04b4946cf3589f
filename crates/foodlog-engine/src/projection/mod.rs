//! # Projection
//!
//! Decorates an already-rendered document in place. The rendered document is
//! modelled as a [`PresentationTree`]; from each block container the engine
//! reconstructs the markdown-like logical text together with an offset map
//! back to the nodes that produced it, runs the food log grammar over that
//! text, and maps the results back onto the tree as highlight wrappers and
//! hint nodes.
//!
//! ## Modules
//!
//! - **`tree`**: the arena tree and its node kinds
//! - **`reconstruct`**: logical text and the offset map
//! - **`apply`**: range wrapping and hint insertion
//! - **`reconcile`**: a full idempotent pass, single-flight
//! - **`triggers`**: events that request a pass
//! - **`render`**: markdown to tree, tree to HTML

pub mod apply;
pub mod reconcile;
pub mod reconstruct;
pub mod render;
pub mod tree;
pub mod triggers;

pub use reconcile::{PassOutcome, PassStats, Reconciler};
pub use reconstruct::{Location, LogicalText, Segment, SegmentKind, reconstruct, reconstruct_within};
pub use render::{render_markdown, to_html};
pub use tree::{Contribution, Element, NodeId, NodeKind, PresentationTree, TreeError};
pub use triggers::{Subscription, Trigger, TriggerHub};
