//! # Food Log Grammar
//!
//! Two independent, per-line pattern families recognised inside the log
//! section:
//!
//! - **Linked**: `[[reference]] <number><unit>`, resolved against a
//!   nutrition lookup.
//! - **Inline**: `<leading text> <signed-number><tag> ...`, carrying its own
//!   values.
//!
//! ## Modules
//!
//! - **`patterns`**: the regular grammars, generated from the unit and
//!   nutrient tag tables
//! - **`reference`**: reduction of `folder/name#anchor|alias` to a lookup name
//! - **`entries`**: first-match-per-line entry extraction
//! - **`highlight`**: all-occurrence highlight ranges
//! - **`annotations`**: end-of-line computed calorie hints

pub mod annotations;
pub mod entries;
pub mod highlight;
pub mod patterns;
pub mod reference;

pub use annotations::{Annotation, annotations};
pub use entries::{InlineEntry, LinkedEntry, LogEntries, parse_entries};
pub use highlight::{HighlightKind, HighlightRange, highlight_ranges};
pub use reference::Reference;
