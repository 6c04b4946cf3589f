//! Isolation of one level-2 section of a heading-structured document.

use xi_rope::Rope;

use super::rope::{LineRef, lines_with_spans};

/// The heading under which food log entries are recognised.
pub const FOOD_LOG_HEADING: &str = "Food Log";

/// Deepest heading level recognised by the `#` prefix count.
const MAX_HEADING_LEVEL: usize = 6;

/// An ATX-style heading recognised on a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading<'a> {
    pub level: usize,
    pub title: &'a str,
}

impl<'a> Heading<'a> {
    /// Classifies a line as a heading: one to six `#`, optional whitespace,
    /// then the title. Hashes beyond the sixth belong to the title.
    pub fn parse(line: &'a str) -> Option<Self> {
        let hashes = line.bytes().take_while(|&b| b == b'#').count();
        if hashes == 0 {
            return None;
        }
        let level = hashes.min(MAX_HEADING_LEVEL);
        Some(Self {
            level,
            title: line[level..].trim(),
        })
    }

    /// True for the level-2 heading titled `heading`, ignoring case.
    pub fn opens(&self, heading: &str) -> bool {
        self.level == 2 && self.title.to_lowercase() == heading.trim().to_lowercase()
    }

    pub fn closes_section(&self) -> bool {
        self.level <= 2
    }
}

/// Returns the lines governed by the first level-2 heading titled `heading`
/// (case-insensitive), each carrying its byte offset into the full text.
///
/// The heading line itself is not returned. Collection stops at the next
/// heading of level 1 or 2, or at the end of the document. An absent heading
/// yields an empty vector.
pub fn extract_section(rope: &Rope, heading: &str) -> Vec<LineRef> {
    let mut out = vec![];
    let mut open = false;

    for line in lines_with_spans(rope) {
        let parsed = Heading::parse(&line.text);
        if open {
            if parsed.as_ref().is_some_and(Heading::closes_section) {
                break;
            }
            out.push(line);
        } else if parsed.is_some_and(|h| h.opens(heading)) {
            open = true;
        }
    }

    out
}

/// Convenience wrapper over [`extract_section`] for plain strings.
pub fn extract_section_str(text: &str, heading: &str) -> Vec<LineRef> {
    extract_section(&Rope::from(text), heading)
}

/// Every line of `text`, for contexts (such as a rendered block) where the
/// whole text already belongs to the log.
pub fn all_lines(text: &str) -> Vec<LineRef> {
    lines_with_spans(&Rope::from(text)).collect()
}
