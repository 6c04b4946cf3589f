use serde::Serialize;

use crate::nutrition::{Nutrient, Nutrients, Unit};
use crate::parsing::rope::LineRef;

use super::{patterns, reference::Reference};

/// `[[reference]] quantity unit`, resolved later against a nutrition lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedEntry {
    /// The raw text between `[[` and `]]`, alias and anchor included.
    pub reference: String,
    pub quantity: f64,
    pub unit: Unit,
}

impl LinkedEntry {
    /// The bare name used for nutrition lookups.
    pub fn name(&self) -> &str {
        Reference::normalize(&self.reference)
    }
}

/// Free text tagged with signed nutrient values; needs no lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InlineEntry {
    pub values: Nutrients,
}

impl InlineEntry {
    pub fn get(&self, nutrient: Nutrient) -> Option<f64> {
        self.values.get(nutrient)
    }
}

/// Entries found in a run of log lines, in line order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogEntries {
    pub linked: Vec<LinkedEntry>,
    pub inline: Vec<InlineEntry>,
}

impl LogEntries {
    pub fn is_empty(&self) -> bool {
        self.linked.is_empty() && self.inline.is_empty()
    }
}

/// Extracts at most one linked and one inline entry per line (the first
/// match of each family).
pub fn parse_entries(lines: &[LineRef]) -> LogEntries {
    let mut out = LogEntries::default();
    for line in lines {
        if let Some(entry) = parse_linked(&line.text) {
            out.linked.push(entry);
        }
        if let Some(entry) = parse_inline(&line.text) {
            out.inline.push(entry);
        }
    }
    out
}

fn parse_linked(line: &str) -> Option<LinkedEntry> {
    let caps = patterns::linked().captures(line)?;
    Some(LinkedEntry {
        reference: caps[1].to_string(),
        quantity: caps[2].parse().ok()?,
        unit: Unit::parse(&caps[3])?,
    })
}

fn parse_inline(line: &str) -> Option<InlineEntry> {
    if patterns::starts_with_link(line) {
        return None;
    }
    let caps = patterns::inline_entry().captures(line)?;
    // The token run is re-scanned with a leading space so every token,
    // including the first, sees the whitespace the token grammar expects.
    let run = format!(" {}", &caps[2]);
    let values = patterns::nutrient_token()
        .captures_iter(&run)
        .filter_map(|t| Some((Nutrient::from_tag(&t[3])?, t[2].parse::<f64>().ok()?)))
        .collect();
    Some(InlineEntry { values })
}
