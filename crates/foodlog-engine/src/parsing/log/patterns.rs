//! Regular grammars for the two entry shapes.
//!
//! Unit and nutrient tag alternations are generated from [`Unit::TOKENS`] and
//! [`Nutrient::tag`] so the grammar and the converters cannot disagree.

use std::sync::OnceLock;

use regex::Regex;

use crate::nutrition::{Nutrient, Unit};

const NUMBER: &str = r"\d+(?:\.\d+)?";
const SIGNED_NUMBER: &str = r"[+-]?\d+(?:\.\d+)?";

fn unit_alternation() -> String {
    Unit::TOKENS.join("|")
}

fn tag_alternation() -> String {
    // `satfat` must be tried before `fat`.
    let mut tags: Vec<&str> = Nutrient::ALL.iter().map(|n| n.tag()).collect();
    tags.sort_by_key(|t| std::cmp::Reverse(t.len()));
    tags.join("|")
}

/// `[[reference]] <number><unit>`.
///
/// Groups: 1 = reference, 2 = quantity, 3 = unit. The amount highlight spans
/// from the start of group 2 to the end of group 3.
pub fn linked() -> &'static Regex {
    static LINKED: OnceLock<Regex> = OnceLock::new();
    LINKED.get_or_init(|| {
        Regex::new(&format!(
            r"(?i)\[\[([^\[\]]+)\]\]\s+({NUMBER})\s*({})\b",
            unit_alternation()
        ))
        .expect("Invalid linked entry regex")
    })
}

/// Leading text followed by one or more space-separated nutrient tokens.
///
/// Groups: 1 = leading text, 2 = the run of tokens. Lines opening with `[[`
/// are rejected by the caller, see [`starts_with_link`].
pub fn inline_entry() -> &'static Regex {
    static INLINE: OnceLock<Regex> = OnceLock::new();
    INLINE.get_or_init(|| {
        let token = format!(r"{SIGNED_NUMBER}(?:{})\b", tag_alternation());
        Regex::new(&format!(
            r"(?i)^\s*(\S.*?)\s+({token}(?:\s+{token})*)"
        ))
        .expect("Invalid inline entry regex")
    })
}

/// A single nutrient token preceded by whitespace.
///
/// Groups: 1 = whole token, 2 = value, 3 = tag.
pub fn nutrient_token() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        Regex::new(&format!(
            r"(?i)\s(({SIGNED_NUMBER})({}))\b",
            tag_alternation()
        ))
        .expect("Invalid nutrient token regex")
    })
}

/// True for lines that can only hold a linked entry.
pub fn starts_with_link(line: &str) -> bool {
    line.trim_start().starts_with("[[")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linked_captures_reference_quantity_and_unit() {
        let caps = linked().captures("[[apple]] 150g").unwrap();
        assert_eq!(&caps[1], "apple");
        assert_eq!(&caps[2], "150");
        assert_eq!(&caps[3], "g");
    }

    #[test]
    fn linked_prefers_whole_unit_tokens() {
        assert_eq!(&linked().captures("[[milk]] 2 cups").unwrap()[3], "cups");
        assert_eq!(&linked().captures("[[beef]] 1.5LB").unwrap()[3], "LB");
        assert!(linked().captures("[[egg]] 2 large").is_none());
        assert!(linked().captures("[[rice]] 100gr").is_none());
    }

    #[test]
    fn inline_entry_requires_leading_text() {
        assert!(inline_entry().captures("300kcal").is_none());
        let caps = inline_entry().captures("Breakfast 300kcal 20prot").unwrap();
        assert_eq!(&caps[1], "Breakfast");
        assert_eq!(&caps[2], "300kcal 20prot");
    }

    #[test]
    fn satfat_is_not_read_as_fat() {
        let caps = nutrient_token().captures("Cheese 4satfat").unwrap();
        assert_eq!(&caps[3], "satfat");
    }

    #[test]
    fn tokens_need_a_word_boundary() {
        assert!(nutrient_token().captures("Shake 20protein").is_none());
    }
}
