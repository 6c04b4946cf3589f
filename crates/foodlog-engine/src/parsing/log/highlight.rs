use serde::Serialize;

use crate::parsing::rope::{LineRef, Span};

use super::patterns;

/// What a highlighted range marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightKind {
    /// The quantity and unit of a linked entry, e.g. `150g`.
    Amount,
    /// A whole inline nutrient token, e.g. `-150kcal`.
    Nutrition,
}

impl HighlightKind {
    /// CSS class used when rendering the highlight.
    pub fn class(self) -> &'static str {
        match self {
            HighlightKind::Amount => "food-log-amount",
            HighlightKind::Nutrition => "food-log-nutrition",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HighlightRange {
    pub span: Span,
    pub kind: HighlightKind,
}

/// Every amount and nutrient token on the given lines, in offset order.
///
/// Unlike entry extraction this scans all occurrences on a line, so a line
/// with one entry may carry several highlighted tokens.
pub fn highlight_ranges(lines: &[LineRef]) -> Vec<HighlightRange> {
    let mut out = vec![];
    for line in lines {
        let base = line.offset();
        for caps in patterns::linked().captures_iter(&line.text) {
            if let (Some(qty), Some(unit)) = (caps.get(2), caps.get(3)) {
                out.push(HighlightRange {
                    span: Span::new(qty.start(), unit.end()).shift(base),
                    kind: HighlightKind::Amount,
                });
            }
        }
        if patterns::starts_with_link(&line.text) {
            continue;
        }
        for caps in patterns::nutrient_token().captures_iter(&line.text) {
            if let Some(token) = caps.get(1) {
                out.push(HighlightRange {
                    span: Span::new(token.start(), token.end()).shift(base),
                    kind: HighlightKind::Nutrition,
                });
            }
        }
    }
    out.sort_by_key(|r| r.span.start);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::section::{all_lines, extract_section_str};
    use pretty_assertions::assert_eq;

    fn covered<'a>(text: &'a str, ranges: &[HighlightRange]) -> Vec<(&'a str, HighlightKind)> {
        ranges
            .iter()
            .map(|r| (&text[r.span.start..r.span.end], r.kind))
            .collect()
    }

    #[test]
    fn amount_spans_number_through_unit() {
        let text = "[[apple]] 150 g";
        let ranges = highlight_ranges(&all_lines(text));
        assert_eq!(covered(text, &ranges), vec![("150 g", HighlightKind::Amount)]);
    }

    #[test]
    fn every_occurrence_is_highlighted() {
        let text = "[[egg]] 2pc and [[toast]] 1pc\nLunch 500kcal -20fat 30prot";
        let ranges = highlight_ranges(&all_lines(text));
        assert_eq!(
            covered(text, &ranges),
            vec![
                ("2pc", HighlightKind::Amount),
                ("1pc", HighlightKind::Amount),
                ("500kcal", HighlightKind::Nutrition),
                ("-20fat", HighlightKind::Nutrition),
                ("30prot", HighlightKind::Nutrition),
            ]
        );
    }

    #[test]
    fn ranges_use_document_offsets() {
        let text = "# Day\n## Food Log\nRun -150kcal\n## Notes\nTea 2kcal";
        let ranges = highlight_ranges(&extract_section_str(text, "food log"));
        assert_eq!(covered(text, &ranges), vec![("-150kcal", HighlightKind::Nutrition)]);
    }

    #[test]
    fn ranges_never_overlap() {
        let text = "[[a]] 1g [[b]] 2kg\nMixed 1kcal 2kcal 3sugar";
        let ranges = highlight_ranges(&all_lines(text));
        for pair in ranges.windows(2) {
            assert!(pair[0].span.end <= pair[1].span.start, "{pair:?}");
        }
    }
}
