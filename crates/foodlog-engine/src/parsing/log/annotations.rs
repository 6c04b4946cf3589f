use serde::Serialize;

use crate::nutrition::{NutritionLookup, Unit};
use crate::parsing::rope::LineRef;

use super::{patterns, reference::Reference};

/// A computed-calorie hint to insert at `position` (end of its line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub position: usize,
    pub text: String,
}

/// Calorie hints for every linked entry on the given lines.
///
/// Entries with a non-positive quantity, a failed lookup, missing calories or
/// a negative or non-finite result produce no hint. Several entries on one
/// line yield several hints at the same position, in match order.
pub fn annotations(lines: &[LineRef], lookup: &dyn NutritionLookup) -> Vec<Annotation> {
    let mut out = vec![];
    for line in lines {
        for caps in patterns::linked().captures_iter(&line.text) {
            let Some(calories) = entry_calories(&caps[1], &caps[2], &caps[3], lookup) else {
                continue;
            };
            out.push(Annotation {
                position: line.span.end,
                text: format!("{calories}kcal"),
            });
        }
    }
    out
}

fn entry_calories(
    reference: &str,
    quantity: &str,
    unit: &str,
    lookup: &dyn NutritionLookup,
) -> Option<i64> {
    let quantity: f64 = quantity.parse().ok()?;
    if !quantity.is_finite() || quantity <= 0.0 {
        return None;
    }
    let unit = Unit::parse(unit)?;
    let name = Reference::normalize(reference);
    let facts = match lookup.nutrition_facts(name) {
        Ok(facts) => facts,
        Err(e) => {
            log::debug!("no calorie hint for '{name}': {e}");
            return None;
        }
    };
    let per_100 = facts.calories.filter(|c| c.is_finite())?;
    let calories = (unit.multiplier(quantity, facts.serving_size) * per_100).round();
    if !calories.is_finite() || calories < 0.0 {
        return None;
    }
    Some(calories as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::{NutritionFacts, StaticLookup};
    use crate::parsing::section::all_lines;
    use pretty_assertions::assert_eq;

    fn lookup() -> StaticLookup {
        StaticLookup::new()
            .with(
                "apple",
                NutritionFacts {
                    calories: Some(52.0),
                    ..Default::default()
                },
            )
            .with(
                "egg",
                NutritionFacts {
                    calories: Some(155.0),
                    serving_size: Some(50.0),
                    ..Default::default()
                },
            )
            .with(
                "water",
                NutritionFacts {
                    protein: Some(0.0),
                    ..Default::default()
                },
            )
            .with(
                "odd",
                NutritionFacts {
                    calories: Some(-10.0),
                    ..Default::default()
                },
            )
    }

    #[test]
    fn hint_sits_at_end_of_line() {
        let text = "[[apple]] 150g eaten\n";
        let hints = annotations(&all_lines(text), &lookup());
        assert_eq!(
            hints,
            vec![Annotation {
                position: 20,
                text: "78kcal".into()
            }]
        );
    }

    #[test]
    fn pieces_use_serving_size_and_aliases_are_stripped() {
        let text = "[[egg|Eggs]] 2pc";
        let hints = annotations(&all_lines(text), &lookup());
        assert_eq!(hints[0].text, "155kcal");
    }

    #[test]
    fn several_links_on_one_line_share_a_position() {
        let text = "[[apple]] 100g [[egg]] 1pc";
        let hints = annotations(&all_lines(text), &lookup());
        let texts: Vec<_> = hints.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["52kcal", "78kcal"]);
        assert!(hints.iter().all(|h| h.position == text.len()));
    }

    #[test]
    fn rejected_entries_produce_no_hint() {
        let text = "[[apple]] 0g\n[[pear]] 10g\n[[water]] 100ml\n[[odd]] 100g";
        assert!(annotations(&all_lines(text), &lookup()).is_empty());
    }
}
