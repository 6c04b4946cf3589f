use std::collections::BTreeMap;

use serde::Serialize;
use xi_rope::Rope;

use crate::parsing::log::{InlineEntry, LinkedEntry, LogEntries, parse_entries};
use crate::parsing::section::extract_section;

use super::lookup::{LookupError, NutritionLookup};
use super::nutrient::{Nutrient, Nutrients};

/// Daily targets per nutrient. Nutrients without a goal get no progress entry.
pub type NutrientGoals = Nutrients;

/// Progress against one nutrient goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub remaining: f64,
    pub percent_consumed: i64,
    pub percent_remaining: i64,
}

impl GoalProgress {
    /// Progress for `consumed` against `goal`. A zero goal reports zero
    /// percentages rather than dividing by zero.
    pub fn new(consumed: f64, goal: f64) -> Self {
        let remaining = goal - consumed;
        if goal == 0.0 {
            return Self {
                remaining,
                percent_consumed: 0,
                percent_remaining: 0,
            };
        }
        Self {
            remaining,
            percent_consumed: (consumed / goal * 100.0).round() as i64,
            percent_remaining: ((remaining / goal * 100.0).round() as i64).max(0),
        }
    }
}

/// Totals for one log section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NutritionTotals {
    /// Linked entries scaled by their quantity.
    pub linked: Nutrients,
    /// Inline entries that count as intake.
    pub inline: Nutrients,
    /// Expenditure from workout entries, as positive amounts burned.
    pub workout: Nutrients,
    /// Linked plus inline, less workout.
    pub combined: Nutrients,
    /// `combined` with every key floored at zero.
    pub clamped: Nutrients,
    pub goal_progress: Option<BTreeMap<Nutrient, GoalProgress>>,
}

impl NutritionTotals {
    pub fn calories(&self) -> Option<f64> {
        self.clamped.get(Nutrient::Calories)
    }
}

/// Computes totals for the `heading` section of `text`.
///
/// Returns `None` when the section holds no entries at all, which callers
/// must treat as "no data" rather than as zero. A failed lookup is handed to
/// `on_error` with the entry's name and skipped; it never aborts the rest.
pub fn aggregate(
    text: &str,
    heading: &str,
    lookup: &dyn NutritionLookup,
    goals: Option<&NutrientGoals>,
    on_error: impl FnMut(&str, &LookupError),
) -> Option<NutritionTotals> {
    let lines = extract_section(&Rope::from(text), heading);
    let entries = parse_entries(&lines);
    if entries.is_empty() {
        return None;
    }
    Some(totals_for(&entries, lookup, goals, on_error))
}

/// Computes totals for already-parsed entries.
pub fn totals_for(
    entries: &LogEntries,
    lookup: &dyn NutritionLookup,
    goals: Option<&NutrientGoals>,
    on_error: impl FnMut(&str, &LookupError),
) -> NutritionTotals {
    let linked = linked_totals(&entries.linked, lookup, on_error);

    let (intake, workouts): (Vec<&InlineEntry>, Vec<&InlineEntry>) =
        entries.inline.iter().partition(|e| is_intake(e));
    let inline = sum_inline(&intake);
    let workout = sum_inline(&workouts).negated();

    let mut adjusted = inline.clone();
    if !workouts.is_empty() {
        adjusted.subtract(&workout);
    }

    let mut combined = linked.clone();
    combined.merge(&adjusted);
    let clamped = combined.clamped();
    let goal_progress = goals.map(|g| goal_progress(&clamped, g));

    NutritionTotals {
        linked,
        inline,
        workout,
        combined,
        clamped,
        goal_progress,
    }
}

/// An inline entry counts as intake when any of its values is positive.
/// Entries made only of zero or negative values are workouts.
fn is_intake(entry: &InlineEntry) -> bool {
    entry.values.iter().any(|(_, v)| v > 0.0)
}

fn sum_inline(entries: &[&InlineEntry]) -> Nutrients {
    let mut out = Nutrients::new();
    for e in entries {
        out.merge(&e.values);
    }
    out
}

fn linked_totals(
    entries: &[LinkedEntry],
    lookup: &dyn NutritionLookup,
    mut on_error: impl FnMut(&str, &LookupError),
) -> Nutrients {
    let mut out = Nutrients::new();
    for entry in entries {
        let name = entry.name();
        match lookup.nutrition_facts(name) {
            Ok(facts) => {
                let factor = entry.unit.multiplier(entry.quantity, facts.serving_size);
                out.merge(&facts.nutrients().scaled(factor));
            }
            Err(e) => {
                log::warn!("skipping '{name}': {e}");
                on_error(name, &e);
            }
        }
    }
    out
}

fn goal_progress(consumed: &Nutrients, goals: &NutrientGoals) -> BTreeMap<Nutrient, GoalProgress> {
    goals
        .iter()
        .map(|(n, goal)| (n, GoalProgress::new(consumed.get(n).unwrap_or(0.0), goal)))
        .collect()
}
