pub mod nutrition;
pub mod parsing;
pub mod projection;

pub use nutrition::{
    GoalProgress, LookupError, Nutrient, NutrientGoals, NutritionFacts, NutritionLookup,
    NutritionTotals, StaticLookup, aggregate,
};
pub use parsing::FOOD_LOG_HEADING;
pub use parsing::log::{Annotation, HighlightKind, HighlightRange};
pub use projection::{PassOutcome, PresentationTree, Reconciler, Trigger, TriggerHub};

use serde::Serialize;

/// Everything an editor needs to decorate the food log section of a source
/// document, in source byte offsets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Decorations {
    pub highlights: Vec<HighlightRange>,
    pub annotations: Vec<Annotation>,
}

impl Decorations {
    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty() && self.annotations.is_empty()
    }
}

/// Highlights and calorie hints for the section under `heading` in `text`.
pub fn decorate(text: &str, heading: &str, lookup: &dyn NutritionLookup) -> Decorations {
    let lines = parsing::extract_section_str(text, heading);
    Decorations {
        highlights: parsing::log::highlight_ranges(&lines),
        annotations: parsing::log::annotations(&lines, lookup),
    }
}
