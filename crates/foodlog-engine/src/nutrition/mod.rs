//! # Nutrition
//!
//! Nutrient keys, unit conversion, the lookup seam and aggregation of a log
//! section into totals and goal progress.

pub mod aggregate;
pub mod lookup;
pub mod nutrient;
pub mod units;

pub use aggregate::{GoalProgress, NutrientGoals, NutritionTotals, aggregate, totals_for};
pub use lookup::{LookupError, NutritionFacts, NutritionLookup, StaticLookup};
pub use nutrient::{Nutrient, Nutrients};
pub use units::{Unit, multiplier};
