use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::nutrient::{Nutrient, Nutrients};

/// Nutrition facts for one food, per 100 g / ml.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutritionFacts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fats: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturated_fats: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
    /// Grams or millilitres in one piece, used by the `pc` unit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<f64>,
}

impl NutritionFacts {
    pub fn get(&self, nutrient: Nutrient) -> Option<f64> {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Fats => self.fats,
            Nutrient::SaturatedFats => self.saturated_fats,
            Nutrient::Protein => self.protein,
            Nutrient::Carbs => self.carbs,
            Nutrient::Sugar => self.sugar,
            Nutrient::Fiber => self.fiber,
            Nutrient::Sodium => self.sodium,
        }
    }

    /// The present nutrient values as a sparse map.
    pub fn nutrients(&self) -> Nutrients {
        Nutrient::ALL
            .into_iter()
            .filter_map(|n| self.get(n).map(|v| (n, v)))
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("No nutrition data for '{0}'")]
    NotFound(String),
    #[error("Nutrition data for '{name}' is unavailable: {reason}")]
    Unavailable { name: String, reason: String },
}

/// Source of per-100 nutrition facts, keyed by normalized food name.
pub trait NutritionLookup {
    fn nutrition_facts(&self, name: &str) -> Result<NutritionFacts, LookupError>;
}

impl<F> NutritionLookup for F
where
    F: Fn(&str) -> Result<NutritionFacts, LookupError>,
{
    fn nutrition_facts(&self, name: &str) -> Result<NutritionFacts, LookupError> {
        self(name)
    }
}

/// An in-memory lookup with case-insensitive names.
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    foods: HashMap<String, NutritionFacts>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, facts: NutritionFacts) {
        self.foods.insert(name.to_lowercase(), facts);
    }

    #[must_use]
    pub fn with(mut self, name: &str, facts: NutritionFacts) -> Self {
        self.insert(name, facts);
        self
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, NutritionFacts)> for StaticLookup {
    fn from_iter<I: IntoIterator<Item = (S, NutritionFacts)>>(iter: I) -> Self {
        let mut lookup = StaticLookup::new();
        for (name, facts) in iter {
            lookup.insert(name.as_ref(), facts);
        }
        lookup
    }
}

impl NutritionLookup for StaticLookup {
    fn nutrition_facts(&self, name: &str) -> Result<NutritionFacts, LookupError> {
        self.foods
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| LookupError::NotFound(name.to_string()))
    }
}
