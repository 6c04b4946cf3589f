use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// The fixed set of nutrient keys tracked by the food log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    Calories,
    Fats,
    SaturatedFats,
    Protein,
    Carbs,
    Sugar,
    Fiber,
    Sodium,
}

impl Nutrient {
    pub const ALL: [Nutrient; 8] = [
        Nutrient::Calories,
        Nutrient::Fats,
        Nutrient::SaturatedFats,
        Nutrient::Protein,
        Nutrient::Carbs,
        Nutrient::Sugar,
        Nutrient::Fiber,
        Nutrient::Sodium,
    ];

    /// Key used in lookups, configuration and serialized totals.
    pub fn key(self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Fats => "fats",
            Nutrient::SaturatedFats => "saturated_fats",
            Nutrient::Protein => "protein",
            Nutrient::Carbs => "carbs",
            Nutrient::Sugar => "sugar",
            Nutrient::Fiber => "fiber",
            Nutrient::Sodium => "sodium",
        }
    }

    /// Suffix that marks an inline value for this nutrient, e.g. `300kcal`.
    pub fn tag(self) -> &'static str {
        match self {
            Nutrient::Calories => "kcal",
            Nutrient::Fats => "fat",
            Nutrient::SaturatedFats => "satfat",
            Nutrient::Protein => "prot",
            Nutrient::Carbs => "carbs",
            Nutrient::Sugar => "sugar",
            Nutrient::Fiber => "fiber",
            Nutrient::Sodium => "sodium",
        }
    }

    /// Case-insensitive inverse of [`Nutrient::tag`].
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|n| n.tag().eq_ignore_ascii_case(tag))
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.key())
    }
}

/// A sparse mapping from nutrient to amount.
///
/// A key is absent when no contributing entry defined it; absence means
/// "no data", which is distinct from an explicit zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Nutrients(BTreeMap<Nutrient, f64>);

impl Nutrients {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, nutrient: Nutrient) -> Option<f64> {
        self.0.get(&nutrient).copied()
    }

    pub fn set(&mut self, nutrient: Nutrient, value: f64) {
        self.0.insert(nutrient, value);
    }

    /// Adds `value` to the entry for `nutrient`, creating it if absent.
    pub fn add(&mut self, nutrient: Nutrient, value: f64) {
        *self.0.entry(nutrient).or_insert(0.0) += value;
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Nutrient, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    /// Key-wise sum; keys present in either side are present in the result.
    pub fn merge(&mut self, other: &Nutrients) {
        for (k, v) in other.iter() {
            self.add(k, v);
        }
    }

    /// Key-wise difference; keys only present in `other` become negative.
    pub fn subtract(&mut self, other: &Nutrients) {
        for (k, v) in other.iter() {
            self.add(k, -v);
        }
    }

    #[must_use]
    pub fn scaled(&self, factor: f64) -> Nutrients {
        Nutrients(self.0.iter().map(|(k, v)| (*k, v * factor)).collect())
    }

    #[must_use]
    pub fn negated(&self) -> Nutrients {
        self.scaled(-1.0)
    }

    /// Every present key floored at zero.
    #[must_use]
    pub fn clamped(&self) -> Nutrients {
        Nutrients(self.0.iter().map(|(k, v)| (*k, v.max(0.0))).collect())
    }
}

impl FromIterator<(Nutrient, f64)> for Nutrients {
    fn from_iter<I: IntoIterator<Item = (Nutrient, f64)>>(iter: I) -> Self {
        let mut out = Nutrients::new();
        for (k, v) in iter {
            out.add(k, v);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tags_round_trip_case_insensitively() {
        for n in Nutrient::ALL {
            assert_eq!(Nutrient::from_tag(&n.tag().to_uppercase()), Some(n));
        }
        assert_eq!(Nutrient::from_tag("kj"), None);
    }

    #[test]
    fn merge_and_subtract_keep_union_of_keys() {
        let mut a: Nutrients = [(Nutrient::Calories, 300.0)].into_iter().collect();
        let b: Nutrients = [(Nutrient::Protein, 20.0)].into_iter().collect();
        a.merge(&b);
        a.subtract(&[(Nutrient::Fiber, 2.0)].into_iter().collect());
        assert_eq!(a.get(Nutrient::Calories), Some(300.0));
        assert_eq!(a.get(Nutrient::Protein), Some(20.0));
        assert_eq!(a.get(Nutrient::Fiber), Some(-2.0));
        assert_eq!(a.get(Nutrient::Sugar), None);
    }

    #[test]
    fn clamped_floors_negative_values() {
        let n: Nutrients = [(Nutrient::Calories, -50.0), (Nutrient::Fats, 3.0)]
            .into_iter()
            .collect();
        let c = n.clamped();
        assert_eq!(c.get(Nutrient::Calories), Some(0.0));
        assert_eq!(c.get(Nutrient::Fats), Some(3.0));
    }

    #[test]
    fn collecting_sums_duplicate_keys() {
        let n: Nutrients = [(Nutrient::Calories, 100.0), (Nutrient::Calories, -30.0)]
            .into_iter()
            .collect();
        assert_eq!(n.get(Nutrient::Calories), Some(70.0));
        assert_eq!(n.len(), 1);
    }
}
