//! Conversion of logged quantities into multipliers against a
//! per-100-units nutrition baseline.

use std::fmt;

/// Nutrition facts are expressed per this many grams or millilitres.
pub const BASELINE_AMOUNT: f64 = 100.0;

/// A recognised quantity unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Gram,
    Kilogram,
    Ounce,
    Pound,
    Millilitre,
    Litre,
    Cup,
    Tablespoon,
    Teaspoon,
    /// A piece or serving, scaled by the food's reference serving size.
    Piece,
}

impl Unit {
    /// Unit tokens accepted by the grammar, longest-first where one is a
    /// prefix of another so regex alternation picks the right one.
    pub const TOKENS: &'static [&'static str] = &[
        "kg", "lb", "ml", "oz", "cups", "cup", "tbsp", "tsp", "pcs", "pc", "g", "l",
    ];

    /// Case-insensitive parse of a unit token, accepting `cups` and `pcs`.
    pub fn parse(token: &str) -> Option<Self> {
        let unit = match token.to_ascii_lowercase().as_str() {
            "g" => Unit::Gram,
            "kg" => Unit::Kilogram,
            "oz" => Unit::Ounce,
            "lb" => Unit::Pound,
            "ml" => Unit::Millilitre,
            "l" => Unit::Litre,
            "cup" | "cups" => Unit::Cup,
            "tbsp" => Unit::Tablespoon,
            "tsp" => Unit::Teaspoon,
            "pc" | "pcs" => Unit::Piece,
            _ => return None,
        };
        Some(unit)
    }

    /// Grams or millilitres per unit. `None` for [`Unit::Piece`], whose size
    /// depends on the food.
    pub fn base_amount(self) -> Option<f64> {
        match self {
            Unit::Gram | Unit::Millilitre => Some(1.0),
            Unit::Kilogram | Unit::Litre => Some(1000.0),
            Unit::Ounce => Some(28.3495),
            Unit::Pound => Some(453.592),
            Unit::Cup => Some(240.0),
            Unit::Tablespoon => Some(15.0),
            Unit::Teaspoon => Some(5.0),
            Unit::Piece => None,
        }
    }

    /// Multiplier that scales per-100 nutrition facts to `quantity` of this
    /// unit. Pieces are sized by `serving_size`, defaulting to 1.
    pub fn multiplier(self, quantity: f64, serving_size: Option<f64>) -> f64 {
        let amount = match self.base_amount() {
            Some(per_unit) => quantity * per_unit,
            None => quantity * serving_size.unwrap_or(1.0),
        };
        amount / BASELINE_AMOUNT
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Unit::Gram => "g",
            Unit::Kilogram => "kg",
            Unit::Ounce => "oz",
            Unit::Pound => "lb",
            Unit::Millilitre => "ml",
            Unit::Litre => "l",
            Unit::Cup => "cup",
            Unit::Tablespoon => "tbsp",
            Unit::Teaspoon => "tsp",
            Unit::Piece => "pc",
        };
        f.write_str(s)
    }
}

/// Multiplier for `quantity` of `unit` against the per-100 baseline.
pub fn multiplier(quantity: f64, unit: Unit, serving_size: Option<f64>) -> f64 {
    unit.multiplier(quantity, serving_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(150.0, Unit::Gram, None, 1.5)]
    #[case(0.5, Unit::Litre, None, 5.0)]
    #[case(2.0, Unit::Piece, Some(50.0), 1.0)]
    #[case(2.0, Unit::Piece, None, 0.02)]
    #[case(1.0, Unit::Kilogram, None, 10.0)]
    #[case(200.0, Unit::Millilitre, None, 2.0)]
    #[case(1.0, Unit::Cup, None, 2.4)]
    #[case(2.0, Unit::Tablespoon, None, 0.3)]
    fn converts_to_baseline_multiplier(
        #[case] quantity: f64,
        #[case] unit: Unit,
        #[case] serving: Option<f64>,
        #[case] expected: f64,
    ) {
        let got = multiplier(quantity, unit, serving);
        assert!((got - expected).abs() < 1e-9, "{got} != {expected}");
    }

    #[test]
    fn serving_size_is_ignored_for_mass_units() {
        assert_eq!(multiplier(150.0, Unit::Gram, Some(30.0)), 1.5);
    }

    #[rstest]
    #[case("G", Unit::Gram)]
    #[case("cups", Unit::Cup)]
    #[case("Cup", Unit::Cup)]
    #[case("PCS", Unit::Piece)]
    #[case("tsp", Unit::Teaspoon)]
    fn parses_unit_tokens(#[case] token: &str, #[case] unit: Unit) {
        assert_eq!(Unit::parse(token), Some(unit));
    }

    #[test]
    fn every_grammar_token_parses() {
        for token in Unit::TOKENS {
            assert!(Unit::parse(token).is_some(), "{token}");
        }
        assert_eq!(Unit::parse("gr"), None);
    }
}
