//! Dice rolling value objects and parsing
//!
//! Supports multi-term formulas like "2d6+3", "1d20-1", or
//! "1d8 + {Constitution}": dice terms (`NdM`) and flat modifiers joined
//! by optional `+`/`-`, with `{name}` tokens substituted from sheet field
//! values before parsing. Validation is a separate entry point that never
//! rolls, so a malformed formula can never produce a partial roll.

use std::collections::HashMap;
use std::sync::LazyLock;

use rand::Rng;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Full-formula grammar used by validation.
static FORMULA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+d\d+([+-]\d+)*|[+-]?\d+)([+-](\d+d\d+|\d+))*$").expect("valid regex")
});

/// Placeholder pattern, `{name}`; names may not contain braces.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]+\}").expect("valid regex"));

/// Most dice one term may roll.
///
/// The validation grammar accepts any digit run; this and
/// [`MAX_DIE_SIZE`] keep a valid-looking formula from wrapping i32
/// arithmetic or allocating absurd roll vectors.
pub const MAX_DICE_PER_TERM: u32 = 1_000;

/// Largest die a term may roll.
pub const MAX_DIE_SIZE: u32 = 1_000_000;

/// Error when a dice formula cannot be rolled
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceFormulaError {
    /// The formula string is empty
    #[error("Empty dice formula")]
    Empty,
    /// The formula does not match the dice grammar
    #[error("Malformed dice formula: {0}")]
    Malformed(String),
}

/// Source of individual die results.
///
/// Injected so rolls are testable and replayable; production code uses
/// [`ThreadRngRoller`], tests use [`SequenceRoller`].
pub trait DieRoller {
    /// One uniform integer in `[1, sides]`.
    fn roll_die(&mut self, sides: u32) -> u32;
}

/// Default roller backed by the thread-local RNG.
#[derive(Debug, Default)]
pub struct ThreadRngRoller;

impl DieRoller for ThreadRngRoller {
    fn roll_die(&mut self, sides: u32) -> u32 {
        rand::thread_rng().gen_range(1..=sides.max(1))
    }
}

/// Deterministic roller that replays a fixed sequence of results.
///
/// Cycles when the sequence is exhausted; an empty sequence yields 1.
#[derive(Debug, Clone)]
pub struct SequenceRoller {
    results: Vec<u32>,
    next: usize,
}

impl SequenceRoller {
    pub fn new(results: impl Into<Vec<u32>>) -> Self {
        Self {
            results: results.into(),
            next: 0,
        }
    }
}

impl DieRoller for SequenceRoller {
    fn roll_die(&mut self, _sides: u32) -> u32 {
        let Some(&value) = self.results.get(self.next) else {
            return 1;
        };
        self.next = (self.next + 1) % self.results.len();
        value
    }
}

/// Result of rolling a dice formula
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceRollResult {
    /// The formula as the user wrote it, placeholders included
    pub formula: String,
    /// Grand total: all dice plus all modifiers
    pub result: i32,
    /// Every individual die result, in roll order
    pub individual: Vec<i32>,
    /// Sum of the flat modifiers
    pub modifier: i32,
    /// Human-readable reconstruction, e.g. "2d6(3,5) + 1d4(2) + 3"
    pub breakdown: String,
}

/// Check a formula against the dice grammar without rolling.
///
/// Placeholders are replaced by `1` first, so "1d20 + {Strength}" is
/// valid even without a field snapshot.
pub fn validate_formula(formula: &str) -> bool {
    let cleaned = PLACEHOLDER_RE.replace_all(formula, "1");
    let cleaned: String = cleaned.chars().filter(|c| !c.is_whitespace()).collect();
    FORMULA_RE.is_match(&cleaned)
}

/// Substitute `{name}` tokens from a field-value snapshot.
///
/// Missing or empty fields substitute as "0".
pub fn substitute_fields(formula: &str, field_values: &HashMap<String, String>) -> String {
    PLACEHOLDER_RE
        .replace_all(formula, |caps: &regex_lite::Captures<'_>| {
            let token = &caps[0];
            let name = &token[1..token.len() - 1];
            match field_values.get(name) {
                Some(value) if !value.is_empty() => value.clone(),
                _ => "0".to_string(),
            }
        })
        .into_owned()
}

/// Roll a dice formula against a field-value snapshot.
///
/// Substitutes placeholders, validates the result in full, then rolls
/// every term with the injected roller. Malformed input is refused
/// outright; there is no partial result. Terms beyond
/// [`MAX_DICE_PER_TERM`], [`MAX_DIE_SIZE`], or the i32 modifier range
/// are refused as malformed.
pub fn roll_formula(
    formula: &str,
    field_values: &HashMap<String, String>,
    roller: &mut dyn DieRoller,
) -> Result<DiceRollResult, DiceFormulaError> {
    let trimmed = formula.trim();
    if trimmed.is_empty() {
        return Err(DiceFormulaError::Empty);
    }

    let substituted = substitute_fields(trimmed, field_values);
    tracing::debug!(formula = trimmed, substituted = %substituted, "rolling dice formula");

    let cleaned: String = substituted.chars().filter(|c| !c.is_whitespace()).collect();
    if !FORMULA_RE.is_match(&cleaned) {
        return Err(DiceFormulaError::Malformed(substituted));
    }

    let mut individual = Vec::new();
    let mut total: i32 = 0;
    let mut modifier: i32 = 0;
    let mut breakdown = String::new();

    let malformed = || DiceFormulaError::Malformed(substituted.clone());
    let mut chars = cleaned.chars().peekable();

    // term := [+-]? ( N 'd' M | N ), scanned left to right
    while chars.peek().is_some() {
        let negative = match chars.peek() {
            Some('+') => {
                chars.next();
                false
            }
            Some('-') => {
                chars.next();
                true
            }
            _ => false,
        };

        let first = read_number(&mut chars).ok_or_else(malformed)?;

        if chars.peek() == Some(&'d') {
            chars.next();
            let sides = read_number(&mut chars).ok_or_else(malformed)?;
            if first > MAX_DICE_PER_TERM || sides > MAX_DIE_SIZE {
                return Err(malformed());
            }

            let mut dice_total: i32 = 0;
            let mut rolls = Vec::with_capacity(first as usize);
            for _ in 0..first {
                let roll = roller.roll_die(sides) as i32;
                rolls.push(roll);
                dice_total += roll;
            }
            total = total.saturating_add(if negative { -dice_total } else { dice_total });
            individual.extend(&rolls);

            if !breakdown.is_empty() {
                breakdown.push_str(if negative { " - " } else { " + " });
            } else if negative {
                breakdown.push('-');
            }
            let rolls_str: Vec<String> = rolls.iter().map(ToString::to_string).collect();
            breakdown.push_str(&format!("{first}d{sides}({})", rolls_str.join(",")));
        } else {
            let magnitude = i32::try_from(first).map_err(|_| malformed())?;
            let value = if negative { -magnitude } else { magnitude };
            modifier = modifier.saturating_add(value);
            total = total.saturating_add(value);

            if breakdown.is_empty() {
                breakdown.push_str(&format!("{value}"));
            } else if value >= 0 {
                breakdown.push_str(&format!(" + {value}"));
            } else {
                breakdown.push_str(&format!(" {value}"));
            }
        }
    }

    if breakdown.is_empty() {
        breakdown = substituted.clone();
    }

    Ok(DiceRollResult {
        formula: formula.to_string(),
        result: total,
        individual,
        modifier,
        breakdown,
    })
}

/// Consume a run of ASCII digits; `None` on no digits or overflow.
fn read_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<u32> {
    let mut text = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            text.push(c);
            chars.next();
        } else {
            break;
        }
    }
    text.parse().ok()
}

/// Starter formulas offered by the roll picker.
pub fn common_formulas() -> Vec<(&'static str, &'static str)> {
    vec![
        ("D20", "1d20"),
        ("D20 + attribute", "1d20 + {Strength}"),
        ("Sword damage", "1d8"),
        ("Greataxe damage", "1d12"),
        ("Fireball damage", "8d6"),
        ("Percentile check", "1d100"),
        ("Hit die + CON", "1d8 + {Constitution}"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_fields() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn rolls_single_dice_term() {
        let mut roller = SequenceRoller::new([14]);
        let result = roll_formula("1d20", &no_fields(), &mut roller).expect("rolls");
        assert_eq!(result.result, 14);
        assert_eq!(result.individual, vec![14]);
        assert_eq!(result.modifier, 0);
        assert_eq!(result.breakdown, "1d20(14)");
    }

    #[test]
    fn rolls_dice_with_modifier() {
        let mut roller = SequenceRoller::new([3, 5]);
        let result = roll_formula("2d6+3", &no_fields(), &mut roller).expect("rolls");
        assert_eq!(result.result, 11);
        assert_eq!(result.individual, vec![3, 5]);
        assert_eq!(result.modifier, 3);
        assert_eq!(result.breakdown, "2d6(3,5) + 3");
    }

    #[test]
    fn rolls_multiple_dice_terms() {
        let mut roller = SequenceRoller::new([3, 5, 2]);
        let result = roll_formula("2d6 + 1d4 + 3", &no_fields(), &mut roller).expect("rolls");
        assert_eq!(result.result, 13);
        assert_eq!(result.individual, vec![3, 5, 2]);
        assert_eq!(result.modifier, 3);
        assert_eq!(result.breakdown, "2d6(3,5) + 1d4(2) + 3");
    }

    #[test]
    fn subtracted_dice_term_reduces_total() {
        let mut roller = SequenceRoller::new([3, 5, 2]);
        let result = roll_formula("2d6-1d4", &no_fields(), &mut roller).expect("rolls");
        assert_eq!(result.result, 6);
        assert_eq!(result.individual, vec![3, 5, 2]);
        assert_eq!(result.modifier, 0);
        assert_eq!(result.breakdown, "2d6(3,5) - 1d4(2)");
    }

    #[test]
    fn negative_modifier_subtracts() {
        let mut roller = SequenceRoller::new([10]);
        let result = roll_formula("1d20-1", &no_fields(), &mut roller).expect("rolls");
        assert_eq!(result.result, 9);
        assert_eq!(result.modifier, -1);
        assert_eq!(result.breakdown, "1d20(10) -1");
    }

    #[test]
    fn substitutes_field_values() {
        let mut fields = HashMap::new();
        fields.insert("Força".to_string(), "3".to_string());

        let mut roller = SequenceRoller::new([12]);
        let result = roll_formula("1d20 + {Força}", &fields, &mut roller).expect("rolls");
        assert_eq!(result.result, 15);
        assert_eq!(result.modifier, 3);
        // The reported formula is the user's original text
        assert_eq!(result.formula, "1d20 + {Força}");
    }

    #[test]
    fn missing_or_empty_field_substitutes_as_zero() {
        let mut fields = HashMap::new();
        fields.insert("Empty".to_string(), String::new());

        let mut roller = SequenceRoller::new([4]);
        let result = roll_formula("1d6 + {Empty} + {Missing}", &fields, &mut roller)
            .expect("rolls");
        assert_eq!(result.result, 4);
        assert_eq!(result.modifier, 0);
    }

    #[test]
    fn malformed_formula_is_refused_without_rolling() {
        let mut roller = SequenceRoller::new([6]);
        assert!(matches!(
            roll_formula("2d", &no_fields(), &mut roller),
            Err(DiceFormulaError::Malformed(_))
        ));
        assert!(matches!(
            roll_formula("", &no_fields(), &mut roller),
            Err(DiceFormulaError::Empty)
        ));
    }

    #[test]
    fn oversized_terms_are_refused() {
        let mut roller = SequenceRoller::new([1]);
        // A flat modifier above i32 must not wrap negative
        assert!(matches!(
            roll_formula("3000000000", &no_fields(), &mut roller),
            Err(DiceFormulaError::Malformed(_))
        ));
        // Absurd dice counts and die sizes must not roll at all
        assert!(matches!(
            roll_formula("4294967295d6", &no_fields(), &mut roller),
            Err(DiceFormulaError::Malformed(_))
        ));
        assert!(matches!(
            roll_formula("1d3000000000", &no_fields(), &mut roller),
            Err(DiceFormulaError::Malformed(_))
        ));
        // Digit runs past u32 are malformed too
        assert!(matches!(
            roll_formula("99999999999999999999", &no_fields(), &mut roller),
            Err(DiceFormulaError::Malformed(_))
        ));
    }

    #[test]
    fn largest_allowed_term_still_rolls() {
        let mut roller = SequenceRoller::new([2]);
        let result =
            roll_formula("1000d1000000", &no_fields(), &mut roller).expect("rolls");
        assert_eq!(result.result, 2000);
        assert_eq!(result.individual.len(), 1000);
    }

    #[test]
    fn validates_well_formed_formulas() {
        assert!(validate_formula("1d20"));
        assert!(validate_formula("2d6+3"));
        assert!(validate_formula("1d20-1"));
        assert!(validate_formula("2d6 + 1d4 + 3"));
        assert!(validate_formula("1d20 + {Força}"));
        assert!(validate_formula("5"));
    }

    #[test]
    fn rejects_malformed_formulas() {
        assert!(!validate_formula("2d"));
        assert!(!validate_formula("d6"));
        assert!(!validate_formula("2d6++3"));
        assert!(!validate_formula("roll me"));
        assert!(!validate_formula("2d6+"));
    }

    #[test]
    fn thread_rng_roller_stays_in_range() {
        let mut roller = ThreadRngRoller;
        for _ in 0..100 {
            let roll = roller.roll_die(6);
            assert!((1..=6).contains(&roll));
        }
    }

    #[test]
    fn sequence_roller_cycles() {
        let mut roller = SequenceRoller::new([1, 2]);
        assert_eq!(roller.roll_die(6), 1);
        assert_eq!(roller.roll_die(6), 2);
        assert_eq!(roller.roll_die(6), 1);
    }

    #[test]
    fn common_formulas_all_validate() {
        for (name, formula) in common_formulas() {
            assert!(validate_formula(formula), "{name} should validate");
        }
    }

    #[test]
    fn result_serializes_with_camel_case_names() {
        let result = DiceRollResult {
            formula: "2d6+3".to_string(),
            result: 11,
            individual: vec![3, 5],
            modifier: 3,
            breakdown: "2d6(3,5) + 3".to_string(),
        };
        let json = serde_json::to_value(&result).expect("serializes");
        assert_eq!(json["individual"], serde_json::json!([3, 5]));
        assert_eq!(json["breakdown"], "2d6(3,5) + 3");
    }
}
