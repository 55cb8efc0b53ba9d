//! Value objects - Immutable objects defined by their attributes

mod dice;
mod roll_log;

pub use dice::{
    common_formulas, roll_formula, substitute_fields, validate_formula, DiceFormulaError,
    DiceRollResult, DieRoller, SequenceRoller, ThreadRngRoller, MAX_DICE_PER_TERM, MAX_DIE_SIZE,
};
pub use roll_log::DiceRollRecord;
