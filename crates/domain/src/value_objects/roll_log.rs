//! Campaign dice-history records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;
use crate::value_objects::DiceRollResult;

/// One entry in a campaign's dice history.
///
/// Built from a [`DiceRollResult`] at the moment of the roll; the
/// breakdown is frozen into `details` so the history stays auditable even
/// if the character's fields change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceRollRecord {
    /// Player who rolled
    pub player_id: UserId,
    /// Character the roll was made for, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_name: Option<String>,
    /// Formula as the player entered it
    pub dice_expression: String,
    /// Grand total
    pub result: i32,
    /// Per-die breakdown at roll time
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

impl DiceRollRecord {
    pub fn from_result(
        player_id: UserId,
        character_name: Option<String>,
        roll: &DiceRollResult,
    ) -> Self {
        Self {
            player_id,
            character_name,
            dice_expression: roll.formula.clone(),
            result: roll.result,
            details: roll.breakdown.clone(),
            timestamp: Utc::now(),
        }
    }
}
