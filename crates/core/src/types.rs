use std::fmt;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub(crate) struct BandId;
    pub(crate) struct SlotId;
}

/// Position of a card inside the deck: band offense, then `(defense, order)`
/// inside the band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardKey {
    pub offense: i32,
    pub defense: i32,
    pub order: u64,
}

impl CardKey {
    pub(crate) fn rank(self) -> (i32, u64) {
        (self.defense, self.order)
    }
}

/// Which rule of the battle cascade produced a selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Kills the attacker and survives the counter-hit.
    KillAndSurvive,
    /// Survives without killing, dealing the most damage possible.
    BestDamage,
    /// Kills the attacker but dies doing it.
    Sacrifice,
    /// Neither kills nor survives.
    Forced,
}

impl Priority {
    pub const CASCADE: [Priority; 4] =
        [Priority::KillAndSurvive, Priority::BestDamage, Priority::Sacrifice, Priority::Forced];

    pub fn classify(survives: bool, kills: bool) -> Self {
        match (survives, kills) {
            (true, true) => Priority::KillAndSurvive,
            (true, false) => Priority::BestDamage,
            (false, true) => Priority::Sacrifice,
            (false, false) => Priority::Forced,
        }
    }

    pub fn rank(self) -> u8 {
        match self {
            Priority::KillAndSurvive => 1,
            Priority::BestDamage => 2,
            Priority::Sacrifice => 3,
            Priority::Forced => 4,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rank())
    }
}

/// Result of applying incoming damage to a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Damage {
    Eliminated,
    Survived { offense: i32, defense: i32 },
}
