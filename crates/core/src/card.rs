//! Card records stored by the deck.
//! This module owns the stat layout and the damage/rescale formula.
//! It does not own placement; a card's position is derived from its key by the deck.

use serde::{Deserialize, Serialize};

use crate::types::{CardKey, Damage};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    /// Stats at draw time. Never change.
    pub initial_offense: i32,
    pub initial_defense: i32,
    /// Reference stats used when rescaling offense after damage.
    pub base_offense: i32,
    pub base_defense: i32,
    pub offense: i32,
    pub defense: i32,
    /// Insertion sequence; breaks defense ties in favor of the older card.
    pub order: u64,
}

impl Card {
    pub fn new(name: impl Into<String>, offense: i32, defense: i32, order: u64) -> Self {
        Self {
            name: name.into(),
            initial_offense: offense,
            initial_defense: defense,
            base_offense: offense,
            base_defense: defense,
            offense,
            defense,
            order,
        }
    }

    pub fn key(&self) -> CardKey {
        CardKey { offense: self.offense, defense: self.defense, order: self.order }
    }

    pub(crate) fn rank(&self) -> (i32, u64) {
        (self.defense, self.order)
    }

    /// Replaces the reference stats used by [`Card::apply_damage`].
    pub fn rebase(&mut self, offense: i32, defense: i32) {
        self.base_offense = offense;
        self.base_defense = defense;
    }

    /// Whether this card outlives a hit of `incoming_offense`.
    pub fn survives(&self, incoming_offense: i32) -> bool {
        self.defense > incoming_offense
    }

    /// Whether this card eliminates an attacker with `incoming_defense`.
    pub fn kills(&self, incoming_defense: i32) -> bool {
        self.offense >= incoming_defense
    }

    /// Subtracts `incoming_offense` from defense and rescales offense to the
    /// remaining fraction of base defense, never below 1.
    ///
    /// An eliminated card is left untouched; the caller discards it. Callers
    /// holding a card that is still inside a deck must go through
    /// [`crate::Deck::checkout`] so the card is re-placed afterwards.
    pub fn apply_damage(&mut self, incoming_offense: i32) -> Damage {
        let defense = self.defense.saturating_sub(incoming_offense);
        if defense <= 0 {
            return Damage::Eliminated;
        }
        self.defense = defense;
        self.offense = rescaled_offense(self.base_offense, self.base_defense, defense);
        Damage::Survived { offense: self.offense, defense }
    }
}

fn rescaled_offense(base_offense: i32, base_defense: i32, defense: i32) -> i32 {
    if base_defense <= 0 {
        return base_offense.max(1);
    }
    let scaled = (i64::from(base_offense) * i64::from(defense)).div_euclid(i64::from(base_defense));
    i32::try_from(scaled).unwrap_or(i32::MAX).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_rescales_offense_by_remaining_defense() {
        let mut card = Card::new("C1", 9, 10, 1);
        assert_eq!(card.apply_damage(4), Damage::Survived { offense: 5, defense: 6 });
        assert_eq!(card.offense, 5);
        assert_eq!(card.defense, 6);
        // Base stats are untouched, so a second hit rescales from the draw-time ratio.
        assert_eq!(card.apply_damage(3), Damage::Survived { offense: 2, defense: 3 });
    }

    #[test]
    fn rescaled_offense_is_clamped_to_one() {
        let mut card = Card::new("weak", 2, 100, 1);
        assert_eq!(card.apply_damage(99), Damage::Survived { offense: 1, defense: 1 });
    }

    #[test]
    fn lethal_damage_leaves_card_unchanged() {
        let mut card = Card::new("C2", 3, 4, 2);
        assert_eq!(card.apply_damage(4), Damage::Eliminated);
        assert_eq!(card.key(), CardKey { offense: 3, defense: 4, order: 2 });
    }

    #[test]
    fn large_stats_do_not_overflow_the_rescale() {
        let mut card = Card::new("big", i32::MAX, i32::MAX, 1);
        assert_eq!(
            card.apply_damage(1),
            Damage::Survived { offense: i32::MAX - 1, defense: i32::MAX - 1 }
        );
    }

    #[test]
    fn rebase_changes_rescale_reference_only() {
        let mut card = Card::new("C3", 4, 8, 1);
        card.rebase(8, 8);
        assert_eq!(card.offense, 4);
        assert_eq!(card.initial_offense, 4);
        assert_eq!(card.apply_damage(4), Damage::Survived { offense: 4, defense: 4 });
    }

    #[test]
    fn survive_and_kill_predicates_match_battle_rules() {
        let card = Card::new("C1", 5, 10, 1);
        assert!(card.survives(9));
        assert!(!card.survives(10));
        assert!(card.kills(5));
        assert!(!card.kills(6));
    }
}
