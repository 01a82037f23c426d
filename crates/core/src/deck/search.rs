//! Pruned band searches behind the battle cascade and the steal query.
//! Every finder skips a subtree as soon as its cached offense or defense
//! range rules the predicate out, so a lookup touches O(log n) bands.

use tracing::debug;

use super::Deck;
use super::offense::OffenseTree;
use crate::card::Card;
use crate::types::{BandId, Priority};

impl OffenseTree {
    /// Lowest-offense band with `offense >= min_offense` that holds a card
    /// with defense strictly above `floor`.
    fn lowest_band_with_defense_above(
        &self,
        node: Option<BandId>,
        min_offense: i32,
        floor: i32,
    ) -> Option<BandId> {
        let id = node?;
        let band = &self.nodes[id];
        if band.max_defense <= floor || band.max_offense < min_offense {
            return None;
        }
        if band.offense < min_offense {
            return self.lowest_band_with_defense_above(band.right, min_offense, floor);
        }
        if let Some(found) = self.lowest_band_with_defense_above(band.left, min_offense, floor) {
            return Some(found);
        }
        if band.band_max_defense > floor {
            return Some(id);
        }
        self.lowest_band_with_defense_above(band.right, min_offense, floor)
    }

    /// Highest-offense band with `offense < below` that holds a card with
    /// defense strictly above `floor`.
    fn highest_band_below_with_defense_above(
        &self,
        node: Option<BandId>,
        below: i32,
        floor: i32,
    ) -> Option<BandId> {
        let id = node?;
        let band = &self.nodes[id];
        if band.max_defense <= floor || band.min_offense >= below {
            return None;
        }
        if band.offense >= below {
            return self.highest_band_below_with_defense_above(band.left, below, floor);
        }
        if let Some(found) = self.highest_band_below_with_defense_above(band.right, below, floor) {
            return Some(found);
        }
        if band.band_max_defense > floor {
            return Some(id);
        }
        self.highest_band_below_with_defense_above(band.left, below, floor)
    }

    /// Lowest-offense band with `offense >= min_offense` whose weakest card
    /// has defense at most `ceiling`.
    fn lowest_band_with_defense_at_most(
        &self,
        node: Option<BandId>,
        min_offense: i32,
        ceiling: i32,
    ) -> Option<BandId> {
        let id = node?;
        let band = &self.nodes[id];
        if band.min_defense > ceiling || band.max_offense < min_offense {
            return None;
        }
        if band.offense < min_offense {
            return self.lowest_band_with_defense_at_most(band.right, min_offense, ceiling);
        }
        if let Some(found) =
            self.lowest_band_with_defense_at_most(band.left, min_offense, ceiling)
        {
            return Some(found);
        }
        if band.band_min_defense <= ceiling {
            return Some(id);
        }
        self.lowest_band_with_defense_at_most(band.right, min_offense, ceiling)
    }
}

impl Deck {
    fn pick(
        &self,
        priority: Priority,
        incoming_offense: i32,
        incoming_defense: i32,
    ) -> Option<&Card> {
        let root = self.bands.root;
        match priority {
            Priority::KillAndSurvive => {
                let band = self.bands.lowest_band_with_defense_above(
                    root,
                    incoming_defense,
                    incoming_offense,
                )?;
                self.slots.first_above(self.bands.nodes[band].band, incoming_offense)
            }
            Priority::BestDamage => {
                let band = self.bands.highest_band_below_with_defense_above(
                    root,
                    incoming_defense,
                    incoming_offense,
                )?;
                self.slots.first_above(self.bands.nodes[band].band, incoming_offense)
            }
            Priority::Sacrifice => {
                let band = self.bands.lowest_band_with_defense_at_most(
                    root,
                    incoming_defense,
                    incoming_offense,
                )?;
                self.slots
                    .first(self.bands.nodes[band].band)
                    .filter(|card| card.defense <= incoming_offense)
            }
            Priority::Forced => {
                let band = self.bands.rightmost(root?);
                self.slots.first(self.bands.nodes[band].band)
            }
        }
    }

    /// Runs the P1..P4 cascade against an attacker with the given stats
    /// without recording the outcome.
    pub fn battle_pick(
        &self,
        incoming_offense: i32,
        incoming_defense: i32,
    ) -> Option<(Priority, &Card)> {
        Priority::CASCADE.into_iter().find_map(|priority| {
            self.pick(priority, incoming_offense, incoming_defense).map(|card| (priority, card))
        })
    }

    /// Selects the card to play against an attacker and remembers which
    /// priority matched, see [`Deck::last_selected_priority`].
    pub fn find_optimal_battle_card(
        &mut self,
        incoming_offense: i32,
        incoming_defense: i32,
    ) -> Option<&Card> {
        let pick = self
            .battle_pick(incoming_offense, incoming_defense)
            .map(|(priority, card)| (priority, card.key()));
        self.last_priority = pick.map(|(priority, _)| priority);
        let (priority, key) = pick?;
        debug!(
            priority = priority.rank(),
            offense = key.offense,
            defense = key.defense,
            order = key.order,
            "battle card selected"
        );
        self.get(key)
    }

    /// Weakest card with offense strictly above `offense_threshold` and
    /// defense strictly above `defense_threshold`: lowest offense band first,
    /// then lowest `(defense, order)` inside the band.
    pub fn find_best_steal_candidate(
        &self,
        offense_threshold: i32,
        defense_threshold: i32,
    ) -> Option<&Card> {
        let min_offense = offense_threshold.checked_add(1)?;
        let band = self.bands.lowest_band_with_defense_above(
            self.bands.root,
            min_offense,
            defense_threshold,
        )?;
        self.slots.first_above(self.bands.nodes[band].band, defense_threshold)
    }
}
