//! Two-level priority index over the cards in play.
//!
//! The outer AVL tree is keyed by offense; each of its nodes is a band owning
//! an inner AVL tree of the cards sharing that offense, keyed by
//! `(defense, order)`. Both levels cache min/max ranges per subtree so the
//! battle and steal searches can discard whole subtrees.
//!
//! A card's position is a function of its current key. The deck never
//! rewrites keys in place: a card whose stats change must leave the deck
//! first, which [`Deck::checkout`] enforces.

mod audit;
mod checkout;
mod defense;
mod hash;
mod offense;
mod search;

use tracing::warn;

pub use audit::{CountMismatch, InvariantViolation, Level};
pub use checkout::Checkout;

use crate::card::Card;
use crate::types::{CardKey, Priority};
use defense::DefenseForest;
use offense::OffenseTree;

#[derive(Debug)]
pub struct Deck {
    bands: OffenseTree,
    slots: DefenseForest,
    count: usize,
    next_order: u64,
    last_priority: Option<Priority>,
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

impl Deck {
    pub fn new() -> Self {
        Self {
            bands: OffenseTree::default(),
            slots: DefenseForest::default(),
            count: 0,
            next_order: 1,
            last_priority: None,
        }
    }

    /// Places `card` in the band matching its offense, creating the band if needed.
    pub fn insert(&mut self, card: Card) {
        self.next_order = self.next_order.max(card.order.saturating_add(1));
        self.bands.insert(card, &mut self.slots);
        self.count += 1;
    }

    /// Removes the card sitting at `key` and hands it back.
    /// Returns `None`, leaving the deck untouched, when no card has that key.
    pub fn take(&mut self, key: CardKey) -> Option<Card> {
        let removed = self.bands.remove(key, &mut self.slots);
        if removed.is_some() {
            self.count -= 1;
        }
        removed
    }

    /// Removes the card whose current key matches `card`'s.
    pub fn delete(&mut self, card: &Card) -> bool {
        self.take(card.key()).is_some()
    }

    /// Number of cards, as maintained by inserts and deletes.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of distinct offense values currently present.
    pub fn band_count(&self) -> usize {
        self.bands.nodes.len()
    }

    /// Returns an order tag that no card in this deck has used yet.
    pub fn issue_order(&mut self) -> u64 {
        let order = self.next_order;
        self.next_order = self.next_order.saturating_add(1);
        order
    }

    /// Rank of the rule that matched on the latest
    /// [`Deck::find_optimal_battle_card`] call, or 0 if nothing matched.
    pub fn last_selected_priority(&self) -> u8 {
        self.last_priority.map_or(0, Priority::rank)
    }

    pub fn get(&self, key: CardKey) -> Option<&Card> {
        let band = self.bands.find(key.offense)?;
        self.slots.get(self.bands.nodes[band].band, key.rank())
    }

    pub fn contains(&self, key: CardKey) -> bool {
        self.get(key).is_some()
    }

    /// Cards in ascending offense, then ascending `(defense, order)`.
    pub fn iter(&self) -> impl Iterator<Item = &Card> + '_ {
        let mut cards = Vec::with_capacity(self.count);
        self.bands.collect_in_order(self.bands.root, &self.slots, &mut cards);
        cards.into_iter()
    }

    /// Recounts every card by walking the trees and compares the total with
    /// the maintained counter. A mismatch is logged and returned; the deck
    /// keeps working either way.
    pub fn verify_consistency(&self) -> Result<(), CountMismatch> {
        let counted = self.bands.count_reachable(self.bands.root, &self.slots);
        if counted == self.count {
            return Ok(());
        }
        warn!(counted, stored = self.count, "deck count mismatch");
        Err(CountMismatch { counted, stored: self.count })
    }
}
