//! Scoped removal of a card whose stats are about to change.
//! The guard reinserts the card when dropped, so a mutated card can never be
//! left sitting at a stale position or silently lost.

use std::mem;
use std::ops::{Deref, DerefMut};

use super::Deck;
use crate::card::Card;
use crate::types::CardKey;

pub struct Checkout<'a> {
    deck: &'a mut Deck,
    card: Card,
    original: CardKey,
    refresh_order: bool,
    discarded: bool,
}

impl Deck {
    /// Pulls the card at `key` out of the deck for mutation.
    ///
    /// The card goes back in when the returned guard is dropped. If its offense
    /// or defense changed it is requeued behind every existing card of equal
    /// defense by receiving a fresh order tag.
    pub fn checkout(&mut self, key: CardKey) -> Option<Checkout<'_>> {
        let card = self.take(key)?;
        Some(Checkout { deck: self, card, original: key, refresh_order: false, discarded: false })
    }
}

impl Checkout<'_> {
    /// Key the card had when it was checked out.
    pub fn original_key(&self) -> CardKey {
        self.original
    }

    /// Requeue the card with a fresh order tag even if its stats are unchanged.
    pub fn refresh_order(&mut self) {
        self.refresh_order = true;
    }

    /// Keeps the card out of the deck and returns it.
    pub fn discard(mut self) -> Card {
        self.discarded = true;
        mem::take(&mut self.card)
    }
}

impl Deref for Checkout<'_> {
    type Target = Card;

    fn deref(&self) -> &Card {
        &self.card
    }
}

impl DerefMut for Checkout<'_> {
    fn deref_mut(&mut self) -> &mut Card {
        &mut self.card
    }
}

impl Drop for Checkout<'_> {
    fn drop(&mut self) {
        if self.discarded {
            return;
        }
        let mut card = mem::take(&mut self.card);
        let moved = card.offense != self.original.offense || card.defense != self.original.defense;
        if moved || self.refresh_order {
            card.order = self.deck.issue_order();
        }
        self.deck.insert(card);
    }
}
