//! Stable snapshot hashing for deterministic verification.
//! The digest covers every card in traversal order, so two decks hash equal
//! exactly when they hold the same cards at the same positions.

use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use super::Deck;

impl Deck {
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_usize(self.count);
        for card in self.iter() {
            hasher.write(card.name.as_bytes());
            hasher.write_u8(0xff);
            hasher.write_i32(card.offense);
            hasher.write_i32(card.defense);
            hasher.write_u64(card.order);
            hasher.write_i32(card.base_offense);
            hasher.write_i32(card.base_defense);
        }
        hasher.finish()
    }
}
