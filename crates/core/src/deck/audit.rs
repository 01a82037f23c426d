//! Structural self-checks for tests and fuzzing.
//! Nothing in the deck's own control flow depends on these.

use std::error::Error;
use std::fmt;

use super::Deck;
use crate::types::{BandId, SlotId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountMismatch {
    pub counted: usize,
    pub stored: usize,
}

impl fmt::Display for CountMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "count mismatch: real={} stored={}", self.counted, self.stored)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Offense,
    Defense,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Offense => write!(f, "offense tree"),
            Level::Defense => write!(f, "defense tree"),
        }
    }
}

/// First broken invariant found by [`Deck::validate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Child heights differ by more than one.
    Unbalanced { level: Level, balance: i64 },
    /// Cached height disagrees with the children.
    StaleHeight { level: Level },
    /// Cached min/max/size disagrees with the subtree contents.
    StaleSummary { level: Level },
    /// In-order walk is not strictly increasing.
    OutOfOrder { level: Level },
    /// A card sits in a band whose offense differs from its own.
    BandKeyMismatch { band: i32, card_offense: i32 },
    /// A band node with no cards survived a removal.
    EmptyBand { band: i32 },
    Count(CountMismatch),
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbalanced { level, balance } => {
                write!(f, "{level} node out of balance (factor {balance})")
            }
            Self::StaleHeight { level } => write!(f, "{level} node has a stale height"),
            Self::StaleSummary { level } => write!(f, "{level} node has a stale summary"),
            Self::OutOfOrder { level } => write!(f, "{level} keys are out of order"),
            Self::BandKeyMismatch { band, card_offense } => {
                write!(f, "card with offense {card_offense} stored in band {band}")
            }
            Self::EmptyBand { band } => write!(f, "band {band} has no cards"),
            Self::Count(mismatch) => write!(f, "{mismatch}"),
        }
    }
}

impl Error for InvariantViolation {}

/// Recomputed facts about one audited subtree.
struct Measured {
    height: u32,
    min_defense: i32,
    max_defense: i32,
    min_offense: i32,
    max_offense: i32,
    size: usize,
}

impl Measured {
    fn node(offense: i32, defense: (i32, i32), size: usize) -> Self {
        Self {
            height: 1,
            min_defense: defense.0,
            max_defense: defense.1,
            min_offense: offense,
            max_offense: offense,
            size,
        }
    }

    fn absorb(&mut self, child: &Measured) {
        self.min_defense = self.min_defense.min(child.min_defense);
        self.max_defense = self.max_defense.max(child.max_defense);
        self.min_offense = self.min_offense.min(child.min_offense);
        self.max_offense = self.max_offense.max(child.max_offense);
        self.size += child.size;
    }
}

fn check_balance(
    level: Level,
    left: Option<&Measured>,
    right: Option<&Measured>,
    cached_height: u32,
) -> Result<u32, InvariantViolation> {
    let left = left.map_or(0, |m| m.height);
    let right = right.map_or(0, |m| m.height);
    let balance = i64::from(left) - i64::from(right);
    if balance.abs() > 1 {
        return Err(InvariantViolation::Unbalanced { level, balance });
    }
    let height = 1 + left.max(right);
    if cached_height != height {
        return Err(InvariantViolation::StaleHeight { level });
    }
    Ok(height)
}

impl Deck {
    /// Audits balance, ordering, cached summaries and band membership on both
    /// levels, then the maintained count.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let mut previous = None;
        let measured = self.audit_bands(self.bands.root, &mut previous)?;
        let size = measured.map_or(0, |m| m.size);
        if size != self.count {
            return Err(InvariantViolation::Count(CountMismatch {
                counted: size,
                stored: self.count,
            }));
        }
        self.verify_consistency().map_err(InvariantViolation::Count)
    }

    fn audit_bands(
        &self,
        node: Option<BandId>,
        previous: &mut Option<i32>,
    ) -> Result<Option<Measured>, InvariantViolation> {
        let Some(id) = node else {
            return Ok(None);
        };
        let band = &self.bands.nodes[id];
        let left = self.audit_bands(band.left, previous)?;

        if previous.is_some_and(|offense| offense >= band.offense) {
            return Err(InvariantViolation::OutOfOrder { level: Level::Offense });
        }
        *previous = Some(band.offense);

        let mut ranks = None;
        let Some(cards) = self.audit_slots(band.band, band.offense, &mut ranks)? else {
            return Err(InvariantViolation::EmptyBand { band: band.offense });
        };
        if band.band_min_defense != cards.min_defense || band.band_max_defense != cards.max_defense
        {
            return Err(InvariantViolation::StaleSummary { level: Level::Offense });
        }

        let right = self.audit_bands(band.right, previous)?;
        let height = check_balance(Level::Offense, left.as_ref(), right.as_ref(), band.height)?;

        let mut measured =
            Measured::node(band.offense, (cards.min_defense, cards.max_defense), cards.size);
        measured.height = height;
        for child in left.iter().chain(right.iter()) {
            measured.absorb(child);
        }
        if band.min_defense != measured.min_defense
            || band.max_defense != measured.max_defense
            || band.min_offense != measured.min_offense
            || band.max_offense != measured.max_offense
            || band.size != measured.size
        {
            return Err(InvariantViolation::StaleSummary { level: Level::Offense });
        }
        Ok(Some(measured))
    }

    fn audit_slots(
        &self,
        node: Option<SlotId>,
        band: i32,
        previous: &mut Option<(i32, u64)>,
    ) -> Result<Option<Measured>, InvariantViolation> {
        let Some(id) = node else {
            return Ok(None);
        };
        let slot = &self.slots.nodes[id];
        let left = self.audit_slots(slot.left, band, previous)?;

        let rank = slot.card.rank();
        if previous.is_some_and(|prior| prior >= rank) {
            return Err(InvariantViolation::OutOfOrder { level: Level::Defense });
        }
        *previous = Some(rank);
        if slot.card.offense != band {
            return Err(InvariantViolation::BandKeyMismatch {
                band,
                card_offense: slot.card.offense,
            });
        }

        let right = self.audit_slots(slot.right, band, previous)?;
        let height = check_balance(Level::Defense, left.as_ref(), right.as_ref(), slot.height)?;

        let mut measured = Measured::node(band, (slot.card.defense, slot.card.defense), 1);
        measured.height = height;
        for child in left.iter().chain(right.iter()) {
            measured.absorb(child);
        }
        if slot.min_defense != measured.min_defense
            || slot.max_defense != measured.max_defense
            || slot.size != measured.size
        {
            return Err(InvariantViolation::StaleSummary { level: Level::Defense });
        }
        Ok(Some(measured))
    }
}
