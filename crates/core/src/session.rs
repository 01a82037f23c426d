//! Game flow on top of the deck: draws, battles against the Stranger, steals
//! and scoring. This module drives the deck only through its public API.
//! It does not own command-line I/O; binaries render [`Report`]s themselves.

mod command;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use command::{Command, CommandParseError, parse_script};

use crate::card::Card;
use crate::deck::Deck;
use crate::types::{CardKey, Damage, Priority};

/// Points awarded per battle event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    /// Opponent eliminated.
    pub kill: u32,
    /// Opponent damaged but alive.
    pub wound: u32,
    /// Awarded to the Stranger when the deck has nothing to play.
    pub forfeit: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self { kill: 2, wound: 1, forfeit: 2 }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub scoring: ScoringRules,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Survivor,
    Stranger,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Survivor => write!(f, "The Survivor"),
            Side::Stranger => write!(f, "The Stranger"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Standing {
    pub side: Side,
    pub points: u32,
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Score: {}", self.side, self.points)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardFate {
    Returned,
    Discarded,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BattleOutcome {
    NoCard,
    Played { priority: Priority, name: String, fate: CardFate },
}

impl fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleOutcome::NoCard => write!(f, "No cards to play, 0 cards revived"),
            BattleOutcome::Played { priority, name, fate } => {
                let fate = match fate {
                    CardFate::Returned => "returned to deck",
                    CardFate::Discarded => "is discarded",
                };
                write!(f, "Found with priority {priority}, Survivor plays {name}, ")?;
                write!(f, "the played card {fate}, 0 cards revived")
            }
        }
    }
}

/// Result of one [`Command`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Report {
    Drawn { name: String },
    Battle(BattleOutcome),
    Steal(Option<Card>),
    Count(usize),
    Winner(Standing),
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Drawn { name } => write!(f, "Added {name} to the deck"),
            Report::Battle(outcome) => write!(f, "{outcome}"),
            Report::Steal(Some(card)) => write!(f, "The Stranger stole the card: {}", card.name),
            Report::Steal(None) => write!(f, "No card to steal"),
            Report::Count(count) => write!(f, "Number of cards in the deck: {count}"),
            Report::Winner(standing) => write!(f, "{standing}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct Session {
    deck: Deck,
    scoring: ScoringRules,
    survivor_points: u32,
    stranger_points: u32,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self { scoring: config.scoring, ..Self::default() }
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Survivor => self.survivor_points,
            Side::Stranger => self.stranger_points,
        }
    }

    fn award(&mut self, side: Side, points: u32) {
        match side {
            Side::Survivor => self.survivor_points += points,
            Side::Stranger => self.stranger_points += points,
        }
    }

    pub fn apply(&mut self, command: Command) -> Report {
        match command {
            Command::Draw { name, offense, defense } => {
                self.draw(name.clone(), offense, defense);
                Report::Drawn { name }
            }
            Command::Battle { offense, defense } => Report::Battle(self.battle(offense, defense)),
            Command::Steal { offense, defense } => Report::Steal(self.steal(offense, defense)),
            Command::Count => Report::Count(self.count()),
            Command::Winner => Report::Winner(self.winner()),
        }
    }

    /// Adds a fresh card behind every card already drawn.
    pub fn draw(&mut self, name: impl Into<String>, offense: i32, defense: i32) -> CardKey {
        let card = Card::new(name, offense, defense, self.deck.issue_order());
        let key = card.key();
        self.deck.insert(card);
        key
    }

    /// Plays the deck's best card against a Stranger attack.
    ///
    /// Both sides trade blows once. The played card is discarded if it dies,
    /// otherwise it is rescaled and requeued with a fresh order tag.
    pub fn battle(&mut self, incoming_offense: i32, incoming_defense: i32) -> BattleOutcome {
        let picked = self.deck.find_optimal_battle_card(incoming_offense, incoming_defense);
        let picked = picked.map(Card::key);
        // The guard borrows `self.deck`; only disjoint fields are touched until it is gone.
        let Some(mut card) = picked.and_then(|key| self.deck.checkout(key)) else {
            self.stranger_points += self.scoring.forfeit;
            return BattleOutcome::NoCard;
        };

        let priority =
            Priority::classify(card.survives(incoming_offense), card.kills(incoming_defense));
        let name = card.name.clone();
        let card_left = card.defense.saturating_sub(incoming_offense);
        let card_wounded = card_left < card.base_defense;
        let stranger_left = incoming_defense.saturating_sub(card.offense);

        let fate = match card.apply_damage(incoming_offense) {
            Damage::Eliminated => {
                card.discard();
                CardFate::Discarded
            }
            Damage::Survived { .. } => {
                card.refresh_order();
                drop(card);
                CardFate::Returned
            }
        };

        let scoring = self.scoring;
        if card_left <= 0 {
            self.award(Side::Stranger, scoring.kill);
        } else if card_wounded {
            self.award(Side::Stranger, scoring.wound);
        }
        if stranger_left <= 0 {
            self.award(Side::Survivor, scoring.kill);
        } else if stranger_left < incoming_defense {
            self.award(Side::Survivor, scoring.wound);
        }

        debug!(card = %name, priority = priority.rank(), ?fate, "battle resolved");
        BattleOutcome::Played { priority, name, fate }
    }

    /// Removes the weakest card beating both thresholds, if any.
    pub fn steal(&mut self, offense_threshold: i32, defense_threshold: i32) -> Option<Card> {
        let key = self.deck.find_best_steal_candidate(offense_threshold, defense_threshold)?.key();
        let card = self.deck.take(key)?;
        debug!(card = %card.name, "card stolen");
        Some(card)
    }

    /// Deck size after a consistency pass; a mismatch is only logged.
    pub fn count(&self) -> usize {
        let _ = self.deck.verify_consistency();
        self.deck.count()
    }

    /// Current leader. Ties go to the Survivor.
    pub fn winner(&self) -> Standing {
        if self.survivor_points >= self.stranger_points {
            Standing { side: Side::Survivor, points: self.survivor_points }
        } else {
            Standing { side: Side::Stranger, points: self.stranger_points }
        }
    }
}

#[cfg(test)]
mod tests;
