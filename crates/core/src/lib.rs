pub mod card;
pub mod deck;
pub mod scan;
pub mod session;
pub mod types;

pub use card::Card;
pub use deck::{Checkout, CountMismatch, Deck, InvariantViolation, Level};
pub use session::{
    BattleOutcome, CardFate, Command, CommandParseError, Report, ScoringRules, Session,
    SessionConfig, Side, Standing, parse_script,
};
pub use types::*;
