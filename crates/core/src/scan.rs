//! Linear-scan reference selections.
//! These apply the battle cascade and the steal predicate to every card in
//! turn. They are the baseline the deck's pruned searches are checked against.

use crate::card::Card;
use crate::types::Priority;

fn weakest<'a>(cards: impl Iterator<Item = &'a Card>) -> Option<&'a Card> {
    cards.min_by_key(|card| card.rank())
}

/// Picks the band offense per `prefer_low`, then the weakest card of that band
/// matching `member`.
fn pick_band<'a>(
    cards: &'a [Card],
    band: impl Fn(&Card) -> bool,
    member: impl Fn(&Card) -> bool,
    prefer_low: bool,
) -> Option<&'a Card> {
    let offenses = cards.iter().filter(|card| band(card) && member(card)).map(|card| card.offense);
    let offense = if prefer_low { offenses.min() } else { offenses.max() }?;
    weakest(cards.iter().filter(|card| card.offense == offense && member(card)))
}

pub fn battle_card(
    cards: &[Card],
    incoming_offense: i32,
    incoming_defense: i32,
) -> Option<(Priority, &Card)> {
    let kills = |card: &Card| card.kills(incoming_defense);
    let survives = |card: &Card| card.survives(incoming_offense);

    if let Some(card) = pick_band(cards, kills, survives, true) {
        return Some((Priority::KillAndSurvive, card));
    }
    if let Some(card) = pick_band(cards, |card| !kills(card), survives, false) {
        return Some((Priority::BestDamage, card));
    }
    // A band qualifies for a sacrifice when its weakest card dies.
    let sacrifice = cards
        .iter()
        .filter(|card| kills(card))
        .map(|card| card.offense)
        .filter(|offense| {
            weakest(cards.iter().filter(|card| card.offense == *offense))
                .is_some_and(|card| !survives(card))
        })
        .min();
    if let Some(offense) = sacrifice {
        let card = weakest(cards.iter().filter(|card| card.offense == offense))?;
        return Some((Priority::Sacrifice, card));
    }
    let offense = cards.iter().map(|card| card.offense).max()?;
    let card = weakest(cards.iter().filter(|card| card.offense == offense))?;
    Some((Priority::Forced, card))
}

pub fn steal_candidate(
    cards: &[Card],
    offense_threshold: i32,
    defense_threshold: i32,
) -> Option<&Card> {
    pick_band(
        cards,
        |card| card.offense > offense_threshold,
        |card| card.defense > defense_threshold,
        true,
    )
}
