use deck::{Card, CardKey, Deck, Priority};

#[test]
fn best_damage_is_chosen_when_no_card_can_kill_and_survive() {
    let mut deck = Deck::new();
    deck.insert(Card::new("C1", 5, 10, 1));
    deck.insert(Card::new("C2", 3, 4, 2));

    let card = deck.find_optimal_battle_card(4, 6).expect("C1 should be selected");
    assert_eq!(card.name, "C1");
    assert_eq!(deck.last_selected_priority(), 2);
    assert_eq!(deck.battle_pick(4, 6).map(|(priority, _)| priority), Some(Priority::BestDamage));
}

#[test]
fn sacrifice_is_chosen_when_the_only_killer_dies() {
    let mut deck = Deck::new();
    deck.insert(Card::new("solo", 2, 3, 1));

    let card = deck.find_optimal_battle_card(5, 1).expect("solo should be selected");
    assert_eq!(card.key(), CardKey { offense: 2, defense: 3, order: 1 });
    assert_eq!(deck.last_selected_priority(), 3);
}

#[test]
fn steal_requires_both_thresholds_strictly() {
    let mut deck = Deck::new();
    deck.insert(Card::new("fragile", 6, 4, 1));
    deck.insert(Card::new("sturdy", 7, 6, 2));

    let card = deck.find_best_steal_candidate(5, 5).expect("sturdy qualifies");
    assert_eq!(card.name, "sturdy");
    assert!(deck.find_best_steal_candidate(5, 6).is_none());
    assert!(deck.find_best_steal_candidate(7, 0).is_none());
}

#[test]
fn deleting_a_missing_card_changes_nothing() {
    let mut deck = Deck::new();
    deck.insert(Card::new("C1", 5, 10, 1));

    assert!(!deck.delete(&Card::new("C1", 5, 10, 2)));
    assert!(!deck.delete(&Card::new("C9", 1, 1, 9)));
    assert_eq!(deck.count(), 1);
    assert_eq!(deck.verify_consistency(), Ok(()));
}

#[test]
fn no_match_resets_last_priority() {
    let mut deck = Deck::new();
    deck.insert(Card::new("C1", 5, 10, 1));
    deck.find_optimal_battle_card(1, 1);
    assert_eq!(deck.last_selected_priority(), 1);

    assert!(deck.delete(&Card::new("C1", 5, 10, 1)));
    assert!(deck.find_optimal_battle_card(1, 1).is_none());
    assert_eq!(deck.last_selected_priority(), 0);
}
