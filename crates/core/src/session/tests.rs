use super::*;

fn session_with(cards: &[(&str, i32, i32)]) -> Session {
    let mut session = Session::default();
    for &(name, offense, defense) in cards {
        session.draw(name, offense, defense);
    }
    session
}

#[test]
fn battle_with_empty_deck_forfeits_to_the_stranger() {
    let mut session = Session::default();
    assert_eq!(session.battle(3, 3), BattleOutcome::NoCard);
    assert_eq!(session.score(Side::Stranger), 2);
    assert_eq!(session.winner(), Standing { side: Side::Stranger, points: 2 });
}

#[test]
fn every_battle_without_a_card_forfeits() {
    let mut session = session_with(&[("C1", 2, 3)]);
    assert!(matches!(session.battle(5, 1), BattleOutcome::Played { .. }));
    assert_eq!(session.score(Side::Stranger), 2);

    assert_eq!(session.battle(5, 1), BattleOutcome::NoCard);
    assert_eq!(session.battle(0, 0), BattleOutcome::NoCard);
    assert_eq!(session.score(Side::Stranger), 6);
    assert_eq!(session.deck().last_selected_priority(), 0);
}

#[test]
fn surviving_card_is_rescaled_and_requeued() {
    let mut session = session_with(&[("C1", 5, 10), ("C2", 3, 4)]);

    let outcome = session.battle(4, 6);
    assert_eq!(
        outcome,
        BattleOutcome::Played {
            priority: Priority::BestDamage,
            name: "C1".into(),
            fate: CardFate::Returned,
        }
    );
    // C1 took 4 damage: defense 6, offense floor(5 * 6 / 10) = 3, fresh order tag.
    let c1 = session.deck().iter().find(|card| card.name == "C1").unwrap();
    assert_eq!(c1.key(), CardKey { offense: 3, defense: 6, order: 3 });
    // Card wounded: Stranger +1. Stranger wounded (6 - 5 = 1 left): Survivor +1.
    assert_eq!(session.score(Side::Stranger), 1);
    assert_eq!(session.score(Side::Survivor), 1);
    assert_eq!(session.count(), 2);
    session.deck().validate().unwrap();
}

#[test]
fn dying_card_is_discarded_and_scored() {
    let mut session = session_with(&[("C1", 2, 3)]);

    let outcome = session.battle(5, 1);
    assert_eq!(
        outcome,
        BattleOutcome::Played {
            priority: Priority::Sacrifice,
            name: "C1".into(),
            fate: CardFate::Discarded,
        }
    );
    assert_eq!(session.count(), 0);
    assert_eq!(session.score(Side::Stranger), 2);
    assert_eq!(session.score(Side::Survivor), 2);
    assert_eq!(session.winner().side, Side::Survivor);
}

#[test]
fn session_priority_agrees_with_the_deck_selection() {
    let mut session = session_with(&[("a", 1, 2), ("b", 3, 9), ("c", 7, 1), ("d", 7, 12)]);
    for (offense, defense) in [(4, 5), (20, 2), (1, 30), (8, 8), (0, 0)] {
        let outcome = session.battle(offense, defense);
        if let BattleOutcome::Played { priority, .. } = outcome {
            assert_eq!(priority.rank(), session.deck().last_selected_priority());
        }
    }
}

#[test]
fn steal_removes_the_weakest_qualifying_card() {
    let mut session = session_with(&[("low", 6, 4), ("high", 7, 6)]);
    let stolen = session.steal(5, 5).unwrap();
    assert_eq!(stolen.name, "high");
    assert_eq!(session.count(), 1);
    assert!(session.steal(5, 5).is_none());
}

#[test]
fn custom_scoring_rules_are_applied() {
    let config = SessionConfig { scoring: ScoringRules { kill: 5, wound: 3, forfeit: 7 } };
    let mut session = Session::new(config);
    session.battle(1, 1);
    assert_eq!(session.score(Side::Stranger), 7);

    session.draw("C1", 4, 10);
    session.battle(2, 4);
    assert_eq!(session.score(Side::Survivor), 5);
    assert_eq!(session.score(Side::Stranger), 10);
}

#[test]
fn reports_render_console_lines() {
    let mut session = Session::default();
    let script = parse_script(
        "draw C1 5 10\ndraw C2 3 4\nbattle 4 6\ncount\nsteal 1 5\nsteal 9 9\n\
         battle 50 50\nbattle 50 50\nbattle 1 1\nwinner\n",
    )
    .unwrap();
    let lines: Vec<String> =
        script.into_iter().map(|command| session.apply(command).to_string()).collect();
    assert_eq!(
        lines,
        [
            "Added C1 to the deck",
            "Added C2 to the deck",
            "Found with priority 2, Survivor plays C1, the played card returned to deck, 0 cards revived",
            "Number of cards in the deck: 2",
            "The Stranger stole the card: C1",
            "No card to steal",
            "Found with priority 4, Survivor plays C2, the played card is discarded, 0 cards revived",
            "No cards to play, 0 cards revived",
            "No cards to play, 0 cards revived",
            "The Stranger, Score: 7",
        ]
    );
}

#[test]
fn winner_ties_go_to_the_survivor() {
    let session = Session::default();
    assert_eq!(session.winner().to_string(), "The Survivor, Score: 0");
}

#[test]
fn parser_accepts_comments_blank_lines_and_any_case() {
    let commands =
        parse_script("# setup\n\nDRAW Knight 4 7\n  Battle 1 2  \ncount\nwinner").unwrap();
    assert_eq!(
        commands,
        [
            Command::Draw { name: "Knight".into(), offense: 4, defense: 7 },
            Command::Battle { offense: 1, defense: 2 },
            Command::Count,
            Command::Winner,
        ]
    );
}

#[test]
fn parser_reports_the_offending_line() {
    assert_eq!(
        parse_script("count\nheal 3"),
        Err(CommandParseError::UnknownCommand { line: 2, word: "heal".into() })
    );
    assert_eq!(
        parse_script("draw Knight 4"),
        Err(CommandParseError::MissingArgument { line: 1, command: "draw", argument: "defense" })
    );
    assert_eq!(
        parse_script("\nsteal x 2"),
        Err(CommandParseError::InvalidNumber {
            line: 2,
            argument: "offense",
            token: "x".into()
        })
    );
    let error = parse_script("winner now").unwrap_err();
    assert_eq!(error.to_string(), "line 1: unexpected trailing `now`");
}

#[test]
fn debug_output_includes_deck_contents() {
    let session = session_with(&[("Knight", 4, 7)]);
    let rendered = format!("{session:?}");
    assert!(rendered.contains("Knight"));
    assert!(rendered.contains("survivor_points: 0"));
}
