//! Limit betting integration tests.
//!
//! Four players in seats 0-3 with limits 100/200 and an unshuffled deck, so
//! the first button lands on seat 0 and action opens on seat 1.

use poker_table::{
    Action, ActionError, ActionType, AllowedActions, AmountRange, CardSource, Configuration, Deck,
    Event, EventType, Player, RecordingListener, TableError, TableManager, TableState,
};

fn four_handed(config: Configuration) -> (TableManager, RecordingListener) {
    let mut table = TableManager::new(config)
        .unwrap()
        .with_deck_factory(|| -> Box<dyn CardSource> { Box::new(Deck::default()) });
    for name in ["alice", "bob", "carol", "dave"] {
        table.add_player(Player::new(name, 1000)).unwrap();
    }
    let recorder = RecordingListener::new();
    table.subscribe(recorder.clone());
    table.start_game().unwrap();
    (table, recorder)
}

fn hand_stacks(table: &TableManager) -> Vec<i64> {
    table
        .current_deal()
        .unwrap()
        .players
        .iter()
        .flatten()
        .map(|player| player.stack)
        .collect()
}

// ============================================================================
// Round Flow
// ============================================================================

#[test]
fn test_check_around_moves_no_chips() {
    let (mut table, _) = four_handed(Configuration::limit([100, 200]));
    table.proceed().unwrap();
    assert_eq!(table.allowed_actions().map(|(seat, _)| seat), Some(1));

    for seat in [1, 2, 3, 0] {
        table.act(Action::check(seat)).unwrap();
    }
    assert!(table.allowed_actions().is_none());
    assert_eq!(table.current_deal().unwrap().pot, 0);
    assert_eq!(hand_stacks(&table), vec![1000; 4]);
    assert_eq!(table.proceed(), Ok(TableState::FlopDealt));
}

#[test]
fn test_bet_and_three_calls() {
    let (mut table, _) = four_handed(Configuration::limit([100, 200]));
    table.proceed().unwrap();
    for seat in [1, 2, 3, 0] {
        table.act(Action::check(seat)).unwrap();
    }
    table.proceed().unwrap();

    table.act(Action::bet(1, 100)).unwrap();
    table.act(Action::call(2)).unwrap();
    table.act(Action::call(3)).unwrap();
    table.act(Action::call(0)).unwrap();

    assert!(table.allowed_actions().is_none());
    assert_eq!(table.current_deal().unwrap().pot, 400);
    assert_eq!(hand_stacks(&table), vec![900; 4]);
}

#[test]
fn test_turn_uses_big_limit() {
    let (mut table, _) = four_handed(Configuration::limit([100, 200]));
    table.proceed().unwrap();
    for _ in 0..2 {
        for seat in [1, 2, 3, 0] {
            table.act(Action::check(seat)).unwrap();
        }
        table.proceed().unwrap();
    }
    assert_eq!(table.state(), TableState::TurnDealt);
    let (seat, allowed) = table.allowed_actions().unwrap();
    assert_eq!(seat, 1);
    assert_eq!(
        allowed.get(ActionType::Bet),
        Some(&AmountRange::exactly(200))
    );
}

#[test]
fn test_action_on_events_follow_each_action() {
    let (mut table, recorder) = four_handed(Configuration::limit([100, 200]));
    table.proceed().unwrap();
    table.act(Action::bet(1, 100)).unwrap();

    let events = recorder.events();
    let tail = &events[events.len() - 4..];
    assert_eq!(
        tail.iter().map(Event::event_type).collect::<Vec<_>>(),
        vec![
            EventType::HoleCardsDealt,
            EventType::ActionOn,
            EventType::Action,
            EventType::ActionOn,
        ]
    );
    assert_eq!(tail[2], Event::Action(Action::bet(1, 100)));
    assert_eq!(
        tail[3],
        Event::ActionOn {
            seat: 2,
            allowed: AllowedActions::from([
                (ActionType::Call, AmountRange::exactly(100)),
                (ActionType::Raise, AmountRange::exactly(200)),
                (ActionType::Fold, AmountRange::exactly(0)),
            ]),
        }
    );
}

#[test]
fn test_closing_action_has_no_action_on() {
    let (mut table, recorder) = four_handed(Configuration::limit([100, 200]));
    table.proceed().unwrap();
    for seat in [1, 2, 3] {
        table.act(Action::check(seat)).unwrap();
    }
    recorder.clear();
    table.act(Action::check(0)).unwrap();
    assert_eq!(recorder.events(), vec![Event::Action(Action::check(0))]);
}

// ============================================================================
// Blinds
// ============================================================================

#[test]
fn test_blinds_post_after_hole_cards() {
    let (mut table, recorder) =
        four_handed(Configuration::limit([100, 200]).with_blinds(vec![50, 100]));
    recorder.clear();
    table.proceed().unwrap();

    assert_eq!(
        recorder.event_types(),
        vec![
            EventType::HoleCardsDealt,
            EventType::Action,
            EventType::Action,
            EventType::ActionOn,
        ]
    );
    let events = recorder.events();
    assert_eq!(events[1], Event::Action(Action::blind_bet(1, 50)));
    assert_eq!(events[2], Event::Action(Action::blind_bet(2, 100)));
    assert_eq!(hand_stacks(&table), vec![1000, 950, 900, 1000]);
    assert_eq!(table.allowed_actions().map(|(seat, _)| seat), Some(3));
}

#[test]
fn test_big_blind_gets_the_option() {
    let (mut table, _) = four_handed(Configuration::limit([100, 200]).with_blinds(vec![50, 100]));
    table.proceed().unwrap();
    table.act(Action::call(3)).unwrap();
    table.act(Action::call(0)).unwrap();
    table.act(Action::call(1)).unwrap();

    let (seat, allowed) = table.allowed_actions().unwrap();
    assert_eq!(seat, 2);
    assert_eq!(
        allowed.get(ActionType::Call),
        Some(&AmountRange::exactly(0))
    );
    table.act(Action::raise(2, 100)).unwrap();
    for seat in [3, 0, 1] {
        table.act(Action::call(seat)).unwrap();
    }
    assert!(table.allowed_actions().is_none());
    assert_eq!(table.current_deal().unwrap().pot, 800);
}

// ============================================================================
// Folding
// ============================================================================

#[test]
fn test_everyone_folds_to_the_bettor() {
    let (mut table, _) = four_handed(Configuration::limit([100, 200]));
    table.proceed().unwrap();
    table.act(Action::bet(1, 100)).unwrap();
    for seat in [2, 3, 0] {
        table.act(Action::fold(seat)).unwrap();
    }
    assert!(table.allowed_actions().is_none());

    while table.state() != TableState::PayingOut {
        table.proceed().unwrap();
        assert!(table.allowed_actions().is_none());
    }
    let deal = table.current_deal().unwrap();
    assert_eq!(deal.winners, Some(vec![1]));
    assert_eq!(
        deal.net_profit,
        Some([vec![Some(0); 4], vec![None; 6]].concat())
    );
}

#[test]
fn test_fold_then_showdown() {
    let (mut table, _) = four_handed(Configuration::limit([100, 200]));
    table.proceed().unwrap();
    table.act(Action::bet(1, 100)).unwrap();
    table.act(Action::fold(2)).unwrap();
    table.act(Action::call(3)).unwrap();
    table.act(Action::call(0)).unwrap();
    while table.state() != TableState::RiverDealt {
        while let Some((seat, _)) = table.allowed_actions() {
            table.act(Action::check(seat)).unwrap();
        }
        table.proceed().unwrap();
    }
    while let Some((seat, _)) = table.allowed_actions() {
        table.act(Action::check(seat)).unwrap();
    }
    table.proceed().unwrap();
    table.proceed().unwrap();

    let deal = table.current_deal().unwrap();
    let winners = deal.winners.clone().unwrap();
    assert!(!winners.contains(&2));
    let total: i64 = table.players().iter().flatten().map(|p| p.stack).sum();
    assert_eq!(total, 4000);
    assert_eq!(table.player(2).unwrap().stack, 1000);
}

// ============================================================================
// Rejected Actions
// ============================================================================

#[test]
fn test_proceed_while_betting() {
    let (mut table, recorder) = four_handed(Configuration::limit([100, 200]));
    table.proceed().unwrap();
    recorder.clear();
    assert_eq!(table.proceed(), Err(TableError::BettingActive));
    assert_eq!(table.state(), TableState::HoleCardsDealt);
    assert!(recorder.events().is_empty());
}

#[test]
fn test_out_of_turn_through_table() {
    let (mut table, _) = four_handed(Configuration::limit([100, 200]));
    table.proceed().unwrap();
    assert_eq!(
        table.act(Action::check(3)),
        Err(TableError::Action(ActionError::OutOfTurn {
            seat: 3,
            action_on: 1
        }))
    );
}

#[test]
fn test_wrong_amount_leaves_table_untouched() {
    let (mut table, recorder) = four_handed(Configuration::limit([100, 200]));
    table.proceed().unwrap();
    recorder.clear();
    let err = table.act(Action::bet(1, 500)).unwrap_err();
    assert_eq!(
        err,
        TableError::Action(ActionError::Amount {
            action_type: ActionType::Bet,
            amount: 500,
            min: 100,
            max: 100
        })
    );
    assert_eq!(err.to_string(), "bet of $500 is outside $100..=$100");
    assert!(recorder.events().is_empty());
    assert_eq!(hand_stacks(&table), vec![1000; 4]);
    assert_eq!(table.allowed_actions().map(|(seat, _)| seat), Some(1));
}

#[test]
fn test_disallowed_type() {
    let (mut table, _) = four_handed(Configuration::limit([100, 200]));
    table.proceed().unwrap();
    let err = table.act(Action::raise(1, 100)).unwrap_err();
    assert!(matches!(
        err,
        TableError::Action(ActionError::NotAllowed {
            action_type: ActionType::Raise,
            ..
        })
    ));
}

#[test]
fn test_malformed_action_is_rejected_at_construction() {
    assert!(Action::new(1, ActionType::Bet, None).is_err());
    assert!(Action::new(1, ActionType::Check, Some(100)).is_err());
    assert_eq!(
        Action::new(1, ActionType::Raise, Some(100)),
        Ok(Action::raise(1, 100))
    );
}

// ============================================================================
// Leaving Mid-Round
// ============================================================================

#[test]
fn test_leaving_on_turn_folds_and_passes_action() {
    let (mut table, recorder) = four_handed(Configuration::limit([100, 200]));
    table.proceed().unwrap();
    table.act(Action::bet(1, 100)).unwrap();
    recorder.clear();

    let carol = table.remove_player(2).unwrap();
    assert_eq!(carol.stack, 1000);
    assert_eq!(
        recorder.event_types(),
        vec![
            EventType::PlayerRemoved,
            EventType::Action,
            EventType::ActionOn,
        ]
    );
    let events = recorder.events();
    assert_eq!(events[1], Event::Action(Action::fold(2)));
    assert_eq!(
        events[2],
        Event::ActionOn {
            seat: 3,
            allowed: AllowedActions::from([
                (ActionType::Call, AmountRange::exactly(100)),
                (ActionType::Raise, AmountRange::exactly(200)),
                (ActionType::Fold, AmountRange::exactly(0)),
            ]),
        }
    );

    table.act(Action::call(3)).unwrap();
    table.act(Action::call(0)).unwrap();
    assert!(table.allowed_actions().is_none());
    assert_eq!(table.current_deal().unwrap().pot, 300);

    for _ in 0..3 {
        table.proceed().unwrap();
        for seat in [1, 3, 0] {
            table.act(Action::check(seat)).unwrap();
        }
    }
    table.proceed().unwrap();
    assert_eq!(table.proceed(), Ok(TableState::PayingOut));
    let seated: i64 = table.players().iter().flatten().map(|p| p.stack).sum();
    assert_eq!(seated + carol.stack, 4000);
}

#[test]
fn test_leaving_off_turn_keeps_committed_chips_in_pot() {
    let (mut table, recorder) = four_handed(Configuration::limit([100, 200]));
    table.proceed().unwrap();
    table.act(Action::bet(1, 100)).unwrap();
    table.act(Action::call(2)).unwrap();
    recorder.clear();

    let bob = table.remove_player(1).unwrap();
    assert_eq!(bob.stack, 900);
    assert_eq!(
        recorder.events(),
        vec![
            Event::PlayerRemoved(bob.clone()),
            Event::Action(Action::fold(1)),
        ]
    );
    assert_eq!(table.allowed_actions().map(|(seat, _)| seat), Some(3));

    table.act(Action::call(3)).unwrap();
    table.act(Action::call(0)).unwrap();
    assert!(table.allowed_actions().is_none());
    assert_eq!(table.current_deal().unwrap().pot, 400);
    assert_eq!(hand_stacks(&table), vec![900; 4]);
}
