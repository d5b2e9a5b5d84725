/// Property-based tests for chip conservation
///
/// Random decks and random legal actions drive limit deals to payout; no
/// chip may be created or destroyed along the way.
use poker_table::{
    Action, ActionType, CardSource, Chips, Configuration, Deck, Player, TableManager, TableState,
};
use proptest::prelude::*;

fn deck_strategy() -> impl Strategy<Value = Vec<usize>> {
    Just((0..52).collect::<Vec<usize>>()).prop_shuffle()
}

/// Pick the action named by `choice` from what the seat on turn may do.
fn choose_action(table: &TableManager, choice: usize) -> Option<Action> {
    let (seat, allowed) = table.allowed_actions()?;
    let types: Vec<ActionType> = allowed.action_types().collect();
    let action_type = types[choice % types.len()];
    let call = allowed.get(ActionType::Call).map_or(0, |range| range.min);
    let range = allowed.get(action_type)?;
    let action = match action_type {
        ActionType::Check => Action::check(seat),
        ActionType::Bet => Action::bet(seat, range.min),
        ActionType::Call => Action::call(seat),
        ActionType::Raise => Action::raise(seat, range.min - call),
        ActionType::Fold => Action::fold(seat),
        ActionType::BlindBet => return None,
    };
    Some(action)
}

/// Play one deal to payout, acting with `choices` in turn and calling or
/// checking once they run out.
fn play_deal(table: &mut TableManager, choices: &[usize]) {
    let mut choices = choices.iter().copied();
    while table.state() != TableState::PayingOut {
        match choose_action(table, choices.next().unwrap_or(0)) {
            Some(action) => table.act(action).unwrap(),
            None => {
                table.proceed().unwrap();
            }
        }
    }
}

fn total_chips(table: &TableManager) -> Chips {
    table.players().iter().flatten().map(|player| player.stack).sum()
}

proptest! {
    #[test]
    fn test_limit_deal_conserves_chips(
        order in deck_strategy(),
        num_players in 2usize..=6,
        choices in prop::collection::vec(0usize..5, 0..40),
        ante in 0i64..=20,
    ) {
        let config = Configuration::limit([100, 200])
            .with_blinds(vec![50, 100])
            .with_ante(ante);
        let mut table = TableManager::new(config)
            .unwrap()
            .with_deck_factory(move || -> Box<dyn CardSource> {
                Box::new(Deck::from_order(&order).unwrap())
            });
        for seat in 0..num_players {
            table.add_player(Player::new(format!("p{seat}"), 5000)).unwrap();
        }
        let before = total_chips(&table);

        table.start_game().unwrap();
        play_deal(&mut table, &choices);

        prop_assert_eq!(total_chips(&table), before);
        let deal = table.current_deal().unwrap();
        prop_assert_eq!(deal.pot, 0);
        let net: Chips = deal.net_profit.as_ref().unwrap().iter().flatten().sum();
        prop_assert_eq!(net, 0);
        let won: Chips = deal.pot_winnings.as_ref().unwrap().iter().flatten().sum();
        let lost: Chips = deal
            .net_profit
            .as_ref()
            .unwrap()
            .iter()
            .flatten()
            .filter(|&&profit| profit < 0)
            .map(|profit| -profit)
            .sum();
        prop_assert!(won >= lost);
    }

    #[test]
    fn test_consecutive_deals_conserve_chips(
        choices in prop::collection::vec(0usize..5, 0..60),
    ) {
        let mut table = TableManager::new(Configuration::limit([10, 20]).with_ante(5))
            .unwrap();
        for seat in 0..4 {
            table.add_player(Player::new(format!("p{seat}"), 1000)).unwrap();
        }
        table.start_game().unwrap();
        for _ in 0..3 {
            play_deal(&mut table, &choices);
            prop_assert_eq!(total_chips(&table), 4000);
            table.proceed().unwrap();
        }
    }

    #[test]
    fn test_leaving_mid_deal_conserves_chips(
        order in deck_strategy(),
        num_players in 2usize..=6,
        choices in prop::collection::vec(0usize..5, 0..40),
        leaver in 0usize..6,
        leave_after in 0usize..30,
    ) {
        let config = Configuration::limit([100, 200])
            .with_blinds(vec![50, 100])
            .with_ante(10);
        let mut table = TableManager::new(config)
            .unwrap()
            .with_deck_factory(move || -> Box<dyn CardSource> {
                Box::new(Deck::from_order(&order).unwrap())
            });
        for seat in 0..num_players {
            table.add_player(Player::new(format!("p{seat}"), 5000)).unwrap();
        }
        let before = total_chips(&table);
        let leaver = leaver % num_players;

        table.start_game().unwrap();
        let mut choices = choices.iter().copied();
        let mut walked = None;
        let mut step = 0;
        while table.state() != TableState::PayingOut {
            if step == leave_after && walked.is_none() {
                walked = Some(table.remove_player(leaver).unwrap().stack);
            }
            step += 1;
            match choose_action(&table, choices.next().unwrap_or(0)) {
                Some(action) => table.act(action).unwrap(),
                None => {
                    table.proceed().unwrap();
                }
            }
        }
        let walked = match walked {
            Some(stack) => stack,
            None => table.remove_player(leaver).unwrap().stack,
        };

        prop_assert_eq!(total_chips(&table) + walked, before);
        let deal = table.current_deal().unwrap();
        prop_assert_eq!(deal.pot, 0);
        let net: Chips = deal.net_profit.as_ref().unwrap().iter().flatten().sum();
        prop_assert_eq!(net, 0);
    }
}
