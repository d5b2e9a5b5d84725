//! Table Walkthrough Example
//!
//! Runs one limit deal at a four-seat table, printing every event the table
//! emits and ranking the final hands.

use poker_table::{
    Action, ActionType, Configuration, Event, LogListener, Player, TableManager, TableState,
    functional::eval,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::builder().format_target(false).init();
    println!("=== Poker Table Walkthrough ===\n");

    let config = Configuration::limit([10, 20]).with_blinds(vec![5, 10]);
    let mut table = TableManager::new(config)?;
    table.subscribe(|event: &Event| println!("  {event}"));
    table.subscribe(LogListener);

    for name in ["alice", "bob", "carol", "dave"] {
        let seat = table.add_player(Player::new(name, 500))?;
        println!("{name} takes seat {seat}");
    }

    println!("\nDealing:");
    table.start_game()?;
    while table.state() != TableState::PayingOut {
        match table.allowed_actions() {
            // Everyone bets once per street when they can, otherwise calls.
            Some((seat, allowed)) if allowed.contains(ActionType::Bet) => {
                let amount = allowed.get(ActionType::Bet).map_or(0, |range| range.min);
                table.act(Action::bet(seat, amount))?;
            }
            Some((seat, _)) => table.act(Action::call(seat))?,
            None => {
                table.proceed()?;
            }
        }
    }

    println!("\nFinal hands:");
    if let Some(deal) = table.current_deal() {
        for player in deal.players.iter().flatten() {
            if let Some(hole_cards) = &player.hole_cards {
                let rank = eval(hole_cards.combine(&deal.board).cards())?;
                println!("  {} holds {hole_cards}: {rank}", player.name);
            }
        }
    }

    println!("\nStacks:");
    for player in table.players().iter().flatten() {
        println!("  {player}");
    }

    Ok(())
}
