//! # Poker Table
//!
//! A Texas Hold'em table engine: seats, button rotation, limit betting,
//! showdown and split-pot payout, driven as a finite state machine.
//!
//! ## Architecture
//!
//! A table moves through eight phases, each implemented as its own type and
//! dispatched with `enum_dispatch`:
//!
//! - **WaitingForStart**: Seating players, no deal in progress
//! - **PreDeal**: Button moved, ante collected
//! - **HoleCardsDealt**: Two cards per seat, pre-flop betting
//! - **FlopDealt/TurnDealt/RiverDealt**: Community cards and their betting
//! - **Showdown**: Hands ranked, winners picked
//! - **PayingOut**: Pot split and stacks settled
//!
//! Callers drive the table with [`TableManager::add_player`],
//! [`TableManager::start_game`], [`TableManager::proceed`] and
//! [`TableManager::act`], and watch it through [`EventListener`]s.
//!
//! ## Core Modules
//!
//! - [`game::entities`]: Cards, decks, players and actions
//! - [`game::functional`]: Hand evaluation
//! - [`game::betting`]: The betting round
//! - [`game::deal`]: One hand from ante to payout
//! - [`game::state_machine`]: The table itself
//!
//! ## Example
//!
//! ```
//! use poker_table::{Configuration, Player, TableManager, TableState};
//!
//! let mut table = TableManager::new(Configuration::no_betting(10)).unwrap();
//! table.add_player(Player::new("alice", 1000)).unwrap();
//! table.add_player(Player::new("bob", 1000)).unwrap();
//! table.start_game().unwrap();
//!
//! while table.state() != TableState::PayingOut {
//!     table.proceed().unwrap();
//! }
//! let total: i64 = table.players().iter().flatten().map(|p| p.stack).sum();
//! assert_eq!(total, 2000);
//! ```

/// Core game logic, entities, and state machine.
pub mod game;
pub use game::{
    ActionError, ConfigError, Configuration, Deal, Event, EventListener, EventType, GameType,
    ListenerId, LogListener, RecordingListener, TableError, TableManager, TableState,
    constants,
    entities::{
        self, Action, ActionType, AllowedActions, AmountRange, Card, CardSet, CardSource, Chips,
        Deck, HandRank, Player, SeatIndex,
    },
    functional::{self, eval},
};
