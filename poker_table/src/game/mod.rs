//! Poker table engine.
//!
//! This module provides:
//! - Cards, decks and hand evaluation
//! - Limit betting rounds
//! - One deal from ante to payout
//! - The table FSM, built on `enum_dispatch`, with its event stream

// Submodules
pub mod betting;
pub mod config;
pub mod constants;
pub mod deal;
pub mod entities;
pub mod events;
pub mod functional;
pub mod state_machine;
pub mod states;

pub use betting::{ActionError, BettingRound, RoundStatus};
pub use config::{ConfigError, Configuration, GameType};
pub use deal::Deal;
pub use events::{Event, EventListener, EventType, ListenerId, LogListener, RecordingListener};
pub use state_machine::{DeckFactory, TableError, TableManager};
pub use states::TableState;
