//! Table events and the listeners that receive them.

use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use super::entities::{
    Action, AllowedActions, Card, CardSet, Chips, HandPlayer, HandRank, Player, SeatIndex,
};

/// Everything a table announces. Per-seat payloads are indexed by seat
/// with `None` for seats that aren't in the deal.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Event {
    PlayerAdded(Player),
    PlayerRemoved(Player),
    WaitingForStart,
    HandStarted(Vec<Option<HandPlayer>>),
    Ante {
        amount: Chips,
        seats: Vec<SeatIndex>,
    },
    HoleCardsDealt(Vec<Option<CardSet>>),
    FlopDealt(CardSet),
    TurnDealt(Card),
    RiverDealt(Card),
    Action(Action),
    ActionOn {
        seat: SeatIndex,
        allowed: AllowedActions,
    },
    Showdown {
        ranks: Vec<HandRank>,
        winners: Vec<SeatIndex>,
    },
    PayingOut {
        net_profit: Vec<Option<Chips>>,
        pot_winnings: Vec<Option<Chips>>,
    },
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum EventType {
    PlayerAdded,
    PlayerRemoved,
    WaitingForStart,
    HandStarted,
    Ante,
    HoleCardsDealt,
    FlopDealt,
    TurnDealt,
    RiverDealt,
    Action,
    ActionOn,
    Showdown,
    PayingOut,
}

impl Event {
    #[must_use]
    pub fn event_type(&self) -> EventType {
        match self {
            Self::PlayerAdded(_) => EventType::PlayerAdded,
            Self::PlayerRemoved(_) => EventType::PlayerRemoved,
            Self::WaitingForStart => EventType::WaitingForStart,
            Self::HandStarted(_) => EventType::HandStarted,
            Self::Ante { .. } => EventType::Ante,
            Self::HoleCardsDealt(_) => EventType::HoleCardsDealt,
            Self::FlopDealt(_) => EventType::FlopDealt,
            Self::TurnDealt(_) => EventType::TurnDealt,
            Self::RiverDealt(_) => EventType::RiverDealt,
            Self::Action(_) => EventType::Action,
            Self::ActionOn { .. } => EventType::ActionOn,
            Self::Showdown { .. } => EventType::Showdown,
            Self::PayingOut { .. } => EventType::PayingOut,
        }
    }
}

fn seats_repr<T: fmt::Display>(values: &[Option<T>]) -> String {
    values
        .iter()
        .enumerate()
        .filter_map(|(seat, value)| Some(format!("{seat}: {}", value.as_ref()?)))
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::PlayerAdded(player) => format!("{player} sat down"),
            Self::PlayerRemoved(player) => format!("{} left the table", player.name),
            Self::WaitingForStart => "waiting for the game to start".to_string(),
            Self::HandStarted(players) => format!("new hand: {}", seats_repr(players)),
            Self::Ante { amount, seats } => format!("${amount} ante from seats {seats:?}"),
            Self::HoleCardsDealt(hole_cards) => {
                format!("hole cards dealt: {}", seats_repr(hole_cards))
            }
            Self::FlopDealt(flop) => format!("flop: {flop}"),
            Self::TurnDealt(card) => format!("turn: {card}"),
            Self::RiverDealt(card) => format!("river: {card}"),
            Self::Action(action) => action.to_string(),
            Self::ActionOn { seat, allowed } => format!("action on seat {seat}: {allowed}"),
            Self::Showdown { ranks, winners } => {
                let ranks = ranks
                    .iter()
                    .enumerate()
                    .filter(|(_, rank)| **rank != HandRank::NoHand)
                    .map(|(seat, rank)| format!("{seat}: {rank}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("showdown ({ranks}), winners {winners:?}")
            }
            Self::PayingOut { pot_winnings, .. } => {
                format!("paying out: {}", seats_repr(pot_winnings))
            }
        };
        write!(f, "{repr}")
    }
}

/// Handle returned by `TableManager::subscribe`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ListenerId(pub(crate) u64);

/// Receives every event a table emits, after the operation that emitted it
/// has completed.
pub trait EventListener: Send {
    fn notify(&mut self, event: &Event);
}

impl<F> EventListener for F
where
    F: FnMut(&Event) + Send,
{
    fn notify(&mut self, event: &Event) {
        self(event);
    }
}

/// Keeps a copy of every event. Clones share the same log, so a test can
/// hand one clone to the table and read from the other.
#[derive(Clone, Debug, Default)]
pub struct RecordingListener {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingListener {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn event_types(&self) -> Vec<EventType> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(Event::event_type)
            .collect()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl EventListener for RecordingListener {
    fn notify(&mut self, event: &Event) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

/// Forwards events to the `log` facade at info level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogListener;

impl EventListener for LogListener {
    fn notify(&mut self, event: &Event) {
        info!("{event}");
    }
}
