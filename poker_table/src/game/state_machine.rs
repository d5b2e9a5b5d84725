//! Table state machine.
//!
//! `TableManager` is the only entry point callers use. It owns the seats,
//! the button, the current deal and the listener registry, and it is the
//! only thing that emits events. Phase logic lives in `states`.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, fmt, sync::Arc};
use thiserror::Error;

use super::{
    betting::ActionError,
    config::{ConfigError, Configuration},
    constants::MIN_PLAYERS,
    deal::Deal,
    entities::{
        Action, AllowedActions, CardSource, Deck, DeckError, HandPlayer, Player, SeatIndex,
    },
    events::{Event, EventListener, ListenerId},
    functional::EvalError,
    states::{Phase, PreDeal, TablePhase, TableState},
};

/// Errors returned by table operations. A failed operation leaves the
/// table untouched.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum TableError {
    #[error("table is full")]
    GameFull,
    #[error("no player in seat {0}")]
    NoSuchPlayer(SeatIndex),
    #[error("can't start a game while {0}")]
    WrongState(TableState),
    #[error("need 2+ players")]
    NotEnoughPlayers,
    #[error("game hasn't started")]
    WaitingForStart,
    #[error("betting round is still open")]
    BettingActive,
    #[error("no betting round to act in while {0}")]
    ActionInWrongState(TableState),
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error(transparent)]
    Deck(#[from] DeckError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Builds the deck for each new deal.
pub type DeckFactory = Box<dyn FnMut() -> Box<dyn CardSource> + Send>;

fn shuffled_deck() -> Box<dyn CardSource> {
    let mut deck = Deck::default();
    deck.shuffle();
    Box::new(deck)
}

/// Seats, button and deal shared by every table phase.
pub struct TableData {
    config: Arc<Configuration>,
    players: Vec<Option<Player>>,
    button: Option<SeatIndex>,
    deal: Option<Deal>,
    deck_factory: DeckFactory,
    events: VecDeque<Event>,
}

impl fmt::Debug for TableData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableData")
            .field("config", &self.config)
            .field("players", &self.players)
            .field("button", &self.button)
            .field("deal", &self.deal)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl TableData {
    fn new(config: Configuration) -> Self {
        let max_seats = config.max_seats;
        Self {
            config: Arc::new(config),
            players: vec![None; max_seats],
            button: None,
            deal: None,
            deck_factory: Box::new(shuffled_deck),
            events: VecDeque::new(),
        }
    }

    pub(crate) fn emit(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub(crate) fn drain_events(&mut self) -> VecDeque<Event> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn num_players(&self) -> usize {
        self.players.iter().flatten().count()
    }

    /// Move the button clockwise to the next occupied seat. A table with no
    /// button yet starts the walk from the last seat.
    pub(crate) fn advance_button(&mut self) -> Result<SeatIndex, TableError> {
        if self.num_players() < MIN_PLAYERS {
            self.button = None;
            return Err(TableError::NotEnoughPlayers);
        }
        let num_seats = self.players.len();
        let start = self.button.unwrap_or(num_seats - 1);
        let button = (1..=num_seats)
            .map(|offset| (start + offset) % num_seats)
            .find(|&seat| self.players[seat].is_some())
            .ok_or(TableError::NotEnoughPlayers)?;
        self.button = Some(button);
        Ok(button)
    }

    /// Move the button, snapshot every seated player and collect the ante.
    pub(crate) fn begin_deal(&mut self) -> Result<(), TableError> {
        let button = self.advance_button()?;
        let hand_players: Vec<Option<HandPlayer>> = self
            .players
            .iter()
            .enumerate()
            .map(|(seat, player)| {
                player
                    .as_ref()
                    .map(|player| HandPlayer::new(player, seat))
            })
            .collect();
        let deck = (self.deck_factory)();
        let mut deal = Deal::new(Arc::clone(&self.config), button, hand_players.clone(), deck);
        info!(
            "new deal with {} players, button on seat {button}",
            self.num_players()
        );
        self.emit(Event::HandStarted(hand_players));
        if let Some(seats) = deal.collect_ante() {
            self.emit(Event::Ante {
                amount: self.config.ante,
                seats,
            });
        }
        self.deal = Some(deal);
        Ok(())
    }

    pub(crate) fn end_deal(&mut self) {
        self.deal = None;
    }

    pub(crate) fn deal_mut(&mut self, state: TableState) -> Result<&mut Deal, TableError> {
        self.deal.as_mut().ok_or(TableError::WrongState(state))
    }

    /// The current deal, provided no betting round is still open.
    pub(crate) fn settled_deal_mut(&mut self, state: TableState) -> Result<&mut Deal, TableError> {
        let deal = self.deal_mut(state)?;
        if deal.is_betting() {
            return Err(TableError::BettingActive);
        }
        Ok(deal)
    }

    /// Announce a freshly opened betting round: any posted blinds, then who
    /// is on turn.
    pub(crate) fn announce_round(&mut self, blinds: Vec<Action>) {
        let action_on = self.deal.as_ref().and_then(Deal::action_on);
        for blind in blinds {
            self.emit(Event::Action(blind));
        }
        if let Some((seat, allowed)) = action_on {
            self.emit(Event::ActionOn { seat, allowed });
        }
    }

    /// Copy final hand stacks back onto the seated players. Anyone who left
    /// mid-deal was settled on the way out.
    pub(crate) fn reconcile(&mut self) {
        let Some(deal) = self.deal.as_ref() else {
            return;
        };
        for hand_player in deal.players.iter().flatten().filter(|p| !p.has_left) {
            if let Some(player) = self.players[hand_player.seat].as_mut() {
                player.stack = hand_player.stack;
            }
        }
        info!("paid out a deal on button {}", deal.button);
    }
}

/// A poker table: seats, button rotation and a deal at a time.
pub struct TableManager {
    data: TableData,
    phase: TablePhase,
    listeners: Vec<(ListenerId, Box<dyn EventListener>)>,
    next_listener_id: u64,
}

impl fmt::Debug for TableManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableManager")
            .field("data", &self.data)
            .field("phase", &self.phase)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl TableManager {
    pub fn new(config: Configuration) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            data: TableData::new(config),
            phase: TablePhase::default(),
            listeners: Vec::new(),
            next_listener_id: 0,
        })
    }

    /// Replace the shuffled deck each deal gets with one from `factory`.
    #[must_use]
    pub fn with_deck_factory<F>(mut self, factory: F) -> Self
    where
        F: FnMut() -> Box<dyn CardSource> + Send + 'static,
    {
        self.data.deck_factory = Box::new(factory);
        self
    }

    pub fn subscribe<L>(&mut self, listener: L) -> ListenerId
    where
        L: EventListener + 'static,
    {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether `id` was subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let num_listeners = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != num_listeners
    }

    /// Seat `player` in the lowest empty seat.
    pub fn add_player(&mut self, mut player: Player) -> Result<SeatIndex, TableError> {
        let data = &mut self.data;
        let seat = data
            .players
            .iter()
            .position(Option::is_none)
            .ok_or(TableError::GameFull)?;
        player.seat = Some(seat);
        info!("{player} joined");
        data.emit(Event::PlayerAdded(player.clone()));
        data.players[seat] = Some(player);
        self.flush_events();
        Ok(seat)
    }

    /// Empty `seat`. A player dealt into the current hand folds out of it
    /// and leaves with the hand's stack; chips they already put in stay in
    /// the pot.
    pub fn remove_player(&mut self, seat: SeatIndex) -> Result<Player, TableError> {
        let data = &mut self.data;
        let mut player = data
            .players
            .get_mut(seat)
            .and_then(Option::take)
            .ok_or(TableError::NoSuchPlayer(seat))?;

        let mut folded = false;
        let mut action_on = None;
        if let Some(deal) = data.deal.as_mut() {
            let on_turn = deal.action_on().map(|(on_turn, _)| on_turn);
            let hand = deal.players[seat].as_ref();
            folded = deal.is_betting() && hand.is_some_and(HandPlayer::is_live);
            if let Some(stack) = deal.fold_out(seat) {
                player.stack = stack;
            }
            if on_turn == Some(seat) {
                action_on = deal.action_on();
            }
        }

        info!("{player} left");
        data.emit(Event::PlayerRemoved(player.clone()));
        if folded {
            data.emit(Event::Action(Action::fold(seat)));
        }
        if let Some((seat, allowed)) = action_on {
            data.emit(Event::ActionOn { seat, allowed });
        }
        self.flush_events();
        Ok(player)
    }

    /// Move the button and start the first deal.
    pub fn start_game(&mut self) -> Result<(), TableError> {
        let state = self.phase.state();
        if state != TableState::WaitingForStart {
            return Err(TableError::WrongState(state));
        }
        if self.data.num_players() < MIN_PLAYERS {
            return Err(TableError::NotEnoughPlayers);
        }
        info!("starting game with {} players", self.data.num_players());
        self.data.begin_deal()?;
        self.phase = PreDeal.into();
        self.flush_events();
        Ok(())
    }

    /// Advance to the next stage of the deal. Returns the new state.
    pub fn proceed(&mut self) -> Result<TableState, TableError> {
        let next = self.phase.proceed(&mut self.data)?;
        debug!("{} -> {}", self.phase.state(), next.state());
        self.phase = next;
        self.flush_events();
        Ok(self.phase.state())
    }

    /// Submit an action for the seat on turn.
    pub fn act(&mut self, action: Action) -> Result<(), TableError> {
        let state = self.phase.state();
        let deal = self
            .data
            .deal
            .as_mut()
            .filter(|deal| deal.is_betting())
            .ok_or(TableError::ActionInWrongState(state))?;
        deal.act(action)?;
        let action_on = deal.action_on();
        self.data.emit(Event::Action(action));
        if let Some((seat, allowed)) = action_on {
            self.data.emit(Event::ActionOn { seat, allowed });
        }
        self.flush_events();
        Ok(())
    }

    fn flush_events(&mut self) {
        for event in self.data.drain_events() {
            for (_, listener) in &mut self.listeners {
                listener.notify(&event);
            }
        }
    }

    #[must_use]
    pub fn state(&self) -> TableState {
        self.phase.state()
    }

    #[must_use]
    pub fn button(&self) -> Option<SeatIndex> {
        self.data.button
    }

    #[must_use]
    pub fn players(&self) -> &[Option<Player>] {
        &self.data.players
    }

    #[must_use]
    pub fn player(&self, seat: SeatIndex) -> Option<&Player> {
        self.data.players.get(seat).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn num_players(&self) -> usize {
        self.data.num_players()
    }

    #[must_use]
    pub fn current_deal(&self) -> Option<&Deal> {
        self.data.deal.as_ref()
    }

    /// Seat on turn and its options, while a betting round is open.
    #[must_use]
    pub fn allowed_actions(&self) -> Option<(SeatIndex, AllowedActions)> {
        self.data.deal.as_ref().and_then(Deal::action_on)
    }

    #[must_use]
    pub fn config(&self) -> &Configuration {
        &self.data.config
    }
}
