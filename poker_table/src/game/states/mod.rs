//! Table phases for the table FSM.
//!
//! Each phase knows how to advance the table to the next one. Phases carry
//! no data of their own; everything lives in `TableData`.

use enum_dispatch::enum_dispatch;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    constants::MIN_PLAYERS,
    events::Event,
    state_machine::{TableData, TableError},
};

/// The table state reported to callers and carried in state errors.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum TableState {
    WaitingForStart,
    PreDeal,
    HoleCardsDealt,
    FlopDealt,
    TurnDealt,
    RiverDealt,
    Showdown,
    PayingOut,
}

impl fmt::Display for TableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::WaitingForStart => "waiting for start",
            Self::PreDeal => "pre-deal",
            Self::HoleCardsDealt => "hole cards dealt",
            Self::FlopDealt => "flop dealt",
            Self::TurnDealt => "turn dealt",
            Self::RiverDealt => "river dealt",
            Self::Showdown => "showdown",
            Self::PayingOut => "paying out",
        };
        write!(f, "{repr}")
    }
}

#[enum_dispatch]
pub trait Phase {
    fn state(&self) -> TableState;

    /// Advance to the next phase. Nothing is touched on error.
    fn proceed(&self, data: &mut TableData) -> Result<TablePhase, TableError>;
}

/// No deal in progress
#[derive(Debug, Default)]
pub struct WaitingForStart;

/// Deal created, ante collected
#[derive(Debug)]
pub struct PreDeal;

/// Two cards out to every seat, pre-flop betting
#[derive(Debug)]
pub struct HoleCardsDealt;

#[derive(Debug)]
pub struct FlopDealt;

#[derive(Debug)]
pub struct TurnDealt;

#[derive(Debug)]
pub struct RiverDealt;

/// Hands ranked, winners known
#[derive(Debug)]
pub struct Showdown;

/// Pot distributed and stacks settled
#[derive(Debug)]
pub struct PayingOut;

#[enum_dispatch(Phase)]
#[derive(Debug)]
pub enum TablePhase {
    WaitingForStart,
    PreDeal,
    HoleCardsDealt,
    FlopDealt,
    TurnDealt,
    RiverDealt,
    Showdown,
    PayingOut,
}

impl Default for TablePhase {
    fn default() -> Self {
        WaitingForStart.into()
    }
}

impl Phase for WaitingForStart {
    fn state(&self) -> TableState {
        TableState::WaitingForStart
    }

    fn proceed(&self, _data: &mut TableData) -> Result<TablePhase, TableError> {
        Err(TableError::WaitingForStart)
    }
}

impl Phase for PreDeal {
    fn state(&self) -> TableState {
        TableState::PreDeal
    }

    fn proceed(&self, data: &mut TableData) -> Result<TablePhase, TableError> {
        let deal = data.deal_mut(self.state())?;
        let (hole_cards, blinds) = deal.deal_hole_cards()?;
        debug!("hole cards dealt");
        data.emit(Event::HoleCardsDealt(hole_cards));
        data.announce_round(blinds);
        Ok(HoleCardsDealt.into())
    }
}

impl Phase for HoleCardsDealt {
    fn state(&self) -> TableState {
        TableState::HoleCardsDealt
    }

    fn proceed(&self, data: &mut TableData) -> Result<TablePhase, TableError> {
        let deal = data.settled_deal_mut(self.state())?;
        let flop = deal.deal_flop()?;
        debug!("flop: {flop}");
        data.emit(Event::FlopDealt(flop));
        data.announce_round(vec![]);
        Ok(FlopDealt.into())
    }
}

impl Phase for FlopDealt {
    fn state(&self) -> TableState {
        TableState::FlopDealt
    }

    fn proceed(&self, data: &mut TableData) -> Result<TablePhase, TableError> {
        let deal = data.settled_deal_mut(self.state())?;
        let card = deal.deal_turn()?;
        debug!("turn: {card}");
        data.emit(Event::TurnDealt(card));
        data.announce_round(vec![]);
        Ok(TurnDealt.into())
    }
}

impl Phase for TurnDealt {
    fn state(&self) -> TableState {
        TableState::TurnDealt
    }

    fn proceed(&self, data: &mut TableData) -> Result<TablePhase, TableError> {
        let deal = data.settled_deal_mut(self.state())?;
        let card = deal.deal_river()?;
        debug!("river: {card}");
        data.emit(Event::RiverDealt(card));
        data.announce_round(vec![]);
        Ok(RiverDealt.into())
    }
}

impl Phase for RiverDealt {
    fn state(&self) -> TableState {
        TableState::RiverDealt
    }

    fn proceed(&self, data: &mut TableData) -> Result<TablePhase, TableError> {
        let deal = data.settled_deal_mut(self.state())?;
        deal.showdown()?;
        let event = Event::Showdown {
            ranks: deal.ranks.clone().unwrap_or_default(),
            winners: deal.winners.clone().unwrap_or_default(),
        };
        data.emit(event);
        Ok(Showdown.into())
    }
}

impl Phase for Showdown {
    fn state(&self) -> TableState {
        TableState::Showdown
    }

    fn proceed(&self, data: &mut TableData) -> Result<TablePhase, TableError> {
        let deal = data.deal_mut(self.state())?;
        deal.payout();
        let event = Event::PayingOut {
            net_profit: deal.net_profit.clone().unwrap_or_default(),
            pot_winnings: deal.pot_winnings.clone().unwrap_or_default(),
        };
        data.reconcile();
        data.emit(event);
        Ok(PayingOut.into())
    }
}

impl Phase for PayingOut {
    fn state(&self) -> TableState {
        TableState::PayingOut
    }

    fn proceed(&self, data: &mut TableData) -> Result<TablePhase, TableError> {
        if data.num_players() >= MIN_PLAYERS {
            data.begin_deal()?;
            return Ok(PreDeal.into());
        }
        info!(
            "{} player(s) left, waiting for the game to start",
            data.num_players()
        );
        data.end_deal();
        data.emit(Event::WaitingForStart);
        Ok(WaitingForStart.into())
    }
}
