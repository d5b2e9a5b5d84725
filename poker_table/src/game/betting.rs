//! A single betting round.
//!
//! The round never owns player state. The deal lends it the per-seat
//! players for each call so there's exactly one copy of every stack and
//! outlay.

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    config::Configuration,
    entities::{
        Action, ActionKind, ActionType, AllowedActions, AmountRange, Chips, HandPlayer, SeatIndex,
        Street,
    },
};

#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum ActionError {
    #[error("seat {seat} acted out of turn, action is on seat {action_on}")]
    OutOfTurn {
        seat: SeatIndex,
        action_on: SeatIndex,
    },
    #[error("can't {action_type} now, choose from {allowed}")]
    NotAllowed {
        action_type: ActionType,
        allowed: AllowedActions,
    },
    #[error("{action_type} of ${amount} is outside ${min}..=${max}")]
    Amount {
        action_type: ActionType,
        amount: Chips,
        min: Chips,
        max: Chips,
    },
    #[error("no betting round is active")]
    NoRound,
}

/// Whether the last applied action left the round open.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoundStatus {
    Open,
    Closed,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct BettingRound {
    pub street: Street,
    pub action_on: SeatIndex,
    /// Every action applied this round, blinds included.
    pub actions: Vec<Action>,
    bet_size: Chips,
}

fn next_live_seat(players: &[Option<HandPlayer>], from: SeatIndex) -> Option<SeatIndex> {
    let num_seats = players.len();
    (1..=num_seats)
        .map(|offset| (from + offset) % num_seats)
        .find(|&seat| players[seat].as_ref().is_some_and(HandPlayer::is_live))
}

fn live_players(players: &[Option<HandPlayer>]) -> impl Iterator<Item = &HandPlayer> {
    players.iter().flatten().filter(|player| player.is_live())
}

fn max_outlay(players: &[Option<HandPlayer>]) -> Chips {
    players
        .iter()
        .flatten()
        .map(|player| player.outlay)
        .max()
        .unwrap_or(0)
}

impl BettingRound {
    /// Open a round on `street` with action on the first live seat
    /// clockwise of the button. Tables without betting and deals with fewer
    /// than two live seats don't get a round.
    ///
    /// Pre-flop, the configured blinds are posted straight away; the posted
    /// blinds are returned alongside the round.
    pub fn open(
        config: &Configuration,
        street: Street,
        button: SeatIndex,
        players: &mut [Option<HandPlayer>],
    ) -> Option<(Self, Vec<Action>)> {
        if !config.has_betting() || live_players(players).count() < 2 {
            return None;
        }
        let action_on = next_live_seat(players, button)?;
        let mut round = Self {
            street,
            action_on,
            actions: Vec::new(),
            bet_size: config.limit_size(street),
        };
        debug!("{street} betting opens on seat {action_on}");

        let mut blinds = Vec::new();
        if street == Street::PreFlop {
            for &amount in &config.blinds {
                let blind = Action::blind_bet(round.action_on, amount);
                round.commit(blind, players);
                round.advance(players);
                blinds.push(blind);
            }
        }
        Some((round, blinds))
    }

    /// Actions open to the seat on turn, with the total chips each would
    /// move from its stack.
    #[must_use]
    pub fn allowed_actions(&self, players: &[Option<HandPlayer>]) -> AllowedActions {
        let table_bet = max_outlay(players);
        if table_bet == 0 {
            return AllowedActions::from([
                (ActionType::Check, AmountRange::exactly(0)),
                (ActionType::Bet, AmountRange::exactly(self.bet_size)),
            ]);
        }
        let call = self.call_amount(players);
        let raise = call + self.bet_size;
        AllowedActions::from([
            (ActionType::Call, AmountRange::exactly(call)),
            (ActionType::Raise, AmountRange::exactly(raise)),
            (ActionType::Fold, AmountRange::exactly(0)),
        ])
    }

    /// Check `action` against the current turn without touching anything.
    pub fn validate(
        &self,
        action: &Action,
        players: &[Option<HandPlayer>],
    ) -> Result<(), ActionError> {
        if action.seat != self.action_on {
            return Err(ActionError::OutOfTurn {
                seat: action.seat,
                action_on: self.action_on,
            });
        }

        let action_type = action.action_type();
        let allowed = self.allowed_actions(players);
        let Some(range) = allowed.get(action_type).copied() else {
            return Err(ActionError::NotAllowed {
                action_type,
                allowed,
            });
        };

        // Raise amounts are on top of the call; ranges are totals.
        let (amount, offset) = match action.kind {
            ActionKind::Bet(amount) => (amount, 0),
            ActionKind::Raise(amount) => (amount, self.call_amount(players)),
            _ => return Ok(()),
        };
        if !range.contains(amount + offset) {
            let range = range.less(offset);
            return Err(ActionError::Amount {
                action_type,
                amount,
                min: range.min,
                max: range.max,
            });
        }
        Ok(())
    }

    /// Validate and apply `action`, then pass the turn along.
    pub fn apply(
        &mut self,
        action: Action,
        players: &mut [Option<HandPlayer>],
    ) -> Result<RoundStatus, ActionError> {
        self.validate(&action, players)?;
        self.commit(action, players);
        Ok(self.advance(players))
    }

    /// Move every seat's outlay into a pot, folded seats included. Returns
    /// the chips moved.
    pub fn sweep(players: &mut [Option<HandPlayer>]) -> Chips {
        players
            .iter_mut()
            .flatten()
            .map(|player| std::mem::take(&mut player.outlay))
            .sum()
    }

    /// Fold `seat` out of the round whether or not it's their turn. The
    /// turn only moves on when it was theirs.
    pub fn fold_out(
        &mut self,
        seat: SeatIndex,
        players: &mut [Option<HandPlayer>],
    ) -> RoundStatus {
        self.commit(Action::fold(seat), players);
        if seat == self.action_on {
            return self.advance(players);
        }
        if live_players(players).count() < 2 {
            RoundStatus::Closed
        } else {
            RoundStatus::Open
        }
    }

    fn call_amount(&self, players: &[Option<HandPlayer>]) -> Chips {
        let outlay = players[self.action_on]
            .as_ref()
            .map_or(0, |player| player.outlay);
        max_outlay(players) - outlay
    }

    fn commit(&mut self, action: Action, players: &mut [Option<HandPlayer>]) {
        let call = self.call_amount(players);
        if let Some(player) = players[action.seat].as_mut() {
            match action.kind {
                ActionKind::Check => {}
                ActionKind::Bet(amount) | ActionKind::BlindBet(amount) => player.commit(amount),
                ActionKind::Call => player.commit(call),
                ActionKind::Raise(amount) => player.commit(call + amount),
                ActionKind::Fold => player.fold(),
            }
        }
        debug!("{action}");
        self.actions.push(action);
    }

    fn advance(&mut self, players: &[Option<HandPlayer>]) -> RoundStatus {
        if live_players(players).count() < 2 {
            return RoundStatus::Closed;
        }
        let Some(next) = next_live_seat(players, self.action_on) else {
            return RoundStatus::Closed;
        };
        self.action_on = next;

        let has_acted = self
            .actions
            .iter()
            .any(|action| action.seat == next && action.action_type() != ActionType::BlindBet);
        let table_bet = live_players(players)
            .map(|player| player.outlay)
            .max()
            .unwrap_or(0);
        let settled = live_players(players).all(|player| player.outlay == table_bet);
        if has_acted && settled {
            RoundStatus::Closed
        } else {
            RoundStatus::Open
        }
    }
}
