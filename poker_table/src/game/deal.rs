//! One hand from ante to payout.

use log::{debug, info};
use std::{fmt, sync::Arc};

use super::{
    betting::{ActionError, BettingRound, RoundStatus},
    config::Configuration,
    constants::HOLE_CARDS,
    entities::{
        Action, AllowedActions, Card, CardSet, CardSource, Chips, DeckError, HandPlayer,
        HandRank, SeatIndex, Street,
    },
    functional::{self, EvalError},
};

/// Per-hand state. Owned by the table and replaced by a fresh deal each hand.
pub struct Deal {
    config: Arc<Configuration>,
    pub board: CardSet,
    pub pot: Chips,
    pub button: SeatIndex,
    /// Indexed by seat; `None` for seats that weren't dealt in.
    pub players: Vec<Option<HandPlayer>>,
    pub round: Option<BettingRound>,
    /// Populated at showdown.
    pub ranks: Option<Vec<HandRank>>,
    pub winners: Option<Vec<SeatIndex>>,
    /// Populated at payout.
    pub pot_winnings: Option<Vec<Option<Chips>>>,
    pub net_profit: Option<Vec<Option<Chips>>>,
    hole_cards_dealt: bool,
    deck: Box<dyn CardSource>,
}

impl fmt::Debug for Deal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deal")
            .field("board", &self.board)
            .field("pot", &self.pot)
            .field("button", &self.button)
            .field("players", &self.players)
            .field("round", &self.round)
            .field("ranks", &self.ranks)
            .field("winners", &self.winners)
            .finish_non_exhaustive()
    }
}

impl Deal {
    #[must_use]
    pub fn new(
        config: Arc<Configuration>,
        button: SeatIndex,
        players: Vec<Option<HandPlayer>>,
        deck: Box<dyn CardSource>,
    ) -> Self {
        Self {
            config,
            board: CardSet::new(),
            pot: 0,
            button,
            players,
            round: None,
            ranks: None,
            winners: None,
            pot_winnings: None,
            net_profit: None,
            hole_cards_dealt: false,
            deck,
        }
    }

    /// Take the ante from every seat dealt in. Returns the contributing
    /// seats, or `None` when the table has no ante.
    pub fn collect_ante(&mut self) -> Option<Vec<SeatIndex>> {
        let ante = self.config.ante;
        if ante == 0 {
            return None;
        }
        let mut seats = Vec::new();
        for player in self.players.iter_mut().flatten() {
            player.stack -= ante;
            self.pot += ante;
            seats.push(player.seat);
        }
        debug!("collected ${ante} ante from {} seats", seats.len());
        Some(seats)
    }

    /// Deal two cards to each seat in ascending seat order and open pre-flop
    /// betting. Returns everyone's hole cards and any posted blinds.
    pub fn deal_hole_cards(&mut self) -> Result<(Vec<Option<CardSet>>, Vec<Action>), DeckError> {
        let num_dealt = self.players.iter().flatten().filter(|p| !p.has_left).count();
        let cards = self.deck.deal(num_dealt * HOLE_CARDS)?;
        let mut hands = cards.chunks(HOLE_CARDS);
        for player in self.players.iter_mut().flatten() {
            if player.has_left {
                continue;
            }
            let hand = hands.next().unwrap_or_default();
            player.hole_cards = Some(CardSet::from_cards(hand.iter().copied())?);
        }
        self.hole_cards_dealt = true;
        let hole_cards = self
            .players
            .iter()
            .map(|player| player.as_ref().and_then(|p| p.hole_cards.clone()))
            .collect();
        let blinds = self.open_round(Street::PreFlop);
        Ok((hole_cards, blinds))
    }

    pub fn deal_flop(&mut self) -> Result<CardSet, DeckError> {
        let flop = CardSet::from_cards(self.deck.deal(3)?)?;
        for &card in &flop {
            self.board.push(card)?;
        }
        self.open_round(Street::Flop);
        Ok(flop)
    }

    pub fn deal_turn(&mut self) -> Result<Card, DeckError> {
        self.deal_street(Street::Turn)
    }

    pub fn deal_river(&mut self) -> Result<Card, DeckError> {
        self.deal_street(Street::River)
    }

    fn deal_street(&mut self, street: Street) -> Result<Card, DeckError> {
        let card = self.deck.deal(1)?.pop().ok_or(DeckError::OutOfCards {
            requested: 1,
            remaining: 0,
        })?;
        self.board.push(card)?;
        self.open_round(street);
        Ok(card)
    }

    fn open_round(&mut self, street: Street) -> Vec<Action> {
        match BettingRound::open(&self.config, street, self.button, &mut self.players) {
            Some((round, blinds)) => {
                self.round = Some(round);
                blinds
            }
            None => Vec::new(),
        }
    }

    #[must_use]
    pub fn is_betting(&self) -> bool {
        self.round.is_some()
    }

    /// Seat on turn and what it may do, while a round is open.
    #[must_use]
    pub fn action_on(&self) -> Option<(SeatIndex, AllowedActions)> {
        self.round.as_ref().map(|round| {
            let allowed = round.allowed_actions(&self.players);
            (round.action_on, allowed)
        })
    }

    /// Apply an action to the open round. A closed round is swept into the
    /// pot and dropped.
    pub fn act(&mut self, action: Action) -> Result<RoundStatus, ActionError> {
        let round = self.round.as_mut().ok_or(ActionError::NoRound)?;
        let status = round.apply(action, &mut self.players)?;
        if status == RoundStatus::Closed {
            self.close_round();
        }
        Ok(status)
    }

    fn close_round(&mut self) {
        let swept = BettingRound::sweep(&mut self.players);
        self.pot += swept;
        if let Some(round) = self.round.take() {
            debug!(
                "{} betting closed, ${swept} into the pot (${})",
                round.street, self.pot
            );
        }
    }

    /// Seats still contesting the pot: live hands, or every seat that hasn't
    /// left if hole cards aren't out yet.
    fn contenders(&self) -> impl Iterator<Item = &HandPlayer> {
        let dealt = self.hole_cards_dealt;
        self.players
            .iter()
            .flatten()
            .filter(move |p| !p.has_left && (p.is_live() || !dealt))
    }

    /// Take `seat` out of the deal for good and return the stack they leave
    /// with, or `None` if the seat wasn't dealt in.
    ///
    /// Before showdown the hand is folded and anything already committed
    /// stays in the pot. If nobody else is contesting the pot, it goes with
    /// them. After showdown they leave with their share of the pot, and
    /// once the deal is paid out their stack is already final.
    pub fn fold_out(&mut self, seat: SeatIndex) -> Option<Chips> {
        let player = self.players.get(seat)?.as_ref()?;
        if player.has_left || self.net_profit.is_some() {
            return Some(player.stack);
        }

        let winnings = self.winners.is_some().then(|| self.split_pot()[seat]);
        let last_contender = {
            let mut contenders = self.contenders().map(|p| p.seat);
            contenders.next() == Some(seat) && contenders.next().is_none()
        };
        let player = self.players.get_mut(seat)?.as_mut()?;
        player.has_left = true;

        if let Some(won) = winnings {
            player.stack += won;
            debug!("{} leaves after showdown with ${won}", player.name);
            return Some(player.stack);
        }

        let was_live = player.is_live();
        player.fold();
        if last_contender {
            player.stack += self.pot;
            debug!("{} leaves uncontested with ${}", player.name, self.pot);
            self.pot = 0;
        }
        let stack = player.stack;
        if was_live {
            let status = self
                .round
                .as_mut()
                .map(|round| round.fold_out(seat, &mut self.players));
            if status == Some(RoundStatus::Closed) {
                self.close_round();
            }
        }
        Some(stack)
    }

    /// Rank every seat against the board and pick the winners.
    pub fn showdown(&mut self) -> Result<(), EvalError> {
        let ranks = self
            .players
            .iter()
            .map(|player| match player.as_ref().and_then(|p| p.hole_cards.as_ref()) {
                Some(hole_cards) => functional::eval(hole_cards.combine(&self.board).cards()),
                None => Ok(HandRank::NoHand),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let winners = functional::argmax(&ranks);
        info!("showdown winners: {winners:?}");
        self.ranks = Some(ranks);
        self.winners = Some(winners);
        Ok(())
    }

    /// Each seat's share of the pot. The odd chips go to the first winner
    /// clockwise from the seat after the button.
    fn split_pot(&self) -> Vec<Chips> {
        let winners = self.winners.as_deref().unwrap_or_default();
        let mut winnings: Vec<Chips> = vec![0; self.players.len()];
        let num_winners = Chips::try_from(winners.len()).unwrap_or(0);
        if num_winners == 0 {
            return winnings;
        }
        let share = self.pot / num_winners;
        for &seat in winners {
            winnings[seat] = share;
        }
        let num_seats = self.players.len();
        let odd_chip_seat = (1..=num_seats)
            .map(|offset| (self.button + offset) % num_seats)
            .find(|seat| winners.contains(seat));
        if let Some(seat) = odd_chip_seat {
            winnings[seat] += self.pot % num_winners;
        }
        winnings
    }

    /// Split the pot between the winners. Players who left after showdown
    /// were paid when they left.
    pub fn payout(&mut self) {
        let winnings = self.split_pot();
        self.pot -= winnings.iter().sum::<Chips>();

        for (player, &won) in self.players.iter_mut().zip(&winnings) {
            if let Some(player) = player.as_mut().filter(|p| !p.has_left) {
                player.stack += won;
            }
        }
        self.pot_winnings = Some(
            self.players
                .iter()
                .zip(winnings)
                .map(|(player, won)| player.as_ref().map(|_| won))
                .collect(),
        );
        self.net_profit = Some(
            self.players
                .iter()
                .map(|player| player.as_ref().map(HandPlayer::net_profit))
                .collect(),
        );
    }

    #[must_use]
    pub fn config(&self) -> &Configuration {
        &self.config
    }
}
