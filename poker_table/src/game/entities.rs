use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashSet},
    fmt::{self},
    str::FromStr,
};
use thiserror::Error;

use super::constants::{DECK_SIZE, HOLE_CARDS};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Diamond,
    Heart,
    Spade,
}

impl Suit {
    /// Suits in deck order. A card's index is `suit * 13 + (value - 2)`.
    pub const ALL: [Suit; 4] = [Self::Club, Self::Diamond, Self::Heart, Self::Spade];

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "c",
            Self::Diamond => "d",
            Self::Heart => "h",
            Self::Spade => "s",
        };
        write!(f, "{repr}")
    }
}

impl TryFrom<char> for Suit {
    type Error = ParseCardError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'c' => Ok(Self::Club),
            'd' => Ok(Self::Diamond),
            'h' => Ok(Self::Heart),
            's' => Ok(Self::Spade),
            other => Err(ParseCardError::BadSuit(other)),
        }
    }
}

/// Placeholder for card values (2..=14, jack=11 ... ace=14).
pub type Value = u8;

pub const MIN_VALUE: Value = 2;
pub const ACE: Value = 14;

/// Errors from reading card notation.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum ParseCardError {
    #[error("bad card string: {0:?}")]
    BadLength(String),
    #[error("bad card value: {0:?}")]
    BadValue(char),
    #[error("bad card suit: {0:?}")]
    BadSuit(char),
    #[error("duplicate card: {0}")]
    Duplicate(Card),
}

/// A card is a tuple of a uInt8 value (two=2u8 ... ace=14u8) and a suit.
///
/// The fields are public, so nothing stops a caller from building a card
/// with a value outside `2..=14`. Such a card has no deck index and
/// `functional::eval` rejects it; use `Card::from_index` or parse card
/// notation to get a card that is known to be valid.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl Card {
    /// Card at position `idx` of an unshuffled deck.
    #[must_use]
    pub fn from_index(idx: usize) -> Option<Self> {
        if idx >= DECK_SIZE {
            return None;
        }
        let value = (idx % 13) as Value + MIN_VALUE;
        Some(Self(value, Suit::ALL[idx / 13]))
    }

    /// Whether the value is in `2..=14`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (MIN_VALUE..=ACE).contains(&self.0)
    }

    /// Position in an unshuffled deck. Only meaningful for valid cards.
    #[must_use]
    pub fn index(&self) -> usize {
        self.1.index() * 13 + usize::from(self.0 - MIN_VALUE)
    }

    #[must_use]
    pub fn value(&self) -> Value {
        self.0
    }

    #[must_use]
    pub fn suit(&self) -> Suit {
        self.1
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self.0 {
            10 => 'T',
            11 => 'J',
            12 => 'Q',
            13 => 'K',
            14 => 'A',
            v => char::from(b'0' + v),
        };
        write!(f, "{value}{}", self.1)
    }
}

impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(value), Some(suit), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(ParseCardError::BadLength(s.to_string()));
        };
        let value = match value {
            '2'..='9' => value as Value - b'0',
            'T' => 10,
            'J' => 11,
            'Q' => 12,
            'K' => 13,
            'A' => 14,
            other => return Err(ParseCardError::BadValue(other)),
        };
        Ok(Self(value, Suit::try_from(suit)?))
    }
}

/// An ordered run of distinct cards: a board, a player's hole cards, or the
/// two of them combined.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct CardSet(Vec<Card>);

impl CardSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards<I>(cards: I) -> Result<Self, ParseCardError>
    where
        I: IntoIterator<Item = Card>,
    {
        let mut set = Self::new();
        for card in cards {
            set.push(card)?;
        }
        Ok(set)
    }

    pub fn push(&mut self, card: Card) -> Result<(), ParseCardError> {
        if self.0.contains(&card) {
            return Err(ParseCardError::Duplicate(card));
        }
        self.0.push(card);
        Ok(())
    }

    /// Both sets in order, as a new set. Neither source is touched.
    #[must_use]
    pub fn combine(&self, other: &CardSet) -> CardSet {
        let mut cards = Vec::with_capacity(self.len() + other.len());
        cards.extend_from_slice(&self.0);
        cards.extend_from_slice(&other.0);
        CardSet(cards)
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Card> {
        self.0.iter()
    }
}

impl fmt::Display for CardSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = self
            .0
            .iter()
            .map(Card::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "{repr}")
    }
}

impl FromStr for CardSet {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cards = s
            .split_whitespace()
            .map(Card::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_cards(cards)
    }
}

impl<'a> IntoIterator for &'a CardSet {
    type Item = &'a Card;
    type IntoIter = std::slice::Iter<'a, Card>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum DeckError {
    #[error("out of cards: asked for {requested}, {remaining} left")]
    OutOfCards { requested: usize, remaining: usize },
    #[error("deck order must use each of the 52 card indices exactly once")]
    BadOrder,
    #[error(transparent)]
    Parse(#[from] ParseCardError),
}

/// Anything the table can draw cards from.
pub trait CardSource: Send {
    /// Deal exactly `n` cards that haven't been dealt since the last shuffle.
    fn deal(&mut self, n: usize) -> Result<Vec<Card>, DeckError>;

    /// Put every card back and randomize the order.
    fn shuffle(&mut self);
}

#[derive(Debug)]
pub struct Deck {
    cards: [Card; DECK_SIZE],
    deck_idx: usize,
}

impl Deck {
    /// A deck that deals the card indices in `order`.
    pub fn from_order(order: &[usize]) -> Result<Self, DeckError> {
        let unique: HashSet<&usize> = order.iter().collect();
        if order.len() != DECK_SIZE || unique.len() != DECK_SIZE {
            return Err(DeckError::BadOrder);
        }
        let mut deck = Self::default();
        for (slot, &idx) in deck.cards.iter_mut().zip(order) {
            *slot = Card::from_index(idx).ok_or(DeckError::BadOrder)?;
        }
        Ok(deck)
    }

    /// A deck with the given cards on top (e.g. "Ks 2c As") followed by the
    /// rest of the deck in index order.
    pub fn from_top_cards(top_cards: &str) -> Result<Self, DeckError> {
        let top = CardSet::from_str(top_cards)?;
        let mut order: Vec<usize> = top.iter().map(Card::index).collect();
        let rest: Vec<usize> = (0..DECK_SIZE).filter(|idx| !order.contains(idx)).collect();
        order.extend(rest);
        Self::from_order(&order)
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        DECK_SIZE - self.deck_idx
    }

    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
        self.deck_idx = 0;
    }
}

impl CardSource for Deck {
    fn deal(&mut self, n: usize) -> Result<Vec<Card>, DeckError> {
        if n > self.remaining() {
            return Err(DeckError::OutOfCards {
                requested: n,
                remaining: self.remaining(),
            });
        }
        let cards = self.cards[self.deck_idx..self.deck_idx + n].to_vec();
        self.deck_idx += n;
        Ok(cards)
    }

    fn shuffle(&mut self) {
        self.shuffle_with(&mut rand::rng());
    }
}

impl Default for Deck {
    fn default() -> Self {
        let mut cards = [Card(MIN_VALUE, Suit::Club); DECK_SIZE];
        for (i, suit) in Suit::ALL.into_iter().enumerate() {
            for value in MIN_VALUE..=ACE {
                cards[13 * i + usize::from(value - MIN_VALUE)] = Card(value, suit);
            }
        }
        Self { cards, deck_idx: 0 }
    }
}

/// Type alias for whole chips. Signed so that per-deal profit and loss share
/// the stack's unit.
pub type Chips = i64;

/// Type alias for seat positions at the table.
pub type SeatIndex = usize;

/// A seated player. The stack only changes between deals.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Player {
    pub name: String,
    pub stack: Chips,
    pub seat: Option<SeatIndex>,
}

impl Player {
    #[must_use]
    pub fn new(name: impl Into<String>, stack: Chips) -> Self {
        Self {
            name: name.into(),
            stack,
            seat: None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.seat {
            Some(seat) => write!(f, "{} (${}, seat {seat})", self.name, self.stack),
            None => write!(f, "{} (${})", self.name, self.stack),
        }
    }
}

/// A player's state for the length of one deal.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct HandPlayer {
    pub name: String,
    pub seat: SeatIndex,
    pub starting_stack: Chips,
    pub stack: Chips,
    /// Present iff the player is still live in the deal.
    pub hole_cards: Option<CardSet>,
    /// Chips committed in the current betting round.
    pub outlay: Chips,
    /// Set once the player leaves the table. Their hand is folded and
    /// their stack already settled.
    #[serde(default)]
    pub has_left: bool,
}

impl HandPlayer {
    #[must_use]
    pub fn new(player: &Player, seat: SeatIndex) -> Self {
        Self {
            name: player.name.clone(),
            seat,
            starting_stack: player.stack,
            stack: player.stack,
            hole_cards: None,
            outlay: 0,
            has_left: false,
        }
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.hole_cards.is_some()
    }

    /// Move `amount` from the stack into the current round's outlay.
    pub fn commit(&mut self, amount: Chips) {
        self.stack -= amount;
        self.outlay += amount;
    }

    pub fn fold(&mut self) {
        self.hole_cards = None;
    }

    #[must_use]
    pub fn net_profit(&self) -> Chips {
        self.stack - self.starting_stack
    }
}

impl fmt::Display for HandPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.hole_cards {
            Some(cards) if cards.len() == HOLE_CARDS => cards.to_string(),
            Some(_) => "live".to_string(),
            None => "out".to_string(),
        };
        write!(
            f,
            "{} (${} of ${}, {state})",
            self.name, self.stack, self.starting_stack
        )
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Category {
    NoHand,
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::NoHand => "--",
            Self::HighCard => "hi",
            Self::OnePair => "1p",
            Self::TwoPair => "2p",
            Self::ThreeOfAKind => "3k",
            Self::Straight => "s8",
            Self::Flush => "fs",
            Self::FullHouse => "fh",
            Self::FourOfAKind => "4k",
            Self::StraightFlush => "sf",
        };
        write!(f, "{repr}")
    }
}

/// The strength of a best five-card hand.
///
/// Variants are declared weakest first and each carries exactly the values
/// that break ties within its category, most significant first, so the
/// derived ordering is the poker ordering. `NoHand` marks a seat that isn't
/// live at showdown.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum HandRank {
    NoHand,
    HighCard([Value; 5]),
    OnePair { pair: Value, kickers: [Value; 3] },
    TwoPair { high: Value, low: Value, kicker: Value },
    ThreeOfAKind { trips: Value, kickers: [Value; 2] },
    Straight { high: Value },
    Flush([Value; 5]),
    FullHouse { trips: Value, pair: Value },
    FourOfAKind { quads: Value, kicker: Value },
    StraightFlush { high: Value },
}

impl HandRank {
    #[must_use]
    pub fn category(&self) -> Category {
        match self {
            Self::NoHand => Category::NoHand,
            Self::HighCard(_) => Category::HighCard,
            Self::OnePair { .. } => Category::OnePair,
            Self::TwoPair { .. } => Category::TwoPair,
            Self::ThreeOfAKind { .. } => Category::ThreeOfAKind,
            Self::Straight { .. } => Category::Straight,
            Self::Flush(_) => Category::Flush,
            Self::FullHouse { .. } => Category::FullHouse,
            Self::FourOfAKind { .. } => Category::FourOfAKind,
            Self::StraightFlush { .. } => Category::StraightFlush,
        }
    }

    /// Tie-break values, most significant first.
    #[must_use]
    pub fn tie_break(&self) -> Vec<Value> {
        match *self {
            Self::NoHand => vec![],
            Self::HighCard(values) | Self::Flush(values) => values.to_vec(),
            Self::OnePair { pair, kickers } => {
                let mut values = vec![pair];
                values.extend(kickers);
                values
            }
            Self::TwoPair { high, low, kicker } => vec![high, low, kicker],
            Self::ThreeOfAKind { trips, kickers } => {
                let mut values = vec![trips];
                values.extend(kickers);
                values
            }
            Self::Straight { high } | Self::StraightFlush { high } => vec![high],
            Self::FullHouse { trips, pair } => vec![trips, pair],
            Self::FourOfAKind { quads, kicker } => vec![quads, kicker],
        }
    }
}

impl fmt::Display for HandRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.category())?;
        for value in self.tie_break() {
            write!(f, ", {value}")?;
        }
        write!(f, "]")
    }
}

/// Betting rounds in deal order.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Street {
    PreFlop,
    Flop,
    Turn,
    River,
}

impl Street {
    /// Which of the configured limit sizes applies on this street.
    #[must_use]
    pub fn limit_idx(&self) -> usize {
        match self {
            Self::PreFlop | Self::Flop => 0,
            Self::Turn | Self::River => 1,
        }
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::PreFlop => "pre-flop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum ActionType {
    Check,
    Bet,
    Call,
    Raise,
    Fold,
    BlindBet,
}

impl ActionType {
    #[must_use]
    pub fn takes_amount(&self) -> bool {
        matches!(self, Self::Bet | Self::Raise | Self::BlindBet)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Check => "check",
            Self::Bet => "bet",
            Self::Call => "call",
            Self::Raise => "raise",
            Self::Fold => "fold",
            Self::BlindBet => "blind",
        };
        write!(f, "{repr}")
    }
}

/// What a seat does on its turn. Amounts only exist where the action needs
/// one.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum ActionKind {
    Check,
    Bet(Chips),
    Call,
    /// Raise by this much on top of calling.
    Raise(Chips),
    Fold,
    BlindBet(Chips),
}

#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum MalformedAction {
    #[error("{0} needs an amount")]
    MissingAmount(ActionType),
    #[error("{0} can't take an amount")]
    UnexpectedAmount(ActionType),
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Action {
    pub seat: SeatIndex,
    pub kind: ActionKind,
}

impl Action {
    /// Assemble an action from loose parts, rejecting an amount that doesn't
    /// fit the action type.
    pub fn new(
        seat: SeatIndex,
        action_type: ActionType,
        amount: Option<Chips>,
    ) -> Result<Self, MalformedAction> {
        let kind = match (action_type, amount) {
            (ActionType::Check, None) => ActionKind::Check,
            (ActionType::Call, None) => ActionKind::Call,
            (ActionType::Fold, None) => ActionKind::Fold,
            (ActionType::Bet, Some(amount)) => ActionKind::Bet(amount),
            (ActionType::Raise, Some(amount)) => ActionKind::Raise(amount),
            (ActionType::BlindBet, Some(amount)) => ActionKind::BlindBet(amount),
            (action_type, None) => return Err(MalformedAction::MissingAmount(action_type)),
            (action_type, Some(_)) => return Err(MalformedAction::UnexpectedAmount(action_type)),
        };
        Ok(Self { seat, kind })
    }

    #[must_use]
    pub fn check(seat: SeatIndex) -> Self {
        Self {
            seat,
            kind: ActionKind::Check,
        }
    }

    #[must_use]
    pub fn bet(seat: SeatIndex, amount: Chips) -> Self {
        Self {
            seat,
            kind: ActionKind::Bet(amount),
        }
    }

    #[must_use]
    pub fn call(seat: SeatIndex) -> Self {
        Self {
            seat,
            kind: ActionKind::Call,
        }
    }

    #[must_use]
    pub fn raise(seat: SeatIndex, amount: Chips) -> Self {
        Self {
            seat,
            kind: ActionKind::Raise(amount),
        }
    }

    #[must_use]
    pub fn fold(seat: SeatIndex) -> Self {
        Self {
            seat,
            kind: ActionKind::Fold,
        }
    }

    #[must_use]
    pub fn blind_bet(seat: SeatIndex, amount: Chips) -> Self {
        Self {
            seat,
            kind: ActionKind::BlindBet(amount),
        }
    }

    #[must_use]
    pub fn action_type(&self) -> ActionType {
        match self.kind {
            ActionKind::Check => ActionType::Check,
            ActionKind::Bet(_) => ActionType::Bet,
            ActionKind::Call => ActionType::Call,
            ActionKind::Raise(_) => ActionType::Raise,
            ActionKind::Fold => ActionType::Fold,
            ActionKind::BlindBet(_) => ActionType::BlindBet,
        }
    }

    #[must_use]
    pub fn amount(&self) -> Option<Chips> {
        match self.kind {
            ActionKind::Bet(amount) | ActionKind::Raise(amount) | ActionKind::BlindBet(amount) => {
                Some(amount)
            }
            ActionKind::Check | ActionKind::Call | ActionKind::Fold => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let seat = self.seat;
        match self.kind {
            ActionKind::Check => write!(f, "seat {seat} checks"),
            ActionKind::Bet(amount) => write!(f, "seat {seat} bets ${amount}"),
            ActionKind::Call => write!(f, "seat {seat} calls"),
            ActionKind::Raise(amount) => write!(f, "seat {seat} raises ${amount}"),
            ActionKind::Fold => write!(f, "seat {seat} folds"),
            ActionKind::BlindBet(amount) => write!(f, "seat {seat} posts a ${amount} blind"),
        }
    }
}

/// Inclusive range of chips an action moves from the actor's stack.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct AmountRange {
    pub min: Chips,
    pub max: Chips,
}

impl AmountRange {
    #[must_use]
    pub const fn exactly(amount: Chips) -> Self {
        Self {
            min: amount,
            max: amount,
        }
    }

    #[must_use]
    pub fn contains(&self, amount: Chips) -> bool {
        (self.min..=self.max).contains(&amount)
    }

    /// The same range moved down by `offset`.
    #[must_use]
    pub fn less(&self, offset: Chips) -> Self {
        Self {
            min: self.min - offset,
            max: self.max - offset,
        }
    }
}

impl fmt::Display for AmountRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "${}", self.min)
        } else {
            write!(f, "${}..=${}", self.min, self.max)
        }
    }
}

/// Action types open to the seat on turn, each with the total chips it
/// would move (for a raise that's the call plus the raise).
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct AllowedActions(pub BTreeMap<ActionType, AmountRange>);

impl AllowedActions {
    #[must_use]
    pub fn get(&self, action_type: ActionType) -> Option<&AmountRange> {
        self.0.get(&action_type)
    }

    #[must_use]
    pub fn contains(&self, action_type: ActionType) -> bool {
        self.0.contains_key(&action_type)
    }

    pub fn action_types(&self) -> impl Iterator<Item = ActionType> + '_ {
        self.0.keys().copied()
    }
}

impl fmt::Display for AllowedActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let num_options = self.0.len();
        let repr = self
            .0
            .iter()
            .enumerate()
            .map(|(i, (action_type, range))| {
                let repr = match action_type {
                    ActionType::Check | ActionType::Fold => action_type.to_string(),
                    _ => format!("{action_type} ({range})"),
                };
                match i {
                    0 if num_options <= 2 => repr,
                    i if i == num_options - 1 => format!(" or {repr}"),
                    0 => repr,
                    _ => format!(", {repr}"),
                }
            })
            .collect::<String>();
        write!(f, "{repr}")
    }
}

impl<I> From<I> for AllowedActions
where
    I: IntoIterator<Item = (ActionType, AmountRange)>,
{
    fn from(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
