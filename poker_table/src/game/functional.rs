//! Hand evaluation.
//!
//! Everything here is a pure function of the cards passed in.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    constants::HAND_SIZE,
    entities::{ACE, Card, HandRank, MIN_VALUE, Suit, Value},
};

#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum EvalError {
    #[error("need at least 5 cards to rank a hand, got {0}")]
    TooFewCards(usize),
    #[error("card value out of range: {0:?}")]
    InvalidCard(Card),
}

/// Rank the best five-card hand that can be made from `cards`.
///
/// Hands bigger than five cards are ranked by brute force over every
/// five-card subset (21 of them for seven cards).
pub fn eval(cards: &[Card]) -> Result<HandRank, EvalError> {
    if cards.len() < HAND_SIZE {
        return Err(EvalError::TooFewCards(cards.len()));
    }
    if let Some(&card) = cards.iter().find(|card| !card.is_valid()) {
        return Err(EvalError::InvalidCard(card));
    }
    let best = five_card_subsets(cards.len())
        .into_iter()
        .map(|subset| eval_five(&subset.map(|idx| cards[idx])))
        .max()
        .unwrap_or(HandRank::NoHand);
    Ok(best)
}

/// Indices of every hand that ties for the best rank. A table where nobody
/// has a hand has no winners.
#[must_use]
pub fn argmax(ranks: &[HandRank]) -> Vec<usize> {
    let Some(best) = ranks.iter().max() else {
        return vec![];
    };
    if *best == HandRank::NoHand {
        return vec![];
    }
    ranks
        .iter()
        .enumerate()
        .filter_map(|(idx, rank)| (rank == best).then_some(idx))
        .collect()
}

fn five_card_subsets(n: usize) -> Vec<[usize; HAND_SIZE]> {
    let mut subsets = Vec::new();
    for a in 0..n {
        for b in a + 1..n {
            for c in b + 1..n {
                for d in c + 1..n {
                    for e in d + 1..n {
                        subsets.push([a, b, c, d, e]);
                    }
                }
            }
        }
    }
    subsets
}

fn eval_five(hand: &[Card; HAND_SIZE]) -> HandRank {
    // Slot 1 mirrors the aces so the wheel (A-2-3-4-5) reads as a run.
    let mut counts = [0u8; ACE as usize + 1];
    let mut suit_counts = [0u8; Suit::ALL.len()];
    for card in hand {
        counts[usize::from(card.0)] += 1;
        suit_counts[card.1 as usize] += 1;
    }
    counts[1] = counts[usize::from(ACE)];

    let mut straight = None;
    let mut run = 0;
    for (value, &count) in counts.iter().enumerate().skip(1) {
        if count == 0 {
            run = 0;
            continue;
        }
        run += 1;
        if run >= HAND_SIZE {
            straight = Some(value as Value);
        }
    }
    let flush = suit_counts.iter().any(|&count| usize::from(count) == HAND_SIZE);

    // (count, value) for every value held, biggest groups first and then
    // highest values first.
    let mut groups: Vec<(u8, Value)> = (MIN_VALUE..=ACE)
        .rev()
        .filter_map(|value| {
            let count = counts[usize::from(value)];
            (count > 0).then_some((count, value))
        })
        .collect();
    groups.sort_by(|a, b| b.cmp(a));
    let value_at = |idx: usize| groups.get(idx).map_or(0, |&(_, value)| value);
    let count_at = |idx: usize| groups.get(idx).map_or(0, |&(count, _)| count);

    let mut descending: [Value; HAND_SIZE] = hand.map(|card| card.0);
    descending.sort_unstable_by(|a, b| b.cmp(a));

    match (straight, flush) {
        (Some(high), true) => return HandRank::StraightFlush { high },
        _ if count_at(0) >= 4 => {
            return HandRank::FourOfAKind {
                quads: value_at(0),
                kicker: value_at(1),
            };
        }
        _ if count_at(0) == 3 && count_at(1) >= 2 => {
            return HandRank::FullHouse {
                trips: value_at(0),
                pair: value_at(1),
            };
        }
        (_, true) => return HandRank::Flush(descending),
        (Some(high), false) => return HandRank::Straight { high },
        _ => {}
    }

    match (count_at(0), count_at(1)) {
        (3, _) => HandRank::ThreeOfAKind {
            trips: value_at(0),
            kickers: [value_at(1), value_at(2)],
        },
        (2, 2) => HandRank::TwoPair {
            high: value_at(0),
            low: value_at(1),
            kicker: value_at(2),
        },
        (2, _) => HandRank::OnePair {
            pair: value_at(0),
            kickers: [value_at(1), value_at(2), value_at(3)],
        },
        _ => HandRank::HighCard(descending),
    }
}
