//! Table-wide constants.

/// Default number of seats at a table.
pub const MAX_PLAYERS: usize = 10;

/// Cards in a standard deck.
pub const DECK_SIZE: usize = 52;

/// Cards dealt face down to each live seat.
pub const HOLE_CARDS: usize = 2;

/// Community cards on a complete board.
pub const BOARD_CARDS: usize = 5;

/// Cards in a ranked poker hand.
pub const HAND_SIZE: usize = 5;

/// The most seats a single deck can serve: every seat gets its hole cards
/// and the full board still fits.
pub const MAX_SEATS_PER_DECK: usize = (DECK_SIZE - BOARD_CARDS) / HOLE_CARDS;

/// Fewest seated players a deal needs.
pub const MIN_PLAYERS: usize = 2;
