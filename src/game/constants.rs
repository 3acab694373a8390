//! Design values for the matching game.

/// Number of cards held for a single comparison. The whole rule set is
/// written against pairs; changing this would change the game.
pub const CARDS_PER_COMPARISON: usize = 2;

/// How long a revealed pair stays face-up before the comparison resolves,
/// in milliseconds.
pub const DEFAULT_COMPARE_DELAY_MS: u64 = 500;

/// How long a completed board stays fully revealed before the automatic
/// reshuffle, in milliseconds.
pub const DEFAULT_RESET_DELAY_MS: u64 = 1000;

/// Default capacity of a session actor's message inbox.
pub const DEFAULT_INBOX_CAPACITY: usize = 100;
