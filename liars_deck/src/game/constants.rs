//! Fixed game constants.

/// Number of distinct card tokens in a freshly built deck.
pub const DECK_SIZE: usize = 20;

/// Cards dealt to every living player at the start of a round.
pub const HAND_SIZE: usize = 5;

/// Lives every player starts with.
pub const DEFAULT_STARTING_LIVES: i32 = 3;

/// Fewest registered players needed to start a match.
pub const MIN_PLAYERS: usize = 2;

/// Most players a single deck can deal a full hand to.
pub const MAX_PLAYERS: usize = DECK_SIZE / HAND_SIZE;

/// Display names are cut down to this many characters.
pub const MAX_NAME_LENGTH: usize = 24;
