//! # Liar's Deck
//!
//! A real-time bluffing card game engine.
//!
//! Players hold five hidden cards drawn from a twenty card deck split into
//! four types (`A`, `B`, `C` and `D`). On their turn a player claims that at
//! least some number of cards of one type sit across everyone's hands; any
//! other player may dispute the claim. The hands are revealed and counted,
//! whoever was wrong loses one of their three lives, and a new round is
//! dealt until one player is left standing.
//!
//! ## Core Modules
//!
//! - [`game`]: The match engine, its entities and error kinds
//! - [`table`]: A single-writer actor that serializes match operations and
//!   delivers the resulting events to subscribed players
//!
//! ## Example
//!
//! ```
//! use liars_deck::{Match, entities::{CardType, PlayerId}};
//!
//! let mut game = Match::new();
//! let (alice, bob) = (PlayerId::new(), PlayerId::new());
//! game.join(alice, "alice").unwrap();
//! game.join(bob, "bob").unwrap();
//!
//! let deal = game.start().unwrap();
//! assert_eq!(deal.first_player.as_str(), "alice");
//!
//! let claim = game.claim(&alice, 2, CardType::A).unwrap();
//! assert_eq!(claim.next_player.as_str(), "bob");
//! ```

/// Match engine, entities and state machine.
pub mod game;
pub use game::{
    Match, MatchError, MatchSettings,
    constants::{self, DECK_SIZE, HAND_SIZE, MAX_PLAYERS, MIN_PLAYERS},
    entities,
};

/// Actor wrapper serializing access to the match.
pub mod table;
