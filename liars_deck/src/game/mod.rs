//! Match engine - roster, dealing, claims and disputes.
//!
//! This module provides the authoritative game state:
//! - Card tokens, the four public card types and the round deck
//! - Player roster with lives and hidden hands
//! - The [`Match`] state machine (`Lobby` -> `InRound` -> `Finished`)

pub mod constants;
pub mod entities;
pub mod state_machine;

pub use state_machine::{Match, MatchError, MatchSettings};
