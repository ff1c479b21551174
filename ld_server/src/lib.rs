//! WebSocket server for the liars_deck bluffing card game.
//!
//! The binary wires these modules together; they are exposed as a library so
//! the router can be exercised in integration tests.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
