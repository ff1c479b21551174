//! Table hosting a single match behind an async actor.
//!
//! This module implements:
//! - TableActor: owns the [`Match`](crate::Match) and serializes every operation
//! - TableHandle: cloneable sender used by connection tasks
//! - TableEvent: notifications fanned out to subscribed players
//!
//! ## Architecture
//!
//! The table runs in its own Tokio task with an mpsc inbox. Requests carry a
//! oneshot reply channel; rejections travel back on that channel only, while
//! successful operations are broadcast to every subscriber. Private events
//! (dealt cards, snapshots) are unicast.
//!
//! ## Example
//!
//! ```no_run
//! use liars_deck::entities::PlayerId;
//! use liars_deck::table::{TableActor, TableConfig};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), liars_deck::table::TableError> {
//!     let table = TableActor::spawn(TableConfig::default())?;
//!
//!     let player = PlayerId::new();
//!     let (tx, mut events) = mpsc::channel(32);
//!     table.subscribe(player, tx).await?;
//!     table.join(player, "alice").await?;
//!
//!     while let Some(event) = events.recv().await {
//!         println!("{event}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod actor;
pub mod config;
pub mod errors;
pub mod messages;

pub use actor::{TableActor, TableHandle};
pub use config::TableConfig;
pub use errors::{TableError, TableResult};
pub use messages::{TableEvent, TableMessage, TableResponse, TableStatus};
