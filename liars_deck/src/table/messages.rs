//! Table actor message types.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::{mpsc, oneshot};

use crate::game::{
    MatchError,
    entities::{CardType, MatchView, Phase, PlayerId, PlayerName, PlayerSummary},
};

/// Reply to a state-changing request. Errors only ever go back to the
/// requester.
pub type TableResponse = Result<(), MatchError>;

/// Messages that can be sent to a TableActor
#[derive(Debug)]
pub enum TableMessage {
    /// Start delivering events for a player
    Subscribe {
        player_id: PlayerId,
        sender: mpsc::Sender<TableEvent>,
    },

    /// Stop delivering events for a player
    Unsubscribe { player_id: PlayerId },

    /// Join the roster
    Join {
        player_id: PlayerId,
        name: String,
        response: oneshot::Sender<TableResponse>,
    },

    /// Leave the roster (also sent on disconnect)
    Leave {
        player_id: PlayerId,
        response: oneshot::Sender<TableResponse>,
    },

    /// Start the match
    Start {
        player_id: PlayerId,
        response: oneshot::Sender<TableResponse>,
    },

    /// Claim a count of a card type
    Claim {
        player_id: PlayerId,
        amount: i64,
        card_type: CardType,
        response: oneshot::Sender<TableResponse>,
    },

    /// Dispute the pending claim
    Dispute {
        player_id: PlayerId,
        response: oneshot::Sender<TableResponse>,
    },

    /// Get the match as seen by a player
    GetView {
        player_id: PlayerId,
        response: oneshot::Sender<MatchView>,
    },

    /// Get a summary for health checks
    GetStatus {
        response: oneshot::Sender<TableStatus>,
    },

    /// Shut the actor down
    Close { response: oneshot::Sender<()> },
}

/// Notifications pushed to subscribed players.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableEvent {
    PlayerList {
        players: Vec<PlayerSummary>,
    },
    GameStarted {
        first_player: PlayerName,
    },
    /// Sent only to the player holding the cards.
    YourCards {
        cards: Vec<CardType>,
    },
    NewClaim {
        player: PlayerName,
        amount: i64,
        card_type: CardType,
    },
    NextTurn {
        player: PlayerName,
    },
    DisputeResult {
        disputer: PlayerName,
        disputed: PlayerName,
        loser: PlayerName,
        actual_count: usize,
        claimed: i64,
        card_type: CardType,
    },
    PlayerEliminated {
        player: PlayerName,
    },
    GameOver {
        winner: Option<PlayerName>,
    },
    NewRound {
        first_player: PlayerName,
    },
    /// Sent only to a freshly subscribed player.
    Snapshot {
        view: MatchView,
    },
}

impl fmt::Display for TableEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::PlayerList { players } => format!("{} players at the table", players.len()),
            Self::GameStarted { first_player } => {
                format!("game started, {first_player} goes first")
            }
            Self::YourCards { cards } => format!("dealt {} cards", cards.len()),
            Self::NewClaim {
                player,
                amount,
                card_type,
            } => format!("{player} claims {amount} x {card_type}"),
            Self::NextTurn { player } => format!("{player}'s turn"),
            Self::DisputeResult {
                disputer,
                disputed,
                loser,
                actual_count,
                claimed,
                card_type,
            } => format!(
                "{disputer} disputed {disputed} ({claimed} x {card_type} claimed, {actual_count} found), {loser} loses a life"
            ),
            Self::PlayerEliminated { player } => format!("{player} was eliminated"),
            Self::GameOver { winner: Some(winner) } => format!("game over, {winner} wins"),
            Self::GameOver { winner: None } => "game over".to_string(),
            Self::NewRound { first_player } => format!("new round, {first_player} goes first"),
            Self::Snapshot { view } => format!("snapshot ({})", view.phase),
        };
        write!(f, "{repr}")
    }
}

/// Table summary for health checks
#[derive(Debug, Clone, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableStatus {
    pub name: String,
    pub phase: Phase,
    pub player_count: usize,
    pub living_count: usize,
    pub subscriber_count: usize,
}
