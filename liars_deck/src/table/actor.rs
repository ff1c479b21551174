//! Table actor implementation with async message handling.

use super::{
    config::TableConfig,
    errors::{TableError, TableResult},
    messages::{TableEvent, TableMessage, TableResponse, TableStatus},
};
use crate::game::{
    Match,
    entities::{
        CardType, ClaimOutcome, DisputeOutcome, LeaveEffect, MatchView, PlayerId, PlayerName,
        Resolution, RoundDeal,
    },
};
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};

/// Table actor handle for sending messages
#[derive(Clone, Debug)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
}

impl TableHandle {
    /// Create a new table handle
    pub fn new(sender: mpsc::Sender<TableMessage>) -> Self {
        Self { sender }
    }

    /// Send a message to the table
    pub async fn send(&self, message: TableMessage) -> TableResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| TableError::Closed)
    }

    async fn request(
        &self,
        message: impl FnOnce(oneshot::Sender<TableResponse>) -> TableMessage,
    ) -> TableResult<()> {
        let (tx, rx) = oneshot::channel();
        self.send(message(tx)).await?;
        rx.await.map_err(|_| TableError::Closed)??;
        Ok(())
    }

    /// Deliver this player's events to `sender`. A snapshot of the match is
    /// sent first.
    pub async fn subscribe(
        &self,
        player_id: PlayerId,
        sender: mpsc::Sender<TableEvent>,
    ) -> TableResult<()> {
        self.send(TableMessage::Subscribe { player_id, sender })
            .await
    }

    pub async fn unsubscribe(&self, player_id: PlayerId) -> TableResult<()> {
        self.send(TableMessage::Unsubscribe { player_id }).await
    }

    pub async fn join(&self, player_id: PlayerId, name: impl Into<String>) -> TableResult<()> {
        let name = name.into();
        self.request(|response| TableMessage::Join {
            player_id,
            name,
            response,
        })
        .await
    }

    pub async fn leave(&self, player_id: PlayerId) -> TableResult<()> {
        self.request(|response| TableMessage::Leave {
            player_id,
            response,
        })
        .await
    }

    pub async fn start(&self, player_id: PlayerId) -> TableResult<()> {
        self.request(|response| TableMessage::Start {
            player_id,
            response,
        })
        .await
    }

    pub async fn claim(
        &self,
        player_id: PlayerId,
        amount: i64,
        card_type: CardType,
    ) -> TableResult<()> {
        self.request(|response| TableMessage::Claim {
            player_id,
            amount,
            card_type,
            response,
        })
        .await
    }

    pub async fn dispute(&self, player_id: PlayerId) -> TableResult<()> {
        self.request(|response| TableMessage::Dispute {
            player_id,
            response,
        })
        .await
    }

    pub async fn view(&self, player_id: PlayerId) -> TableResult<MatchView> {
        let (tx, rx) = oneshot::channel();
        self.send(TableMessage::GetView {
            player_id,
            response: tx,
        })
        .await?;
        rx.await.map_err(|_| TableError::Closed)
    }

    pub async fn status(&self) -> TableResult<TableStatus> {
        let (tx, rx) = oneshot::channel();
        self.send(TableMessage::GetStatus { response: tx }).await?;
        rx.await.map_err(|_| TableError::Closed)
    }

    pub async fn close(&self) -> TableResult<()> {
        let (tx, rx) = oneshot::channel();
        self.send(TableMessage::Close { response: tx }).await?;
        rx.await.map_err(|_| TableError::Closed)
    }
}

/// Table actor owning the match.
///
/// Messages are handled strictly one at a time, so no two operations ever
/// interleave their reads and writes of the match state.
pub struct TableActor {
    /// Table configuration
    config: TableConfig,

    /// The hosted match
    game: Match,

    /// Message inbox
    inbox: mpsc::Receiver<TableMessage>,

    /// Per-player event channels
    subscribers: HashMap<PlayerId, mpsc::Sender<TableEvent>>,

    /// Is table closed
    is_closed: bool,
}

impl TableActor {
    /// Create a new table actor
    ///
    /// # Arguments
    ///
    /// * `config` - Table configuration
    ///
    /// # Returns
    ///
    /// * `(TableActor, TableHandle)` - Actor and handle for sending messages
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidConfig`] or a settings error if the
    /// configuration doesn't validate.
    pub fn new(config: TableConfig) -> TableResult<(Self, TableHandle)> {
        config.validate()?;
        let game = Match::with_settings(config.settings.clone())?;
        let (sender, inbox) = mpsc::channel(config.inbox_capacity);

        let actor = Self {
            config,
            game,
            inbox,
            subscribers: HashMap::new(),
            is_closed: false,
        };

        Ok((actor, TableHandle::new(sender)))
    }

    /// Create the actor and run it on the tokio runtime.
    pub fn spawn(config: TableConfig) -> TableResult<TableHandle> {
        let (actor, handle) = Self::new(config)?;
        tokio::spawn(actor.run());
        Ok(handle)
    }

    /// Run the table actor event loop
    pub async fn run(mut self) {
        log::info!("Table '{}' open", self.config.name);

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message);

            if self.is_closed {
                break;
            }
        }

        log::info!("Table '{}' closed", self.config.name);
    }

    /// Handle a table message
    fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::Subscribe { player_id, sender } => {
                let view = self.game.view(&player_id);
                self.subscribers.insert(player_id, sender);
                log::debug!("Player {player_id} subscribed to table events");
                self.unicast(&player_id, TableEvent::Snapshot { view });
            }

            TableMessage::Unsubscribe { player_id } => {
                self.subscribers.remove(&player_id);
                log::debug!("Player {player_id} unsubscribed from table events");
            }

            TableMessage::Join {
                player_id,
                name,
                response,
            } => {
                let result = self.handle_join(player_id, &name);
                self.reply(player_id, "join", response, result);
            }

            TableMessage::Leave {
                player_id,
                response,
            } => {
                self.handle_leave(&player_id);
                let _ = response.send(Ok(()));
            }

            TableMessage::Start {
                player_id,
                response,
            } => {
                let result = self.handle_start();
                self.reply(player_id, "start", response, result);
            }

            TableMessage::Claim {
                player_id,
                amount,
                card_type,
                response,
            } => {
                let result = self.handle_claim(&player_id, amount, card_type);
                self.reply(player_id, "claim", response, result);
            }

            TableMessage::Dispute {
                player_id,
                response,
            } => {
                let result = self.handle_dispute(&player_id);
                self.reply(player_id, "dispute", response, result);
            }

            TableMessage::GetView {
                player_id,
                response,
            } => {
                let _ = response.send(self.game.view(&player_id));
            }

            TableMessage::GetStatus { response } => {
                let _ = response.send(self.status());
            }

            TableMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(());
            }
        }
    }

    fn reply(
        &self,
        player_id: PlayerId,
        operation: &str,
        response: oneshot::Sender<TableResponse>,
        result: TableResponse,
    ) {
        if let Err(e) = &result {
            log::debug!("Rejected {operation} from {player_id}: {e}");
        }
        let _ = response.send(result);
    }

    fn handle_join(&mut self, player_id: PlayerId, name: &str) -> TableResponse {
        let players = self.game.join(player_id, name)?;
        self.broadcast(TableEvent::PlayerList { players });
        Ok(())
    }

    fn handle_leave(&mut self, player_id: &PlayerId) {
        let outcome = self.game.leave(player_id);
        if outcome.removed.is_none() {
            return;
        }

        self.broadcast(TableEvent::PlayerList {
            players: outcome.roster,
        });
        match outcome.effect {
            LeaveEffect::None => {}
            LeaveEffect::TurnPassed { next_player } => {
                self.broadcast(TableEvent::NextTurn {
                    player: next_player,
                });
            }
            LeaveEffect::GameOver { winner } => {
                self.broadcast(TableEvent::GameOver { winner });
            }
        }
    }

    fn handle_start(&mut self) -> TableResponse {
        let deal = self.game.start()?;
        let first_player = self.deliver_hands(deal);
        self.broadcast(TableEvent::GameStarted { first_player });
        Ok(())
    }

    fn handle_claim(
        &mut self,
        player_id: &PlayerId,
        amount: i64,
        card_type: CardType,
    ) -> TableResponse {
        let ClaimOutcome {
            claimant,
            next_player,
            amount,
            card_type,
        } = self.game.claim(player_id, amount, card_type)?;

        self.broadcast(TableEvent::NewClaim {
            player: claimant,
            amount,
            card_type,
        });
        self.broadcast(TableEvent::NextTurn {
            player: next_player,
        });
        Ok(())
    }

    fn handle_dispute(&mut self, player_id: &PlayerId) -> TableResponse {
        let DisputeOutcome {
            disputer,
            disputed,
            loser,
            actual_count,
            claimed,
            card_type,
            eliminated,
            resolution,
        } = self.game.dispute(player_id)?;

        self.broadcast(TableEvent::DisputeResult {
            disputer,
            disputed,
            loser: loser.clone(),
            actual_count,
            claimed,
            card_type,
        });
        if eliminated {
            self.broadcast(TableEvent::PlayerEliminated { player: loser });
        }

        match resolution {
            Resolution::GameOver { winner } => {
                self.broadcast(TableEvent::GameOver {
                    winner: Some(winner),
                });
            }
            Resolution::NewRound(deal) => {
                let first_player = self.deliver_hands(deal);
                self.broadcast(TableEvent::NewRound { first_player });
            }
        }
        Ok(())
    }

    /// Send every dealt hand to its owner only.
    fn deliver_hands(&mut self, deal: RoundDeal) -> PlayerName {
        for hand in deal.hands {
            self.unicast(&hand.player, TableEvent::YourCards { cards: hand.cards });
        }
        deal.first_player
    }

    fn status(&self) -> TableStatus {
        TableStatus {
            name: self.config.name.clone(),
            phase: self.game.phase(),
            player_count: self.game.players().len(),
            living_count: self.game.living_count(),
            subscriber_count: self.subscribers.len(),
        }
    }

    /// Broadcast an event to all subscribers
    fn broadcast(&mut self, event: TableEvent) {
        log::debug!("Table '{}': {}", self.config.name, event);
        self.subscribers.retain(|player_id, sender| {
            match sender.try_send(event.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!("Subscriber {player_id} channel full, dropping event");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Subscriber {player_id} disconnected, removing");
                    false
                }
            }
        });
    }

    /// Send an event to a single subscriber
    fn unicast(&mut self, player_id: &PlayerId, event: TableEvent) {
        let Some(sender) = self.subscribers.get(player_id) else {
            return;
        };
        match sender.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                log::warn!("Subscriber {player_id} channel full, dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                log::debug!("Subscriber {player_id} disconnected, removing");
                self.subscribers.remove(player_id);
            }
        }
    }
}
