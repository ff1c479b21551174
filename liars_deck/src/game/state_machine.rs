//! The match engine.
//!
//! A [`Match`] owns the roster, the turn pointer, the pending claim and the
//! round's deck. Every operation checks its preconditions before touching
//! any state, so a rejected call leaves the match exactly as it was.

use log::{debug, info};
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{DEFAULT_STARTING_LIVES, HAND_SIZE, MAX_PLAYERS, MIN_PLAYERS};
use super::entities::{
    CardType, Claim, ClaimOutcome, ClaimView, DealtHand, Deck, DisputeOutcome, LeaveEffect,
    LeaveOutcome, MatchView, Phase, Player, PlayerId, PlayerName, PlayerSummary, Resolution,
    RoundDeal,
};

/// Reasons a match operation is rejected. None of these are fatal; the
/// match stays usable after any of them.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum MatchError {
    #[error("game is already in progress")]
    MatchBusy,
    #[error("need 2+ players to start")]
    InsufficientPlayers,
    #[error("not your turn")]
    NotYourTurn,
    #[error("no claim to dispute")]
    NoClaim,
    #[error("you can't dispute your own claim")]
    SelfDispute,
    #[error("invalid dispute: player not found")]
    PlayerNotFound,
    #[error("game is full ({max} players)")]
    MatchFull { max: usize },
    #[error("invalid match settings: {0}")]
    InvalidSettings(String),
    #[error("invalid match state: no living players to deal to")]
    InternalState,
}

/// Match configuration settings
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MatchSettings {
    pub starting_lives: i32,
    pub max_players: usize,
    /// Seeds the shuffle RNG. Matches with the same seed and the same
    /// sequence of operations deal the same cards.
    pub seed: Option<u64>,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            starting_lives: DEFAULT_STARTING_LIVES,
            max_players: MAX_PLAYERS,
            seed: None,
        }
    }
}

impl MatchSettings {
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.starting_lives < 1 {
            return Err(MatchError::InvalidSettings(
                "starting lives must be at least 1".to_string(),
            ));
        }
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.max_players) {
            return Err(MatchError::InvalidSettings(format!(
                "max players must be between {MIN_PLAYERS} and {MAX_PLAYERS}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct Match {
    settings: MatchSettings,
    /// Join order doubles as turn order.
    players: Vec<Player>,
    phase: Phase,
    /// Always a living player while the phase is `InRound`.
    current_turn: Option<PlayerId>,
    claim: Option<Claim>,
    deck: Deck,
    rng: StdRng,
}

impl Default for Match {
    fn default() -> Self {
        Self::new()
    }
}

impl Match {
    #[must_use]
    pub fn new() -> Self {
        Self::build(MatchSettings::default())
    }

    pub fn with_settings(settings: MatchSettings) -> Result<Self, MatchError> {
        settings.validate()?;
        Ok(Self::build(settings))
    }

    fn build(settings: MatchSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            players: Vec::with_capacity(settings.max_players),
            settings,
            phase: Phase::Lobby,
            current_turn: None,
            claim: None,
            deck: Deck::default(),
            rng,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.phase == Phase::InRound
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[must_use]
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id == *id)
    }

    #[must_use]
    pub fn roster(&self) -> Vec<PlayerSummary> {
        self.players.iter().map(Player::summary).collect()
    }

    #[must_use]
    pub fn current_turn(&self) -> Option<PlayerId> {
        self.current_turn
    }

    #[must_use]
    pub fn current_player(&self) -> Option<&PlayerName> {
        self.current_turn
            .and_then(|id| self.player(&id))
            .map(|player| &player.name)
    }

    /// The pending claim, if there is one and its claimant is still here.
    #[must_use]
    pub fn pending_claim(&self) -> Option<ClaimView> {
        let claim = self.claim?;
        let claimant = self.player(&claim.claimant)?;
        Some(ClaimView {
            claimant: claimant.name.clone(),
            amount: claim.amount,
            card_type: claim.card_type,
        })
    }

    #[must_use]
    pub fn hand(&self, id: &PlayerId) -> Option<Vec<CardType>> {
        self.player(id).map(Player::card_types)
    }

    #[must_use]
    pub fn living_count(&self) -> usize {
        self.players.iter().filter(|player| player.is_alive()).count()
    }

    /// Cards of `card_type` across every rostered hand, eliminated players
    /// included.
    #[must_use]
    pub fn count_card_type(&self, card_type: CardType) -> usize {
        self.players.iter().map(|player| player.count(card_type)).sum()
    }

    #[must_use]
    pub fn view(&self, id: &PlayerId) -> MatchView {
        MatchView {
            phase: self.phase,
            players: self.roster(),
            current_player: self.current_player().cloned(),
            pending_claim: self.pending_claim(),
            your_cards: self.hand(id).unwrap_or_default(),
        }
    }

    /// Add a player to the roster. Joining twice with the same identity is
    /// a no-op.
    pub fn join(&mut self, id: PlayerId, name: &str) -> Result<Vec<PlayerSummary>, MatchError> {
        if self.is_in_progress() {
            return Err(MatchError::MatchBusy);
        }
        if self.position(&id).is_some() {
            return Ok(self.roster());
        }
        if self.players.len() >= self.settings.max_players {
            return Err(MatchError::MatchFull {
                max: self.settings.max_players,
            });
        }

        let player = Player::new(id, PlayerName::new(name), self.settings.starting_lives);
        info!("{} joined ({} players)", player.name, self.players.len() + 1);
        self.players.push(player);
        Ok(self.roster())
    }

    /// Remove a player at any point. Mid-round, a departing turn holder
    /// passes the turn on, and the match ends once fewer than two living
    /// players remain.
    pub fn leave(&mut self, id: &PlayerId) -> LeaveOutcome {
        let Some(idx) = self.position(id) else {
            return LeaveOutcome {
                removed: None,
                roster: self.roster(),
                effect: LeaveEffect::None,
            };
        };

        let player = self.players.remove(idx);
        info!("{} left", player.name);

        let effect = if !self.is_in_progress() {
            LeaveEffect::None
        } else if self.living_count() < MIN_PLAYERS {
            let winner = self.first_living_from(0).map(|p| p.name.clone());
            self.finish();
            info!(
                "match ended by departure, winner: {}",
                winner.as_ref().map_or("nobody", PlayerName::as_str)
            );
            LeaveEffect::GameOver { winner }
        } else if self.current_turn == Some(player.id) {
            // Removal shifted the successor into `idx`.
            match self.first_living_from(idx).map(|p| (p.id, p.name.clone())) {
                Some((next_id, next_name)) => {
                    self.current_turn = Some(next_id);
                    debug!("turn passed to {next_name}");
                    LeaveEffect::TurnPassed {
                        next_player: next_name,
                    }
                }
                None => LeaveEffect::None,
            }
        } else {
            LeaveEffect::None
        };

        LeaveOutcome {
            removed: Some(player.name),
            roster: self.roster(),
            effect,
        }
    }

    /// Start a match and deal the first round. Starting again after a
    /// finished match resets every player's lives.
    pub fn start(&mut self) -> Result<RoundDeal, MatchError> {
        if self.is_in_progress() {
            return Err(MatchError::MatchBusy);
        }
        if self.players.len() < MIN_PLAYERS {
            return Err(MatchError::InsufficientPlayers);
        }

        if self.phase == Phase::Finished {
            let lives = self.settings.starting_lives;
            for player in &mut self.players {
                player.lives = lives;
            }
        }

        let deal = self.deal_round()?;
        self.phase = Phase::InRound;
        info!(
            "match started with {} players, {} goes first",
            self.players.len(),
            deal.first_player
        );
        Ok(deal)
    }

    /// Record a claim from the current player and pass the turn to the next
    /// living player.
    pub fn claim(
        &mut self,
        id: &PlayerId,
        amount: i64,
        card_type: CardType,
    ) -> Result<ClaimOutcome, MatchError> {
        if !self.is_in_progress() || self.current_turn != Some(*id) {
            return Err(MatchError::NotYourTurn);
        }
        let idx = self.position(id).ok_or(MatchError::PlayerNotFound)?;
        let (next_id, next_player) = self
            .first_living_from(idx + 1)
            .map(|p| (p.id, p.name.clone()))
            .ok_or(MatchError::InternalState)?;

        let claimant = self.players[idx].name.clone();
        self.claim = Some(Claim {
            claimant: *id,
            amount,
            card_type,
        });
        self.current_turn = Some(next_id);
        debug!("{claimant} claims {amount} x {card_type}, {next_player} is up");

        Ok(ClaimOutcome {
            claimant,
            next_player,
            amount,
            card_type,
        })
    }

    /// Challenge the pending claim. The hands are counted, whoever was
    /// wrong loses a life, and the match either ends or deals a new round.
    pub fn dispute(&mut self, id: &PlayerId) -> Result<DisputeOutcome, MatchError> {
        let claim = self.claim.ok_or(MatchError::NoClaim)?;
        if claim.claimant == *id {
            return Err(MatchError::SelfDispute);
        }
        let disputer_idx = self.position(id).ok_or(MatchError::PlayerNotFound)?;
        let claimant_idx = self
            .position(&claim.claimant)
            .ok_or(MatchError::PlayerNotFound)?;

        let actual_count = self.count_card_type(claim.card_type);
        // The claim is a lower bound, so meeting it exactly is truthful.
        let loser_idx = if actual_count as i64 >= claim.amount {
            disputer_idx
        } else {
            claimant_idx
        };

        let loser = &mut self.players[loser_idx];
        loser.lives -= 1;
        let eliminated = !loser.is_alive();
        let loser_name = loser.name.clone();

        let disputer = self.players[disputer_idx].name.clone();
        let disputed = self.players[claimant_idx].name.clone();
        info!(
            "{disputer} disputed {disputed}'s claim of {} x {}: {actual_count} found, {loser_name} loses a life",
            claim.amount, claim.card_type
        );
        if eliminated {
            info!("{loser_name} was eliminated");
        }

        let resolution = if self.living_count() < MIN_PLAYERS {
            let winner = self
                .first_living_from(0)
                .map(|p| p.name.clone())
                .ok_or(MatchError::InternalState)?;
            self.finish();
            info!("{winner} wins the match");
            Resolution::GameOver { winner }
        } else {
            Resolution::NewRound(self.deal_round()?)
        };

        Ok(DisputeOutcome {
            disputer,
            disputed,
            loser: loser_name,
            actual_count,
            claimed: claim.amount,
            card_type: claim.card_type,
            eliminated,
            resolution,
        })
    }

    fn position(&self, id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|player| player.id == *id)
    }

    /// First living player at or after `start` in roster order, wrapping
    /// around the end.
    fn first_living_from(&self, start: usize) -> Option<&Player> {
        let len = self.players.len();
        (0..len)
            .map(|offset| &self.players[(start + offset) % len])
            .find(|player| player.is_alive())
    }

    /// Shuffle a fresh deck and deal a full hand to every living player in
    /// roster order. Eliminated players keep their last hand, and it still
    /// counts toward disputes.
    fn deal_round(&mut self) -> Result<RoundDeal, MatchError> {
        let (first_id, first_player) = self
            .first_living_from(0)
            .map(|p| (p.id, p.name.clone()))
            .ok_or(MatchError::InternalState)?;

        self.deck = Deck::shuffled(&mut self.rng);
        let mut hands = Vec::with_capacity(self.players.len());
        for player in self.players.iter_mut().filter(|p| p.is_alive()) {
            player.hand = self
                .deck
                .deal(HAND_SIZE)
                .ok_or(MatchError::InternalState)?;
            hands.push(DealtHand {
                player: player.id,
                cards: player.card_types(),
            });
        }
        debug!("dealt {} hands, {} cards unused", hands.len(), self.deck.remaining());

        self.current_turn = Some(first_id);
        self.claim = None;
        Ok(RoundDeal {
            first_player,
            hands,
        })
    }

    fn finish(&mut self) {
        self.phase = Phase::Finished;
        self.current_turn = None;
        self.claim = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{constants::DECK_SIZE, entities::Token};

    fn seeded() -> Match {
        Match::with_settings(MatchSettings {
            seed: Some(42),
            ..MatchSettings::default()
        })
        .unwrap()
    }

    fn with_players(names: &[&str]) -> (Match, Vec<PlayerId>) {
        let mut game = seeded();
        let ids: Vec<PlayerId> = names
            .iter()
            .map(|name| {
                let id = PlayerId::new();
                game.join(id, name).unwrap();
                id
            })
            .collect();
        (game, ids)
    }

    fn set_hand(game: &mut Match, id: &PlayerId, tokens: &[u8]) {
        let idx = game.position(id).unwrap();
        game.players[idx].hand = tokens.iter().map(|&t| Token::new(t).unwrap()).collect();
    }

    #[test]
    fn test_join_appends_with_full_lives() {
        let (game, _) = with_players(&["alice", "bob", "carol"]);
        let roster = game.roster();
        let names: Vec<&str> = roster.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["alice", "bob", "carol"]);
        assert!(roster.iter().all(|p| p.lives == 3 && p.card_count == 0));
        assert_eq!(game.phase(), Phase::Lobby);
    }

    #[test]
    fn test_join_twice_is_noop() {
        let (mut game, ids) = with_players(&["alice"]);
        let roster = game.join(ids[0], "alice again").unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].name.as_str(), "alice");
    }

    #[test]
    fn test_join_in_progress_is_busy() {
        let (mut game, _) = with_players(&["alice", "bob"]);
        game.start().unwrap();
        let before = game.roster();

        assert_eq!(game.join(PlayerId::new(), "late"), Err(MatchError::MatchBusy));
        assert_eq!(game.roster(), before);
    }

    #[test]
    fn test_join_full() {
        let (mut game, _) = with_players(&["a", "b", "c", "d"]);
        assert_eq!(
            game.join(PlayerId::new(), "e"),
            Err(MatchError::MatchFull { max: MAX_PLAYERS })
        );
    }

    #[test]
    fn test_start_needs_two_players() {
        let (mut game, _) = with_players(&["alice"]);
        assert_eq!(game.start(), Err(MatchError::InsufficientPlayers));
        assert_eq!(game.phase(), Phase::Lobby);
        assert!(game.current_turn().is_none());
    }

    #[test]
    fn test_start_deals_five_to_everyone() {
        let (mut game, ids) = with_players(&["alice", "bob", "carol"]);
        let deal = game.start().unwrap();

        assert_eq!(game.phase(), Phase::InRound);
        assert_eq!(deal.first_player.as_str(), "alice");
        assert_eq!(game.current_turn(), Some(ids[0]));
        assert_eq!(deal.hands.len(), 3);
        for id in &ids {
            assert_eq!(deal.hand_for(id).unwrap().len(), HAND_SIZE);
            assert_eq!(game.hand(id).unwrap().len(), HAND_SIZE);
        }
        assert_eq!(game.deck.remaining(), DECK_SIZE - 3 * HAND_SIZE);
        assert!(game.pending_claim().is_none());
    }

    #[test]
    fn test_dealt_tokens_are_distinct() {
        let (mut game, _) = with_players(&["a", "b", "c", "d"]);
        game.start().unwrap();
        let mut tokens: Vec<u8> = game
            .players
            .iter()
            .flat_map(|p| p.hand.iter().map(|t| t.value()))
            .collect();
        tokens.sort_unstable();
        tokens.dedup();
        assert_eq!(tokens.len(), DECK_SIZE);
        assert_eq!(game.deck.remaining(), 0);
    }

    #[test]
    fn test_start_while_in_round_is_busy() {
        let (mut game, ids) = with_players(&["alice", "bob"]);
        game.start().unwrap();
        let hand = game.hand(&ids[0]);
        assert_eq!(game.start(), Err(MatchError::MatchBusy));
        assert_eq!(game.hand(&ids[0]), hand);
    }

    #[test]
    fn test_claim_out_of_turn() {
        let (mut game, ids) = with_players(&["alice", "bob"]);
        assert_eq!(
            game.claim(&ids[0], 2, CardType::A),
            Err(MatchError::NotYourTurn)
        );

        game.start().unwrap();
        assert_eq!(
            game.claim(&ids[1], 2, CardType::A),
            Err(MatchError::NotYourTurn)
        );
        assert_eq!(game.current_turn(), Some(ids[0]));
        assert!(game.pending_claim().is_none());
    }

    #[test]
    fn test_claim_advances_and_wraps() {
        let (mut game, ids) = with_players(&["alice", "bob", "carol"]);
        game.start().unwrap();

        let outcome = game.claim(&ids[0], 3, CardType::A).unwrap();
        assert_eq!(outcome.claimant.as_str(), "alice");
        assert_eq!(outcome.next_player.as_str(), "bob");
        assert_eq!(game.current_turn(), Some(ids[1]));

        game.claim(&ids[1], 4, CardType::A).unwrap();
        let outcome = game.claim(&ids[2], 5, CardType::B).unwrap();
        assert_eq!(outcome.next_player.as_str(), "alice");
        assert_eq!(game.current_turn(), Some(ids[0]));

        let pending = game.pending_claim().unwrap();
        assert_eq!(pending.claimant.as_str(), "carol");
        assert_eq!(pending.amount, 5);
        assert_eq!(pending.card_type, CardType::B);
    }

    #[test]
    fn test_claim_skips_eliminated_players() {
        let (mut game, ids) = with_players(&["alice", "bob", "carol"]);
        game.start().unwrap();
        game.players[1].lives = 0;

        let outcome = game.claim(&ids[0], 1, CardType::C).unwrap();
        assert_eq!(outcome.next_player.as_str(), "carol");
        let outcome = game.claim(&ids[2], 2, CardType::C).unwrap();
        assert_eq!(outcome.next_player.as_str(), "alice");
    }

    #[test]
    fn test_claim_accepts_out_of_range_amounts() {
        let (mut game, ids) = with_players(&["alice", "bob"]);
        game.start().unwrap();
        assert!(game.claim(&ids[0], -4, CardType::D).is_ok());
        assert!(game.claim(&ids[1], i64::MAX, CardType::D).is_ok());
    }

    #[test]
    fn test_dispute_without_claim() {
        let (mut game, ids) = with_players(&["alice", "bob"]);
        assert_eq!(game.dispute(&ids[1]), Err(MatchError::NoClaim));
        game.start().unwrap();
        assert_eq!(game.dispute(&ids[1]), Err(MatchError::NoClaim));
    }

    #[test]
    fn test_dispute_own_claim() {
        let (mut game, ids) = with_players(&["alice", "bob"]);
        game.start().unwrap();
        game.claim(&ids[0], 2, CardType::A).unwrap();
        assert_eq!(game.dispute(&ids[0]), Err(MatchError::SelfDispute));
        assert!(game.pending_claim().is_some());
    }

    #[test]
    fn test_dispute_by_unknown_player() {
        let (mut game, ids) = with_players(&["alice", "bob"]);
        game.start().unwrap();
        game.claim(&ids[0], 2, CardType::A).unwrap();
        assert_eq!(
            game.dispute(&PlayerId::new()),
            Err(MatchError::PlayerNotFound)
        );
    }

    #[test]
    fn test_dispute_after_claimant_left() {
        let (mut game, ids) = with_players(&["alice", "bob", "carol"]);
        game.start().unwrap();
        game.claim(&ids[0], 2, CardType::A).unwrap();
        game.leave(&ids[0]);

        let lives: Vec<i32> = game.players.iter().map(|p| p.lives).collect();
        assert_eq!(game.dispute(&ids[1]), Err(MatchError::PlayerNotFound));
        assert_eq!(game.players.iter().map(|p| p.lives).collect::<Vec<_>>(), lives);
    }

    #[test]
    fn test_dispute_by_eliminated_player() {
        let (mut game, ids) = with_players(&["alice", "bob", "carol"]);
        game.start().unwrap();
        game.players[2].lives = 0;
        game.claim(&ids[0], 0, CardType::A).unwrap();

        let outcome = game.dispute(&ids[2]).unwrap();
        assert_eq!(outcome.disputer.as_str(), "carol");
        assert_eq!(outcome.loser.as_str(), "carol");
        assert!(outcome.eliminated);
        assert!(game.player(&ids[2]).unwrap().lives < 0);

        let Resolution::NewRound(deal) = outcome.resolution else {
            panic!("expected a new round");
        };
        assert_eq!(deal.hands.len(), 2);
        assert_eq!(game.living_count(), 2);
    }

    #[test]
    fn test_eliminated_disputer_can_cost_claimant() {
        let (mut game, ids) = with_players(&["alice", "bob", "carol"]);
        game.start().unwrap();
        game.players[2].lives = 0;
        game.claim(&ids[0], i64::MAX, CardType::A).unwrap();

        let outcome = game.dispute(&ids[2]).unwrap();
        assert_eq!(outcome.loser.as_str(), "alice");
        assert!(!outcome.eliminated);
        assert_eq!(game.player(&ids[0]).unwrap().lives, 2);
        assert_eq!(game.player(&ids[2]).unwrap().lives, 0);
    }

    #[test]
    fn test_truthful_claim_costs_disputer() {
        let (mut game, ids) = with_players(&["alice", "bob", "carol"]);
        game.start().unwrap();
        set_hand(&mut game, &ids[0], &[0, 1, 6, 7, 12]);
        set_hand(&mut game, &ids[1], &[2, 8, 9, 13, 14]);
        set_hand(&mut game, &ids[2], &[10, 11, 15, 16, 18]);

        game.claim(&ids[0], 3, CardType::A).unwrap();
        let outcome = game.dispute(&ids[1]).unwrap();

        assert_eq!(outcome.actual_count, 3);
        assert_eq!(outcome.claimed, 3);
        assert_eq!(outcome.card_type, CardType::A);
        assert_eq!(outcome.disputer.as_str(), "bob");
        assert_eq!(outcome.disputed.as_str(), "alice");
        assert_eq!(outcome.loser.as_str(), "bob");
        assert!(!outcome.eliminated);
        assert_eq!(game.player(&ids[1]).unwrap().lives, 2);
        assert_eq!(game.player(&ids[0]).unwrap().lives, 3);
    }

    #[test]
    fn test_bluff_costs_claimant_and_deals_new_round() {
        let (mut game, ids) = with_players(&["alice", "bob", "carol"]);
        game.start().unwrap();
        set_hand(&mut game, &ids[0], &[0, 6, 7, 8, 12]);
        set_hand(&mut game, &ids[1], &[1, 9, 10, 13, 14]);
        set_hand(&mut game, &ids[2], &[11, 15, 16, 17, 18]);

        game.claim(&ids[0], 3, CardType::A).unwrap();
        let outcome = game.dispute(&ids[1]).unwrap();

        assert_eq!(outcome.actual_count, 2);
        assert_eq!(outcome.loser.as_str(), "alice");
        assert_eq!(game.player(&ids[0]).unwrap().lives, 2);

        let Resolution::NewRound(deal) = outcome.resolution else {
            panic!("expected a new round");
        };
        assert_eq!(deal.first_player.as_str(), "alice");
        assert_eq!(deal.hands.len(), 3);
        assert_eq!(game.current_turn(), Some(ids[0]));
        assert!(game.pending_claim().is_none());
        assert_eq!(game.phase(), Phase::InRound);
    }

    #[test]
    fn test_counts_every_hand() {
        let (mut game, ids) = with_players(&["alice", "bob"]);
        game.start().unwrap();
        set_hand(&mut game, &ids[0], &[18, 0, 1, 2, 3]);
        set_hand(&mut game, &ids[1], &[19, 4, 5, 6, 7]);
        assert_eq!(game.count_card_type(CardType::D), 2);
        assert_eq!(game.count_card_type(CardType::A), 6);
        assert_eq!(game.count_card_type(CardType::C), 0);
    }

    #[test]
    fn test_non_positive_claim_always_holds() {
        let (mut game, ids) = with_players(&["alice", "bob"]);
        game.start().unwrap();
        set_hand(&mut game, &ids[0], &[0, 1, 2, 3, 4]);
        set_hand(&mut game, &ids[1], &[5, 6, 7, 8, 9]);

        game.claim(&ids[0], 0, CardType::C).unwrap();
        let outcome = game.dispute(&ids[1]).unwrap();
        assert_eq!(outcome.actual_count, 0);
        assert_eq!(outcome.loser.as_str(), "bob");
    }

    #[test]
    fn test_elimination_and_game_over() {
        let (mut game, ids) = with_players(&["alice", "bob"]);
        game.start().unwrap();
        game.players[0].lives = 1;

        game.claim(&ids[0], i64::MAX, CardType::A).unwrap();
        let outcome = game.dispute(&ids[1]).unwrap();

        assert_eq!(outcome.loser.as_str(), "alice");
        assert!(outcome.eliminated);
        assert_eq!(
            outcome.resolution,
            Resolution::GameOver {
                winner: "bob".into()
            }
        );
        assert_eq!(game.phase(), Phase::Finished);
        assert!(game.current_turn().is_none());
        assert!(game.pending_claim().is_none());
        assert_eq!(game.roster().len(), 2);
        assert!(game.roster()[0].eliminated);
        assert_eq!(game.dispute(&ids[1]), Err(MatchError::NoClaim));
    }

    #[test]
    fn test_eliminated_player_sits_out() {
        let (mut game, ids) = with_players(&["alice", "bob", "carol"]);
        game.start().unwrap();
        game.players[1].lives = 1;

        let kept = game.hand(&ids[1]).unwrap();

        game.claim(&ids[0], 0, CardType::B).unwrap();
        let outcome = game.dispute(&ids[1]).unwrap();
        assert!(outcome.eliminated);

        let Resolution::NewRound(deal) = outcome.resolution else {
            panic!("expected a new round");
        };
        assert_eq!(deal.hands.len(), 2);
        assert!(deal.hand_for(&ids[1]).is_none());
        assert_eq!(game.hand(&ids[1]), Some(kept));
        assert_eq!(game.hand(&ids[1]).unwrap().len(), HAND_SIZE);
        assert_eq!(game.roster().len(), 3);
        assert_eq!(game.living_count(), 2);

        let outcome = game.claim(&ids[0], 1, CardType::A).unwrap();
        assert_eq!(outcome.next_player.as_str(), "carol");
    }

    #[test]
    fn test_eliminated_hand_counts_in_later_disputes() {
        let (mut game, ids) = with_players(&["alice", "bob", "carol"]);
        game.start().unwrap();
        game.players[1].lives = 1;
        game.claim(&ids[0], 0, CardType::B).unwrap();
        assert!(game.dispute(&ids[1]).unwrap().eliminated);

        let total: usize = ids
            .iter()
            .map(|id| {
                game.hand(id)
                    .unwrap()
                    .iter()
                    .filter(|&&t| t == CardType::A)
                    .count()
            })
            .sum();
        assert_eq!(game.count_card_type(CardType::A), total);

        set_hand(&mut game, &ids[0], &[6, 7, 8, 12, 13]);
        set_hand(&mut game, &ids[1], &[18, 19, 0, 1, 2]);
        set_hand(&mut game, &ids[2], &[9, 10, 14, 15, 16]);

        game.claim(&ids[0], 2, CardType::D).unwrap();
        let outcome = game.dispute(&ids[2]).unwrap();
        assert_eq!(outcome.actual_count, 2);
        assert_eq!(outcome.loser.as_str(), "carol");
        assert_eq!(game.player(&ids[0]).unwrap().lives, 3);
    }

    #[test]
    fn test_leave_in_lobby() {
        let (mut game, ids) = with_players(&["alice", "bob"]);
        let outcome = game.leave(&ids[0]);
        assert_eq!(outcome.removed.unwrap().as_str(), "alice");
        assert_eq!(outcome.roster.len(), 1);
        assert_eq!(outcome.effect, LeaveEffect::None);

        let outcome = game.leave(&ids[0]);
        assert!(outcome.removed.is_none());
    }

    #[test]
    fn test_leave_passes_turn() {
        let (mut game, ids) = with_players(&["alice", "bob", "carol"]);
        game.start().unwrap();
        game.claim(&ids[0], 1, CardType::A).unwrap();

        let outcome = game.leave(&ids[1]);
        assert_eq!(
            outcome.effect,
            LeaveEffect::TurnPassed {
                next_player: "carol".into()
            }
        );
        assert_eq!(game.current_turn(), Some(ids[2]));
    }

    #[test]
    fn test_leave_last_in_rotation_wraps() {
        let (mut game, ids) = with_players(&["alice", "bob", "carol"]);
        game.start().unwrap();
        game.claim(&ids[0], 1, CardType::A).unwrap();
        game.claim(&ids[1], 2, CardType::A).unwrap();

        let outcome = game.leave(&ids[2]);
        assert_eq!(
            outcome.effect,
            LeaveEffect::TurnPassed {
                next_player: "alice".into()
            }
        );
    }

    #[test]
    fn test_leave_ends_match() {
        let (mut game, ids) = with_players(&["alice", "bob"]);
        game.start().unwrap();
        let outcome = game.leave(&ids[0]);
        assert_eq!(
            outcome.effect,
            LeaveEffect::GameOver {
                winner: Some("bob".into())
            }
        );
        assert_eq!(game.phase(), Phase::Finished);
    }

    #[test]
    fn test_restart_resets_lives() {
        let (mut game, ids) = with_players(&["alice", "bob"]);
        game.start().unwrap();
        game.players[0].lives = 1;
        game.claim(&ids[0], i64::MAX, CardType::A).unwrap();
        game.dispute(&ids[1]).unwrap();
        assert_eq!(game.phase(), Phase::Finished);

        let late = PlayerId::new();
        game.join(late, "carol").unwrap();
        let deal = game.start().unwrap();
        assert_eq!(deal.hands.len(), 3);
        assert!(game.players.iter().all(|p| p.lives == 3));
        assert_eq!(game.current_turn(), Some(ids[0]));
    }

    #[test]
    fn test_same_seed_same_deal() {
        let (mut first, first_ids) = with_players(&["alice", "bob"]);
        let (mut second, second_ids) = with_players(&["alice", "bob"]);
        first.start().unwrap();
        second.start().unwrap();
        assert_eq!(first.hand(&first_ids[0]), second.hand(&second_ids[0]));
        assert_eq!(first.hand(&first_ids[1]), second.hand(&second_ids[1]));
    }

    #[test]
    fn test_view_hides_other_hands() {
        let (mut game, ids) = with_players(&["alice", "bob"]);
        game.start().unwrap();
        let view = game.view(&ids[1]);
        assert_eq!(view.phase, Phase::InRound);
        assert_eq!(view.your_cards, game.hand(&ids[1]).unwrap());
        assert_eq!(view.current_player.unwrap().as_str(), "alice");
        assert!(view.players.iter().all(|p| p.card_count == HAND_SIZE));

        let stranger = game.view(&PlayerId::new());
        assert!(stranger.your_cards.is_empty());
    }

    #[test]
    fn test_settings_validation() {
        assert!(MatchSettings::default().validate().is_ok());
        let bad_lives = MatchSettings {
            starting_lives: 0,
            ..MatchSettings::default()
        };
        assert!(matches!(
            Match::with_settings(bad_lives),
            Err(MatchError::InvalidSettings(_))
        ));
        let too_many = MatchSettings {
            max_players: MAX_PLAYERS + 1,
            ..MatchSettings::default()
        };
        assert!(too_many.validate().is_err());
    }
}
