use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use uuid::Uuid;

use super::constants::{DECK_SIZE, MAX_NAME_LENGTH};

/// The four public card categories. Every token in the deck maps to exactly
/// one of these, and they are the only card representation that leaves the
/// engine.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum CardType {
    A,
    B,
    C,
    D,
}

impl CardType {
    pub const ALL: [CardType; 4] = [Self::A, Self::B, Self::C, Self::D];

    /// Classify a token by the fixed partition
    /// `A = 0..=5`, `B = 6..=11`, `C = 12..=17`, `D = 18..=19`.
    #[must_use]
    pub const fn of(token: Token) -> Self {
        match token.0 {
            0..=5 => Self::A,
            6..=11 => Self::B,
            12..=17 => Self::C,
            _ => Self::D,
        }
    }

    /// How many tokens of this type a full deck holds.
    #[must_use]
    pub const fn deck_count(self) -> usize {
        match self {
            Self::A | Self::B | Self::C => 6,
            Self::D => 2,
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        };
        write!(f, "{repr}")
    }
}

#[derive(Debug, Eq, Error, PartialEq)]
#[error("unknown card type: {0:?}")]
pub struct ParseCardTypeError(String);

impl FromStr for CardType {
    type Err = ParseCardTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            "C" | "c" => Ok(Self::C),
            "D" | "d" => Ok(Self::D),
            other => Err(ParseCardTypeError(other.to_string())),
        }
    }
}

/// A numbered card token. Tokens stay inside the engine; callers only ever
/// see the [`CardType`] they map to.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Token(u8);

impl Token {
    #[must_use]
    pub fn new(value: u8) -> Option<Self> {
        (usize::from(value) < DECK_SIZE).then_some(Self(value))
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn card_type(self) -> CardType {
        CardType::of(self)
    }
}

/// A round's deck. Rebuilt and reshuffled every round, then consumed from
/// the front while dealing. Leftover tokens are never looked at again.
#[derive(Clone, Debug, Default)]
pub struct Deck {
    tokens: Vec<Token>,
}

impl Deck {
    /// Build all [`DECK_SIZE`] tokens and shuffle them into a uniformly
    /// random permutation.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut tokens: Vec<Token> = (0..DECK_SIZE as u8).map(Token).collect();
        tokens.shuffle(rng);
        Self { tokens }
    }

    /// Take `n` tokens off the front of the deck, or nothing if fewer
    /// than `n` remain.
    pub fn deal(&mut self, n: usize) -> Option<Vec<Token>> {
        if self.tokens.len() < n {
            return None;
        }
        Some(self.tokens.drain(..n).collect())
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

/// Opaque player identity handed out by the transport.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlayerId(Uuid);

impl PlayerId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(s: &str) -> Self {
        let name: String = s
            .trim()
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .take(MAX_NAME_LENGTH)
            .collect();
        if name.is_empty() {
            return Self("anonymous".to_string());
        }
        Self(name)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for PlayerName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<&str> for PlayerName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PlayerName {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

/// A rostered player. Eliminated players keep their seat in the roster
/// but no longer take turns or receive cards.
#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: PlayerName,
    /// Can drop below zero; anything `<= 0` counts as eliminated.
    pub lives: i32,
    pub(crate) hand: Vec<Token>,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, name: PlayerName, lives: i32) -> Self {
        Self {
            id,
            name,
            lives,
            hand: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }

    #[must_use]
    pub fn hand(&self) -> &[Token] {
        &self.hand
    }

    #[must_use]
    pub fn card_types(&self) -> Vec<CardType> {
        self.hand.iter().map(|token| token.card_type()).collect()
    }

    #[must_use]
    pub fn count(&self, card_type: CardType) -> usize {
        self.hand
            .iter()
            .filter(|token| token.card_type() == card_type)
            .count()
    }

    #[must_use]
    pub fn summary(&self) -> PlayerSummary {
        PlayerSummary {
            name: self.name.clone(),
            lives: self.lives,
            eliminated: !self.is_alive(),
            card_count: self.hand.len(),
        }
    }
}

/// The pending, undisputed claim.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Claim {
    pub claimant: PlayerId,
    /// Lower bound the claimant asserts on the number of `card_type`
    /// cards across all hands.
    pub amount: i64,
    pub card_type: CardType,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Lobby,
    InRound,
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Lobby => "lobby",
            Self::InRound => "in round",
            Self::Finished => "finished",
        };
        write!(f, "{repr}")
    }
}

/// Public roster entry. Carries the hand size but never the cards.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerSummary {
    pub name: PlayerName,
    pub lives: i32,
    pub eliminated: bool,
    pub card_count: usize,
}

/// One living player's freshly dealt cards, meant for that player only.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DealtHand {
    pub player: PlayerId,
    pub cards: Vec<CardType>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundDeal {
    pub first_player: PlayerName,
    pub hands: Vec<DealtHand>,
}

impl RoundDeal {
    #[must_use]
    pub fn hand_for(&self, player: &PlayerId) -> Option<&[CardType]> {
        self.hands
            .iter()
            .find(|hand| hand.player == *player)
            .map(|hand| hand.cards.as_slice())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimOutcome {
    pub claimant: PlayerName,
    pub next_player: PlayerName,
    pub amount: i64,
    pub card_type: CardType,
}

/// What follows a resolved dispute. Exactly one of these happens.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Resolution {
    GameOver { winner: PlayerName },
    NewRound(RoundDeal),
}

impl Resolution {
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        matches!(self, Self::GameOver { .. })
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DisputeOutcome {
    pub disputer: PlayerName,
    pub disputed: PlayerName,
    pub loser: PlayerName,
    pub actual_count: usize,
    pub claimed: i64,
    pub card_type: CardType,
    /// Whether the loser ran out of lives.
    pub eliminated: bool,
    pub resolution: Resolution,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LeaveEffect {
    None,
    TurnPassed { next_player: PlayerName },
    GameOver { winner: Option<PlayerName> },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LeaveOutcome {
    pub removed: Option<PlayerName>,
    pub roster: Vec<PlayerSummary>,
    pub effect: LeaveEffect,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ClaimView {
    pub claimant: PlayerName,
    pub amount: i64,
    pub card_type: CardType,
}

/// The match as one player is allowed to see it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MatchView {
    pub phase: Phase,
    pub players: Vec<PlayerSummary>,
    pub current_player: Option<PlayerName>,
    pub pending_claim: Option<ClaimView>,
    pub your_cards: Vec<CardType>,
}
