//! Shared types for the ticker demo.
//!
//! These types form the data model used across the engine, the widgets
//! and the dashboard. They carry no behaviour beyond formatting helpers
//! so every other module can depend on them freely.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Wager direction: CALL bets the price rises, PUT bets it falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Call,
    Put,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Call => write!(f, "CALL"),
            Direction::Put => write!(f, "PUT"),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Win,
    Loss,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win => write!(f, "WIN"),
            Outcome::Loss => write!(f, "LOSS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tone
// ---------------------------------------------------------------------------

/// Colour tag for the last price move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Up,
    Down,
    Neutral,
}

impl Tone {
    /// Classify a price delta by its sign.
    pub fn from_delta(delta: f64) -> Self {
        if delta > 0.0 {
            Tone::Up
        } else if delta < 0.0 {
            Tone::Down
        } else {
            Tone::Neutral
        }
    }

    /// CSS colour used by the page for this tone.
    pub fn color(&self) -> &'static str {
        match self {
            Tone::Up => "#4CAF50",
            Tone::Down => "#F44336",
            Tone::Neutral => "#f0f0f0",
        }
    }
}

// ---------------------------------------------------------------------------
// Wagers
// ---------------------------------------------------------------------------

/// Identifier generated for every placed wager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WagerId(pub Uuid);

impl WagerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WagerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Investment amount as typed by the user: a JSON number or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    /// Parse into a decimal amount. `None` when the input is not a finite number.
    pub fn parse(&self) -> Option<Decimal> {
        match self {
            AmountInput::Number(n) if n.is_finite() => Decimal::from_f64(*n),
            AmountInput::Number(_) => None,
            AmountInput::Text(s) => {
                let s = s.trim();
                Decimal::from_str(s)
                    .or_else(|_| Decimal::from_scientific(s))
                    .ok()
            }
        }
    }
}

impl fmt::Display for AmountInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountInput::Number(n) => write!(f, "{n}"),
            AmountInput::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for AmountInput {
    fn from(s: &str) -> Self {
        AmountInput::Text(s.to_string())
    }
}

impl From<f64> for AmountInput {
    fn from(n: f64) -> Self {
        AmountInput::Number(n)
    }
}

/// A wager request as submitted by the input surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WagerTicket {
    pub direction: Direction,
    pub amount: AmountInput,
    pub expiry_seconds: u32,
}

impl WagerTicket {
    pub fn new(direction: Direction, amount: impl Into<AmountInput>, expiry_seconds: u32) -> Self {
        Self {
            direction,
            amount: amount.into(),
            expiry_seconds,
        }
    }
}

/// An accepted wager. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wager {
    pub id: WagerId,
    pub direction: Direction,
    pub amount: Decimal,
    pub entry_price: f64,
    pub duration_seconds: u32,
    pub placed_at: DateTime<Utc>,
}

impl Wager {
    /// When the settlement timer is due.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.placed_at + chrono::Duration::seconds(i64::from(self.duration_seconds))
    }
}

impl fmt::Display for Wager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {:.5} for ${}",
            self.direction,
            self.entry_price,
            self.amount.normalize(),
        )
    }
}

/// Lifecycle of a wager. Placement and scheduling happen in one engine
/// step, so an accepted wager is pending straight away. There is no
/// cancelled state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WagerStatus {
    Pending,
    Settled,
}

/// The single, final result of a wager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub wager_id: WagerId,
    pub direction: Direction,
    pub amount: Decimal,
    pub entry_price: f64,
    pub exit_price: f64,
    pub outcome: Outcome,
    /// Profit on a win, the full stake on a loss. Always non-negative.
    pub payout: Decimal,
    pub settled_at: DateTime<Utc>,
}

impl Settlement {
    /// Profit or loss with the sign applied.
    pub fn signed_pnl(&self) -> Decimal {
        match self.outcome {
            Outcome::Win => self.payout,
            Outcome::Loss => -self.payout,
        }
    }

    pub fn is_win(&self) -> bool {
        self.outcome == Outcome::Win
    }
}

// ---------------------------------------------------------------------------
// Activity log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStyle {
    Info,
    Win,
    Loss,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub style: LogStyle,
}

impl LogEntry {
    pub fn new(message: impl Into<String>, style: LogStyle) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
            style,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for the demo.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DemoError {
    #[error("Please enter a valid investment amount (min ${minimum}).")]
    InvalidWagerAmount {
        input: String,
        minimum: Decimal,
        maximum: Decimal,
    },

    #[error("Invalid expiry: {seconds}s (allowed {min}s to {max}s)")]
    InvalidExpiry { seconds: u32, min: u32, max: u32 },

    #[error("Unknown slide {index} (carousel has {count})")]
    UnknownSlide { index: usize, count: usize },

    #[error("Engine is not running")]
    EngineUnavailable,

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
