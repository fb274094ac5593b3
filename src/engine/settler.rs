//! Wager validation, outcome decision and payout.
//!
//! Everything here is pure: the engine supplies the prices and the clock,
//! the settler turns them into wagers, settlements and log lines.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::debug;

use crate::engine::price::format_price;
use crate::types::{DemoError, Direction, LogEntry, LogStyle, Outcome, Settlement, Wager, WagerId, WagerTicket};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WagerRules {
    /// Profit on a win as a fraction of the stake.
    pub payout_ratio: Decimal,
    pub min_amount: Decimal,
    /// Largest accepted stake. Keeps totals well inside `Decimal` range.
    pub max_amount: Decimal,
    pub min_expiry_secs: u32,
    pub max_expiry_secs: u32,
}

impl Default for WagerRules {
    fn default() -> Self {
        Self {
            payout_ratio: dec!(0.85),
            min_amount: dec!(10),
            max_amount: dec!(1000000),
            min_expiry_secs: 1,
            max_expiry_secs: 3600,
        }
    }
}

// ---------------------------------------------------------------------------
// Decision rule
// ---------------------------------------------------------------------------

/// Strict comparison in the wager's direction. An unchanged price loses
/// for both CALL and PUT.
pub fn decide(direction: Direction, entry_price: f64, exit_price: f64) -> Outcome {
    let won = match direction {
        Direction::Call => exit_price > entry_price,
        Direction::Put => exit_price < entry_price,
    };
    if won {
        Outcome::Win
    } else {
        Outcome::Loss
    }
}

// ---------------------------------------------------------------------------
// Settler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct WagerSettler {
    rules: WagerRules,
}

impl WagerSettler {
    pub fn new(rules: WagerRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &WagerRules {
        &self.rules
    }

    /// Parse the amount and check the stake and expiry against the rules.
    pub fn validate(&self, ticket: &WagerTicket) -> Result<Decimal, DemoError> {
        let amount = match ticket.amount.parse() {
            Some(a) if a >= self.rules.min_amount && a <= self.rules.max_amount => a,
            _ => {
                return Err(DemoError::InvalidWagerAmount {
                    input: ticket.amount.to_string(),
                    minimum: self.rules.min_amount,
                    maximum: self.rules.max_amount,
                })
            }
        };

        let secs = ticket.expiry_seconds;
        if secs < self.rules.min_expiry_secs || secs > self.rules.max_expiry_secs {
            return Err(DemoError::InvalidExpiry {
                seconds: secs,
                min: self.rules.min_expiry_secs,
                max: self.rules.max_expiry_secs,
            });
        }

        Ok(amount)
    }

    /// Create a wager snapshotting `entry_price`.
    pub fn open(
        &self,
        ticket: &WagerTicket,
        entry_price: f64,
        placed_at: DateTime<Utc>,
    ) -> Result<Wager, DemoError> {
        let amount = self.validate(ticket)?;
        Ok(Wager {
            id: WagerId::new(),
            direction: ticket.direction,
            amount,
            entry_price,
            duration_seconds: ticket.expiry_seconds,
            placed_at,
        })
    }

    /// Profit on a win, the stake on a loss.
    pub fn payout(&self, amount: Decimal, outcome: Outcome) -> Decimal {
        match outcome {
            Outcome::Win => amount * self.rules.payout_ratio,
            Outcome::Loss => amount,
        }
    }

    /// Decide a wager against the price at expiry.
    pub fn settle(&self, wager: &Wager, exit_price: f64, settled_at: DateTime<Utc>) -> Settlement {
        let outcome = decide(wager.direction, wager.entry_price, exit_price);
        let payout = self.payout(wager.amount, outcome);
        debug!(
            wager_id = %wager.id,
            entry = wager.entry_price,
            exit = exit_price,
            %outcome,
            "Wager decided"
        );
        Settlement {
            wager_id: wager.id,
            direction: wager.direction,
            amount: wager.amount,
            entry_price: wager.entry_price,
            exit_price,
            outcome,
            payout,
            settled_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Log lines
// ---------------------------------------------------------------------------

/// Money with two decimals, half-cents rounded away from zero.
pub fn format_money(amount: Decimal) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

pub fn placement_entry(wager: &Wager) -> LogEntry {
    LogEntry::new(
        format!(
            "Trade placed: {}. Waiting {}s...",
            wager, wager.duration_seconds
        ),
        LogStyle::Info,
    )
}

pub fn settlement_entry(settlement: &Settlement) -> LogEntry {
    let exit = format_price(settlement.exit_price);
    match settlement.outcome {
        Outcome::Win => LogEntry::new(
            format!("WIN! Profit: ${} (Exit: {exit})", format_money(settlement.payout)),
            LogStyle::Win,
        ),
        Outcome::Loss => LogEntry::new(
            format!("LOSS! -${} (Exit: {exit})", format_money(settlement.payout)),
            LogStyle::Loss,
        ),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
