//! End-to-end wager flows against a running engine.
//!
//! A pinned price source stands in for the random walk so every scenario
//! has a known entry and exit price. Time is paused; tokio advances the
//! clock whenever the runtime is idle.

use rust_decimal_macros::dec;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use tickerdemo::config::AppConfig;
use tickerdemo::engine::price::{PriceSource, PriceTick};
use tickerdemo::engine::{start_engine, EngineHandle, EngineSettings};
use tickerdemo::types::*;

/// Price source whose value is set directly by the test.
#[derive(Clone)]
pub struct PinnedPrice(Arc<Mutex<f64>>);

impl PinnedPrice {
    pub fn new(price: f64) -> Self {
        Self(Arc::new(Mutex::new(price)))
    }

    pub fn set(&self, price: f64) {
        *self.0.lock().unwrap() = price;
    }
}

impl PriceSource for PinnedPrice {
    fn current(&self) -> f64 {
        *self.0.lock().unwrap()
    }

    fn advance(&mut self) -> PriceTick {
        PriceTick::new(self.current(), 0.0)
    }
}

fn engine_at(price: f64) -> (EngineHandle, PinnedPrice) {
    let pinned = PinnedPrice::new(price);
    let engine = start_engine(
        Box::new(pinned.clone()),
        EngineSettings::from_config(&AppConfig::default()),
    );
    (engine, pinned)
}

async fn settle_one(direction: Direction, exit: f64) -> (Settlement, Vec<LogEntry>) {
    let (engine, pinned) = engine_at(1.09540);
    engine
        .place(WagerTicket::new(direction, "100", 1))
        .await
        .unwrap();
    pinned.set(exit);
    sleep(Duration::from_millis(1050)).await;

    let frame = engine.frame().await.unwrap();
    (frame.recent_settlements[0].clone(), frame.log)
}

#[tokio::test(start_paused = true)]
async fn test_call_profit_on_rise() {
    let (s, log) = settle_one(Direction::Call, 1.09550).await;
    assert_eq!(s.outcome, Outcome::Win);
    assert_eq!(s.payout, dec!(85));
    assert_eq!(log[0].message, "WIN! Profit: $85.00 (Exit: 1.09550)");
    assert_eq!(log[1].message, "Trade placed: CALL at 1.09540 for $100. Waiting 1s...");
}

#[tokio::test(start_paused = true)]
async fn test_call_loss_on_fall() {
    let (s, log) = settle_one(Direction::Call, 1.09530).await;
    assert_eq!(s.outcome, Outcome::Loss);
    assert_eq!(s.signed_pnl(), dec!(-100));
    assert_eq!(log[0].message, "LOSS! -$100.00 (Exit: 1.09530)");
}

#[tokio::test(start_paused = true)]
async fn test_put_profit_on_fall() {
    let (s, _) = settle_one(Direction::Put, 1.09530).await;
    assert_eq!(s.outcome, Outcome::Win);
    assert_eq!(s.payout, dec!(85));
}

#[tokio::test(start_paused = true)]
async fn test_tie_is_loss_for_both_directions() {
    for direction in [Direction::Call, Direction::Put] {
        let (s, log) = settle_one(direction, 1.09540).await;
        assert_eq!(s.outcome, Outcome::Loss, "{direction} tie must lose");
        assert_eq!(log[0].message, "LOSS! -$100.00 (Exit: 1.09540)");
        assert_eq!(log[0].style, LogStyle::Loss);
    }
}

#[tokio::test(start_paused = true)]
async fn test_wager_pending_until_expiry() {
    let (engine, pinned) = engine_at(1.09540);
    engine
        .place(WagerTicket::new(Direction::Call, "10", 5))
        .await
        .unwrap();

    pinned.set(1.1);
    sleep(Duration::from_secs(4)).await;
    let frame = engine.frame().await.unwrap();
    assert_eq!(frame.open_wagers.len(), 1);
    assert!(frame.recent_settlements.is_empty());

    sleep(Duration::from_millis(1100)).await;
    let frame = engine.frame().await.unwrap();
    assert!(frame.open_wagers.is_empty());
    assert_eq!(frame.recent_settlements.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_odd_stake_profit_rounds_to_cents() {
    let (engine, pinned) = engine_at(1.09540);
    engine
        .place(WagerTicket::new(Direction::Call, "12.34", 1))
        .await
        .unwrap();
    pinned.set(1.09550);
    sleep(Duration::from_millis(1050)).await;

    let frame = engine.frame().await.unwrap();
    assert_eq!(frame.recent_settlements[0].payout, dec!(10.489));
    assert_eq!(frame.log[0].message, "WIN! Profit: $10.49 (Exit: 1.09550)");
}

#[tokio::test(start_paused = true)]
async fn test_rejected_wager_leaves_no_trace() {
    let (engine, _pinned) = engine_at(1.09540);
    for amount in ["5", "abc", "9.99", "1000000.01", "50000000000000000000000000000"] {
        let err = engine
            .place(WagerTicket::new(Direction::Call, amount, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DemoError::InvalidWagerAmount { .. }));
    }

    let frame = engine.frame().await.unwrap();
    assert!(frame.log.is_empty());
    assert!(frame.markers.is_empty());
    assert!(frame.open_wagers.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_markers_clamped_inside_chart() {
    let (engine, pinned) = engine_at(5.0);
    engine
        .place(WagerTicket::new(Direction::Put, "10", 60))
        .await
        .unwrap();
    pinned.set(0.1);
    engine
        .place(WagerTicket::new(Direction::Call, "10", 60))
        .await
        .unwrap();

    let frame = engine.frame().await.unwrap();
    let g = frame.geometry;
    let tops: Vec<f64> = frame.markers.iter().map(|m| m.top).collect();
    assert_eq!(tops, vec![g.margin, g.height - g.margin]);
}

#[tokio::test(start_paused = true)]
async fn test_eleven_log_events_keep_ten() {
    let (engine, _pinned) = engine_at(1.09540);
    for i in 0..11 {
        engine
            .place(WagerTicket::new(Direction::Call, format!("{}", 10 + i).as_str(), 600))
            .await
            .unwrap();
    }
    let frame = engine.frame().await.unwrap();
    assert_eq!(frame.log.len(), 10);
    assert!(frame.log[0].message.contains("for $20."));
    assert!(frame.log[9].message.contains("for $11."));
}
