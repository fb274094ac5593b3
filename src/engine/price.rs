//! Simulated price source.
//!
//! The engine owns a `PriceSource` and is the only caller of `advance()`.
//! `RandomWalk` is the stock implementation: an unbounded random walk
//! with uniform steps. Nothing clamps the price, so long runs drift.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::config::TickerConfig;
use crate::types::Tone;

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceTick {
    pub price: f64,
    pub delta: f64,
    pub tone: Tone,
}

impl PriceTick {
    pub fn new(price: f64, delta: f64) -> Self {
        Self {
            price,
            delta,
            tone: Tone::from_delta(delta),
        }
    }

    /// Price as shown on the ticker.
    pub fn text(&self) -> String {
        format_price(self.price)
    }
}

/// Fixed five-decimal price formatting.
pub fn format_price(price: f64) -> String {
    format!("{price:.5}")
}

/// Abstraction over anything that can publish a current price and move it.
#[cfg_attr(test, mockall::automock)]
pub trait PriceSource: Send {
    /// Latest published price.
    fn current(&self) -> f64;

    /// Move the price by one tick and return the new state.
    fn advance(&mut self) -> PriceTick;
}

/// Uniform random walk around a starting price.
pub struct RandomWalk {
    price: f64,
    half_range: f64,
    rng: StdRng,
}

impl RandomWalk {
    pub fn new(start_price: f64, half_range: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            price: start_price,
            half_range: half_range.abs(),
            rng,
        }
    }

    pub fn from_config(cfg: &TickerConfig) -> Self {
        Self::new(cfg.start_price, cfg.delta_half_range, cfg.seed)
    }

    fn draw_delta(&mut self) -> f64 {
        if self.half_range == 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-self.half_range..self.half_range)
    }
}

impl PriceSource for RandomWalk {
    fn current(&self) -> f64 {
        self.price
    }

    fn advance(&mut self) -> PriceTick {
        let delta = self.draw_delta();
        self.price += delta;
        PriceTick::new(self.price, delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price_five_decimals() {
        assert_eq!(format_price(1.0954), "1.09540");
        assert_eq!(format_price(1.095456), "1.09546");
    }

    #[test]
    fn test_tick_tone_follows_delta() {
        assert_eq!(PriceTick::new(1.1, 0.00002).tone, Tone::Up);
        assert_eq!(PriceTick::new(1.1, -0.00002).tone, Tone::Down);
        assert_eq!(PriceTick::new(1.1, 0.0).tone, Tone::Neutral);
    }

    #[test]
    fn test_deltas_stay_within_half_range() {
        let mut walk = RandomWalk::new(1.09540, 0.00005, Some(7));
        let mut last = walk.current();
        for _ in 0..10_000 {
            let tick = walk.advance();
            assert!(tick.delta.abs() <= 0.00005);
            assert!((tick.price - (last + tick.delta)).abs() < 1e-12);
            assert!(tick.price.is_finite());
            assert_eq!(walk.current(), tick.price);
            last = tick.price;
        }
    }

    #[test]
    fn test_seeded_walks_repeat() {
        let mut a = RandomWalk::new(1.09540, 0.00005, Some(99));
        let mut b = RandomWalk::new(1.09540, 0.00005, Some(99));
        for _ in 0..100 {
            assert_eq!(a.advance(), b.advance());
        }
    }

    #[test]
    fn test_zero_half_range_is_flat() {
        let mut walk = RandomWalk::new(1.5, 0.0, None);
        let tick = walk.advance();
        assert_eq!(tick.delta, 0.0);
        assert_eq!(tick.tone, Tone::Neutral);
        assert_eq!(walk.current(), 1.5);
    }

    #[test]
    fn test_mock_source_is_usable_as_trait_object() {
        let mut mock = MockPriceSource::new();
        mock.expect_current().return_const(1.2345);
        let source: Box<dyn PriceSource> = Box::new(mock);
        assert_eq!(source.current(), 1.2345);
    }
}
