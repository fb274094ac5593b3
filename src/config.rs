//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every field has a default, so a partial file (or no file at all)
//! yields the stock demo tunables.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::engine::chart::ChartGeometry;
use crate::engine::settler::WagerRules;
use crate::types::DemoError;
use crate::widgets::carousel::Testimonial;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: GeneralConfig,
    pub ticker: TickerConfig,
    pub chart: ChartConfig,
    pub wagers: WagersConfig,
    pub journal: JournalConfig,
    pub carousel: CarouselConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeneralConfig {
    pub name: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            name: "TICKERDEMO".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TickerConfig {
    pub tick_period_ms: u64,
    /// Each tick moves the price by a uniform draw from (-half_range, +half_range).
    pub delta_half_range: f64,
    pub start_price: f64,
    /// Fixed RNG seed for reproducible runs. Entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 200,
            delta_half_range: 0.00005,
            start_price: 1.09540,
            seed: None,
        }
    }
}

impl TickerConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChartConfig {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub step: f64,
    /// Total price span mapped onto the chart height.
    pub price_range: f64,
    /// Price plotted at the vertical centre of the chart.
    pub reference_price: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 300.0,
            margin: 5.0,
            step: 2.0,
            price_range: 0.00100,
            reference_price: 1.09540,
        }
    }
}

impl ChartConfig {
    pub fn geometry(&self) -> ChartGeometry {
        ChartGeometry {
            width: self.width,
            height: self.height,
            margin: self.margin,
            step: self.step,
            price_range: self.price_range,
            reference_price: self.reference_price,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WagersConfig {
    pub payout_ratio: Decimal,
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    pub min_expiry_secs: u32,
    pub max_expiry_secs: u32,
    /// Choices offered by the page's expiry selector.
    pub expiry_choices: Vec<u32>,
}

impl Default for WagersConfig {
    fn default() -> Self {
        Self {
            payout_ratio: dec!(0.85),
            min_amount: dec!(10),
            max_amount: dec!(1000000),
            min_expiry_secs: 1,
            max_expiry_secs: 3600,
            expiry_choices: vec![5, 10, 30, 60],
        }
    }
}

impl WagersConfig {
    pub fn rules(&self) -> WagerRules {
        WagerRules {
            payout_ratio: self.payout_ratio,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            min_expiry_secs: self.min_expiry_secs,
            max_expiry_secs: self.max_expiry_secs,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct JournalConfig {
    pub cap: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self { cap: 10 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CarouselConfig {
    pub period_ms: u64,
    pub slides: Vec<Testimonial>,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            period_ms: 6000,
            slides: vec![
                Testimonial::new("Maria K.", "The simulator taught me how fast a 30 second call can turn."),
                Testimonial::new("James O.", "Clean interface and instant results. Great for practice."),
                Testimonial::new("Priya S.", "I finally understand how expiry times change the odds."),
            ],
        }
    }
}

impl CarouselConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8080,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {path}"))?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            info!(path, "No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Reject tunables the engine cannot run with.
    pub fn validate(&self) -> Result<(), DemoError> {
        if self.ticker.tick_period_ms == 0 {
            return Err(DemoError::Config("ticker.tick_period_ms must be > 0".into()));
        }
        if !(self.ticker.delta_half_range.is_finite() && self.ticker.delta_half_range >= 0.0) {
            return Err(DemoError::Config("ticker.delta_half_range must be finite and >= 0".into()));
        }
        if !self.ticker.start_price.is_finite() {
            return Err(DemoError::Config("ticker.start_price must be finite".into()));
        }
        if !(self.chart.price_range > 0.0) {
            return Err(DemoError::Config("chart.price_range must be > 0".into()));
        }
        if self.chart.height <= 2.0 * self.chart.margin || self.chart.width <= 0.0 {
            return Err(DemoError::Config("chart must be larger than its margins".into()));
        }
        if self.wagers.payout_ratio <= Decimal::ZERO {
            return Err(DemoError::Config("wagers.payout_ratio must be > 0".into()));
        }
        if self.wagers.min_amount <= Decimal::ZERO || self.wagers.max_amount < self.wagers.min_amount {
            return Err(DemoError::Config("wagers amount bounds are inconsistent".into()));
        }
        if self.wagers.min_expiry_secs == 0 || self.wagers.min_expiry_secs > self.wagers.max_expiry_secs {
            return Err(DemoError::Config("wagers expiry bounds are inconsistent".into()));
        }
        if self.journal.cap == 0 {
            return Err(DemoError::Config("journal.cap must be > 0".into()));
        }
        if self.carousel.period_ms == 0 {
            return Err(DemoError::Config("carousel.period_ms must be > 0".into()));
        }
        Ok(())
    }
}
