//! Chart geometry and the scrolling price trail.
//!
//! Prices are mapped linearly onto the chart height around a reference
//! price, then clamped to stay `margin` pixels inside the container. The
//! same mapping positions entry markers, so markers and trail line up.

use serde::Serialize;
use std::collections::VecDeque;

use crate::types::{Tone, WagerId};

/// Pixel geometry of the chart container plus the price window it shows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    /// Horizontal distance each point travels per tick.
    pub step: f64,
    pub price_range: f64,
    pub reference_price: f64,
}

impl ChartGeometry {
    /// Height above the chart floor, clamped to the margins.
    pub fn plot_y(&self, price: f64) -> f64 {
        let floor_price = self.reference_price - self.price_range / 2.0;
        let y = (price - floor_price) / self.price_range * self.height;
        y.min(self.height - self.margin).max(self.margin)
    }

    /// Offset from the chart top, which is what the page positions by.
    pub fn plot_top(&self, price: f64) -> f64 {
        self.height - self.plot_y(price)
    }
}

/// One plotted sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailPoint {
    /// Distance from the right edge of the chart.
    pub right: f64,
    pub top: f64,
    pub tone: Tone,
    pub color: &'static str,
}

/// Horizontal line marking an open wager's entry price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryMarker {
    pub wager_id: WagerId,
    pub top: f64,
    pub entry_price: f64,
}

/// Time-ordered plot samples, oldest at the front.
#[derive(Debug, Clone)]
pub struct Trail {
    geometry: ChartGeometry,
    points: VecDeque<TrailPoint>,
}

impl Trail {
    pub fn new(geometry: ChartGeometry) -> Self {
        Self {
            geometry,
            points: VecDeque::new(),
        }
    }

    pub fn geometry(&self) -> &ChartGeometry {
        &self.geometry
    }

    /// Append a sample at the right edge, scroll everything left by one
    /// step and evict whatever scrolled past the chart width.
    pub fn push(&mut self, price: f64, tone: Tone) {
        self.points.push_back(TrailPoint {
            right: 0.0,
            top: self.geometry.plot_top(price),
            tone,
            color: tone.color(),
        });

        let step = self.geometry.step;
        let width = self.geometry.width;
        for point in self.points.iter_mut() {
            point.right += step;
        }
        self.points.retain(|p| p.right <= width);
    }

    /// Entry marker for a wager, positioned with the trail's mapping.
    pub fn marker(&self, wager_id: WagerId, entry_price: f64) -> EntryMarker {
        EntryMarker {
            wager_id,
            top: self.geometry.plot_top(entry_price),
            entry_price,
        }
    }

    pub fn points(&self) -> Vec<TrailPoint> {
        self.points.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
