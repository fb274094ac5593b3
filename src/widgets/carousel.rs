//! Testimonial carousel.
//!
//! Rotates through slides on a fixed period; a dot click jumps straight to
//! a slide without resetting the rotation timer.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::debug;

use crate::types::DemoError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub author: String,
    pub quote: String,
}

impl Testimonial {
    pub fn new(author: &str, quote: &str) -> Self {
        Self {
            author: author.to_string(),
            quote: quote.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CarouselView {
    pub active: usize,
    pub count: usize,
    /// Horizontal shift of the slide strip, in percent.
    pub offset_percent: i64,
    pub slides: Vec<Testimonial>,
}

#[derive(Debug, Clone)]
pub struct Carousel {
    slides: Vec<Testimonial>,
    index: usize,
}

impl Carousel {
    pub fn new(slides: Vec<Testimonial>) -> Self {
        Self { slides, index: 0 }
    }

    pub fn active(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Move to the next slide, wrapping to the first. No-op when empty.
    pub fn advance(&mut self) -> usize {
        if !self.slides.is_empty() {
            self.index = (self.index + 1) % self.slides.len();
        }
        self.index
    }

    /// Jump to a slide chosen by the user.
    pub fn select(&mut self, index: usize) -> Result<usize, DemoError> {
        if index >= self.slides.len() {
            return Err(DemoError::UnknownSlide {
                index,
                count: self.slides.len(),
            });
        }
        self.index = index;
        Ok(index)
    }

    pub fn view(&self) -> CarouselView {
        CarouselView {
            active: self.index,
            count: self.slides.len(),
            offset_percent: -(self.index as i64) * 100,
            slides: self.slides.clone(),
        }
    }
}

pub type SharedCarousel = Arc<RwLock<Carousel>>;

/// Advance the carousel every `period` until the task is aborted.
/// The task ends on its own if the carousel has no slides.
pub fn spawn_autoplay(carousel: SharedCarousel, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        loop {
            ticker.tick().await;
            let mut c = carousel.write().await;
            if c.is_empty() {
                break;
            }
            let active = c.advance();
            debug!(active, "Carousel advanced");
        }
    })
}
