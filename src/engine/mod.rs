//! Core engine: price ticks, chart trail, wager lifecycle and the
//! activity log, all driven from one task.

pub mod price;
pub mod chart;
pub mod journal;
pub mod settler;
pub mod runtime;

pub use runtime::{start_engine, DisplayFrame, EngineHandle, EngineSettings, EngineSummary};
