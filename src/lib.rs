//! TICKERDEMO: simulated price ticker with timed call/put wagers.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod engine;
pub mod widgets;
pub mod dashboard;
