//! Integration test harness.

mod dashboard_api;
mod wager_flow;
