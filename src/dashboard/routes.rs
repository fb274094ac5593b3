//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DashboardState>`;
//! every engine read or write goes through the `EngineHandle`.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::config::AppConfig;
use crate::engine::runtime::{DisplayFrame, OpenWager, PriceView, SettledWager};
use crate::engine::EngineHandle;
use crate::types::{DemoError, LogEntry, Wager, WagerTicket};
use crate::widgets::carousel::{CarouselView, SharedCarousel};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub engine: EngineHandle,
    pub carousel: SharedCarousel,
    pub settings: PageSettings,
}

impl DashboardState {
    pub fn new(engine: EngineHandle, carousel: SharedCarousel, cfg: &AppConfig) -> Self {
        Self {
            engine,
            carousel,
            settings: PageSettings::from_config(cfg),
        }
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Static values the page needs to build its form.
#[derive(Debug, Clone, Serialize)]
pub struct PageSettings {
    pub name: String,
    pub min_amount: Decimal,
    pub payout_ratio: Decimal,
    pub expiry_choices: Vec<u32>,
    pub tick_period_ms: u64,
    pub carousel_period_ms: u64,
}

impl PageSettings {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            name: cfg.app.name.clone(),
            min_amount: cfg.wagers.min_amount,
            payout_ratio: cfg.wagers.payout_ratio,
            expiry_choices: cfg.wagers.expiry_choices.clone(),
            tick_period_ms: cfg.ticker.tick_period_ms,
            carousel_period_ms: cfg.carousel.period_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WagersResponse {
    pub open: Vec<OpenWager>,
    pub recent: Vec<SettledWager>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TickerResponse {
    pub ticking: bool,
    pub changed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectSlide {
    pub index: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Maps domain errors onto HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub DemoError);

impl From<DemoError> for ApiError {
    fn from(e: DemoError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DemoError::InvalidWagerAmount { .. }
            | DemoError::InvalidExpiry { .. }
            | DemoError::UnknownSlide { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            DemoError::EngineUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            DemoError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorBody { error: self.0.to_string() })).into_response()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/frame
pub async fn get_frame(State(state): State<AppState>) -> Result<Json<DisplayFrame>, ApiError> {
    Ok(Json(state.engine.frame().await?))
}

/// GET /api/price
pub async fn get_price(State(state): State<AppState>) -> Result<Json<PriceView>, ApiError> {
    Ok(Json(state.engine.frame().await?.ticker))
}

/// GET /api/log
pub async fn get_log(State(state): State<AppState>) -> Result<Json<Vec<LogEntry>>, ApiError> {
    Ok(Json(state.engine.frame().await?.log))
}

/// GET /api/wagers
pub async fn get_wagers(State(state): State<AppState>) -> Result<Json<WagersResponse>, ApiError> {
    let frame = state.engine.frame().await?;
    Ok(Json(WagersResponse {
        open: frame.open_wagers,
        recent: frame
            .recent_settlements
            .into_iter()
            .map(SettledWager::from)
            .collect(),
    }))
}

/// POST /api/wagers
pub async fn place_wager(
    State(state): State<AppState>,
    Json(ticket): Json<WagerTicket>,
) -> Result<(StatusCode, Json<Wager>), ApiError> {
    debug!(direction = %ticket.direction, amount = %ticket.amount, "Wager requested");
    let wager = state.engine.place(ticket).await?;
    Ok((StatusCode::CREATED, Json(wager)))
}

/// POST /api/ticker/start
pub async fn start_ticker(State(state): State<AppState>) -> Result<Json<TickerResponse>, ApiError> {
    let changed = state.engine.start_ticker().await?;
    Ok(Json(TickerResponse { ticking: true, changed }))
}

/// POST /api/ticker/stop
pub async fn stop_ticker(State(state): State<AppState>) -> Result<Json<TickerResponse>, ApiError> {
    let changed = state.engine.stop_ticker().await?;
    Ok(Json(TickerResponse { ticking: false, changed }))
}

/// GET /api/carousel
pub async fn get_carousel(State(state): State<AppState>) -> Json<CarouselView> {
    Json(state.carousel.read().await.view())
}

/// POST /api/carousel/select
pub async fn select_slide(
    State(state): State<AppState>,
    Json(req): Json<SelectSlide>,
) -> Result<Json<CarouselView>, ApiError> {
    let mut carousel = state.carousel.write().await;
    carousel.select(req.index)?;
    Ok(Json(carousel.view()))
}

/// GET /api/settings
pub async fn get_settings(State(state): State<AppState>) -> Json<PageSettings> {
    Json(state.settings.clone())
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
