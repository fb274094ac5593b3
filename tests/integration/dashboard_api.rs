//! Dashboard API exercised through the router, as a browser would.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceExt;

use tickerdemo::config::AppConfig;
use tickerdemo::dashboard::build_router;
use tickerdemo::dashboard::routes::{AppState, DashboardState};
use tickerdemo::engine::price::RandomWalk;
use tickerdemo::engine::{start_engine, EngineSettings};
use tickerdemo::widgets::carousel::Carousel;

fn app_state() -> AppState {
    let mut cfg = AppConfig::default();
    cfg.ticker.seed = Some(2024);
    let engine = start_engine(
        Box::new(RandomWalk::from_config(&cfg.ticker)),
        EngineSettings::from_config(&cfg),
    );
    let carousel = Arc::new(RwLock::new(Carousel::new(cfg.carousel.slides.clone())));
    Arc::new(DashboardState::new(engine, carousel, &cfg))
}

async fn send(state: &AppState, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let resp = build_router(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_place_then_list_wagers() {
    let state = app_state();

    let (status, wager) = send(
        &state,
        post("/api/wagers", r#"{"direction":"CALL","amount":"100","expiry_seconds":60}"#),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, wagers) = send(&state, get("/api/wagers")).await;
    assert_eq!(status, StatusCode::OK);
    let open = wagers["open"].as_array().unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0]["id"], wager["id"]);
    assert_eq!(open[0]["status"], "pending");

    let (_, frame) = send(&state, get("/api/frame")).await;
    assert_eq!(frame["markers"].as_array().unwrap().len(), 1);
    let log = frame["log"].as_array().unwrap();
    assert!(log[0]["message"].as_str().unwrap().starts_with("Trade placed: CALL"));
}

#[tokio::test]
async fn test_invalid_amount_is_rejected_without_side_effects() {
    let state = app_state();

    let (status, body) = send(
        &state,
        post("/api/wagers", r#"{"direction":"PUT","amount":"5","expiry_seconds":10}"#),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("min $10"));

    let (_, log) = send(&state, get("/api/log")).await;
    assert!(log.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_expiry_is_rejected() {
    let state = app_state();
    let (status, body) = send(
        &state,
        post("/api/wagers", r#"{"direction":"PUT","amount":50,"expiry_seconds":0}"#),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid expiry"));
}

#[tokio::test]
async fn test_ticker_lifecycle() {
    let state = app_state();

    let (_, stopped) = send(&state, post("/api/ticker/stop", "")).await;
    assert_eq!(stopped["changed"], true);
    let (_, again) = send(&state, post("/api/ticker/stop", "")).await;
    assert_eq!(again["changed"], false);

    let (_, frame) = send(&state, get("/api/frame")).await;
    assert_eq!(frame["ticking"], false);

    let (_, started) = send(&state, post("/api/ticker/start", "")).await;
    assert_eq!(started["ticking"], true);
    assert_eq!(started["changed"], true);
}

#[tokio::test]
async fn test_price_and_settings() {
    let state = app_state();

    let (status, price) = send(&state, get("/api/price")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(price["text"].as_str().unwrap().len(), 7);

    let (_, settings) = send(&state, get("/api/settings")).await;
    assert_eq!(settings["tick_period_ms"], 200);
    assert_eq!(settings["carousel_period_ms"], 6000);
}

#[tokio::test]
async fn test_engine_gone_maps_to_503() {
    let state = app_state();
    state.engine.shutdown().await.unwrap();

    let (status, body) = send(&state, get("/api/frame")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Engine is not running");
}

#[tokio::test]
async fn test_unknown_slide_is_rejected() {
    let state = app_state();
    let (status, _) = send(&state, post("/api/carousel/select", r#"{"index":42}"#)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, carousel) = send(&state, get("/api/carousel")).await;
    assert_eq!(carousel["active"], 0);
}
