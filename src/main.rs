//! TICKERDEMO: simulated price ticker with timed call/put wagers.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! starts the engine and the page widgets, serves the dashboard and runs
//! until Ctrl+C.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use tickerdemo::config;
use tickerdemo::dashboard::{self, routes::DashboardState};
use tickerdemo::engine::price::RandomWalk;
use tickerdemo::engine::settler::format_money;
use tickerdemo::engine::{start_engine, EngineSettings};
use tickerdemo::widgets::carousel::{spawn_autoplay, Carousel};

const BANNER: &str = r#"
 _____ ___ ____ _  _______ ____  ____  _____ __  __  ___
|_   _|_ _/ ___| |/ / ____|  _ \|  _ \| ____|  \/  |/ _ \
  | |  | | |   | ' /|  _| | |_) | | | |  _| | |\/| | | | |
  | |  | | |___| . \| |___|  _ <| |_| | |___| |  | | |_| |
  |_| |___\____|_|\_\_____|_| \_\____/|_____|_|  |_|\___/

  Simulated ticker · timed CALL/PUT wagers
  v0.1.0
"#;

const DEFAULT_CONFIG: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path =
        std::env::var("TICKERDEMO_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG.to_string());

    init_logging();

    let cfg = config::AppConfig::load_or_default(&config_path)?;

    println!("{BANNER}");
    info!(
        name = %cfg.app.name,
        start_price = cfg.ticker.start_price,
        tick_period_ms = cfg.ticker.tick_period_ms,
        payout_ratio = %cfg.wagers.payout_ratio,
        min_amount = %cfg.wagers.min_amount,
        seeded = cfg.ticker.seed.is_some(),
        "TICKERDEMO starting up"
    );

    // -- Engine ----------------------------------------------------------

    let engine = start_engine(
        Box::new(RandomWalk::from_config(&cfg.ticker)),
        EngineSettings::from_config(&cfg),
    );

    // -- Widgets ---------------------------------------------------------

    let carousel = Arc::new(RwLock::new(Carousel::new(cfg.carousel.slides.clone())));
    let autoplay = spawn_autoplay(carousel.clone(), cfg.carousel.period());

    // -- Dashboard -------------------------------------------------------

    let server = if cfg.dashboard.enabled {
        let state = Arc::new(DashboardState::new(engine.clone(), carousel, &cfg));
        Some(
            dashboard::spawn_dashboard(state, cfg.dashboard.port)
                .await
                .context("Dashboard failed to start")?,
        )
    } else {
        warn!("Dashboard disabled, the engine runs headless");
        None
    };

    info!("Running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;
    info!("Shutdown signal received.");

    // -- Teardown --------------------------------------------------------

    if let Some(server) = server {
        server.abort();
    }
    autoplay.abort();

    engine.stop_ticker().await?;
    let summary = engine.shutdown().await?;
    info!(
        ticks = summary.ticks,
        wagers = summary.wagers_placed,
        wins = summary.wins,
        losses = summary.losses,
        pnl = format!("${}", format_money(summary.net_pnl)),
        aborted = summary.pending_aborted,
        last_price = format!("{:.5}", summary.last_price),
        "TICKERDEMO shut down cleanly."
    );

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tickerdemo=info"));

    let json_logging = std::env::var("TICKERDEMO_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
