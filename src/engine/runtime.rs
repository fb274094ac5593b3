//! Engine runtime: one task owns the price source, the chart trail, the
//! activity log and the registry of pending wagers.
//!
//! Ticks, commands from handles and settlement wake-ups all go through the
//! same queue, so a settlement always reads the price left by the last
//! completed tick. Each pending wager keeps the abort handle of its own
//! sleeper task; the sleeper only posts `Settle` back into the queue.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::AbortHandle;
use tokio::time::{interval_at, sleep, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::config::AppConfig;
use crate::engine::chart::{ChartGeometry, EntryMarker, Trail, TrailPoint};
use crate::engine::journal::ActivityLog;
use crate::engine::price::{format_price, PriceSource};
use crate::engine::settler::{
    format_money, placement_entry, settlement_entry, WagerRules, WagerSettler,
};
use crate::types::{DemoError, LogEntry, Settlement, Tone, Wager, WagerId, WagerStatus, WagerTicket};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub tick_period: Duration,
    pub geometry: ChartGeometry,
    pub rules: WagerRules,
    pub log_cap: usize,
}

impl EngineSettings {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            tick_period: cfg.ticker.tick_period(),
            geometry: cfg.chart.geometry(),
            rules: cfg.wagers.rules(),
            log_cap: cfg.journal.cap,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// What the ticker widget shows.
#[derive(Debug, Clone, Serialize)]
pub struct PriceView {
    pub price: f64,
    pub text: String,
    pub tone: Tone,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenWager {
    #[serde(flatten)]
    pub wager: Wager,
    pub status: WagerStatus,
    pub expires_at: DateTime<Utc>,
}

/// A settled wager as reported to the page.
#[derive(Debug, Clone, Serialize)]
pub struct SettledWager {
    #[serde(flatten)]
    pub settlement: Settlement,
    pub status: WagerStatus,
}

impl From<Settlement> for SettledWager {
    fn from(settlement: Settlement) -> Self {
        Self {
            settlement,
            status: WagerStatus::Settled,
        }
    }
}

/// Everything the display surface needs to redraw.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayFrame {
    pub ticker: PriceView,
    pub ticking: bool,
    pub ticks: u64,
    pub geometry: ChartGeometry,
    pub trail: Vec<TrailPoint>,
    pub markers: Vec<EntryMarker>,
    pub log: Vec<LogEntry>,
    pub open_wagers: Vec<OpenWager>,
    /// Most recent settlements, newest first.
    pub recent_settlements: Vec<Settlement>,
}

/// Totals reported when the engine shuts down.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EngineSummary {
    pub ticks: u64,
    pub wagers_placed: u64,
    pub wins: u64,
    pub losses: u64,
    pub net_pnl: Decimal,
    pub pending_aborted: usize,
    pub last_price: f64,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum EngineCommand {
    Place {
        ticket: WagerTicket,
        reply: oneshot::Sender<Result<Wager, DemoError>>,
    },

    // sleeper task -> engine
    Settle {
        id: WagerId,
    },

    Frame {
        reply: oneshot::Sender<DisplayFrame>,
    },

    SetTicking {
        running: bool,
        reply: oneshot::Sender<bool>,
    },

    Shutdown {
        reply: oneshot::Sender<EngineSummary>,
    },
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Cloneable front door to a running engine.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> EngineCommand,
    ) -> Result<T, DemoError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| DemoError::EngineUnavailable)?;
        rx.await.map_err(|_| DemoError::EngineUnavailable)
    }

    /// Place a wager at the current price. Validation errors leave the
    /// engine untouched.
    pub async fn place(&self, ticket: WagerTicket) -> Result<Wager, DemoError> {
        self.request(|reply| EngineCommand::Place { ticket, reply }).await?
    }

    pub async fn frame(&self) -> Result<DisplayFrame, DemoError> {
        self.request(|reply| EngineCommand::Frame { reply }).await
    }

    /// Resume the recurring tick. Returns whether the ticker was stopped.
    pub async fn start_ticker(&self) -> Result<bool, DemoError> {
        self.request(|reply| EngineCommand::SetTicking { running: true, reply })
            .await
    }

    /// Halt the recurring tick. Pending wagers still settle, against the
    /// last published price.
    pub async fn stop_ticker(&self) -> Result<bool, DemoError> {
        self.request(|reply| EngineCommand::SetTicking { running: false, reply })
            .await
    }

    /// Stop the engine and abort every pending settlement timer.
    pub async fn shutdown(&self) -> Result<EngineSummary, DemoError> {
        self.request(|reply| EngineCommand::Shutdown { reply }).await
    }
}

/// Spawn the engine task. Must be called inside a tokio runtime.
pub fn start_engine(source: Box<dyn PriceSource>, settings: EngineSettings) -> EngineHandle {
    let (tx, rx) = mpsc::channel::<EngineCommand>(1024);
    let core = EngineCore::new(source, settings, tx.downgrade());
    tokio::spawn(core.run(rx));
    EngineHandle { tx }
}

// ---------------------------------------------------------------------------
// Core
// ---------------------------------------------------------------------------

struct PendingWager {
    seq: u64,
    wager: Wager,
    marker: EntryMarker,
    timer: AbortHandle,
}

struct EngineCore {
    source: Box<dyn PriceSource>,
    settler: WagerSettler,
    trail: Trail,
    log: ActivityLog,
    pending: HashMap<WagerId, PendingWager>,
    recent: VecDeque<Settlement>,
    last_tone: Tone,
    ticking: bool,
    tick_period: Duration,
    summary: EngineSummary,
    self_tx: mpsc::WeakSender<EngineCommand>,
}

impl EngineCore {
    fn new(
        source: Box<dyn PriceSource>,
        settings: EngineSettings,
        self_tx: mpsc::WeakSender<EngineCommand>,
    ) -> Self {
        Self {
            source,
            settler: WagerSettler::new(settings.rules),
            trail: Trail::new(settings.geometry),
            log: ActivityLog::new(settings.log_cap),
            pending: HashMap::new(),
            recent: VecDeque::new(),
            last_tone: Tone::Neutral,
            ticking: true,
            tick_period: settings.tick_period,
            summary: EngineSummary::default(),
            self_tx,
        }
    }

    async fn run(mut self, mut rx: mpsc::Receiver<EngineCommand>) {
        let mut ticker = interval_at(Instant::now() + self.tick_period, self.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            price = %format_price(self.source.current()),
            period_ms = self.tick_period.as_millis() as u64,
            "Engine started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick(), if self.ticking => self.on_tick(),
                cmd = rx.recv() => {
                    let Some(cmd) = cmd else {
                        self.shutdown();
                        break;
                    };
                    if self.handle(cmd, &mut ticker).is_break() {
                        break;
                    }
                }
            }
        }

        info!("Engine stopped");
    }

    fn handle(&mut self, cmd: EngineCommand, ticker: &mut Interval) -> ControlFlow<()> {
        match cmd {
            EngineCommand::Place { ticket, reply } => {
                let _ = reply.send(self.place(ticket));
            }
            EngineCommand::Settle { id } => self.settle(id),
            EngineCommand::Frame { reply } => {
                let _ = reply.send(self.frame());
            }
            EngineCommand::SetTicking { running, reply } => {
                let changed = running != self.ticking;
                if running && changed {
                    // Next tick one full period from now, not immediately.
                    ticker.reset();
                }
                self.ticking = running;
                info!(running, "Ticker toggled");
                let _ = reply.send(changed);
            }
            EngineCommand::Shutdown { reply } => {
                let _ = reply.send(self.shutdown());
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn on_tick(&mut self) {
        let tick = self.source.advance();
        self.last_tone = tick.tone;
        self.trail.push(tick.price, tick.tone);
        self.summary.ticks += 1;
        trace!(price = tick.price, delta = tick.delta, tone = ?tick.tone, "Tick");
    }

    fn place(&mut self, ticket: WagerTicket) -> Result<Wager, DemoError> {
        let entry_price = self.source.current();
        let wager = match self.settler.open(&ticket, entry_price, Utc::now()) {
            Ok(w) => w,
            Err(e) => {
                warn!(
                    direction = %ticket.direction,
                    amount = %ticket.amount,
                    expiry_secs = ticket.expiry_seconds,
                    error = %e,
                    "Wager rejected"
                );
                return Err(e);
            }
        };

        self.log.record(placement_entry(&wager));
        let marker = self.trail.marker(wager.id, entry_price);
        let timer = self.schedule(wager.id, Duration::from_secs(u64::from(wager.duration_seconds)));

        info!(
            wager_id = %wager.id,
            direction = %wager.direction,
            amount = format!("${}", format_money(wager.amount)),
            entry_price = %format_price(entry_price),
            expiry_secs = wager.duration_seconds,
            open = self.pending.len() + 1,
            "Wager placed"
        );

        self.summary.wagers_placed += 1;
        self.pending.insert(
            wager.id,
            PendingWager {
                seq: self.summary.wagers_placed,
                wager: wager.clone(),
                marker,
                timer,
            },
        );
        Ok(wager)
    }

    fn schedule(&self, id: WagerId, delay: Duration) -> AbortHandle {
        let tx = self.self_tx.clone();
        tokio::spawn(async move {
            sleep(delay).await;
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(EngineCommand::Settle { id }).await;
            }
        })
        .abort_handle()
    }

    fn settle(&mut self, id: WagerId) {
        // Removal from the registry makes settlement happen at most once.
        let Some(pending) = self.pending.remove(&id) else {
            debug!(wager_id = %id, "Settle for unknown wager ignored");
            return;
        };

        let exit_price = self.source.current();
        let settlement = self.settler.settle(&pending.wager, exit_price, Utc::now());
        self.log.record(settlement_entry(&settlement));

        if settlement.is_win() {
            self.summary.wins += 1;
        } else {
            self.summary.losses += 1;
        }
        self.summary.net_pnl = self.summary.net_pnl.saturating_add(settlement.signed_pnl());

        info!(
            wager_id = %id,
            direction = %settlement.direction,
            entry_price = %format_price(settlement.entry_price),
            exit_price = %format_price(exit_price),
            outcome = %settlement.outcome,
            pnl = format!("${}", format_money(settlement.signed_pnl())),
            "Wager settled"
        );

        self.recent.push_front(settlement);
        self.recent.truncate(self.log.cap());
    }

    fn price_view(&self) -> PriceView {
        let price = self.source.current();
        PriceView {
            price,
            text: format_price(price),
            tone: self.last_tone,
            color: self.last_tone.color(),
        }
    }

    fn frame(&self) -> DisplayFrame {
        let mut open: Vec<&PendingWager> = self.pending.values().collect();
        open.sort_by_key(|p| p.seq);

        DisplayFrame {
            ticker: self.price_view(),
            ticking: self.ticking,
            ticks: self.summary.ticks,
            geometry: *self.trail.geometry(),
            trail: self.trail.points(),
            markers: open.iter().map(|p| p.marker.clone()).collect(),
            log: self.log.entries(),
            open_wagers: open
                .iter()
                .map(|p| OpenWager {
                    wager: p.wager.clone(),
                    status: WagerStatus::Pending,
                    expires_at: p.wager.expires_at(),
                })
                .collect(),
            recent_settlements: self.recent.iter().cloned().collect(),
        }
    }

    fn shutdown(&mut self) -> EngineSummary {
        let aborted = self.pending.len();
        for (_, pending) in self.pending.drain() {
            pending.timer.abort();
        }
        self.ticking = false;

        let mut summary = self.summary.clone();
        summary.pending_aborted = aborted;
        summary.last_price = self.source.current();
        summary
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
