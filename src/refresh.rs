use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::AppState;
use crate::store::StoreResult;
use crate::views::{build_overview, OrdersOverview};

/// Shared switch and bookkeeping for the periodic overview refresh.
#[derive(Clone)]
pub struct RefreshControl {
    interval: Duration,
    paused: Arc<AtomicBool>,
    last_refreshed_at: Arc<RwLock<Option<DateTime<Utc>>>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshStatus {
    pub interval_seconds: u64,
    pub paused: bool,
    pub last_refreshed_at: Option<String>,
}

impl RefreshControl {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            paused: Arc::new(AtomicBool::new(false)),
            last_refreshed_at: Arc::new(RwLock::new(None)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn set_paused(&self, paused: bool) {
        let previous = self.paused.swap(paused, Ordering::SeqCst);
        if previous != paused {
            info!(paused, "overview auto-refresh toggled");
        }
    }

    async fn record_refresh(&self) {
        *self.last_refreshed_at.write().await = Some(Utc::now());
    }

    pub async fn status(&self) -> RefreshStatus {
        let last_refreshed_at = *self.last_refreshed_at.read().await;
        RefreshStatus {
            interval_seconds: self.interval.as_secs(),
            paused: self.is_paused(),
            last_refreshed_at: last_refreshed_at.map(|at| at.to_rfc3339()),
        }
    }
}

/// Re-reads the newest orders and replaces the cached overview.
pub async fn refresh_overview(state: &AppState) -> StoreResult<OrdersOverview> {
    let generation = state.views.generation();
    let rows = state
        .orders
        .list_recent(state.config.orders_list_limit)
        .await?;
    let overview = build_overview(&rows, state.refresh.interval());
    state.views.store_overview(generation, overview.clone()).await;
    state.refresh.record_refresh().await;
    Ok(overview)
}

/// Timer-driven re-fetch of the overview. Ticks are awaited one after the
/// other and missed ticks are skipped, so two refreshes never run at once.
pub struct OverviewRefresher {
    state: AppState,
}

impl OverviewRefresher {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn run(&self) {
        let period = self.state.refresh.interval();
        info!(interval_seconds = period.as_secs(), "overview refresher started");
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    /// Runs one refresh unless paused. Returns whether the overview was reloaded.
    pub async fn tick(&self) -> bool {
        if self.state.refresh.is_paused() {
            debug!("overview refresh skipped while paused");
            return false;
        }
        match refresh_overview(&self.state).await {
            Ok(overview) => {
                let total: usize = overview.groups.iter().map(|group| group.count).sum();
                debug!(
                    orders = total,
                    unrecognized = overview.unrecognized.len(),
                    "overview refreshed"
                );
                true
            }
            Err(err) => {
                error!(error = %err, "overview refresh failed");
                false
            }
        }
    }
}
