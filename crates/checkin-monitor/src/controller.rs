//! Debounced dashboard controller.
//!
//! Every trigger restarts a quiet period; only the last filter state in a
//! burst is fetched. Fetches already in flight are never cancelled. Each
//! dispatched cycle gets a sequence number, and a result is applied to the
//! view only if no newer cycle has been dispatched since.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use checkin_core::RecordSource;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::enrich::DEFAULT_ALLOWED_RADIUS_METERS;
use crate::orchestrator::{DashboardData, FetchOrchestrator};
use crate::error::MonitorError;
use crate::query::{FilterState, PaginationState};
use crate::view::DashboardView;

/// Default quiet period before a trigger is fetched.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Owns the displayed state and schedules fetch cycles.
pub struct DashboardController<S: RecordSource + 'static> {
    orchestrator: Arc<FetchOrchestrator<S>>,
    debounce: Duration,
    default_radius: f64,
    /// Bumped by every trigger; a timer fires only if still current.
    pending: Arc<AtomicU64>,
    /// Bumped by every dispatched cycle.
    dispatched: Arc<AtomicU64>,
    /// Serializes the staleness check with the publish.
    apply_lock: Arc<Mutex<()>>,
    state: Arc<watch::Sender<DashboardView>>,
}

impl<S: RecordSource + 'static> DashboardController<S> {
    /// Create a controller with the default debounce and radius.
    pub fn new(orchestrator: FetchOrchestrator<S>) -> Self {
        Self::with_settings(orchestrator, DEFAULT_DEBOUNCE, DEFAULT_ALLOWED_RADIUS_METERS)
    }

    pub fn with_settings(
        orchestrator: FetchOrchestrator<S>,
        debounce: Duration,
        default_radius: f64,
    ) -> Self {
        let (state, _) = watch::channel(DashboardView::default());
        Self {
            orchestrator: Arc::new(orchestrator),
            debounce,
            default_radius,
            pending: Arc::new(AtomicU64::new(0)),
            dispatched: Arc::new(AtomicU64::new(0)),
            apply_lock: Arc::new(Mutex::new(())),
            state: Arc::new(state),
        }
    }

    /// Subscribe to view updates.
    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.state.subscribe()
    }

    /// Snapshot of the current view.
    pub fn current(&self) -> DashboardView {
        self.state.borrow().clone()
    }

    pub fn orchestrator(&self) -> &FetchOrchestrator<S> {
        &self.orchestrator
    }

    /// Schedule a fetch for this filter state after the quiet period.
    ///
    /// A later trigger within the quiet period supersedes this one. The
    /// returned handle completes once the timer lapses and, if this trigger
    /// was still current, the cycle has finished.
    pub fn trigger(&self, filter: FilterState, pagination: PaginationState) -> JoinHandle<()> {
        let generation = self.pending.fetch_add(1, Ordering::SeqCst) + 1;
        let pending = self.pending.clone();
        let cycle = self.cycle();
        let debounce = self.debounce;

        tokio::spawn(async move {
            sleep(debounce).await;
            if pending.load(Ordering::SeqCst) != generation {
                debug!("Trigger {} superseded during quiet period", generation);
                return;
            }
            cycle.run(filter, pagination).await;
        })
    }

    /// Fetch immediately, bypassing the debounce, and return the resulting view.
    pub async fn refresh(&self, filter: FilterState, pagination: PaginationState) -> DashboardView {
        self.cycle().run(filter, pagination).await;
        self.current()
    }

    /// Drop every cached result so the next cycle refetches.
    pub async fn invalidate_cache(&self) {
        self.orchestrator.cache().clear().await;
    }

    fn cycle(&self) -> Cycle<S> {
        Cycle {
            orchestrator: self.orchestrator.clone(),
            dispatched: self.dispatched.clone(),
            apply_lock: self.apply_lock.clone(),
            state: self.state.clone(),
            default_radius: self.default_radius,
        }
    }
}

/// Everything a spawned cycle needs, detached from the controller's lifetime.
struct Cycle<S: RecordSource + 'static> {
    orchestrator: Arc<FetchOrchestrator<S>>,
    dispatched: Arc<AtomicU64>,
    apply_lock: Arc<Mutex<()>>,
    state: Arc<watch::Sender<DashboardView>>,
    default_radius: f64,
}

impl<S: RecordSource + 'static> Cycle<S> {
    async fn run(self, filter: FilterState, pagination: PaginationState) {
        let sequence = self.dispatched.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Dispatching fetch cycle {}", sequence);
        self.state.send_modify(|view| view.loading = true);

        let result = self.orchestrator.run(&filter, &pagination).await;
        self.apply(sequence, result);
    }

    fn apply(&self, sequence: u64, result: Result<DashboardData, MonitorError>) {
        let _guard = match self.apply_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let latest = self.dispatched.load(Ordering::SeqCst);
        if sequence < latest {
            warn!(
                "Discarding result of fetch cycle {} (cycle {} is newer)",
                sequence, latest
            );
            return;
        }

        let view = match result {
            Ok(data) => DashboardView::from_data(data, self.default_radius),
            Err(e) => {
                error!("Fetch cycle {} failed: {}", sequence, e);
                DashboardView::failed(e.user_message())
            }
        };
        self.state.send_replace(view);
    }
}
