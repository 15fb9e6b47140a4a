//! Dataset Refresh Controller
//!
//! Owns the per-product status list shown on the data center page and runs
//! the full / incremental download jobs.
//!
//! ```text
//! initialize ──> load storage path ─┐
//!            └─> refresh_status ────┴─> snapshot
//!
//! trigger_* ──> busy ──> [job task] job service ──> notify ──> (delay) refresh_status
//!                 └──────── cleared when the job task ends ───────┘
//! ```
//!
//! Service failures never propagate out of the controller: reads fall back
//! to empty/placeholder values, triggers report a [`TriggerOutcome`].

use crate::backend::{ConfigService, DatasetJobService};
use crate::config::Settings;
use crate::datasets::{self, catalog, DatasetStatus, RefreshKind};
use crate::scheduler::DeferredTask;
use crate::services::notification_service::{Notification, NotificationSink};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Controller tuning
#[derive(Debug, Clone)]
pub struct RefreshOptions {
    pub pinned_product: String,
    pub refresh_delay: Duration,
    pub notify_failures: bool,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self {
            pinned_product: catalog::PINNED_PRODUCT.to_string(),
            refresh_delay: Duration::from_secs(2),
            notify_failures: true,
        }
    }
}

impl From<&Settings> for RefreshOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            pinned_product: settings.pinned_product.clone(),
            refresh_delay: settings.refresh_delay,
            notify_failures: settings.notify_failures,
        }
    }
}

/// Identifies one outstanding refresh job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunToken(Uuid);

impl RunToken {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// The refresh job currently outstanding
#[derive(Debug, Clone, Serialize)]
pub struct InFlightRun {
    pub token: RunToken,
    pub kind: RefreshKind,
    pub started_at: DateTime<Utc>,
}

/// Result of a trigger call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TriggerOutcome {
    /// The job finished; `products` lists what a full refresh updated
    Completed {
        kind: RefreshKind,
        products: Vec<String>,
    },
    /// The job call failed or the backend reported failure
    Failed { kind: RefreshKind, reason: String },
    /// Another job was still outstanding; nothing was sent
    Rejected {
        kind: RefreshKind,
        running: RefreshKind,
    },
}

/// Read-only view for the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct DataCenterSnapshot {
    pub datasets: Vec<DatasetStatus>,
    pub storage_path_display: String,
    pub has_prior_run: bool,
    pub is_busy: bool,
    pub primary_action: RefreshKind,
    pub in_flight: Option<InFlightRun>,
}

#[derive(Debug, Default)]
struct ControllerState {
    datasets: Vec<DatasetStatus>,
    storage_path: Option<String>,
    has_prior_run: bool,
}

/// Clears the in-flight marker when the job task finishes
struct InFlightGuard {
    controller: Arc<DatasetRefreshController>,
    token: RunToken,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut slot = self.controller.in_flight.lock();
        if slot.as_ref().is_some_and(|run| run.token == self.token) {
            *slot = None;
        }
    }
}

pub struct DatasetRefreshController {
    config_service: Arc<dyn ConfigService>,
    job_service: Arc<dyn DatasetJobService>,
    notifier: Arc<dyn NotificationSink>,
    options: RefreshOptions,
    state: RwLock<ControllerState>,
    in_flight: Mutex<Option<InFlightRun>>,
    deferred_refresh: DeferredTask,
}

impl DatasetRefreshController {
    pub fn new(
        config_service: Arc<dyn ConfigService>,
        job_service: Arc<dyn DatasetJobService>,
        notifier: Arc<dyn NotificationSink>,
        options: RefreshOptions,
    ) -> Self {
        Self {
            config_service,
            job_service,
            notifier,
            options,
            state: RwLock::new(ControllerState::default()),
            in_flight: Mutex::new(None),
            deferred_refresh: DeferredTask::new("dataset status refresh"),
        }
    }

    // ========================================================================
    // Read side
    // ========================================================================

    /// Load the storage path and the status list. Never fails.
    pub async fn initialize(&self) {
        tokio::join!(self.load_storage_path(), self.refresh_status());
        info!(
            "Data center initialized: {} datasets, storage {}",
            self.state.read().datasets.len(),
            self.storage_path_display()
        );
    }

    async fn load_storage_path(&self) {
        let storage_path = match self.config_service.data_path().await {
            Ok(path) => path,
            Err(e) => {
                warn!("Failed to load data path from config: {}", e);
                None
            }
        };
        self.state.write().storage_path = storage_path;
    }

    /// Replace the status list with the backend's current view. Never fails.
    pub async fn refresh_status(&self) {
        let records = match self.job_service.get_status().await {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to load dataset status: {}", e);
                Vec::new()
            }
        };

        let has_prior_run = !records.is_empty();
        let datasets = datasets::pin_first(records, &self.options.pinned_product);
        debug!("Dataset status refreshed: {} records", datasets.len());

        let mut state = self.state.write();
        state.datasets = datasets;
        state.has_prior_run = has_prior_run;
    }

    pub fn datasets(&self) -> Vec<DatasetStatus> {
        self.state.read().datasets.clone()
    }

    /// Parent directory of the data path, or the placeholder
    pub fn storage_path_display(&self) -> String {
        self.state
            .read()
            .storage_path
            .as_deref()
            .map(datasets::parent_directory)
            .filter(|dir| !dir.is_empty())
            .unwrap_or(catalog::UNAVAILABLE)
            .to_string()
    }

    pub fn has_prior_run(&self) -> bool {
        self.state.read().has_prior_run
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.lock().is_some()
    }

    pub fn in_flight(&self) -> Option<InFlightRun> {
        self.in_flight.lock().clone()
    }

    /// The refresh the primary action runs
    pub fn primary_action(&self) -> RefreshKind {
        if self.has_prior_run() {
            RefreshKind::Incremental
        } else {
            RefreshKind::Full
        }
    }

    pub fn snapshot(&self) -> DataCenterSnapshot {
        let (datasets, has_prior_run) = {
            let state = self.state.read();
            (state.datasets.clone(), state.has_prior_run)
        };
        let in_flight = self.in_flight();

        DataCenterSnapshot {
            datasets,
            storage_path_display: self.storage_path_display(),
            has_prior_run,
            is_busy: in_flight.is_some(),
            primary_action: if has_prior_run {
                RefreshKind::Incremental
            } else {
                RefreshKind::Full
            },
            in_flight,
        }
    }

    /// Whether a delayed status refresh is waiting to run
    pub fn has_pending_refresh(&self) -> bool {
        self.deferred_refresh.is_pending()
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// Run the primary action: incremental after a prior run, full otherwise
    pub async fn decide_action(self: &Arc<Self>) -> TriggerOutcome {
        self.trigger(self.primary_action()).await
    }

    pub async fn trigger_full_refresh(self: &Arc<Self>) -> TriggerOutcome {
        self.trigger(RefreshKind::Full).await
    }

    pub async fn trigger_incremental_refresh(self: &Arc<Self>) -> TriggerOutcome {
        self.trigger(RefreshKind::Incremental).await
    }

    /// Run one refresh job.
    ///
    /// The job runs on its own task: dropping the returned future does not
    /// cancel the backend call, and the controller stays busy until the job
    /// answers.
    pub async fn trigger(self: &Arc<Self>, kind: RefreshKind) -> TriggerOutcome {
        let guard = match self.begin(kind) {
            Ok(guard) => guard,
            Err(running) => {
                warn!("Rejected {} refresh: {} refresh still running", kind, running);
                self.notifier.notify(Notification::info(format!(
                    "{} is already running",
                    running.label()
                )));
                return TriggerOutcome::Rejected { kind, running };
            }
        };

        let controller = self.clone();
        let job = tokio::spawn(async move {
            let outcome = controller.run_job(kind).await;
            drop(guard);
            outcome
        });

        match job.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("{} refresh task ended abnormally: {}", kind, e);
                TriggerOutcome::Failed {
                    kind,
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn run_job(self: &Arc<Self>, kind: RefreshKind) -> TriggerOutcome {
        info!("Starting {} refresh", kind);
        let result = match kind {
            RefreshKind::Full => self.job_service.trigger_full().await,
            RefreshKind::Incremental => self
                .job_service
                .trigger_incremental()
                .await
                .map(|()| Vec::new()),
        };

        match result {
            Ok(products) => {
                info!("{} refresh completed", kind);
                self.notifier
                    .notify(Notification::success(success_summary(kind, &products)));
                self.schedule_status_refresh();
                TriggerOutcome::Completed { kind, products }
            }
            Err(e) => {
                warn!("{} refresh failed: {}", kind, e);
                if self.options.notify_failures {
                    self.notifier
                        .notify(Notification::error(format!("{} failed: {}", kind.label(), e)));
                }
                TriggerOutcome::Failed {
                    kind,
                    reason: e.to_string(),
                }
            }
        }
    }

    fn begin(self: &Arc<Self>, kind: RefreshKind) -> Result<InFlightGuard, RefreshKind> {
        let mut slot = self.in_flight.lock();
        if let Some(run) = slot.as_ref() {
            return Err(run.kind);
        }

        let token = RunToken::new();
        *slot = Some(InFlightRun {
            token,
            kind,
            started_at: Utc::now(),
        });

        Ok(InFlightGuard {
            controller: self.clone(),
            token,
        })
    }

    fn schedule_status_refresh(self: &Arc<Self>) {
        let controller = Arc::downgrade(self);
        self.deferred_refresh
            .schedule(self.options.refresh_delay, move || async move {
                if let Some(controller) = controller.upgrade() {
                    controller.refresh_status().await;
                }
            });
    }

    /// Cancel the pending delayed refresh; later triggers schedule nothing
    pub fn shutdown(&self) {
        self.deferred_refresh.shutdown();
        debug!("Refresh controller shut down");
    }
}

fn success_summary(kind: RefreshKind, products: &[String]) -> String {
    match kind {
        RefreshKind::Full => format!("Full data {} updated successfully", products.join(",")),
        RefreshKind::Incremental => "Incremental data updated successfully".to_string(),
    }
}
