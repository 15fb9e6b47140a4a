//! In-memory collaborators for controller and API tests

use crate::backend::{ConfigService, DatasetJobService};
use crate::datasets::DatasetStatus;
use crate::error::{AppError, Result};
use crate::services::notification_service::{Notification, NotificationSink};
use crate::services::refresh_controller::{DatasetRefreshController, RefreshOptions};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

pub fn record(product_name: &str) -> DatasetStatus {
    DatasetStatus::new(product_name)
}

// ============================================================================
// Config service
// ============================================================================

pub struct FakeConfigService {
    path: Mutex<Option<String>>,
    fail: AtomicBool,
}

impl FakeConfigService {
    pub fn new() -> Self {
        Self {
            path: Mutex::new(None),
            fail: AtomicBool::new(false),
        }
    }

    pub fn set_path(&self, path: Option<&str>) {
        *self.path.lock() = path.map(str::to_string);
        self.fail.store(false, Ordering::SeqCst);
    }

    pub fn fail(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConfigService for FakeConfigService {
    async fn data_path(&self) -> Result<Option<String>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Api("config unavailable".into()));
        }
        Ok(self.path.lock().clone())
    }
}

// ============================================================================
// Job service
// ============================================================================

pub struct FakeJobService {
    status: Mutex<Option<Vec<DatasetStatus>>>,
    full_result: Mutex<Option<Vec<String>>>,
    incremental_ok: AtomicBool,
    gate: Mutex<Option<Arc<Notify>>>,
    status_calls: AtomicUsize,
    full_calls: AtomicUsize,
    incremental_calls: AtomicUsize,
}

impl FakeJobService {
    pub fn new() -> Self {
        Self {
            status: Mutex::new(Some(Vec::new())),
            full_result: Mutex::new(Some(Vec::new())),
            incremental_ok: AtomicBool::new(true),
            gate: Mutex::new(None),
            status_calls: AtomicUsize::new(0),
            full_calls: AtomicUsize::new(0),
            incremental_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_status(&self, records: Vec<DatasetStatus>) {
        *self.status.lock() = Some(records);
    }

    pub fn fail_status(&self) {
        *self.status.lock() = None;
    }

    /// `None` makes the full trigger fail
    pub fn set_full_result(&self, products: Option<Vec<String>>) {
        *self.full_result.lock() = products;
    }

    pub fn set_incremental_ok(&self, ok: bool) {
        self.incremental_ok.store(ok, Ordering::SeqCst);
    }

    /// Make triggers wait until the returned handle is notified
    pub fn gate(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock() = Some(gate.clone());
        gate
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn full_calls(&self) -> usize {
        self.full_calls.load(Ordering::SeqCst)
    }

    pub fn incremental_calls(&self) -> usize {
        self.incremental_calls.load(Ordering::SeqCst)
    }

    async fn wait_for_gate(&self) {
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl DatasetJobService for FakeJobService {
    async fn get_status(&self) -> Result<Vec<DatasetStatus>> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.status
            .lock()
            .clone()
            .ok_or_else(|| AppError::Api("status unavailable".into()))
    }

    async fn trigger_full(&self) -> Result<Vec<String>> {
        self.full_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_for_gate().await;
        self.full_result
            .lock()
            .clone()
            .ok_or_else(|| AppError::Api("full download failed".into()))
    }

    async fn trigger_incremental(&self) -> Result<()> {
        self.incremental_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_for_gate().await;
        if self.incremental_ok.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::Api("incremental download failed".into()))
        }
    }
}

// ============================================================================
// Notification sink
// ============================================================================

#[derive(Default)]
pub struct RecordingSink {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().push(notification);
    }
}

// ============================================================================
// Harness
// ============================================================================

/// A controller wired to fakes, with handles to each fake
pub struct Harness {
    pub controller: Arc<DatasetRefreshController>,
    pub config: Arc<FakeConfigService>,
    pub jobs: Arc<FakeJobService>,
    pub sink: Arc<RecordingSink>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_options(RefreshOptions::default())
    }

    pub fn with_options(options: RefreshOptions) -> Self {
        let config = Arc::new(FakeConfigService::new());
        let jobs = Arc::new(FakeJobService::new());
        let sink = Arc::new(RecordingSink::default());
        let controller = Arc::new(DatasetRefreshController::new(
            config.clone(),
            jobs.clone(),
            sink.clone(),
            options,
        ));

        Self {
            controller,
            config,
            jobs,
            sink,
        }
    }
}
