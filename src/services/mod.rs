//! Services Layer
//!
//! Business logic shared between the CLI and the REST API handlers.
//!
//! # Architecture
//!
//! ```text
//! CLI ────────┐
//!             ├──> DatasetRefreshController ──> ConfigService / DatasetJobService
//! REST API ───┘              │
//!                            └──> NotificationSink
//! ```
//!
//! # Services
//!
//! - `DatasetRefreshController` - Status list, storage path, full / incremental refresh
//! - `NotificationCenter` - Notification history and live subscription

pub mod notification_service;
pub mod refresh_controller;

pub use notification_service::{Notification, NotificationCenter, NotificationSink, Severity};
pub use refresh_controller::{
    DataCenterSnapshot, DatasetRefreshController, InFlightRun, RefreshOptions, RunToken,
    TriggerOutcome,
};
