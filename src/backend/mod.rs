//! Backend collaborators the controller depends on
//!
//! The controller only sees these traits. `QronosClient` implements both over
//! HTTP; tests swap in in-memory fakes.

mod qronos;
pub mod types;

pub use qronos::QronosClient;

use crate::datasets::DatasetStatus;
use crate::error::Result;
use async_trait::async_trait;

/// Read-only access to the backtest configuration
#[async_trait]
pub trait ConfigService: Send + Sync {
    /// Storage path under which downloaded data resides (`pre_data_path`).
    ///
    /// `Ok(None)` when the config exists but carries no data path.
    async fn data_path(&self) -> Result<Option<String>>;
}

/// Market-data download jobs run by the backend
#[async_trait]
pub trait DatasetJobService: Send + Sync {
    /// Current status of every product, in the order the backend lists them
    async fn get_status(&self) -> Result<Vec<DatasetStatus>>;

    /// Run the full download; returns the products that were updated
    async fn trigger_full(&self) -> Result<Vec<String>>;

    /// Run the incremental download
    async fn trigger_incremental(&self) -> Result<()>;
}
