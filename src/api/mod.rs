//! Data center HTTP API
//!
//! Provides:
//! - Snapshot of the data center page (/api/data-center)
//! - Status re-read and refresh triggers (/api/data-center/*)
//! - Recent notifications (/api/data-center/notifications)
//!
//! Every response uses the `{status, message?, data?}` envelope. A rejected
//! trigger answers 409, a failed one 502.

pub mod handlers;
mod server;
mod types;

pub use handlers::DataCenterState;
pub use server::{router, DataCenterServer};
pub use types::{ApiResponse, Empty};
