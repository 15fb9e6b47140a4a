//! Scheduled work for the data center
//!
//! Handles:
//! - Delayed status re-read after a refresh job completes

mod deferred_refresh;

pub use deferred_refresh::DeferredTask;
