//! Application state management

use crate::backend::QronosClient;
use crate::config::Settings;
use crate::error::Result;
use crate::services::notification_service::NotificationCenter;
use crate::services::refresh_controller::{DatasetRefreshController, RefreshOptions};
use std::sync::Arc;

/// Application state shared by the CLI and the API handlers
pub struct AppState {
    /// Effective settings
    pub settings: Settings,

    /// Backend client
    pub client: Arc<QronosClient>,

    /// Refresh controller for the data center page
    pub controller: Arc<DatasetRefreshController>,

    /// Notifications raised by the controller
    pub notifications: Arc<NotificationCenter>,
}

impl AppState {
    /// Create new application state
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;

        let client = Arc::new(QronosClient::new(&settings)?);
        tracing::info!("Backend: {}", client.base_url());

        let notifications = Arc::new(NotificationCenter::new());
        let controller = Arc::new(DatasetRefreshController::new(
            client.clone(),
            client.clone(),
            notifications.clone(),
            RefreshOptions::from(&settings),
        ));

        Ok(Self {
            settings,
            client,
            controller,
            notifications,
        })
    }

    /// Stop background work owned by the state
    pub fn shutdown(&self) {
        self.controller.shutdown();
    }
}
