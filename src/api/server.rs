//! HTTP server exposing the data center to the presentation layer

use crate::api::handlers::{self, DataCenterState};
use crate::error::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Build the router with all data center routes
pub fn router(state: Arc<DataCenterState>) -> Router {
    // Allow all origins: the UI is served from a different local port
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/", get(handlers::health_check))
        .route("/api/data-center", get(handlers::get_data_center))
        .route("/api/data-center/status", post(handlers::refresh_status))
        .route("/api/data-center/refresh", post(handlers::refresh))
        .route("/api/data-center/refresh/full", post(handlers::refresh_full))
        .route(
            "/api/data-center/refresh/incremental",
            post(handlers::refresh_incremental),
        )
        .route(
            "/api/data-center/notifications",
            get(handlers::get_notifications),
        )
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Data center API server manager
pub struct DataCenterServer {
    state: Arc<DataCenterState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl DataCenterServer {
    pub fn new(state: Arc<DataCenterState>) -> Self {
        Self {
            state,
            shutdown_tx: None,
            task: None,
        }
    }

    /// Bind and start serving in the background; returns the bound address
    pub async fn start(&mut self, addr: SocketAddr) -> Result<SocketAddr> {
        let app = router(self.state.clone());

        let listener = tokio::net::TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        let task = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Data center API shutting down");
            });

            if let Err(e) = server.await {
                error!("Data center API error: {}", e);
            }
        });
        self.task = Some(task);

        info!("Data center API listening on {}", local_addr);
        info!("  GET  http://{}/api/data-center", local_addr);
        info!("  POST http://{}/api/data-center/refresh", local_addr);
        info!("  POST http://{}/api/data-center/refresh/full", local_addr);
        info!("  POST http://{}/api/data-center/refresh/incremental", local_addr);

        Ok(local_addr)
    }

    /// Stop the server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            info!("Data center API stop signal sent");
        }
    }

    /// Stop the server and wait for in-flight requests to drain
    pub async fn shutdown(&mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Data center API task failed: {}", e);
            }
        }
        info!("Data center API stopped");
    }

    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }
}

impl Drop for DataCenterServer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets::catalog;
    use crate::services::notification_service::{Notification, NotificationCenter, NotificationSink};
    use crate::services::refresh_controller::{DatasetRefreshController, RefreshOptions};
    use crate::test_helpers::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app(harness: &Harness, center: Arc<NotificationCenter>) -> Router {
        router(Arc::new(DataCenterState::new(
            harness.controller.clone(),
            center,
        )))
    }

    async fn call(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let harness = Harness::new();
        let (status, body) = call(app(&harness, Arc::default()), "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
    }

    #[tokio::test]
    async fn test_snapshot_endpoint() {
        let harness = Harness::new();
        harness.config.set_path(Some("/var/data/x"));
        harness
            .jobs
            .set_status(vec![record("coin-cap"), record(catalog::PINNED_PRODUCT)]);
        harness.controller.initialize().await;

        let (status, body) = call(app(&harness, Arc::default()), "GET", "/api/data-center").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["storage_path_display"], "/var/data");
        assert_eq!(body["data"]["has_prior_run"], true);
        assert_eq!(body["data"]["is_busy"], false);
        assert_eq!(body["data"]["datasets"][0]["product_name"], catalog::PINNED_PRODUCT);
    }

    #[tokio::test]
    async fn test_status_endpoint_refetches() {
        let harness = Harness::new();
        harness.jobs.set_status(vec![record("coin-cap")]);

        let (status, body) =
            call(app(&harness, Arc::default()), "POST", "/api/data-center/status").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(harness.jobs.status_calls(), 1);
        assert_eq!(body["data"]["datasets"][0]["product_name"], "coin-cap");
    }

    #[tokio::test]
    async fn test_primary_refresh_runs_full_first_time() {
        let harness = Harness::new();
        harness.jobs.set_full_result(Some(vec!["coin-cap".into()]));

        let (status, body) =
            call(app(&harness, Arc::default()), "POST", "/api/data-center/refresh").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["outcome"], "completed");
        assert_eq!(body["data"]["kind"], "full");
        assert_eq!(body["data"]["products"][0], "coin-cap");
        harness.controller.shutdown();
    }

    #[tokio::test]
    async fn test_failed_refresh_is_bad_gateway() {
        let harness = Harness::new();
        harness.jobs.set_incremental_ok(false);

        let (status, body) = call(
            app(&harness, Arc::default()),
            "POST",
            "/api/data-center/refresh/incremental",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["status"], "error");
        assert_eq!(body["data"]["outcome"], "failed");
    }

    #[tokio::test]
    async fn test_overlapping_refresh_is_conflict() {
        let harness = Harness::new();
        let gate = harness.jobs.gate();

        let controller = harness.controller.clone();
        let running = tokio::spawn(async move { controller.trigger_full_refresh().await });
        while !harness.controller.is_busy() {
            tokio::task::yield_now().await;
        }

        let (status, body) = call(
            app(&harness, Arc::default()),
            "POST",
            "/api/data-center/refresh/full",
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["data"]["outcome"], "rejected");

        gate.notify_one();
        running.await.unwrap();
        harness.controller.shutdown();
    }

    #[tokio::test]
    async fn test_notifications_endpoint() {
        let harness = Harness::new();
        let center = Arc::new(NotificationCenter::new());
        center.notify(Notification::success("Incremental data updated successfully"));

        let (status, body) = call(
            app(&harness, center),
            "GET",
            "/api/data-center/notifications",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["severity"], "success");
    }

    #[tokio::test]
    async fn test_server_start_and_stop() {
        let harness = Harness::new();
        let mut server = DataCenterServer::new(Arc::new(DataCenterState::new(
            harness.controller.clone(),
            Arc::default(),
        )));

        let addr = server.start("127.0.0.1:0".parse().unwrap()).await.unwrap();
        assert!(server.is_running());

        let body: Value = reqwest::get(format!("http://{}/health", addr))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "success");

        server.shutdown().await;
        assert!(!server.is_running());
        assert!(reqwest::get(format!("http://{}/health", addr)).await.is_err());
    }

    #[tokio::test]
    async fn test_controller_notifications_reach_endpoint() {
        let config = Arc::new(FakeConfigService::new());
        let jobs = Arc::new(FakeJobService::new());
        let center = Arc::new(NotificationCenter::new());
        let controller = Arc::new(DatasetRefreshController::new(
            config,
            jobs,
            center.clone(),
            RefreshOptions::default(),
        ));
        let app = router(Arc::new(DataCenterState::new(controller.clone(), center)));

        let (status, _) = call(
            app.clone(),
            "POST",
            "/api/data-center/refresh/incremental",
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(app, "GET", "/api/data-center/notifications").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["data"][0]["severity"], "success");
        assert_eq!(
            body["data"][0]["summary"],
            "Incremental data updated successfully"
        );
        controller.shutdown();
    }
}
