//! HTTP client for the Qronos backtest backend

use crate::backend::types::{ApiEnvelope, ConfigData};
use crate::backend::{ConfigService, DatasetJobService};
use crate::config::Settings;
use crate::datasets::{catalog, DatasetStatus};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const CONFIG_PATH: &str = "qronos/config";
const STATUS_PATH: &str = "qronos/data/info";
const FETCH_FULL_PATH: &str = "qronos/data/fetch_full";
const FETCH_DAILY_PATH: &str = "qronos/data/fetch_daily";

/// Qronos backend client
///
/// Reads (config, status) use the configured timeout. Job triggers wait as
/// long as the backend takes: a full download can run for many minutes.
#[derive(Clone)]
pub struct QronosClient {
    client: Client,
    base_url: Url,
    config_name: String,
    read_timeout: Duration,
}

impl QronosClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut base_url = Url::parse(&settings.api_base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            config_name: settings.config_name.clone(),
            read_timeout: settings.http_timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<ApiEnvelope<T>> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .timeout(self.read_timeout)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn post<T: DeserializeOwned>(&self, url: Url) -> Result<ApiEnvelope<T>> {
        debug!("POST {}", url);
        let response = self.client.post(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

/// Turn the backend's `{product_name: record}` map into an ordered list.
///
/// Records without a `product_name` take their key; a name seen twice keeps
/// its first record. A record that does not parse is skipped.
fn records_from_map(map: Map<String, Value>) -> Vec<DatasetStatus> {
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(map.len());

    for (key, value) in map {
        let mut record: DatasetStatus = match serde_json::from_value(value) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping malformed status record {}: {}", key, e);
                continue;
            }
        };
        if record.product_name.is_empty() {
            record.product_name = key;
        }
        if !seen.insert(record.product_name.clone()) {
            warn!("Duplicate status record for {}, keeping the first", record.product_name);
            continue;
        }
        if !catalog::is_known(&record.product_name) {
            debug!("Status for untracked product {}", record.product_name);
        }
        records.push(record);
    }

    records
}

#[async_trait]
impl ConfigService for QronosClient {
    async fn data_path(&self) -> Result<Option<String>> {
        let mut url = self.endpoint(CONFIG_PATH)?;
        url.query_pairs_mut()
            .append_pair("config_name", &self.config_name);

        let envelope: ApiEnvelope<ConfigData> = self.get(url).await?;
        if !envelope.is_success() {
            return Err(AppError::Api(envelope.failure_reason()));
        }

        Ok(envelope
            .data
            .and_then(|data| data.pre_data_path)
            .filter(|path| !path.is_empty()))
    }
}

#[async_trait]
impl DatasetJobService for QronosClient {
    async fn get_status(&self) -> Result<Vec<DatasetStatus>> {
        let envelope: ApiEnvelope<Map<String, Value>> =
            self.get(self.endpoint(STATUS_PATH)?).await?;
        if !envelope.is_success() {
            return Err(AppError::Api(envelope.failure_reason()));
        }

        Ok(records_from_map(envelope.data.unwrap_or_default()))
    }

    async fn trigger_full(&self) -> Result<Vec<String>> {
        info!("Requesting full data download");
        let envelope: ApiEnvelope<Vec<String>> = self.post(self.endpoint(FETCH_FULL_PATH)?).await?;
        if !envelope.is_success() {
            return Err(AppError::Api(envelope.failure_reason()));
        }

        Ok(envelope.data.unwrap_or_default())
    }

    async fn trigger_incremental(&self) -> Result<()> {
        info!("Requesting incremental data download");
        let envelope: ApiEnvelope<Value> = self.post(self.endpoint(FETCH_DAILY_PATH)?).await?;
        if !envelope.is_success() {
            return Err(AppError::Api(envelope.failure_reason()));
        }

        Ok(())
    }
}
