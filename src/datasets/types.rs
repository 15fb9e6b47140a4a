//! Dataset status records as reported by the backend

use super::catalog;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// State of a download job for one product
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    NotStarted,
    Downloading,
    Processing,
    Success,
    Failed,
    /// Any state the backend reports that this client does not know
    Unknown(String),
}

impl JobStatus {
    /// Parse the backend's wire value
    pub fn from_wire(value: &str) -> Self {
        match value {
            "" | "not-started" | "not_started" => JobStatus::NotStarted,
            "downloading" => JobStatus::Downloading,
            "processing" => JobStatus::Processing,
            "success" => JobStatus::Success,
            "failed" => JobStatus::Failed,
            other => JobStatus::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::NotStarted => "not-started",
            JobStatus::Downloading => "downloading",
            JobStatus::Processing => "processing",
            JobStatus::Success => "success",
            JobStatus::Failed => "failed",
            JobStatus::Unknown(raw) => raw,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::NotStarted => "Not started",
            JobStatus::Downloading => "Downloading",
            JobStatus::Processing => "Processing",
            JobStatus::Success => "Success",
            JobStatus::Failed => "Failed",
            JobStatus::Unknown(_) => "Unknown",
        }
    }

    /// Whether the backend is still working on this job
    pub fn is_active(&self) -> bool {
        matches!(self, JobStatus::Downloading | JobStatus::Processing)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for JobStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

// The backend writes `null` for jobs that never ran.
impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map_or(JobStatus::NotStarted, |s| JobStatus::from_wire(&s)))
    }
}

/// Status of one tracked product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetStatus {
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(rename = "dataContentTime", default)]
    pub data_content_time: Option<String>,
    #[serde(rename = "lastUpdateTime", default)]
    pub last_update_time: Option<String>,
    #[serde(default)]
    pub full_status: JobStatus,
    #[serde(default)]
    pub update_status: JobStatus,
}

impl DatasetStatus {
    pub fn new(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            display_name: None,
            data_content_time: None,
            last_update_time: None,
            full_status: JobStatus::NotStarted,
            update_status: JobStatus::NotStarted,
        }
    }

    /// Display name, falling back to the catalog and then the placeholder
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| catalog::display_name(&self.product_name))
            .unwrap_or(catalog::UNAVAILABLE)
    }

    /// Whether either job is still running on the backend
    pub fn is_active(&self) -> bool {
        self.full_status.is_active() || self.update_status.is_active()
    }
}

/// Which download job a refresh runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshKind {
    Full,
    Incremental,
}

impl RefreshKind {
    pub fn label(&self) -> &'static str {
        match self {
            RefreshKind::Full => "Update full data",
            RefreshKind::Incremental => "Update incremental data",
        }
    }
}

impl fmt::Display for RefreshKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshKind::Full => f.write_str("full"),
            RefreshKind::Incremental => f.write_str("incremental"),
        }
    }
}
