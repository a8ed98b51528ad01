//! Lead submission service
//!
//! Delivers captured leads to the configured external sink and falls back
//! to a local append-only store when no sink is configured or delivery
//! fails. Callers always get a successful outcome; the tag only records
//! which path was taken.

use crate::config::LeadConfig;
use async_trait::async_trait;
use metabolic_risk_shared::LeadRecord;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Namespace the fallback store keeps leads under
pub const FALLBACK_NAMESPACE: &str = "metabolic_leads";

/// Delivery failures; never leave this module
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Lead sink returned {0}")]
    Status(u16),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Which path a submitted lead took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Delivered,
    FellBackToLocal,
}

impl SubmissionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionOutcome::Delivered => "delivered",
            SubmissionOutcome::FellBackToLocal => "fell_back_to_local",
        }
    }
}

/// Destination for captured leads
#[async_trait]
pub trait LeadSink: Send + Sync {
    async fn deliver(&self, record: &LeadRecord) -> Result<(), DeliveryError>;
}

// ============================================================================
// HTTP Sink
// ============================================================================

/// POSTs each lead as JSON to an external endpoint
#[derive(Clone)]
pub struct HttpLeadSink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpLeadSink {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeliveryError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LeadSink for HttpLeadSink {
    async fn deliver(&self, record: &LeadRecord) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(record)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status.as_u16()));
        }
        Ok(())
    }
}

// ============================================================================
// Local Fallback Store
// ============================================================================

/// Ordered, append-only list of leads kept under [`FALLBACK_NAMESPACE`]
///
/// When a path is set the whole list is rewritten to disk after each append
/// as `{ "metabolic_leads": [...] }`.
pub struct LocalLeadStore {
    path: Option<PathBuf>,
    entries: Mutex<Vec<LeadRecord>>,
}

impl LocalLeadStore {
    /// Store that lives only in memory
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Store backed by a JSON file; existing entries are loaded
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, DeliveryError> {
        let path = path.into();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let mut document: serde_json::Map<String, serde_json::Value> =
                    serde_json::from_slice(&bytes)
                        .map_err(|e| DeliveryError::Storage(format!("Corrupt fallback store: {}", e)))?;
                match document.remove(FALLBACK_NAMESPACE) {
                    Some(list) => serde_json::from_value(list)
                        .map_err(|e| DeliveryError::Storage(format!("Corrupt fallback store: {}", e)))?,
                    None => Vec::new(),
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(DeliveryError::Storage(e.to_string())),
        };

        debug!(path = %path.display(), count = entries.len(), "Opened lead fallback store");
        Ok(Self {
            path: Some(path),
            entries: Mutex::new(entries),
        })
    }

    /// Append a lead, returning the new list length
    ///
    /// The lead is kept in memory even if writing the file fails.
    pub async fn append(&self, record: LeadRecord) -> Result<usize, DeliveryError> {
        let mut entries = self.entries.lock().await;
        entries.push(record);
        let count = entries.len();

        if let Some(path) = &self.path {
            let document = serde_json::json!({ FALLBACK_NAMESPACE: &*entries });
            let bytes = serde_json::to_vec_pretty(&document)
                .map_err(|e| DeliveryError::Storage(e.to_string()))?;
            tokio::fs::write(path, bytes)
                .await
                .map_err(|e| DeliveryError::Storage(e.to_string()))?;
        }
        Ok(count)
    }

    pub async fn entries(&self) -> Vec<LeadRecord> {
        self.entries.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

// ============================================================================
// Submitter
// ============================================================================

/// Lead submission with guaranteed local fallback
pub struct LeadSubmitter {
    sink: Option<Arc<dyn LeadSink>>,
    fallback: LocalLeadStore,
    include_clinical_detail: bool,
}

impl LeadSubmitter {
    /// Build from configuration
    pub async fn from_config(config: &LeadConfig) -> Result<Self, DeliveryError> {
        let sink: Option<Arc<dyn LeadSink>> = match config.endpoint() {
            Some(endpoint) => Some(Arc::new(HttpLeadSink::new(
                endpoint,
                Duration::from_secs(config.request_timeout_secs),
            )?)),
            None => None,
        };

        let fallback = match config.fallback_path() {
            Some(path) => LocalLeadStore::open(path).await?,
            None => LocalLeadStore::in_memory(),
        };

        Ok(Self::new(sink, fallback, config.send_clinical_data))
    }

    pub fn new(
        sink: Option<Arc<dyn LeadSink>>,
        fallback: LocalLeadStore,
        include_clinical_detail: bool,
    ) -> Self {
        Self {
            sink,
            fallback,
            include_clinical_detail,
        }
    }

    pub fn include_clinical_detail(&self) -> bool {
        self.include_clinical_detail
    }

    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    pub fn fallback(&self) -> &LocalLeadStore {
        &self.fallback
    }

    /// Deliver a lead, falling back to the local store on any failure
    ///
    /// Makes a single attempt; there is no retry.
    pub async fn submit(&self, record: LeadRecord) -> SubmissionOutcome {
        if let Some(sink) = &self.sink {
            match sink.deliver(&record).await {
                Ok(()) => {
                    info!("Lead delivered to external sink");
                    return SubmissionOutcome::Delivered;
                }
                Err(e) => {
                    warn!(error = %e, "Lead delivery failed, keeping lead locally");
                }
            }
        } else {
            debug!("No lead endpoint configured, keeping lead locally");
        }

        match self.fallback.append(record).await {
            Ok(count) => info!(count, "Lead saved to local fallback store"),
            Err(e) => error!(error = %e, "Failed to persist local fallback store"),
        }
        SubmissionOutcome::FellBackToLocal
    }
}
