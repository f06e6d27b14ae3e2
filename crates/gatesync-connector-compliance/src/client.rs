//! HTTP client for the workforce-compliance platform.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use gatesync_connector::http::read_json;
use gatesync_connector::{ConnectorError, ConnectorResult, WorkforceSource};
use gatesync_core::{Contractor, ContractorId, Worker};

use crate::models::{ContractorsEnvelope, WorkersEnvelope};

/// Header carrying the API key on every request.
const API_KEY_HEADER: &str = "apikey";

/// Default request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const WORKERS_PATH: &str = "2.0/Compliance/Workers/List";
const CONTRACTORS_PATH: &str = "2.0/Compliance/Contractors/List";

/// Configuration for [`ComplianceClient`].
#[derive(Debug, Clone)]
pub struct ComplianceConfig {
    /// Base URL of the compliance API.
    pub base_url: String,
    /// API key sent with every request.
    pub api_key: String,
}

/// HTTP client for the workforce-compliance platform.
///
/// Owns its `reqwest::Client`; nothing here is process-global.
#[derive(Debug, Clone)]
pub struct ComplianceClient {
    base_url: String,
    api_key: String,
    http_client: Client,
}

impl ComplianceClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::InvalidConfiguration`] if the underlying
    /// HTTP client cannot be built.
    pub fn new(config: ComplianceConfig) -> ConnectorResult<Self> {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("gatesync/0.1")
            .build()
            .map_err(|e| {
                ConnectorError::invalid_configuration(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self::with_http_client(config, http_client))
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    #[must_use]
    pub fn with_http_client(config: ComplianceConfig, http_client: Client) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            http_client,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ConnectorResult<T> {
        let url = format!("{}/{path}", self.base_url);
        debug!(%url, "compliance GET");
        let response = self
            .http_client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        read_json(response).await
    }
}

#[async_trait]
impl WorkforceSource for ComplianceClient {
    async fn list_workers(&self) -> ConnectorResult<Vec<Worker>> {
        let envelope: WorkersEnvelope = self.get(WORKERS_PATH).await?;
        Ok(envelope.workers.into_iter().map(Worker::from).collect())
    }

    async fn list_contractors(&self) -> ConnectorResult<Vec<Contractor>> {
        let envelope: ContractorsEnvelope = self.get(CONTRACTORS_PATH).await?;
        Ok(envelope
            .contractors
            .into_iter()
            .map(Contractor::from)
            .collect())
    }

    async fn list_workers_with_contractors(&self) -> ConnectorResult<Vec<Worker>> {
        let (mut workers, contractors) =
            tokio::try_join!(self.list_workers(), self.list_contractors())?;

        let by_id: HashMap<ContractorId, Contractor> = contractors
            .into_iter()
            .map(|contractor| (contractor.id, contractor))
            .collect();

        for worker in &mut workers {
            worker.contractor = worker
                .primary_contractor
                .as_ref()
                .and_then(|primary| by_id.get(&primary.id).cloned());
        }

        Ok(workers)
    }
}
