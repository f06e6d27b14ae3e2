//! HTTP client for the access-control platform.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use tracing::debug;

use gatesync_connector::http::{check_status, read_json};
use gatesync_connector::{
    AccessTarget, CollectionRange, ConnectorError, ConnectorResult, GrantPage, PageRequest,
};
use gatesync_core::{AccessGrant, GrantId, NewGrant};

use crate::models::{GrantCreateEnvelope, WireGrant};

/// Authorization scheme the platform expects in place of `Bearer`.
const AUTH_SCHEME: &str = "KEY-LOGIN";

/// Response header carrying listing progress as `start-end/total`.
const COLLECTION_RANGE_HEADER: &str = "x-collection-range";

const GROUP_LINKS_PATH: &str = "group_links";

/// Default request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`AccessClient`].
#[derive(Debug, Clone)]
pub struct AccessConfig {
    /// Base URL of the access API.
    pub base_url: String,
    /// API token sent in the `Authorization` header.
    pub api_token: String,
}

/// HTTP client for the access-control platform.
///
/// Owns its `reqwest::Client`; nothing here is process-global.
#[derive(Debug, Clone)]
pub struct AccessClient {
    base_url: String,
    api_token: String,
    http_client: Client,
}

impl AccessClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::InvalidConfiguration`] if the underlying
    /// HTTP client cannot be built.
    pub fn new(config: AccessConfig) -> ConnectorResult<Self> {
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
    pub fn with_http_client(config: AccessConfig, http_client: Client) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token,
            http_client,
        }
    }

    fn auth_value(&self) -> String {
        format!("{AUTH_SCHEME} {}", self.api_token)
    }
}

#[async_trait]
impl AccessTarget for AccessClient {
    async fn list_grants(&self, page: PageRequest) -> ConnectorResult<GrantPage> {
        let url = format!("{}/{GROUP_LINKS_PATH}", self.base_url);
        debug!(limit = page.limit, offset = page.offset, "access GET grants");
        let response = self
            .http_client
            .get(&url)
            .query(&[("limit", page.limit), ("offset", page.offset)])
            .header(AUTHORIZATION, self.auth_value())
            .send()
            .await?;

        // The range header has to come off before the body consumes the
        // response.
        let range = response
            .headers()
            .get(COLLECTION_RANGE_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(CollectionRange::parse);

        let grants: Vec<WireGrant> = read_json(response).await?;
        Ok(GrantPage {
            grants: grants.into_iter().map(AccessGrant::from).collect(),
            range,
        })
    }

    async fn create_grant(&self, grant: NewGrant) -> ConnectorResult<()> {
        let url = format!("{}/{GROUP_LINKS_PATH}", self.base_url);
        debug!(email = %grant.email, "access POST grant");
        let response = self
            .http_client
            .post(&url)
            .header(AUTHORIZATION, self.auth_value())
            .json(&GrantCreateEnvelope::from(grant))
            .send()
            .await?;
        check_status(response).await
    }

    async fn delete_grant(&self, id: GrantId) -> ConnectorResult<()> {
        let url = format!("{}/{GROUP_LINKS_PATH}/{id}", self.base_url);
        debug!(%id, "access DELETE grant");
        let response = self
            .http_client
            .delete(&url)
            .header(AUTHORIZATION, self.auth_value())
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ConnectorError::not_found(format!("grant {id}")));
        }
        check_status(response).await
    }
}
