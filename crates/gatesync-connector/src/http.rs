//! Shared HTTP response handling for the platform clients.
//!
//! Both connectors speak plain JSON over HTTP and classify failures the same
//! way, so the status-to-error mapping lives here rather than in each client.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{ConnectorError, ConnectorResult};

/// Decode a successful response body as JSON, or map the status to a
/// [`ConnectorError`].
pub async fn read_json<T: DeserializeOwned>(response: Response) -> ConnectorResult<T> {
    let status = response.status();
    if status.is_success() {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            ConnectorError::malformed_response(format!("failed to decode response: {e}"))
        })
    } else {
        Err(error_for_status(status, response).await)
    }
}

/// Check only the status of a response whose body carries nothing useful
/// (creates and deletes).
pub async fn check_status(response: Response) -> ConnectorResult<()> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(error_for_status(status, response).await)
    }
}

/// Map a non-success status (and whatever body came with it) to the
/// connector error taxonomy.
pub async fn error_for_status(status: StatusCode, response: Response) -> ConnectorError {
    let retry_after = response
        .headers()
        .get("Retry-After")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<no body>".to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ConnectorError::AuthenticationFailed,
        StatusCode::TOO_MANY_REQUESTS => ConnectorError::RateLimited {
            retry_after_secs: retry_after,
        },
        s if s.is_server_error() => ConnectorError::TargetUnavailable {
            status: s.as_u16(),
            message: body,
        },
        s => ConnectorError::UnexpectedStatus {
            status: s.as_u16(),
            body,
        },
    }
}
