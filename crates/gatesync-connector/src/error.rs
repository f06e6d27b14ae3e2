//! Connector error types
//!
//! Error definitions with transient/permanent classification, shared by the
//! platform connectors and the engine's mutation loop.

use thiserror::Error;

/// Error that can occur while talking to either platform.
#[derive(Debug, Error)]
pub enum ConnectorError {
    // Transport errors (usually transient)
    /// Failed to establish a connection to the platform.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// The platform answered with a server-side failure.
    #[error("platform unavailable (status {status}): {message}")]
    TargetUnavailable { status: u16, message: String },

    /// The platform is throttling us.
    #[error("rate limited by platform (retry after {retry_after_secs:?} seconds)")]
    RateLimited { retry_after_secs: Option<u64> },

    // Authentication errors (permanent)
    /// The platform rejected our credentials.
    #[error("authentication failed: credentials rejected")]
    AuthenticationFailed,

    // Configuration errors (permanent)
    /// Connector configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    // Operation errors (permanent)
    /// The addressed record does not exist on the platform.
    #[error("record not found: {resource}")]
    NotFound { resource: String },

    /// The platform answered with a status we have no mapping for.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("malformed response: {message}")]
    MalformedResponse { message: String },
}

impl ConnectorError {
    /// Check if this error is transient and the operation may succeed on a
    /// later run.
    ///
    /// Transient errors are caused by temporary conditions such as network
    /// issues, throttling or platform outages.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ConnectorError::ConnectionFailed { .. }
                | ConnectorError::Timeout { .. }
                | ConnectorError::TargetUnavailable { .. }
                | ConnectorError::RateLimited { .. }
        )
    }

    /// Check if this error is permanent and retrying won't help.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Get an error code for classification in logs and notifications.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            ConnectorError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            ConnectorError::Timeout { .. } => "TIMEOUT",
            ConnectorError::TargetUnavailable { .. } => "TARGET_UNAVAILABLE",
            ConnectorError::RateLimited { .. } => "RATE_LIMITED",
            ConnectorError::AuthenticationFailed => "AUTH_FAILED",
            ConnectorError::InvalidConfiguration { .. } => "INVALID_CONFIG",
            ConnectorError::NotFound { .. } => "NOT_FOUND",
            ConnectorError::UnexpectedStatus { .. } => "UNEXPECTED_STATUS",
            ConnectorError::MalformedResponse { .. } => "MALFORMED_RESPONSE",
        }
    }

    // Convenience constructors

    /// Create a connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        ConnectorError::ConnectionFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection failed error with source.
    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        ConnectorError::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create a malformed response error.
    pub fn malformed_response(message: impl Into<String>) -> Self {
        ConnectorError::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a not found error for a record reference.
    pub fn not_found(resource: impl Into<String>) -> Self {
        ConnectorError::NotFound {
            resource: resource.into(),
        }
    }
}

impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ConnectorError::Timeout {
                message: err.to_string(),
            }
        } else if err.is_decode() {
            ConnectorError::MalformedResponse {
                message: err.to_string(),
            }
        } else {
            ConnectorError::ConnectionFailed {
                message: err.to_string(),
                source: Some(Box::new(err)),
            }
        }
    }
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;
