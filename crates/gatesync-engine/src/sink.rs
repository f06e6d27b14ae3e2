//! Buffered failure collection with webhook delivery.
//!
//! Mutation and evaluation failures are recorded as they happen and shipped
//! once per run as a single JSON document, so one flaky grant does not turn
//! into a hundred notifications.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use gatesync_connector::http::check_status;
use gatesync_connector::{ConnectorError, ConnectorResult, ErrorSink};

/// Timeout for the notification POST.
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// One recorded failure.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEntry {
    /// When the failure was recorded.
    pub at: DateTime<Utc>,
    pub message: String,
}

/// Posts accumulated failures to a configured URL as one JSON document.
pub struct WebhookNotifier {
    url: String,
    client: Client,
}

impl WebhookNotifier {
    /// Create a notifier for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::InvalidConfiguration`] if the underlying
    /// HTTP client cannot be built.
    pub fn new(url: String) -> ConnectorResult<Self> {
        let client = Client::builder().timeout(WEBHOOK_TIMEOUT).build().map_err(|e| {
            ConnectorError::invalid_configuration(format!("failed to build webhook client: {e}"))
        })?;
        Ok(Self { url, client })
    }

    async fn deliver(&self, entries: &[ErrorEntry]) -> ConnectorResult<()> {
        let payload = serde_json::json!({
            "error_count": entries.len(),
            "errors": entries,
        });
        let response = self.client.post(&self.url).json(&payload).send().await?;
        check_status(response).await
    }
}

/// [`ErrorSink`] that buffers entries in memory and delivers on flush.
///
/// Without a notifier, flushing logs the dropped count instead of sending.
/// A failed delivery puts the entries back so a later flush can retry them.
pub struct BufferedErrorSink {
    entries: Mutex<Vec<ErrorEntry>>,
    notifier: Option<WebhookNotifier>,
}

impl BufferedErrorSink {
    #[must_use]
    pub fn new(notifier: Option<WebhookNotifier>) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            notifier,
        }
    }

    /// Number of entries waiting for delivery.
    pub async fn pending(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[async_trait]
impl ErrorSink for BufferedErrorSink {
    async fn record(&self, message: &str) {
        debug!(message, "recording run failure");
        self.entries.lock().await.push(ErrorEntry {
            at: Utc::now(),
            message: message.to_string(),
        });
    }

    async fn flush(&self) -> ConnectorResult<()> {
        let entries: Vec<ErrorEntry> = {
            let mut guard = self.entries.lock().await;
            std::mem::take(&mut *guard)
        };
        if entries.is_empty() {
            return Ok(());
        }

        let Some(notifier) = &self.notifier else {
            warn!(
                count = entries.len(),
                "no error webhook configured, dropping failure messages"
            );
            return Ok(());
        };

        if let Err(err) = notifier.deliver(&entries).await {
            warn!(error = %err, count = entries.len(), "failure notification not delivered");
            let mut guard = self.entries.lock().await;
            let recorded_meanwhile = std::mem::replace(&mut *guard, entries);
            guard.extend(recorded_meanwhile);
            return Err(err);
        }

        debug!(count = entries.len(), "failure notification delivered");
        Ok(())
    }
}

impl Drop for BufferedErrorSink {
    fn drop(&mut self) {
        // Drop cannot deliver asynchronously; the best it can do is make the
        // loss visible.
        if let Ok(guard) = self.entries.try_lock() {
            if !guard.is_empty() {
                warn!(count = guard.len(), "error sink dropped with undelivered messages");
            }
        }
    }
}
