use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use gatesync_connector::{ConnectorResult, ErrorSink};
use gatesync_connector_access::{AccessClient, AccessConfig};
use gatesync_connector_compliance::{ComplianceClient, ComplianceConfig};
use gatesync_engine::{
    BufferedErrorSink, EngineConfig, EngineError, EngineResult, ReconcileEngine, RunSummary,
    WebhookNotifier,
};
use tokio::signal;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::AppConfig;

/// Shared state for the HTTP handlers and the interval scheduler.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<ReconcileEngine>,
    sink: Arc<BufferedErrorSink>,
    /// Serializes runs: a manual trigger waits for an in-flight scheduled
    /// run instead of racing it.
    run_lock: Arc<Mutex<()>>,
    cancel: CancellationToken,
}

impl AppState {
    /// Build the platform clients, error sink and engine from configuration.
    pub fn from_config(config: &AppConfig) -> ConnectorResult<Self> {
        let source = ComplianceClient::new(ComplianceConfig {
            base_url: config.source_base_url.clone(),
            api_key: config.source_api_key.clone(),
        })?;
        let target = AccessClient::new(AccessConfig {
            base_url: config.target_base_url.clone(),
            api_token: config.target_api_token.clone(),
        })?;
        let notifier = match &config.error_webhook_url {
            Some(url) => Some(WebhookNotifier::new(url.clone())?),
            None => None,
        };
        let sink = Arc::new(BufferedErrorSink::new(notifier));

        let engine = ReconcileEngine::new(
            Arc::new(source),
            Arc::new(target),
            sink.clone(),
            EngineConfig {
                policy: config.grant_policy(),
                limits: config.batch_limits(),
            },
        );

        Ok(Self {
            engine: Arc::new(engine),
            sink,
            run_lock: Arc::new(Mutex::new(())),
            cancel: CancellationToken::new(),
        })
    }

    /// Token observed by in-flight runs; cancelling it makes the current run
    /// stop between mutation batches.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

/// Run one reconciliation pass and flush accumulated failure messages.
///
/// Holds the run lock for the duration, so concurrent triggers execute one
/// after another. A flush failure is logged but does not fail the run; the
/// sink keeps the entries for the next flush.
pub async fn execute_run(state: &AppState) -> EngineResult<RunSummary> {
    let _guard = state.run_lock.lock().await;
    let result = state.engine.run(state.cancel.clone()).await;
    if let Err(e) = state.sink.flush().await {
        warn!(error = %e, "failed to deliver error notifications");
    }
    result
}

/// `POST /v1/sync`: trigger a reconciliation run and wait for it to finish.
async fn trigger_sync(State(state): State<AppState>) -> (StatusCode, String) {
    match execute_run(&state).await {
        Ok(summary) => (
            StatusCode::OK,
            format!("Reconciliation completed: {summary}."),
        ),
        Err(e) => {
            error!(error = %e, "reconciliation run failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An error occurred while executing the reconciliation.".to_string(),
            )
        }
    }
}

/// `GET /healthz`: liveness probe.
async fn healthz() -> &'static str {
    "ok"
}

/// Build the HTTP router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/sync", post(trigger_sync))
        .with_state(state)
}

/// Run reconciliation on a fixed interval until the token is cancelled.
///
/// The first tick fires immediately, so the service reconciles at startup
/// rather than waiting out a full interval.
pub async fn interval_loop(state: AppState, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = state.cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        match execute_run(&state).await {
            Ok(summary) => info!(%summary, "scheduled run finished"),
            Err(EngineError::Cancelled) => break,
            Err(e) => error!(error = %e, "scheduled run failed"),
        }
    }
    info!("scheduler stopped");
}

/// Start the HTTP server and the interval scheduler; blocks until shutdown.
pub async fn serve(config: AppConfig, state: AppState) -> std::io::Result<()> {
    let period = Duration::from_secs(config.sync_interval_secs);
    let scheduler = tokio::spawn(interval_loop(state.clone(), period));

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(addr = %config.listen_addr, "listening");

    axum::serve(listener, router(state.clone()))
        .with_graceful_shutdown(shutdown_signal(state.cancel.clone()))
        .await?;

    // The signal handler already cancelled the token; wait for the scheduler
    // to notice, then deliver anything still buffered.
    if let Err(e) = scheduler.await {
        error!(error = %e, "scheduler task panicked");
    }
    if let Err(e) = state.sink.flush().await {
        warn!(error = %e, "failed to deliver error notifications during shutdown");
    }
    Ok(())
}

async fn shutdown_signal(cancel: CancellationToken) {
    match signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received, stopping"),
        Err(e) => error!(error = %e, "failed to listen for shutdown signal"),
    }
    cancel.cancel();
}
