//! Rate-limited execution of mutation batches.
//!
//! The access platform throttles aggressively, so mutations go out in small
//! fixed-size batches with a pause between them rather than all at once.

use std::future::Future;
use std::time::Duration;

use futures::future::try_join_all;
use tokio::time::sleep;

/// Limits for batched mutation traffic.
#[derive(Debug, Clone, Copy)]
pub struct BatchLimits {
    /// Number of units started together.
    pub batch_size: usize,
    /// Pause between consecutive batches.
    pub delay: Duration,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            batch_size: 5,
            delay: Duration::from_secs(1),
        }
    }
}

/// Run `units` in fixed-size batches with a pause between batches.
///
/// Each batch is awaited as a whole before the next one starts; the pause is
/// skipped after the final batch, so a single batch never waits and an empty
/// list completes immediately. The first unit error fails the call and no
/// further batch starts; callers that want per-unit fault isolation submit
/// units that capture their own failures.
///
/// # Errors
///
/// Returns the first error produced by a unit.
pub async fn run_with_rate_limit<F, T, E>(units: Vec<F>, limits: BatchLimits) -> Result<Vec<T>, E>
where
    F: Future<Output = Result<T, E>>,
{
    let batch_size = limits.batch_size.max(1);
    let mut results = Vec::with_capacity(units.len());
    let mut remaining = units.into_iter();

    loop {
        let batch: Vec<F> = remaining.by_ref().take(batch_size).collect();
        if batch.is_empty() {
            break;
        }
        results.extend(try_join_all(batch).await?);
        if remaining.len() > 0 {
            sleep(limits.delay).await;
        }
    }

    Ok(results)
}
