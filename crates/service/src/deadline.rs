use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::ServiceError;

/// Run `work` until it finishes, `limit` elapses, or `cancel` fires.
///
/// Dropping `work` on timeout or cancellation aborts it at its next await
/// point, so anything it had not committed yet is never written.
pub(crate) async fn bounded<T, F>(
    operation: &str,
    limit: Duration,
    cancel: &CancellationToken,
    work: F,
) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            tracing::info!(operation, "Request cancelled");
            Err(ServiceError::Cancelled)
        }
        result = tokio::time::timeout(limit, work) => match result {
            Ok(inner) => inner,
            Err(_) => {
                tracing::warn!(operation, ?limit, "Request timed out");
                Err(ServiceError::Timeout(operation.to_owned()))
            }
        },
    }
}
