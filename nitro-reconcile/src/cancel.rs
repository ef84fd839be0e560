use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::ReconcileError;

/// Race `fut` against `cancel`. The inner result is returned untouched so the
/// caller can attach its own context.
pub(crate) async fn guard<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<F::Output, ReconcileError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ReconcileError::Cancelled),
        out = fut => Ok(out),
    }
}
