//! Service layer for the once-per-push dispatch phase.

use crate::update_task::{
    domain::CorrelationId,
    ports::{DispatchNotifier, NotifierError, UpdateTaskRepository, UpdateTaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Outcome of a dispatch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchReport {
    /// No task of the push was pending.
    NothingPending,
    /// The push's pending tasks were delivered and marked dispatched.
    Dispatched {
        /// Number of tasks transitioned.
        count: usize,
    },
}

/// Service-level errors for dispatch.
///
/// Every variant leaves all tasks of the push pending.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Reading or acknowledging the batch failed.
    #[error("task store error during dispatch: {0}")]
    Repository(#[from] UpdateTaskRepositoryError),
    /// A downstream consumer did not accept the batch.
    #[error("downstream delivery failed: {0}")]
    Notifier(#[from] NotifierError),
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Hands each completed push to downstream consumers exactly once.
#[derive(Clone)]
pub struct PushDispatchService<R, N, C>
where
    R: UpdateTaskRepository,
    N: DispatchNotifier,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    notifier: Arc<N>,
    clock: Arc<C>,
}

impl<R, N, C> PushDispatchService<R, N, C>
where
    R: UpdateTaskRepository,
    N: DispatchNotifier,
    C: Clock + Send + Sync,
{
    /// Creates a new dispatch service.
    #[must_use]
    pub const fn new(repository: Arc<R>, notifier: Arc<N>, clock: Arc<C>) -> Self {
        Self {
            repository,
            notifier,
            clock,
        }
    }

    /// Delivers the pending batch of a push and acknowledges it.
    ///
    /// The batch is only marked dispatched after the notifier accepted it.
    /// Running this again after a failure re-reads the same pending batch.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Notifier`] when delivery fails and
    /// [`DispatchError::Repository`] when the store cannot be read or the
    /// batch changed before it could be acknowledged.
    pub async fn dispatch(&self, correlation_id: &CorrelationId) -> DispatchResult<DispatchReport> {
        let batch = self.repository.list_pending(correlation_id).await?;
        if batch.is_empty() {
            debug!(%correlation_id, "no pending update tasks");
            return Ok(DispatchReport::NothingPending);
        }

        if let Err(err) = self.notifier.notify(&batch).await {
            warn!(
                %correlation_id,
                pending = batch.len(),
                error = %err,
                "dispatch not acknowledged; tasks remain pending"
            );
            return Err(err.into());
        }

        let count = self
            .repository
            .mark_dispatched(&batch, self.clock.utc())
            .await?;
        info!(%correlation_id, count, "update tasks dispatched");
        Ok(DispatchReport::Dispatched { count })
    }
}
