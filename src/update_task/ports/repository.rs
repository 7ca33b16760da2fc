//! Repository port for update task persistence and batch dispatch.

use crate::update_task::domain::{CorrelationId, PendingBatch, RefName, UpdateTask};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for update task repository operations.
pub type UpdateTaskRepositoryResult<T> = Result<T, UpdateTaskRepositoryError>;

/// Update task persistence contract.
///
/// Hook processes for different refs of one push call [`Self::upsert`]
/// concurrently from separate processes, so implementations must isolate
/// writers per (correlation id, ref name) without cross-ref locking. Every
/// operation must be safe to retry from scratch after the caller was killed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpdateTaskRepository: Send + Sync {
    /// Inserts the task, or updates the stored task with the same
    /// correlation id and ref name in place.
    ///
    /// Returns the stored task: for an existing pair its identifier and
    /// creation time are kept while commit ids and the update timestamp come
    /// from `task`, and the task returns to pending.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateTaskRepositoryError::Persistence`] when the write
    /// fails.
    async fn upsert(&self, task: &UpdateTask) -> UpdateTaskRepositoryResult<UpdateTask>;

    /// Returns the pending tasks of a push ordered by creation time.
    ///
    /// An empty batch is the normal state once a push was dispatched.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateTaskRepositoryError::Persistence`] when the read
    /// fails.
    async fn list_pending(
        &self,
        correlation_id: &CorrelationId,
    ) -> UpdateTaskRepositoryResult<PendingBatch>;

    /// Transitions every pending task of the batch's push to dispatched.
    ///
    /// The transition is all-or-nothing. It only applies when the pending
    /// tasks found under the store's lock are exactly those of `batch`.
    /// Returns the number of tasks transitioned.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateTaskRepositoryError::StaleBatch`] when the pending set
    /// changed since `batch` was read, or
    /// [`UpdateTaskRepositoryError::Persistence`] when the transaction fails.
    /// In both cases no task changes state.
    async fn mark_dispatched(
        &self,
        batch: &PendingBatch,
        at: DateTime<Utc>,
    ) -> UpdateTaskRepositoryResult<usize>;

    /// Finds the task recorded for a ref within a push, whatever its status.
    ///
    /// Returns `None` when the pair was never recorded.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateTaskRepositoryError::Persistence`] when the read
    /// fails.
    async fn find(
        &self,
        correlation_id: &CorrelationId,
        ref_name: &RefName,
    ) -> UpdateTaskRepositoryResult<Option<UpdateTask>>;
}

/// Errors returned by update task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum UpdateTaskRepositoryError {
    /// The pending tasks of a push changed after the batch was read.
    #[error(
        "pending batch for {correlation_id} is stale: observed {observed} tasks, found {found}"
    )]
    StaleBatch {
        /// Push whose batch was acknowledged.
        correlation_id: CorrelationId,
        /// Number of tasks in the acknowledged batch.
        observed: usize,
        /// Number of pending tasks found in the store.
        found: usize,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl UpdateTaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
