//! Service layer turning validated ref updates into stored tasks.

use crate::update_task::{
    domain::{RefUpdate, UpdateTask},
    ports::{UpdateTaskRepository, UpdateTaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Service-level errors for task ingestion.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The task store rejected or failed the write.
    #[error("failed to record update task: {0}")]
    Repository(#[from] UpdateTaskRepositoryError),
}

/// Result type for ingest operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Records one ref update per hook invocation.
#[derive(Clone)]
pub struct UpdateTaskIngestService<R, C>
where
    R: UpdateTaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> UpdateTaskIngestService<R, C>
where
    R: UpdateTaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new ingest service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Builds a pending task for `update` and upserts it.
    ///
    /// Exactly one write is attempted. Recording the same ref of the same
    /// push again updates the stored task in place.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Repository`] when the write fails; the ref
    /// update must then be rejected.
    pub async fn record(&self, update: RefUpdate) -> IngestResult<UpdateTask> {
        let task = UpdateTask::new(update, &*self.clock);
        let stored = self.repository.upsert(&task).await.map_err(|err| {
            error!(
                correlation_id = %task.correlation_id(),
                ref_name = %task.ref_name(),
                error = %err,
                "update task write failed"
            );
            err
        })?;

        info!(
            correlation_id = %stored.correlation_id(),
            ref_name = %stored.ref_name(),
            old_commit_id = %stored.old_commit_id(),
            new_commit_id = %stored.new_commit_id(),
            kind = ?stored.kind(),
            reingested = stored.id() != task.id(),
            "update task recorded"
        );
        Ok(stored)
    }
}
