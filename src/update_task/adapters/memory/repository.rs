//! In-memory update task repository for tests and single-process use.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::update_task::{
    domain::{CorrelationId, PendingBatch, RefName, UpdateTask, UpdateTaskId},
    ports::{UpdateTaskRepository, UpdateTaskRepositoryError, UpdateTaskRepositoryResult},
};

/// Thread-safe in-memory update task repository.
///
/// Every operation holds the write lock for its whole duration, which gives
/// the same per-row and per-push atomicity the `PostgreSQL` adapter gets
/// from its transactions. Faults can be injected to exercise failure paths.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUpdateTaskRepository {
    state: Arc<RwLock<InMemoryUpdateTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryUpdateTaskState {
    tasks: HashMap<UpdateTaskId, StoredTask>,
    key_index: HashMap<(CorrelationId, RefName), UpdateTaskId>,
    next_sequence: u64,
    faults: FaultPlan,
}

/// Stored task with its insertion sequence, used to order equal timestamps.
#[derive(Debug, Clone)]
struct StoredTask {
    task: UpdateTask,
    sequence: u64,
}

#[derive(Debug, Default)]
struct FaultPlan {
    fail_next_upsert: bool,
    fail_dispatch_after: Option<usize>,
}

impl InMemoryUpdateTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next [`UpdateTaskRepository::upsert`] call fail without
    /// writing anything.
    pub fn fail_next_upsert(&self) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .faults
            .fail_next_upsert = true;
    }

    /// Makes the next [`UpdateTaskRepository::mark_dispatched`] call fail
    /// after staging `transitions` status changes.
    pub fn fail_dispatch_after(&self, transitions: usize) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .faults
            .fail_dispatch_after = Some(transitions);
    }

    /// Returns the number of stored tasks, whatever their status.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateTaskRepositoryError::Persistence`] when the state lock
    /// is poisoned.
    pub fn len(&self) -> UpdateTaskRepositoryResult<usize> {
        Ok(self.read_state()?.tasks.len())
    }

    /// Returns `true` when no task has been stored.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateTaskRepositoryError::Persistence`] when the state lock
    /// is poisoned.
    pub fn is_empty(&self) -> UpdateTaskRepositoryResult<bool> {
        Ok(self.read_state()?.tasks.is_empty())
    }

    fn read_state(&self) -> UpdateTaskRepositoryResult<RwLockReadGuard<'_, InMemoryUpdateTaskState>> {
        self.state.read().map_err(|err| {
            UpdateTaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write_state(
        &self,
    ) -> UpdateTaskRepositoryResult<RwLockWriteGuard<'_, InMemoryUpdateTaskState>> {
        self.state.write().map_err(|err| {
            UpdateTaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Collects the pending tasks of a push in creation order.
fn pending_for(state: &InMemoryUpdateTaskState, correlation_id: &CorrelationId) -> Vec<UpdateTask> {
    let mut pending: Vec<&StoredTask> = state
        .tasks
        .values()
        .filter(|stored| {
            stored.task.is_pending() && stored.task.correlation_id() == correlation_id
        })
        .collect();
    pending.sort_by_key(|stored| (stored.task.created_at(), stored.sequence));
    pending.into_iter().map(|stored| stored.task.clone()).collect()
}

fn injected_failure(operation: &str) -> UpdateTaskRepositoryError {
    UpdateTaskRepositoryError::persistence(std::io::Error::other(format!(
        "injected {operation} failure"
    )))
}

#[async_trait]
impl UpdateTaskRepository for InMemoryUpdateTaskRepository {
    async fn upsert(&self, task: &UpdateTask) -> UpdateTaskRepositoryResult<UpdateTask> {
        let mut state = self.write_state()?;
        if std::mem::take(&mut state.faults.fail_next_upsert) {
            return Err(injected_failure("upsert"));
        }

        let key = (task.correlation_id().clone(), task.ref_name().clone());
        if let Some(existing_id) = state.key_index.get(&key).copied()
            && let Some(stored) = state.tasks.get_mut(&existing_id)
        {
            stored.task.reingest(task);
            return Ok(stored.task.clone());
        }

        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.key_index.insert(key, task.id());
        state.tasks.insert(
            task.id(),
            StoredTask {
                task: task.clone(),
                sequence,
            },
        );
        Ok(task.clone())
    }

    async fn list_pending(
        &self,
        correlation_id: &CorrelationId,
    ) -> UpdateTaskRepositoryResult<PendingBatch> {
        let state = self.read_state()?;
        Ok(PendingBatch::new(
            correlation_id.clone(),
            pending_for(&state, correlation_id),
        ))
    }

    async fn mark_dispatched(
        &self,
        batch: &PendingBatch,
        at: DateTime<Utc>,
    ) -> UpdateTaskRepositoryResult<usize> {
        let mut state = self.write_state()?;
        let current = pending_for(&state, batch.correlation_id());
        if !batch.matches(&current) {
            return Err(UpdateTaskRepositoryError::StaleBatch {
                correlation_id: batch.correlation_id().clone(),
                observed: batch.len(),
                found: current.len(),
            });
        }

        // Stage every transition before touching stored state.
        let fail_after = state.faults.fail_dispatch_after.take();
        let mut staged = Vec::with_capacity(current.len());
        for (applied, mut task) in current.into_iter().enumerate() {
            if fail_after.is_some_and(|limit| applied >= limit) {
                return Err(injected_failure("dispatch"));
            }
            task.mark_dispatched(at);
            staged.push(task);
        }

        let count = staged.len();
        for task in staged {
            if let Some(stored) = state.tasks.get_mut(&task.id()) {
                stored.task = task;
            }
        }
        Ok(count)
    }

    async fn find(
        &self,
        correlation_id: &CorrelationId,
        ref_name: &RefName,
    ) -> UpdateTaskRepositoryResult<Option<UpdateTask>> {
        let state = self.read_state()?;
        let key = (correlation_id.clone(), ref_name.clone());
        Ok(state
            .key_index
            .get(&key)
            .and_then(|task_id| state.tasks.get(task_id))
            .map(|stored| stored.task.clone()))
    }
}
