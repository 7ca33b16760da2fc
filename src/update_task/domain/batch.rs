//! Pending batch of update tasks for one push.

use super::{CorrelationId, UpdateTask};

/// Ordered pending tasks sharing one correlation identifier.
///
/// Returned by the task store for the post-receive phase and handed back to
/// it when the batch is acknowledged, so the store can check that nothing
/// changed in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingBatch {
    correlation_id: CorrelationId,
    tasks: Vec<UpdateTask>,
}

impl PendingBatch {
    /// Creates a batch from tasks already ordered by creation time.
    #[must_use]
    pub const fn new(correlation_id: CorrelationId, tasks: Vec<UpdateTask>) -> Self {
        Self {
            correlation_id,
            tasks,
        }
    }

    /// Creates an empty batch.
    #[must_use]
    pub const fn empty(correlation_id: CorrelationId) -> Self {
        Self::new(correlation_id, Vec::new())
    }

    /// Returns the push correlation identifier.
    #[must_use]
    pub const fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    /// Returns the tasks in creation order.
    #[must_use]
    pub fn tasks(&self) -> &[UpdateTask] {
        &self.tasks
    }

    /// Returns the number of tasks in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` when no task is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns `true` when `current` holds exactly the tasks of this batch in
    /// the state they were observed in.
    ///
    /// Whole tasks are compared, so a ref added or re-ingested after the
    /// batch was read makes the batch stale even when the new commit and
    /// timestamp happen to repeat.
    #[must_use]
    pub fn matches(&self, current: &[UpdateTask]) -> bool {
        self.tasks.len() == current.len()
            && self
                .tasks
                .iter()
                .all(|observed| current.contains(observed))
    }
}

impl IntoIterator for PendingBatch {
    type Item = UpdateTask;
    type IntoIter = std::vec::IntoIter<UpdateTask>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.into_iter()
    }
}
