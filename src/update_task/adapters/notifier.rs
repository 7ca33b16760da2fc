//! Dispatch notifier adapters.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::update_task::{
    domain::PendingBatch,
    ports::{DispatchNotifier, NotifierResult},
};

/// Notifier that records each ref update of a push as a log event.
///
/// Branch and tag refs also carry their short name as a `branch` or `tag`
/// field.
///
/// This is the consumer the hook binary uses when no other consumer is
/// configured; log collectors downstream pick the events up.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDispatchNotifier;

#[async_trait]
impl DispatchNotifier for TracingDispatchNotifier {
    async fn notify(&self, batch: &PendingBatch) -> NotifierResult<()> {
        for task in batch.tasks() {
            info!(
                correlation_id = %task.correlation_id(),
                ref_name = %task.ref_name(),
                branch = task.ref_name().branch_name(),
                tag = task.ref_name().tag_name(),
                old_commit_id = %task.old_commit_id(),
                new_commit_id = %task.new_commit_id(),
                kind = ?task.kind(),
                "ref update dispatched"
            );
        }
        Ok(())
    }
}

/// Notifier that delivers a batch to several consumers in order.
///
/// Delivery stops at the first failing consumer and the failure is returned,
/// which leaves the batch pending so the whole fan-out is retried.
#[derive(Clone, Default)]
pub struct FanOutDispatchNotifier {
    notifiers: Vec<Arc<dyn DispatchNotifier>>,
}

impl FanOutDispatchNotifier {
    /// Creates a notifier with no consumers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a consumer to the end of the delivery order.
    #[must_use]
    pub fn with(mut self, notifier: Arc<dyn DispatchNotifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    /// Returns the number of consumers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Returns `true` when no consumer is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl std::fmt::Debug for FanOutDispatchNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanOutDispatchNotifier")
            .field("notifiers", &self.notifiers.len())
            .finish()
    }
}

#[async_trait]
impl DispatchNotifier for FanOutDispatchNotifier {
    async fn notify(&self, batch: &PendingBatch) -> NotifierResult<()> {
        for notifier in &self.notifiers {
            notifier.notify(batch).await?;
        }
        Ok(())
    }
}
