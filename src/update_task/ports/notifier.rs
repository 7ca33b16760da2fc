//! Port for handing a completed push to downstream consumers.
//!
//! Webhooks, mirror sync, CI triggers and activity feeds sit behind this
//! boundary. Their fan-out is not modelled here; the port only fixes what a
//! consumer receives and what success means.

use crate::update_task::domain::PendingBatch;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for notifier operations.
pub type NotifierResult<T> = Result<T, NotifierError>;

/// Downstream consumer of completed pushes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DispatchNotifier: Send + Sync {
    /// Delivers the ordered, deduplicated batch of one push.
    ///
    /// Returning `Ok` means every consumer durably accepted the batch or
    /// queued it for retry. The caller only acknowledges the batch in the
    /// task store after that.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError`] when any consumer failed to accept the
    /// batch.
    async fn notify(&self, batch: &PendingBatch) -> NotifierResult<()>;
}

/// Errors returned by dispatch notifiers.
#[derive(Debug, Clone, Error)]
pub enum NotifierError {
    /// A consumer refused the batch.
    #[error("consumer '{consumer}' rejected the batch: {reason}")]
    Rejected {
        /// Name of the refusing consumer.
        consumer: String,
        /// Reason given by the consumer.
        reason: String,
    },

    /// The batch could not be delivered.
    #[error("delivery error: {0}")]
    Delivery(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotifierError {
    /// Creates a rejection error for the named consumer.
    #[must_use]
    pub fn rejected(consumer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            consumer: consumer.into(),
            reason: reason.into(),
        }
    }

    /// Wraps a delivery error.
    pub fn delivery(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Delivery(Arc::new(err))
    }
}
