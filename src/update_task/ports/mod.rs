//! Port contracts for the update task pipeline.
//!
//! Ports define infrastructure-agnostic interfaces used by the ingest and
//! dispatch services.

pub mod notifier;
pub mod repository;

pub use notifier::{DispatchNotifier, NotifierError, NotifierResult};
pub use repository::{UpdateTaskRepository, UpdateTaskRepositoryError, UpdateTaskRepositoryResult};

#[cfg(test)]
pub use notifier::MockDispatchNotifier;
#[cfg(test)]
pub use repository::MockUpdateTaskRepository;
