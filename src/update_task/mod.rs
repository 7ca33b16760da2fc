//! Update-task pipeline for git pushes.
//!
//! Every ref updated by a push is recorded as one [`domain::UpdateTask`]
//! keyed by the push's correlation identifier and the ref name. A later
//! post-receive phase reads the pending batch for the push, hands it to
//! downstream consumers, and marks the whole batch dispatched in one step.
//! The module follows hexagonal architecture:
//!
//! - Domain types and the hook invocation parser in [`domain`]
//! - Port contracts for storage and dispatch in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Ingest and dispatch services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
