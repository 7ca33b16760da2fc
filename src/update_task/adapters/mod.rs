//! Adapter implementations for the update task ports.

pub mod memory;
pub mod notifier;
pub mod postgres;
