//! Pushrelay: durable update tasks for git pushes.
//!
//! The `update` hook records one task per updated ref, keyed by the push's
//! correlation identifier. The `post-receive` hook later hands the whole
//! pending batch of that push to downstream consumers and marks it
//! dispatched.
//!
//! # Architecture
//!
//! Pushrelay follows hexagonal architecture principles:
//!
//! - **Domain**: Tasks, identifiers and hook invocation parsing
//! - **Ports**: Task store and downstream notifier traits
//! - **Adapters**: In-memory and `PostgreSQL` stores, logging notifiers
//!
//! # Modules
//!
//! - [`update_task`]: Update task recording and dispatch
//! - [`hook`]: Hook process boundary and exit codes
//! - [`config`]: Hook configuration file
//! - [`telemetry`]: Log subscriber setup

pub mod config;
pub mod hook;
pub mod telemetry;
pub mod update_task;
