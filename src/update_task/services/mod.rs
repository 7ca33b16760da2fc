//! Application services for the update task pipeline.

mod dispatch;
mod ingest;

pub use dispatch::{DispatchError, DispatchReport, DispatchResult, PushDispatchService};
pub use ingest::{IngestError, IngestResult, UpdateTaskIngestService};
