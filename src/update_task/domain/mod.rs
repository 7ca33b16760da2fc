//! Domain model for push update tasks.
//!
//! The domain covers validated ref and commit identifiers, the update task
//! record and its dispatch state, pending batches, and parsing of the hook
//! invocation that feeds them. Nothing here touches storage or the process
//! environment directly.

mod batch;
mod error;
mod ids;
mod invocation;
mod task;

pub use batch::PendingBatch;
pub use error::{InvocationError, ParseUpdateTaskStatusError, UpdateTaskDomainError};
pub use ids::{CommitId, CorrelationId, RefName, UpdateTaskId};
pub use invocation::{
    CORRELATION_ID_VAR, HookEnvironment, INTERACTIVE_PUSH_MARKER, InvocationOutcome,
    ProcessEnvironment, correlation_id_from_env, parse_update_invocation,
};
pub use task::{PersistedUpdateTaskData, RefUpdate, RefUpdateKind, UpdateTask, UpdateTaskStatus};
