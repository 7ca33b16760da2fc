//! Update task record and its dispatch lifecycle.

use super::{CommitId, CorrelationId, ParseUpdateTaskStatusError, RefName, UpdateTaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Dispatch state of an update task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateTaskStatus {
    /// Recorded by the update hook and not yet handed downstream.
    Pending,
    /// Accepted by every downstream consumer.
    Dispatched,
}

impl UpdateTaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Dispatched => "dispatched",
        }
    }
}

impl TryFrom<&str> for UpdateTaskStatus {
    type Error = ParseUpdateTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "dispatched" => Ok(Self::Dispatched),
            _ => Err(ParseUpdateTaskStatusError(value.to_owned())),
        }
    }
}

/// Kind of change a ref update makes, derived from the zero object id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefUpdateKind {
    /// The ref did not exist before the push.
    Create,
    /// The ref was removed by the push.
    Delete,
    /// The ref moved from one commit to another.
    Update,
}

/// Validated ref update extracted from one hook invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefUpdate {
    /// Push the update belongs to.
    pub correlation_id: CorrelationId,
    /// Updated ref.
    pub ref_name: RefName,
    /// Commit the ref pointed at before the push.
    pub old_commit_id: CommitId,
    /// Commit the ref points at after the push.
    pub new_commit_id: CommitId,
}

/// One ref update within one push, as stored in the task store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTask {
    id: UpdateTaskId,
    correlation_id: CorrelationId,
    ref_name: RefName,
    old_commit_id: CommitId,
    new_commit_id: CommitId,
    status: UpdateTaskStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    dispatched_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted update task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedUpdateTaskData {
    /// Persisted row identifier.
    pub id: UpdateTaskId,
    /// Persisted correlation identifier.
    pub correlation_id: CorrelationId,
    /// Persisted ref name.
    pub ref_name: RefName,
    /// Persisted previous commit.
    pub old_commit_id: CommitId,
    /// Persisted new commit.
    pub new_commit_id: CommitId,
    /// Persisted dispatch state.
    pub status: UpdateTaskStatus,
    /// Persisted ingestion timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest ingestion timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted dispatch timestamp, if dispatched.
    pub dispatched_at: Option<DateTime<Utc>>,
}

impl UpdateTask {
    /// Creates a pending task for a validated ref update.
    #[must_use]
    pub fn new(update: RefUpdate, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        let RefUpdate {
            correlation_id,
            ref_name,
            old_commit_id,
            new_commit_id,
        } = update;

        Self {
            id: UpdateTaskId::new(),
            correlation_id,
            ref_name,
            old_commit_id,
            new_commit_id,
            status: UpdateTaskStatus::Pending,
            created_at: timestamp,
            updated_at: timestamp,
            dispatched_at: None,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedUpdateTaskData) -> Self {
        Self {
            id: data.id,
            correlation_id: data.correlation_id,
            ref_name: data.ref_name,
            old_commit_id: data.old_commit_id,
            new_commit_id: data.new_commit_id,
            status: data.status,
            created_at: data.created_at,
            updated_at: data.updated_at,
            dispatched_at: data.dispatched_at,
        }
    }

    /// Returns the row identifier.
    #[must_use]
    pub const fn id(&self) -> UpdateTaskId {
        self.id
    }

    /// Returns the push correlation identifier.
    #[must_use]
    pub const fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    /// Returns the updated ref.
    #[must_use]
    pub const fn ref_name(&self) -> &RefName {
        &self.ref_name
    }

    /// Returns the commit the ref pointed at before the push.
    #[must_use]
    pub const fn old_commit_id(&self) -> &CommitId {
        &self.old_commit_id
    }

    /// Returns the commit the ref points at after the push.
    #[must_use]
    pub const fn new_commit_id(&self) -> &CommitId {
        &self.new_commit_id
    }

    /// Returns the dispatch state.
    #[must_use]
    pub const fn status(&self) -> UpdateTaskStatus {
        self.status
    }

    /// Returns the first ingestion timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest ingestion timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns when the task was dispatched, if it has been.
    #[must_use]
    pub const fn dispatched_at(&self) -> Option<DateTime<Utc>> {
        self.dispatched_at
    }

    /// Returns `true` while the task awaits dispatch.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == UpdateTaskStatus::Pending
    }

    /// Classifies the ref update by its zero object ids.
    #[must_use]
    pub fn kind(&self) -> RefUpdateKind {
        if self.old_commit_id.is_zero() {
            RefUpdateKind::Create
        } else if self.new_commit_id.is_zero() {
            RefUpdateKind::Delete
        } else {
            RefUpdateKind::Update
        }
    }

    /// Applies a re-ingestion of the same (correlation id, ref name) pair.
    ///
    /// The identity and creation time of `self` are kept; commit ids and the
    /// update timestamp come from `incoming`. The task returns to pending so
    /// the newer ref state is dispatched.
    pub fn reingest(&mut self, incoming: &Self) {
        debug_assert_eq!(self.correlation_id, incoming.correlation_id);
        debug_assert_eq!(self.ref_name, incoming.ref_name);
        self.old_commit_id = incoming.old_commit_id.clone();
        self.new_commit_id = incoming.new_commit_id.clone();
        self.updated_at = incoming.updated_at;
        self.status = UpdateTaskStatus::Pending;
        self.dispatched_at = None;
    }

    /// Transitions the task to dispatched.
    pub const fn mark_dispatched(&mut self, at: DateTime<Utc>) {
        self.status = UpdateTaskStatus::Dispatched;
        self.dispatched_at = Some(at);
    }
}
