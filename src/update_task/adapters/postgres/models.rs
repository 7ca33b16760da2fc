//! Diesel row models for update task persistence.

use super::schema::update_tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for update task records.
///
/// `insertion_seq` only orders queries and is not selected.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = update_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateTaskRow {
    pub id: uuid::Uuid,
    pub correlation_id: String,
    pub ref_name: String,
    pub old_commit_id: String,
    pub new_commit_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub dispatched_at: Option<DateTime<Utc>>,
}

/// Insert model for update task records.
///
/// `insertion_seq` is assigned by the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = update_tasks)]
pub struct NewUpdateTaskRow {
    pub id: uuid::Uuid,
    pub correlation_id: String,
    pub ref_name: String,
    pub old_commit_id: String,
    pub new_commit_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub dispatched_at: Option<DateTime<Utc>>,
}
