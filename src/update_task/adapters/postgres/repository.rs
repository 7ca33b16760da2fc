//! `PostgreSQL` repository implementation for update task storage.

use super::{
    models::{NewUpdateTaskRow, UpdateTaskRow},
    schema::update_tasks,
};
use crate::update_task::{
    domain::{
        CommitId, CorrelationId, PendingBatch, PersistedUpdateTaskData, RefName, UpdateTask,
        UpdateTaskId, UpdateTaskStatus,
    },
    ports::{UpdateTaskRepository, UpdateTaskRepositoryError, UpdateTaskRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error as DieselError;
use diesel::upsert::excluded;
use std::time::Duration;

/// `PostgreSQL` connection pool type used by update task adapters.
pub type UpdateTaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed update task repository.
///
/// Upserts rely on the unique `(correlation_id, ref_name)` index, so
/// concurrent hook processes for different refs never contend on a lock and
/// two writers for the same ref resolve to one row. Dispatch locks the
/// push's pending rows with `SELECT ... FOR UPDATE` inside a transaction.
#[derive(Debug, Clone)]
pub struct PostgresUpdateTaskRepository {
    pool: UpdateTaskPgPool,
}

impl PostgresUpdateTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: UpdateTaskPgPool) -> Self {
        Self { pool }
    }

    /// Builds a connection pool for `database_url` and wraps it.
    ///
    /// Blocks until the pool's first connection is established or
    /// `connect_timeout` elapses.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateTaskRepositoryError::Persistence`] when no connection
    /// can be established.
    pub fn connect(
        database_url: &str,
        pool_size: u32,
        connect_timeout: Duration,
    ) -> UpdateTaskRepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(pool_size)
            .connection_timeout(connect_timeout)
            .build(manager)
            .map_err(UpdateTaskRepositoryError::persistence)?;
        Ok(Self::new(pool))
    }

    async fn run_blocking<F, T>(&self, f: F) -> UpdateTaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> UpdateTaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(UpdateTaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(UpdateTaskRepositoryError::persistence)?
    }
}

impl From<DieselError> for UpdateTaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl UpdateTaskRepository for PostgresUpdateTaskRepository {
    async fn upsert(&self, task: &UpdateTask) -> UpdateTaskRepositoryResult<UpdateTask> {
        let new_row = to_new_row(task);

        self.run_blocking(move |connection| {
            let row = diesel::insert_into(update_tasks::table)
                .values(&new_row)
                .on_conflict((update_tasks::correlation_id, update_tasks::ref_name))
                .do_update()
                .set((
                    update_tasks::old_commit_id.eq(excluded(update_tasks::old_commit_id)),
                    update_tasks::new_commit_id.eq(excluded(update_tasks::new_commit_id)),
                    update_tasks::status.eq(UpdateTaskStatus::Pending.as_str()),
                    update_tasks::updated_at.eq(excluded(update_tasks::updated_at)),
                    update_tasks::dispatched_at.eq(None::<DateTime<Utc>>),
                ))
                .returning(UpdateTaskRow::as_returning())
                .get_result::<UpdateTaskRow>(connection)?;
            row_to_task(row)
        })
        .await
    }

    async fn list_pending(
        &self,
        correlation_id: &CorrelationId,
    ) -> UpdateTaskRepositoryResult<PendingBatch> {
        let lookup_id = correlation_id.clone();
        self.run_blocking(move |connection| {
            let rows = update_tasks::table
                .filter(update_tasks::correlation_id.eq(lookup_id.as_str()))
                .filter(update_tasks::status.eq(UpdateTaskStatus::Pending.as_str()))
                .order((
                    update_tasks::created_at.asc(),
                    update_tasks::insertion_seq.asc(),
                ))
                .select(UpdateTaskRow::as_select())
                .load::<UpdateTaskRow>(connection)?;
            let tasks = rows
                .into_iter()
                .map(row_to_task)
                .collect::<UpdateTaskRepositoryResult<Vec<_>>>()?;
            Ok(PendingBatch::new(lookup_id, tasks))
        })
        .await
    }

    async fn mark_dispatched(
        &self,
        batch: &PendingBatch,
        at: DateTime<Utc>,
    ) -> UpdateTaskRepositoryResult<usize> {
        let observed = batch.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, UpdateTaskRepositoryError, _>(|tx_conn| {
                let locked = update_tasks::table
                    .filter(update_tasks::correlation_id.eq(observed.correlation_id().as_str()))
                    .filter(update_tasks::status.eq(UpdateTaskStatus::Pending.as_str()))
                    .order((
                        update_tasks::created_at.asc(),
                        update_tasks::insertion_seq.asc(),
                    ))
                    .select(UpdateTaskRow::as_select())
                    .for_update()
                    .load::<UpdateTaskRow>(tx_conn)?
                    .into_iter()
                    .map(row_to_task)
                    .collect::<UpdateTaskRepositoryResult<Vec<_>>>()?;

                if !observed.matches(&locked) {
                    return Err(UpdateTaskRepositoryError::StaleBatch {
                        correlation_id: observed.correlation_id().clone(),
                        observed: observed.len(),
                        found: locked.len(),
                    });
                }
                if locked.is_empty() {
                    return Ok(0);
                }

                let ids: Vec<uuid::Uuid> =
                    locked.iter().map(|task| task.id().into_inner()).collect();
                let updated = diesel::update(update_tasks::table)
                    .filter(update_tasks::id.eq_any(ids))
                    .set((
                        update_tasks::status.eq(UpdateTaskStatus::Dispatched.as_str()),
                        update_tasks::dispatched_at.eq(Some(at)),
                    ))
                    .execute(tx_conn)?;
                Ok(updated)
            })
        })
        .await
    }

    async fn find(
        &self,
        correlation_id: &CorrelationId,
        ref_name: &RefName,
    ) -> UpdateTaskRepositoryResult<Option<UpdateTask>> {
        let lookup_id = correlation_id.clone();
        let lookup_ref = ref_name.clone();
        self.run_blocking(move |connection| {
            let row = update_tasks::table
                .filter(update_tasks::correlation_id.eq(lookup_id.as_str()))
                .filter(update_tasks::ref_name.eq(lookup_ref.as_str()))
                .select(UpdateTaskRow::as_select())
                .first::<UpdateTaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }
}

fn to_new_row(task: &UpdateTask) -> NewUpdateTaskRow {
    NewUpdateTaskRow {
        id: task.id().into_inner(),
        correlation_id: task.correlation_id().as_str().to_owned(),
        ref_name: task.ref_name().as_str().to_owned(),
        old_commit_id: task.old_commit_id().as_str().to_owned(),
        new_commit_id: task.new_commit_id().as_str().to_owned(),
        status: task.status().as_str().to_owned(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
        dispatched_at: task.dispatched_at(),
    }
}

fn row_to_task(row: UpdateTaskRow) -> UpdateTaskRepositoryResult<UpdateTask> {
    let UpdateTaskRow {
        id,
        correlation_id,
        ref_name,
        old_commit_id,
        new_commit_id,
        status,
        created_at,
        updated_at,
        dispatched_at,
    } = row;

    let data = PersistedUpdateTaskData {
        id: UpdateTaskId::from_uuid(id),
        correlation_id: CorrelationId::new(correlation_id)
            .map_err(UpdateTaskRepositoryError::persistence)?,
        ref_name: RefName::new(ref_name).map_err(UpdateTaskRepositoryError::persistence)?,
        old_commit_id: CommitId::new(old_commit_id)
            .map_err(UpdateTaskRepositoryError::persistence)?,
        new_commit_id: CommitId::new(new_commit_id)
            .map_err(UpdateTaskRepositoryError::persistence)?,
        status: UpdateTaskStatus::try_from(status.as_str())
            .map_err(UpdateTaskRepositoryError::persistence)?,
        created_at,
        updated_at,
        dispatched_at,
    };
    Ok(UpdateTask::from_persisted(data))
}
