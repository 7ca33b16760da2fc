//! `PostgreSQL` adapters for update task persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresUpdateTaskRepository, UpdateTaskPgPool};
