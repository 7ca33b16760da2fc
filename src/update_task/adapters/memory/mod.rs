//! In-memory adapters for the update task pipeline.

mod repository;

pub use repository::InMemoryUpdateTaskRepository;
