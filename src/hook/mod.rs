//! Process boundary of the git hooks.
//!
//! A hook process turns its arguments and environment into a
//! [`HookRequest`], runs it through a [`HookPipeline`], and exits with the
//! code from [`exit_code`]. Requests that do not belong to an interactive
//! push never reach the pipeline and exit successfully.

use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::update_task::{
    domain::{
        CorrelationId, HookEnvironment, InvocationError, InvocationOutcome, RefUpdate, UpdateTask,
        correlation_id_from_env, parse_update_invocation,
    },
    ports::{DispatchNotifier, UpdateTaskRepository, UpdateTaskRepositoryError},
    services::{
        DispatchError, DispatchReport, IngestError, PushDispatchService, UpdateTaskIngestService,
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

/// Exit code accepting the ref update.
pub const EXIT_ACCEPT: u8 = 0;

/// Exit code for a malformed invocation.
pub const EXIT_MALFORMED: u8 = 2;

/// Exit code for every other fatal failure.
pub const EXIT_FAILURE: u8 = 1;

/// Work requested by one hook invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookRequest {
    /// Record one ref update (`update` hook).
    Update(RefUpdate),
    /// Dispatch the pending tasks of a push (`post-receive` hook).
    PostReceive(CorrelationId),
}

impl HookRequest {
    /// Parses an `update` hook invocation.
    ///
    /// Returns `Ok(None)` when the hook ran outside an interactive push.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::MalformedInvocation`] when the arguments or the
    /// correlation identifier are invalid.
    pub fn from_update_args<S: AsRef<str>>(
        args: &[S],
        env: &impl HookEnvironment,
    ) -> HookResult<Option<Self>> {
        Ok(match parse_update_invocation(args, env)? {
            InvocationOutcome::Applicable(update) => Some(Self::Update(update)),
            InvocationOutcome::NotApplicable => None,
        })
    }

    /// Parses a `post-receive` hook invocation.
    ///
    /// Returns `Ok(None)` when the hook ran outside an interactive push.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::MalformedInvocation`] when the correlation
    /// identifier is missing.
    pub fn from_post_receive(env: &impl HookEnvironment) -> HookResult<Option<Self>> {
        Ok(match correlation_id_from_env(env)? {
            InvocationOutcome::Applicable(correlation_id) => Some(Self::PostReceive(correlation_id)),
            InvocationOutcome::NotApplicable => None,
        })
    }
}

/// Successful outcome of a hook invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    /// The ref update was recorded.
    Recorded(UpdateTask),
    /// The post-receive phase ran.
    Dispatched(DispatchReport),
    /// The hook ran outside an interactive push and did nothing.
    NotApplicable,
}

/// Fatal hook failures; git rejects the push when any of these occurs.
#[derive(Debug, Error)]
pub enum HookError {
    /// The invocation arguments or environment are malformed.
    #[error("malformed hook invocation: {0}")]
    MalformedInvocation(#[from] InvocationError),
    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Logging could not be set up.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    /// The task store could not be opened.
    #[error("task store unavailable: {0}")]
    Storage(#[from] UpdateTaskRepositoryError),
    /// The ref update could not be recorded.
    #[error(transparent)]
    Ingest(#[from] IngestError),
    /// The push could not be dispatched.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    /// The async runtime could not be started.
    #[error("failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl HookError {
    /// Returns the process exit code for this failure.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::MalformedInvocation(_) => EXIT_MALFORMED,
            Self::Config(_)
            | Self::Telemetry(_)
            | Self::Storage(_)
            | Self::Ingest(_)
            | Self::Dispatch(_)
            | Self::Runtime(_) => EXIT_FAILURE,
        }
    }
}

/// Result type for hook operations.
pub type HookResult<T> = Result<T, HookError>;

/// Maps the result of a hook invocation to its process exit code.
#[must_use]
pub const fn exit_code(result: &HookResult<HookOutcome>) -> u8 {
    match result {
        Ok(HookOutcome::Recorded(_) | HookOutcome::Dispatched(_) | HookOutcome::NotApplicable) => {
            EXIT_ACCEPT
        }
        Err(err) => err.exit_code(),
    }
}

/// Ingest and dispatch services sharing one task store.
pub struct HookPipeline<R, N, C>
where
    R: UpdateTaskRepository,
    N: DispatchNotifier,
    C: Clock + Send + Sync,
{
    ingest: UpdateTaskIngestService<R, C>,
    dispatch: PushDispatchService<R, N, C>,
}

impl<R, N, C> HookPipeline<R, N, C>
where
    R: UpdateTaskRepository,
    N: DispatchNotifier,
    C: Clock + Send + Sync,
{
    /// Creates a pipeline over the given store, notifier and clock.
    #[must_use]
    pub fn new(repository: Arc<R>, notifier: Arc<N>, clock: Arc<C>) -> Self {
        Self {
            ingest: UpdateTaskIngestService::new(Arc::clone(&repository), Arc::clone(&clock)),
            dispatch: PushDispatchService::new(repository, notifier, clock),
        }
    }

    /// Runs one parsed hook request.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::Ingest`] or [`HookError::Dispatch`] when the
    /// store or a downstream consumer fails.
    pub async fn execute(&self, request: HookRequest) -> HookResult<HookOutcome> {
        let outcome = match request {
            HookRequest::Update(update) => HookOutcome::Recorded(self.ingest.record(update).await?),
            HookRequest::PostReceive(correlation_id) => {
                HookOutcome::Dispatched(self.dispatch.dispatch(&correlation_id).await?)
            }
        };
        Ok(outcome)
    }
}

/// Parses and runs an `update` hook invocation end to end.
///
/// # Errors
///
/// Returns [`HookError`] for malformed invocations and store failures.
pub async fn run_update<S, R, N, C>(
    args: &[S],
    env: &impl HookEnvironment,
    pipeline: &HookPipeline<R, N, C>,
) -> HookResult<HookOutcome>
where
    S: AsRef<str>,
    R: UpdateTaskRepository,
    N: DispatchNotifier,
    C: Clock + Send + Sync,
{
    match HookRequest::from_update_args(args, env)? {
        Some(request) => pipeline.execute(request).await,
        None => Ok(HookOutcome::NotApplicable),
    }
}

/// Parses and runs a `post-receive` hook invocation end to end.
///
/// # Errors
///
/// Returns [`HookError`] for a missing correlation identifier and for store
/// or delivery failures.
pub async fn run_post_receive<R, N, C>(
    env: &impl HookEnvironment,
    pipeline: &HookPipeline<R, N, C>,
) -> HookResult<HookOutcome>
where
    R: UpdateTaskRepository,
    N: DispatchNotifier,
    C: Clock + Send + Sync,
{
    match HookRequest::from_post_receive(env)? {
        Some(request) => pipeline.execute(request).await,
        None => Ok(HookOutcome::NotApplicable),
    }
}

/// Logs a fatal hook failure before the process exits.
pub fn report_failure(err: &HookError) {
    error!(error = %err, exit_code = err.exit_code(), "hook failed");
}
