//! Parsing of the `update` hook invocation.
//!
//! Git runs the update hook once per ref with three positional arguments:
//! the ref name, the old object id and the new object id. The push is
//! identified by a correlation identifier placed in the environment by
//! whatever accepted the SSH session. Parsing is pure: the environment is
//! read through [`HookEnvironment`] so callers can supply a fixed map.

use super::{CommitId, CorrelationId, InvocationError, RefName, RefUpdate};
use std::collections::BTreeMap;

/// Environment variable that is only set for interactive pushes over SSH.
pub const INTERACTIVE_PUSH_MARKER: &str = "SSH_ORIGINAL_COMMAND";

/// Environment variable carrying the push correlation identifier.
pub const CORRELATION_ID_VAR: &str = "PUSHRELAY_UUID";

/// Read access to the variables of the hook's environment.
pub trait HookEnvironment {
    /// Returns the value of `key`, or `None` when unset or not valid UTF-8.
    fn var(&self, key: &str) -> Option<String>;
}

/// [`HookEnvironment`] backed by the current process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl HookEnvironment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl HookEnvironment for BTreeMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Result of parsing a hook invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome<T> {
    /// The invocation belongs to an interactive push.
    Applicable(T),
    /// The hook ran outside an interactive push; nothing is to be done.
    NotApplicable,
}

/// Resolves the push correlation identifier from the environment.
///
/// Returns [`InvocationOutcome::NotApplicable`] when the interactive-push
/// marker is absent or empty.
///
/// # Errors
///
/// Returns [`InvocationError::MissingCorrelationId`] when the marker is
/// present but the identifier is unset or blank.
pub fn correlation_id_from_env(
    env: &impl HookEnvironment,
) -> Result<InvocationOutcome<CorrelationId>, InvocationError> {
    if !is_interactive_push(env) {
        return Ok(InvocationOutcome::NotApplicable);
    }
    require_correlation_id(env).map(InvocationOutcome::Applicable)
}

/// Parses the arguments and environment of one `update` hook invocation.
///
/// # Errors
///
/// Returns [`InvocationError`] when an interactive push supplies the wrong
/// number of arguments, an empty ref name, no correlation identifier, or a
/// commit id that is not a hexadecimal object id.
pub fn parse_update_invocation<S: AsRef<str>>(
    args: &[S],
    env: &impl HookEnvironment,
) -> Result<InvocationOutcome<RefUpdate>, InvocationError> {
    if !is_interactive_push(env) {
        return Ok(InvocationOutcome::NotApplicable);
    }

    let [ref_arg, old_arg, new_arg] = args else {
        return Err(InvocationError::ArgumentCount {
            actual: args.len(),
        });
    };
    let ref_name = RefName::new(ref_arg.as_ref())?;
    let correlation_id = require_correlation_id(env)?;
    let old_commit_id = CommitId::new(old_arg.as_ref())?;
    let new_commit_id = CommitId::new(new_arg.as_ref())?;

    Ok(InvocationOutcome::Applicable(RefUpdate {
        correlation_id,
        ref_name,
        old_commit_id,
        new_commit_id,
    }))
}

fn is_interactive_push(env: &impl HookEnvironment) -> bool {
    env.var(INTERACTIVE_PUSH_MARKER)
        .is_some_and(|value| !value.is_empty())
}

fn require_correlation_id(env: &impl HookEnvironment) -> Result<CorrelationId, InvocationError> {
    env.var(CORRELATION_ID_VAR)
        .and_then(|value| CorrelationId::new(value).ok())
        .ok_or(InvocationError::MissingCorrelationId {
            variable: CORRELATION_ID_VAR,
        })
}
