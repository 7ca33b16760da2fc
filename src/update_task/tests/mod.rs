//! Unit tests for the update task pipeline.


use crate::update_task::domain::{CommitId, CorrelationId, RefName, RefUpdate};

const OLD_COMMIT: &str = "1111111111111111111111111111111111111111";
const NEW_COMMIT: &str = "2222222222222222222222222222222222222222";
const NEWER_COMMIT: &str = "3333333333333333333333333333333333333333";

fn correlation_id(value: &str) -> CorrelationId {
    CorrelationId::new(value).expect("valid correlation id")
}

fn ref_update(correlation: &str, ref_name: &str, old: &str, new: &str) -> RefUpdate {
    RefUpdate {
        correlation_id: correlation_id(correlation),
        ref_name: RefName::new(ref_name).expect("valid ref name"),
        old_commit_id: CommitId::new(old).expect("valid old commit"),
        new_commit_id: CommitId::new(new).expect("valid new commit"),
    }
}
