//! Whole pushes recorded ref by ref and dispatched once.

use super::helpers::{NEW_COMMIT, OLD_COMMIT, ZERO_COMMIT, pipeline, push_env, repository};
use eyre::{Result, ensure};
use pushrelay::hook::{HookOutcome, run_post_receive, run_update};
use pushrelay::update_task::adapters::memory::InMemoryUpdateTaskRepository;
use pushrelay::update_task::domain::{CorrelationId, RefUpdateKind};
use pushrelay::update_task::ports::UpdateTaskRepository;
use pushrelay::update_task::services::DispatchReport;
use rstest::rstest;
use std::sync::Arc;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_and_delete_in_one_push_dispatch_together(
    repository: Arc<InMemoryUpdateTaskRepository>,
) -> Result<()> {
    let env = push_env("uuid-42");
    let pipeline = pipeline(&repository);
    run_update(&["refs/heads/main", ZERO_COMMIT, NEW_COMMIT], &env, &pipeline).await?;
    run_update(&["refs/heads/dev", OLD_COMMIT, ZERO_COMMIT], &env, &pipeline).await?;

    let id = CorrelationId::new("uuid-42")?;
    let pending = repository.list_pending(&id).await?;
    let kinds: Vec<(&str, RefUpdateKind)> = pending
        .tasks()
        .iter()
        .map(|task| (task.ref_name().as_str(), task.kind()))
        .collect();
    ensure!(
        kinds
            == [
                ("refs/heads/main", RefUpdateKind::Create),
                ("refs/heads/dev", RefUpdateKind::Delete),
            ],
        "unexpected pending batch: {kinds:?}"
    );

    let outcome = run_post_receive(&env, &pipeline).await?;
    ensure!(
        outcome == HookOutcome::Dispatched(DispatchReport::Dispatched { count: 2 }),
        "unexpected outcome: {outcome:?}"
    );
    ensure!(repository.list_pending(&id).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_update_hooks_of_one_push_are_all_recorded(
    repository: Arc<InMemoryUpdateTaskRepository>,
) -> Result<()> {
    let pipeline = Arc::new(pipeline(&repository));
    let mut handles = Vec::new();
    for index in 0..12 {
        let shared = Arc::clone(&pipeline);
        handles.push(tokio::spawn(async move {
            let ref_name = format!("refs/heads/topic-{index}");
            run_update(
                &[ref_name.as_str(), OLD_COMMIT, NEW_COMMIT],
                &push_env("uuid-42"),
                &shared,
            )
            .await
            .map(|_| ())
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let outcome = run_post_receive(&push_env("uuid-42"), &pipeline).await?;
    ensure!(
        outcome == HookOutcome::Dispatched(DispatchReport::Dispatched { count: 12 }),
        "unexpected outcome: {outcome:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn retried_update_hook_keeps_a_single_task(
    repository: Arc<InMemoryUpdateTaskRepository>,
) -> Result<()> {
    let env = push_env("uuid-42");
    let pipeline = pipeline(&repository);
    for _ in 0..3 {
        run_update(&["refs/heads/main", OLD_COMMIT, NEW_COMMIT], &env, &pipeline).await?;
    }

    ensure!(repository.len()? == 1, "expected one stored task");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn interrupted_dispatch_is_retried_by_next_post_receive(
    repository: Arc<InMemoryUpdateTaskRepository>,
) -> Result<()> {
    let env = push_env("uuid-42");
    let pipeline = pipeline(&repository);
    for ref_name in ["refs/heads/a", "refs/heads/b", "refs/heads/c"] {
        run_update(&[ref_name, OLD_COMMIT, NEW_COMMIT], &env, &pipeline).await?;
    }
    repository.fail_dispatch_after(1);

    ensure!(run_post_receive(&env, &pipeline).await.is_err());
    let id = CorrelationId::new("uuid-42")?;
    ensure!(repository.list_pending(&id).await?.len() == 3);

    let outcome = run_post_receive(&env, &pipeline).await?;
    ensure!(outcome == HookOutcome::Dispatched(DispatchReport::Dispatched { count: 3 }));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pushes_with_different_correlation_ids_stay_apart(
    repository: Arc<InMemoryUpdateTaskRepository>,
) -> Result<()> {
    let pipeline = pipeline(&repository);
    run_update(
        &["refs/heads/main", OLD_COMMIT, NEW_COMMIT],
        &push_env("uuid-42"),
        &pipeline,
    )
    .await?;
    run_update(
        &["refs/heads/main", OLD_COMMIT, NEW_COMMIT],
        &push_env("uuid-43"),
        &pipeline,
    )
    .await?;

    run_post_receive(&push_env("uuid-42"), &pipeline).await?;

    ensure!(repository.len()? == 2);
    ensure!(
        repository
            .list_pending(&CorrelationId::new("uuid-43")?)
            .await?
            .len()
            == 1
    );
    Ok(())
}
