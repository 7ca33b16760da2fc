//! Given steps for push update task scenarios.

use super::world::PushWorld;
use pushrelay::update_task::domain::{CORRELATION_ID_VAR, INTERACTIVE_PUSH_MARKER};
use rstest_bdd_macros::given;

fn mark_interactive(world: &mut PushWorld) {
    world.env.insert(
        INTERACTIVE_PUSH_MARKER.to_owned(),
        "git-receive-pack 'owner/repo.git'".to_owned(),
    );
}

#[given(r#"an interactive push with correlation id "{correlation_id}""#)]
fn interactive_push(world: &mut PushWorld, correlation_id: String) {
    mark_interactive(world);
    world.env.insert(CORRELATION_ID_VAR.to_owned(), correlation_id);
}

#[given("an interactive push without a correlation id")]
fn interactive_push_without_correlation_id(world: &mut PushWorld) {
    mark_interactive(world);
    world.env.remove(CORRELATION_ID_VAR);
}

#[given("a hook environment without an interactive push marker")]
fn non_interactive_environment(world: &mut PushWorld) {
    world.env.clear();
}

#[given("downstream delivery is failing")]
fn downstream_failing(world: &mut PushWorld) {
    world.notifier.fail_deliveries();
}
