//! Git hook entry point.
//!
//! Install as the repository's `update` and `post-receive` hooks:
//!
//! ```text
//! pushrelay [--config <FILE>] update <ref-name> <old-commit> <new-commit>
//! pushrelay [--config <FILE>] post-receive
//! ```
//!
//! Outside an interactive push (no `SSH_ORIGINAL_COMMAND`) both commands exit
//! successfully without reading the configuration or touching the store. A
//! non-zero exit makes git reject the ref update.

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use mockable::DefaultClock;
use pushrelay::config::{DEFAULT_CONFIG_PATH, HookConfig};
use pushrelay::hook::{
    HookError, HookOutcome, HookPipeline, HookRequest, HookResult, exit_code, report_failure,
};
use pushrelay::telemetry;
use pushrelay::update_task::adapters::notifier::TracingDispatchNotifier;
use pushrelay::update_task::adapters::postgres::PostgresUpdateTaskRepository;
use pushrelay::update_task::domain::ProcessEnvironment;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::runtime::Builder;
use tracing::debug;

/// Records git push ref updates and dispatches them once per push
#[derive(Debug, Parser)]
#[command(name = "pushrelay")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the hook configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "PUSHRELAY_CONFIG",
        value_name = "FILE",
        default_value = DEFAULT_CONFIG_PATH
    )]
    config: Utf8PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Record one ref update (git `update` hook)
    #[command(name = "update")]
    Update {
        /// Ref name, old commit id and new commit id as passed by git
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Dispatch the pending ref updates of the push (git `post-receive` hook)
    #[command(name = "post-receive")]
    PostReceive,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let env = ProcessEnvironment;

    let parsed = match &cli.command {
        Command::Update { args } => HookRequest::from_update_args(args, &env),
        Command::PostReceive => HookRequest::from_post_receive(&env),
    };
    let result = match parsed {
        Ok(Some(request)) => run(&cli.config, request),
        Ok(None) => Ok(HookOutcome::NotApplicable),
        Err(err) => Err(err),
    };

    if let Err(err) = &result {
        report_failure(err);
        drop(writeln!(io::stderr(), "pushrelay: {err}"));
    }
    ExitCode::from(exit_code(&result))
}

fn run(config_path: &Utf8Path, request: HookRequest) -> HookResult<HookOutcome> {
    let config = HookConfig::load(config_path, &ProcessEnvironment)?;
    telemetry::init(config.log())?;
    debug!(config = %config_path, "configuration loaded");

    let repository = PostgresUpdateTaskRepository::connect(
        config.database_url(),
        config.pool_size(),
        config.connect_timeout(),
    )?;
    let pipeline = HookPipeline::new(
        Arc::new(repository),
        Arc::new(TracingDispatchNotifier),
        Arc::new(DefaultClock),
    );

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(HookError::Runtime)?;
    runtime.block_on(pipeline.execute(request))
}
