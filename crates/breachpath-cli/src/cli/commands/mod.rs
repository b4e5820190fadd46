use super::args::{Cli, Command, EngineArgs};
use anyhow::Context;
use breachpath_core::{load_engine_config, EngineConfig, EngineConfigOverrides};
use tracing::debug;

pub mod attack;
pub mod scenarios;
pub mod validate;

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Validate(args) => validate::run(&args),
        Command::Attack(args) => attack::run(&args),
        Command::Scenarios(args) => scenarios::run(&args),
    }
}

/// Defaults, then the `--config` file, then flags.
pub(crate) fn engine_config(args: &EngineArgs) -> anyhow::Result<EngineConfig> {
    let base = match &args.config {
        Some(path) => load_engine_config(path)
            .with_context(|| format!("loading engine config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let cfg = base.apply(EngineConfigOverrides {
        version: None,
        effort_policy: args.policy.map(Into::into),
        max_relaxations: args.max_relaxations,
    });
    debug!(policy = ?cfg.effort_policy, max_relaxations = ?cfg.max_relaxations, "engine config");
    Ok(cfg)
}
