use breachpath_core::{Classification, EffortPolicy};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "breachpath",
    version,
    about = "Propagate compromise through attack graphs and check which steps an attacker reaches"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build the graph in a document and print a summary
    Validate(ValidateArgs),
    /// Run one attack from the given entry points
    Attack(AttackArgs),
    /// Run every scenario declared in a document
    Scenarios(ScenariosArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum PolicyArg {
    FirstTransition,
    Relax,
}

impl From<PolicyArg> for EffortPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::FirstTransition => Self::FirstTransition,
            PolicyArg::Relax => Self::Relax,
        }
    }
}

/// Engine flags shared by commands that run attacks. Flags win over `--config`.
#[derive(clap::Args, Clone, Debug, Default)]
pub struct EngineArgs {
    /// YAML engine config (effort_policy, max_relaxations)
    #[arg(long, env = "BREACHPATH_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Abort the run after this many edge relaxations
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_relaxations: Option<u64>,
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    pub document: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct AttackArgs {
    pub document: PathBuf,

    /// Entry point as <asset>.<step>; repeatable
    #[arg(long = "entry", required = true)]
    pub entries: Vec<String>,

    /// Expected label as <asset>.<step>=<label>; repeatable
    #[arg(long = "expect", value_parser = parse_expectation)]
    pub expectations: Vec<(String, Classification)>,

    #[command(flatten)]
    pub engine: EngineArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also list uncompromised steps in text output
    #[arg(long)]
    pub all: bool,
}

#[derive(Parser, Debug)]
pub struct ScenariosArgs {
    pub document: PathBuf,

    #[command(flatten)]
    pub engine: EngineArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

fn parse_expectation(raw: &str) -> Result<(String, Classification), String> {
    let (step, label) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected <asset>.<step>=<label>, got '{raw}'"))?;
    if step.is_empty() {
        return Err(format!("missing step in '{raw}'"));
    }
    Ok((step.to_string(), label.parse()?))
}
