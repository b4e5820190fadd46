use crate::cli::args::{AttackArgs, OutputFormat};
use crate::cli::commands::engine_config;
use crate::exit_codes;
use anyhow::{bail, Context};
use breachpath_core::{load_document, AttackReport, Attacker, Expectation, Model, StepId};
use tracing::info;

pub fn run(args: &AttackArgs) -> anyhow::Result<i32> {
    let doc = load_document(&args.document)?;
    let loaded = doc
        .build()
        .with_context(|| format!("building model from {}", args.document.display()))?;
    let mut model = loaded.model;
    let config = engine_config(&args.engine)?;

    let mut attacker = Attacker::with_config(config);
    for entry in &args.entries {
        attacker.add_attack_point(resolve(&model, entry, "--entry")?);
    }
    let expectations = args
        .expectations
        .iter()
        .map(|(step, expected)| {
            Ok(Expectation {
                step: resolve(&model, step, "--expect")?,
                expected: *expected,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let outcome = attacker.attack(&mut model).context("attack aborted")?;
    let mismatches = model.check(&expectations);
    info!(
        expectations = expectations.len(),
        mismatches = mismatches.len(),
        "checked expectations"
    );

    let failed = !mismatches.is_empty();
    let report = AttackReport::from_model(&model, &outcome).with_mismatches(mismatches);
    match args.format {
        OutputFormat::Text => print!("{}", report.render_text(args.all)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(if failed {
        exit_codes::EXPECTATION_FAILED
    } else {
        exit_codes::OK
    })
}

fn resolve(model: &Model, qualified: &str, flag: &str) -> anyhow::Result<StepId> {
    match model.resolve(qualified) {
        Some(step) => Ok(step),
        None => bail!("{flag}: unknown step '{qualified}' (expected <asset>.<step>)"),
    }
}
