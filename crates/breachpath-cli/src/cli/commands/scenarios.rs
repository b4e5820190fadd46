use crate::cli::args::{OutputFormat, ScenariosArgs};
use crate::cli::commands::engine_config;
use crate::exit_codes;
use anyhow::Context;
use breachpath_core::{load_document, ScenarioResult};
use serde_json::json;

pub fn run(args: &ScenariosArgs) -> anyhow::Result<i32> {
    let doc = load_document(&args.document)?;
    let loaded = doc
        .build()
        .with_context(|| format!("building model from {}", args.document.display()))?;
    let config = engine_config(&args.engine)?;

    let results = loaded
        .scenarios
        .iter()
        .map(|s| {
            s.run(&loaded.model, &config)
                .with_context(|| format!("scenario '{}'", s.name))
        })
        .collect::<anyhow::Result<Vec<ScenarioResult>>>()?;
    let failed = results.iter().filter(|r| !r.passed).count();

    match args.format {
        OutputFormat::Text => {
            if results.is_empty() {
                println!("no scenarios in {}", args.document.display());
            }
            for r in &results {
                let status = if r.passed { "PASS" } else { "FAIL" };
                println!("{status} {}", r.name);
                for m in &r.mismatches {
                    println!("     {m}");
                }
            }
            println!();
            println!("{} passed, {} failed", results.len() - failed, failed);
        }
        OutputFormat::Json => {
            let out = json!({
                "document": args.document.display().to_string(),
                "passed": results.len() - failed,
                "failed": failed,
                "scenarios": results,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    Ok(if failed > 0 {
        exit_codes::EXPECTATION_FAILED
    } else {
        exit_codes::OK
    })
}
