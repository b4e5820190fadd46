use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::exit_codes;
use breachpath_core::{load_document, LoadedModel};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Serialize)]
struct GraphSummary {
    assets: usize,
    steps: usize,
    disabled_steps: usize,
    edges: usize,
    blocked_edges: usize,
    scenarios: usize,
}

impl GraphSummary {
    fn of(loaded: &LoadedModel) -> Self {
        let graph = loaded.model.graph();
        let disabled_steps = graph
            .step_ids()
            .filter(|&s| !graph.step(s).enabled)
            .count();
        let blocked_edges = graph
            .step_ids()
            .flat_map(|s| graph.neighbors(s))
            .filter(|(edge, _)| edge.blocked)
            .count();
        Self {
            assets: graph.asset_count(),
            steps: graph.step_count(),
            disabled_steps,
            edges: graph.edge_count(),
            blocked_edges,
            scenarios: loaded.scenarios.len(),
        }
    }
}

pub fn run(args: &ValidateArgs) -> anyhow::Result<i32> {
    let path = args.document.display().to_string();
    let built = load_document(&args.document).and_then(|doc| doc.build());

    match (built, args.format) {
        (Ok(loaded), OutputFormat::Text) => {
            let s = GraphSummary::of(&loaded);
            println!("valid: {path}");
            println!("  assets:    {}", s.assets);
            println!("  steps:     {} ({} disabled)", s.steps, s.disabled_steps);
            println!("  edges:     {} ({} blocked)", s.edges, s.blocked_edges);
            println!("  scenarios: {}", s.scenarios);
            Ok(exit_codes::OK)
        }
        (Ok(loaded), OutputFormat::Json) => {
            let out = json!({
                "document": path,
                "valid": true,
                "summary": GraphSummary::of(&loaded),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(exit_codes::OK)
        }
        (Err(e), OutputFormat::Text) => {
            println!("invalid: {path}");
            println!("  {e}");
            Ok(exit_codes::CONFIG_ERROR)
        }
        (Err(e), OutputFormat::Json) => {
            let out = json!({
                "document": path,
                "valid": false,
                "error": e.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(exit_codes::CONFIG_ERROR)
        }
    }
}
