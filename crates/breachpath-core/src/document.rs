//! YAML graph documents.
//!
//! ```yaml
//! version: 1
//! assets:
//!   - name: srv
//!     kind: WebServer
//!     defenses:
//!       fullyPatched: true
//!     steps:
//!       - name: attemptRCEExploit
//!       - name: exploitRCE
//!         disabled_when: [fullyPatched]
//!       - name: privilegedCodeExecution
//!         gate: and
//! edges:
//!   - { from: srv.attemptRCEExploit, to: srv.exploitRCE, effort: with_effort }
//!   - { from: srv.exploitRCE, to: srv.privilegedCodeExecution }
//! scenarios:
//!   - name: patched server resists RCE
//!     entry: [srv.attemptRCEExploit]
//!     expect:
//!       srv.exploitRCE: uncompromised
//! ```
//!
//! Step guards name a defense of the same asset; edge guards use the
//! qualified `<asset>.<defense>` form. A bare name activates on `true`,
//! `{ defense, equals }` on any value.

use crate::classify::Classification;
use crate::config::EngineConfig;
use crate::engine::{AttackOutcome, Attacker};
use crate::error::{AttackError, ModelError};
use crate::graph::{AssetId, DefenseId, DefenseValue, GraphBuilder, Guard, StepId};
use crate::model::Model;
use crate::query::{AssertionMismatch, Expectation};
use crate::state::{EffortClass, Gate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

pub const SUPPORTED_DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to read document {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse document {path}: {message}")]
    Parse { path: String, message: String },

    #[error("unsupported document version {found} (supported: {})", SUPPORTED_DOCUMENT_VERSION)]
    UnsupportedVersion { found: u32 },

    #[error("{context}: unknown step '{step}'")]
    UnknownStep { context: String, step: String },

    #[error("{context}: unknown defense '{defense}'")]
    UnknownDefense { context: String, defense: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDocument {
    pub version: u32,
    #[serde(default)]
    pub assets: Vec<AssetSpec>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
    #[serde(default)]
    pub scenarios: Vec<ScenarioSpec>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssetSpec {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub defenses: BTreeMap<String, DefenseValue>,
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StepSpec {
    pub name: String,
    #[serde(default = "default_gate")]
    pub gate: Gate,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled_when: Vec<GuardSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forced_effort_when: Vec<GuardSpec>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EdgeSpec {
    pub from: String,
    pub to: String,
    #[serde(default = "default_effort")]
    pub effort: EffortClass,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_when: Vec<GuardSpec>,
}

/// `fullyPatched` or `{ defense: tier, equals: legacy }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum GuardSpec {
    Name(String),
    Match { defense: String, equals: DefenseValue },
}

impl GuardSpec {
    fn parts(&self) -> (&str, DefenseValue) {
        match self {
            Self::Name(name) => (name, DefenseValue::Flag(true)),
            Self::Match { defense, equals } => (defense, equals.clone()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioSpec {
    pub name: String,
    pub entry: Vec<String>,
    #[serde(default)]
    pub expect: BTreeMap<String, Classification>,
}

fn default_gate() -> Gate {
    Gate::Or
}

fn default_effort() -> EffortClass {
    EffortClass::Instantaneous
}

fn default_required() -> bool {
    true
}

/// A built model plus its scenarios with step references resolved.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub model: Model,
    pub scenarios: Vec<Scenario>,
}

#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub entry: Vec<StepId>,
    pub expect: Vec<Expectation>,
}

/// Result of running one [`Scenario`].
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub name: String,
    pub passed: bool,
    pub outcome: AttackOutcome,
    pub mismatches: Vec<AssertionMismatch>,
}

impl Scenario {
    /// Runs on a fresh fork of `base`, leaving `base` untouched.
    pub fn run(&self, base: &Model, config: &EngineConfig) -> Result<ScenarioResult, AttackError> {
        let mut model = base.fork();
        let mut attacker = Attacker::with_config(config.clone());
        for &step in &self.entry {
            attacker.add_attack_point(step);
        }
        let outcome = attacker.attack(&mut model)?;
        let mismatches = model.check(&self.expect);
        info!(
            scenario = %self.name,
            mismatches = mismatches.len(),
            "scenario finished"
        );
        Ok(ScenarioResult {
            name: self.name.clone(),
            passed: mismatches.is_empty(),
            outcome,
            mismatches,
        })
    }
}

impl ModelDocument {
    pub fn from_yaml(raw: &str, origin: &str) -> Result<Self, DocumentError> {
        let doc: Self = serde_yaml::from_str(raw).map_err(|e| DocumentError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        if doc.version != SUPPORTED_DOCUMENT_VERSION {
            return Err(DocumentError::UnsupportedVersion { found: doc.version });
        }
        Ok(doc)
    }

    /// Feeds every asset, step, defense, edge and guard into a
    /// [`GraphBuilder`] in document order and builds the model.
    pub fn build(&self) -> Result<LoadedModel, DocumentError> {
        let mut b = GraphBuilder::new();

        for asset in &self.assets {
            let id = b.add_asset(&asset.name, &asset.kind)?;
            for (name, value) in &asset.defenses {
                b.add_defense(id, name, value.clone())?;
            }
            for step in &asset.steps {
                b.add_attack_step(id, &step.name, step.gate)?;
            }
        }

        for asset in &self.assets {
            let Some(id) = b.asset_by_name(&asset.name) else {
                continue;
            };
            for step in &asset.steps {
                let qualified = format!("{}.{}", asset.name, step.name);
                let Some(sid) = b.lookup(&qualified) else {
                    continue;
                };
                for spec in &step.disabled_when {
                    let guard = local_guard(&b, id, spec, &qualified)?;
                    b.disable_step_when(sid, guard)?;
                }
                for spec in &step.forced_effort_when {
                    let guard = local_guard(&b, id, spec, &qualified)?;
                    b.force_effort_when(sid, guard)?;
                }
            }
        }

        for edge in &self.edges {
            let context = format!("edge {} -> {}", edge.from, edge.to);
            let parent = resolve_step(&b, &edge.from, &context)?;
            let child = resolve_step(&b, &edge.to, &context)?;
            let eid = b.add_edge(parent, child, edge.effort, edge.required)?;
            for spec in &edge.blocked_when {
                let guard = qualified_guard(&b, spec, &context)?;
                b.block_edge_when(eid, guard)?;
            }
        }

        let scenarios = self
            .scenarios
            .iter()
            .map(|s| resolve_scenario(&b, s))
            .collect::<Result<Vec<_>, _>>()?;

        let model = Model::new(b.build()?);
        debug!(
            steps = model.graph().step_count(),
            scenarios = scenarios.len(),
            "loaded model document"
        );
        Ok(LoadedModel { model, scenarios })
    }
}

pub fn load_document(path: &Path) -> Result<ModelDocument, DocumentError> {
    let raw = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
        path: path.display().to_string(),
        source,
    })?;
    ModelDocument::from_yaml(&raw, &path.display().to_string())
}

fn resolve_step(b: &GraphBuilder, qualified: &str, context: &str) -> Result<StepId, DocumentError> {
    b.lookup(qualified).ok_or_else(|| DocumentError::UnknownStep {
        context: context.to_string(),
        step: qualified.to_string(),
    })
}

fn local_guard(
    b: &GraphBuilder,
    asset: AssetId,
    spec: &GuardSpec,
    context: &str,
) -> Result<Guard, DocumentError> {
    let (name, when) = spec.parts();
    let defense = find_defense(b, asset, name, name, context)?;
    Ok(Guard::equals(defense, when))
}

fn qualified_guard(b: &GraphBuilder, spec: &GuardSpec, context: &str) -> Result<Guard, DocumentError> {
    let (qualified, when) = spec.parts();
    let unknown = || DocumentError::UnknownDefense {
        context: context.to_string(),
        defense: qualified.to_string(),
    };
    let (asset, name) = qualified.split_once('.').ok_or_else(unknown)?;
    let asset = b.asset_by_name(asset).ok_or_else(unknown)?;
    let defense = find_defense(b, asset, name, qualified, context)?;
    Ok(Guard::equals(defense, when))
}

fn find_defense(
    b: &GraphBuilder,
    asset: AssetId,
    name: &str,
    shown: &str,
    context: &str,
) -> Result<DefenseId, DocumentError> {
    b.defense_of(asset, name)
        .ok_or_else(|| DocumentError::UnknownDefense {
            context: context.to_string(),
            defense: shown.to_string(),
        })
}

fn resolve_scenario(b: &GraphBuilder, spec: &ScenarioSpec) -> Result<Scenario, DocumentError> {
    let context = format!("scenario '{}'", spec.name);
    let entry = spec
        .entry
        .iter()
        .map(|s| resolve_step(b, s, &context))
        .collect::<Result<Vec<_>, _>>()?;
    let expect = spec
        .expect
        .iter()
        .map(|(step, &expected)| {
            Ok(Expectation {
                step: resolve_step(b, step, &context)?,
                expected,
            })
        })
        .collect::<Result<Vec<_>, DocumentError>>()?;
    Ok(Scenario {
        name: spec.name.clone(),
        entry,
        expect,
    })
}
