//! Graph store: assets, attack steps, defenses and dependency edges.
//!
//! # Layout
//!
//! ```text
//! assets:   [Asset]      ── name, kind tag, step-name → StepId, defense-name → DefenseId
//! steps:    [AttackStep] ── qualified id "<asset>.<step>", gate, resolved flags
//! edges:    [Edge]       ── parent → child, cost class, requiredForAnd, blocked
//! outgoing: [[EdgeId]]   ── per step, in insertion order
//! incoming: [[EdgeId]]   ── per step, in insertion order
//! ```
//!
//! A [`Graph`] is only produced by [`GraphBuilder::build`], which validates
//! references, rejects AND-dependency cycles and resolves defense guards into
//! the `enabled` / `blocked` / `forced_effort` flags. The built graph has no
//! mutators; runs share it behind an `Arc`.

mod builder;
mod cycles;
mod ids;

pub use builder::GraphBuilder;
pub use ids::{AssetId, DefenseId, EdgeId, StepId};

use crate::state::{EffortClass, Gate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A system component owning attack steps and defenses.
#[derive(Debug, Clone, Serialize)]
pub struct Asset {
    pub name: String,
    /// Free-form kind tag, e.g. `WebServer`.
    pub kind: String,
    pub steps: BTreeMap<String, StepId>,
    pub defenses: BTreeMap<String, DefenseId>,
}

/// Value of a defense.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefenseValue {
    Flag(bool),
    Choice(String),
}

impl fmt::Display for DefenseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(v) => write!(f, "{v}"),
            Self::Choice(v) => f.write_str(v),
        }
    }
}

impl From<bool> for DefenseValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// A mitigating control attached to an asset.
#[derive(Debug, Clone, Serialize)]
pub struct Defense {
    pub asset: AssetId,
    pub name: String,
    pub value: DefenseValue,
}

/// Condition on a defense. Active when the defense holds `when`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guard {
    pub defense: DefenseId,
    pub when: DefenseValue,
}

impl Guard {
    /// Active when a flag defense is switched on.
    #[must_use]
    pub fn enabled(defense: DefenseId) -> Self {
        Self {
            defense,
            when: DefenseValue::Flag(true),
        }
    }

    /// Active when a flag defense is switched off.
    #[must_use]
    pub fn disabled(defense: DefenseId) -> Self {
        Self {
            defense,
            when: DefenseValue::Flag(false),
        }
    }

    #[must_use]
    pub fn equals(defense: DefenseId, value: impl Into<DefenseValue>) -> Self {
        Self {
            defense,
            when: value.into(),
        }
    }
}

/// The unit of compromise.
#[derive(Debug, Clone, Serialize)]
pub struct AttackStep {
    /// Qualified id, `<asset>.<step>`.
    pub id: String,
    pub asset: AssetId,
    pub name: String,
    pub gate: Gate,
    /// False when a defense removed this step from the model.
    pub enabled: bool,
    /// True when a defense forces this step to `WithEffort`.
    pub forced_effort: bool,
}

/// Directed dependency `parent -> child`.
#[derive(Debug, Clone, Serialize)]
pub struct Edge {
    pub parent: StepId,
    pub child: StepId,
    pub cost: EffortClass,
    pub required_for_and: bool,
    /// True when a defense makes this edge always fail.
    pub blocked: bool,
}

/// Validated, immutable attack graph.
#[derive(Debug, Clone)]
pub struct Graph {
    assets: Vec<Asset>,
    steps: Vec<AttackStep>,
    edges: Vec<Edge>,
    defenses: Vec<Defense>,
    outgoing: Vec<Vec<EdgeId>>,
    incoming: Vec<Vec<EdgeId>>,
    asset_index: HashMap<String, AssetId>,
    step_index: HashMap<String, StepId>,
}

impl Graph {
    #[must_use]
    pub fn step(&self, id: StepId) -> &AttackStep {
        &self.steps[id.index()]
    }

    #[must_use]
    pub fn asset(&self, id: AssetId) -> &Asset {
        &self.assets[id.index()]
    }

    #[must_use]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    #[must_use]
    pub fn defense(&self, id: DefenseId) -> &Defense {
        &self.defenses[id.index()]
    }

    #[must_use]
    pub fn contains_step(&self, id: StepId) -> bool {
        id.index() < self.steps.len()
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    pub fn step_ids(&self) -> impl Iterator<Item = StepId> + '_ {
        (0..self.steps.len()).map(StepId::from_index)
    }

    pub fn assets(&self) -> impl Iterator<Item = (AssetId, &Asset)> + '_ {
        self.assets
            .iter()
            .enumerate()
            .map(|(i, a)| (AssetId::from_index(i), a))
    }

    pub fn defenses(&self) -> impl Iterator<Item = &Defense> + '_ {
        self.defenses.iter()
    }

    /// Children of `step` with the edge leading to each, in insertion order.
    pub fn neighbors(&self, step: StepId) -> impl Iterator<Item = (&Edge, StepId)> + '_ {
        self.outgoing[step.index()].iter().map(|id| {
            let edge = &self.edges[id.index()];
            (edge, edge.child)
        })
    }

    /// Edges whose child is `step`, in insertion order.
    pub fn incoming(&self, step: StepId) -> impl Iterator<Item = &Edge> + '_ {
        self.incoming[step.index()]
            .iter()
            .map(|id| &self.edges[id.index()])
    }

    /// Resolves a qualified `<asset>.<step>` id.
    #[must_use]
    pub fn lookup(&self, qualified: &str) -> Option<StepId> {
        self.step_index.get(qualified).copied()
    }

    #[must_use]
    pub fn asset_by_name(&self, name: &str) -> Option<AssetId> {
        self.asset_index.get(name).copied()
    }

    pub fn steps_of(&self, asset: AssetId) -> impl Iterator<Item = StepId> + '_ {
        self.assets[asset.index()].steps.values().copied()
    }
}
