use super::cycles::find_and_cycle;
use super::{
    Asset, AssetId, AttackStep, Defense, DefenseId, DefenseValue, Edge, EdgeId, Graph, Guard,
    StepId,
};
use crate::error::{ModelError, ModelResult};
use crate::state::{EffortClass, Gate};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepEffect {
    Disable,
    ForceEffort,
}

/// Appends assets, steps, defenses and edges to flat arenas.
///
/// All references are checked as they are added; [`GraphBuilder::build`]
/// additionally rejects AND-dependency cycles and resolves defense guards.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    assets: Vec<Asset>,
    steps: Vec<AttackStep>,
    edges: Vec<Edge>,
    defenses: Vec<Defense>,
    step_guards: Vec<(StepId, Guard, StepEffect)>,
    edge_guards: Vec<(EdgeId, Guard)>,
    asset_index: HashMap<String, AssetId>,
    step_index: HashMap<String, StepId>,
}

impl GraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_asset(
        &mut self,
        name: impl Into<String>,
        kind: impl Into<String>,
    ) -> ModelResult<AssetId> {
        let name = name.into();
        if self.asset_index.contains_key(&name) {
            return Err(ModelError::duplicate("asset", name));
        }
        let id = AssetId::from_index(self.assets.len());
        self.asset_index.insert(name.clone(), id);
        self.assets.push(Asset {
            name,
            kind: kind.into(),
            steps: BTreeMap::new(),
            defenses: BTreeMap::new(),
        });
        Ok(id)
    }

    pub fn add_attack_step(
        &mut self,
        asset: AssetId,
        name: impl Into<String>,
        gate: Gate,
    ) -> ModelResult<StepId> {
        let name = name.into();
        let owner = self
            .assets
            .get(asset.index())
            .ok_or_else(|| ModelError::unknown("asset", asset))?;
        // Asset names may contain dots; the step segment may not, so the
        // qualified id splits unambiguously at its last dot.
        if name.is_empty() || name.contains('.') {
            return Err(ModelError::InvalidName {
                entity: "attack step",
                asset: owner.name.clone(),
                name,
            });
        }
        let qualified = format!("{}.{}", owner.name, name);
        if self.step_index.contains_key(&qualified) {
            return Err(ModelError::duplicate("attack step", qualified));
        }

        let id = StepId::from_index(self.steps.len());
        self.step_index.insert(qualified.clone(), id);
        self.assets[asset.index()].steps.insert(name.clone(), id);
        self.steps.push(AttackStep {
            id: qualified,
            asset,
            name,
            gate,
            enabled: true,
            forced_effort: false,
        });
        Ok(id)
    }

    pub fn add_defense(
        &mut self,
        asset: AssetId,
        name: impl Into<String>,
        value: impl Into<DefenseValue>,
    ) -> ModelResult<DefenseId> {
        let name = name.into();
        let owner = self
            .assets
            .get_mut(asset.index())
            .ok_or_else(|| ModelError::unknown("asset", asset))?;
        if owner.defenses.contains_key(&name) {
            return Err(ModelError::duplicate(
                "defense",
                format!("{}.{}", owner.name, name),
            ));
        }
        let id = DefenseId::from_index(self.defenses.len());
        owner.defenses.insert(name.clone(), id);
        self.defenses.push(Defense {
            asset,
            name,
            value: value.into(),
        });
        Ok(id)
    }

    /// Adds `parent -> child`. Parallel edges are allowed.
    pub fn add_edge(
        &mut self,
        parent: StepId,
        child: StepId,
        cost: EffortClass,
        required_for_and: bool,
    ) -> ModelResult<EdgeId> {
        self.check_step(parent)?;
        self.check_step(child)?;
        let id = EdgeId::from_index(self.edges.len());
        self.edges.push(Edge {
            parent,
            child,
            cost,
            required_for_and,
            blocked: false,
        });
        Ok(id)
    }

    /// Removes `step` from the model when `guard` holds.
    pub fn disable_step_when(&mut self, step: StepId, guard: Guard) -> ModelResult<()> {
        self.check_step(step)?;
        self.check_defense(guard.defense)?;
        self.step_guards.push((step, guard, StepEffect::Disable));
        Ok(())
    }

    /// Forces `step` to `WithEffort` when `guard` holds.
    pub fn force_effort_when(&mut self, step: StepId, guard: Guard) -> ModelResult<()> {
        self.check_step(step)?;
        self.check_defense(guard.defense)?;
        self.step_guards.push((step, guard, StepEffect::ForceEffort));
        Ok(())
    }

    /// Makes `edge` always fail when `guard` holds.
    pub fn block_edge_when(&mut self, edge: EdgeId, guard: Guard) -> ModelResult<()> {
        if edge.index() >= self.edges.len() {
            return Err(ModelError::unknown("edge", edge));
        }
        self.check_defense(guard.defense)?;
        self.edge_guards.push((edge, guard));
        Ok(())
    }

    #[must_use]
    pub fn lookup(&self, qualified: &str) -> Option<StepId> {
        self.step_index.get(qualified).copied()
    }

    #[must_use]
    pub fn asset_by_name(&self, name: &str) -> Option<AssetId> {
        self.asset_index.get(name).copied()
    }

    #[must_use]
    pub fn defense_of(&self, asset: AssetId, name: &str) -> Option<DefenseId> {
        self.assets
            .get(asset.index())
            .and_then(|a| a.defenses.get(name).copied())
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Validates the graph and freezes it.
    pub fn build(self) -> ModelResult<Graph> {
        let Self {
            assets,
            mut steps,
            mut edges,
            defenses,
            step_guards,
            edge_guards,
            asset_index,
            step_index,
        } = self;

        let holds = |guard: &Guard| defenses[guard.defense.index()].value == guard.when;

        let mut disabled = 0usize;
        let mut forced = 0usize;
        for (step, guard, effect) in &step_guards {
            if !holds(guard) {
                continue;
            }
            let node = &mut steps[step.index()];
            match effect {
                StepEffect::Disable if node.enabled => {
                    node.enabled = false;
                    disabled += 1;
                }
                StepEffect::ForceEffort if !node.forced_effort => {
                    node.forced_effort = true;
                    forced += 1;
                }
                _ => {}
            }
        }

        let mut blocked = 0usize;
        for (edge, guard) in &edge_guards {
            if holds(guard) && !edges[edge.index()].blocked {
                edges[edge.index()].blocked = true;
                blocked += 1;
            }
        }

        let mut outgoing = vec![Vec::new(); steps.len()];
        let mut incoming = vec![Vec::new(); steps.len()];
        for (i, edge) in edges.iter().enumerate() {
            let id = EdgeId::from_index(i);
            outgoing[edge.parent.index()].push(id);
            incoming[edge.child.index()].push(id);
        }

        if let Some(cycle) = find_and_cycle(&steps, &edges, &outgoing) {
            return Err(ModelError::AndCycle {
                steps: cycle
                    .into_iter()
                    .map(|s| steps[s.index()].id.clone())
                    .collect(),
            });
        }

        debug!(
            assets = assets.len(),
            steps = steps.len(),
            edges = edges.len(),
            defenses = defenses.len(),
            disabled,
            forced,
            blocked,
            "built attack graph"
        );

        Ok(Graph {
            assets,
            steps,
            edges,
            defenses,
            outgoing,
            incoming,
            asset_index,
            step_index,
        })
    }

    fn check_step(&self, step: StepId) -> ModelResult<()> {
        if step.index() < self.steps.len() {
            Ok(())
        } else {
            Err(ModelError::unknown("step", step))
        }
    }

    fn check_defense(&self, defense: DefenseId) -> ModelResult<()> {
        if defense.index() < self.defenses.len() {
            Ok(())
        } else {
            Err(ModelError::unknown("defense", defense))
        }
    }
}
