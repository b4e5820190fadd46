//! Propagation engine.
//!
//! # Algorithm
//!
//! ```text
//!  entry points (sorted)            worklist (FIFO)
//!  ┌──────────────────┐  seed   ┌───────────────────────┐
//!  │ Compromised/Inst │ ──────▶ │ s₀ s₁ s₂ …            │
//!  └──────────────────┘         └──────────┬────────────┘
//!                                          │ pop s
//!                                          ▼
//!                          for each edge s → c: re-evaluate gate(c)
//!                                          │
//!                     transitions (or is lowered under `Relax`)?
//!                                          │ yes
//!                                          ▼
//!                                       push c
//! ```
//!
//! The loop ends when the worklist is empty. Every step can transition at
//! most once, and under `Relax` can be lowered at most once more, so each
//! edge is relaxed a bounded number of times.

use crate::config::{EffortPolicy, EngineConfig};
use crate::error::{AttackError, AttackResult};
use crate::graph::StepId;
use crate::model::Model;
use crate::state::{transition, EffortClass, StepState, Transition};
use serde::Serialize;
use std::collections::{BTreeSet, VecDeque};
use tracing::{debug, info, trace, warn};

/// Summary of one [`Attacker::attack`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttackOutcome {
    /// Entry points seeded as compromised.
    pub seeded: Vec<StepId>,
    /// Entry points ignored because a defense disabled them.
    pub skipped_disabled: Vec<StepId>,
    /// Steps that went from uncompromised to compromised in this call
    /// (entry points included), in transition order.
    pub newly_compromised: Vec<StepId>,
    /// Effort classes lowered after the first transition: by `Relax`
    /// propagation, or under either policy by re-seeding an entry point that
    /// an earlier call compromised with effort.
    pub lowered: usize,
    /// Edge evaluations performed.
    pub relaxations: u64,
}

/// Traversal driver holding the entry set.
///
/// The attacker owns no part of the graph; [`Attacker::attack`] borrows the
/// model exclusively for the duration of the run.
#[derive(Debug, Clone, Default)]
pub struct Attacker {
    entry: BTreeSet<StepId>,
    config: EngineConfig,
}

impl Attacker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            entry: BTreeSet::new(),
            config,
        }
    }

    /// Adds an entry point. Validated against the model in [`Attacker::attack`].
    pub fn add_attack_point(&mut self, step: StepId) -> &mut Self {
        self.entry.insert(step);
        self
    }

    pub fn entry_points(&self) -> impl Iterator<Item = StepId> + '_ {
        self.entry.iter().copied()
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs propagation to a fixed point.
    ///
    /// Entry points are seeded in ascending step order regardless of the
    /// order they were added, so the result depends only on the entry set.
    /// Fails before touching any state if an entry point is unknown.
    pub fn attack(&self, model: &mut Model) -> AttackResult<AttackOutcome> {
        let (graph, states) = model.split_mut();

        if let Some(unknown) = self.entry.iter().find(|s| !graph.contains_step(**s)) {
            return Err(AttackError::UnknownAttackPoint {
                step: unknown.to_string(),
            });
        }

        let relax = self.config.effort_policy == EffortPolicy::Relax;
        let budget = self.config.max_relaxations;
        let mut outcome = AttackOutcome::default();
        let mut worklist = VecDeque::new();

        for &step in &self.entry {
            let node = graph.step(step);
            if !node.enabled {
                warn!(step = %node.id, "entry point is disabled by a defense, skipping");
                outcome.skipped_disabled.push(step);
                continue;
            }
            let seeded = StepState::Compromised(EffortClass::Instantaneous);
            match states[step.index()] {
                StepState::Uncompromised => outcome.newly_compromised.push(step),
                StepState::Compromised(EffortClass::Instantaneous) => {}
                StepState::Compromised(EffortClass::WithEffort) => outcome.lowered += 1,
            }
            states[step.index()] = seeded;
            outcome.seeded.push(step);
            worklist.push_back(step);
        }
        debug!(
            seeded = outcome.seeded.len(),
            skipped = outcome.skipped_disabled.len(),
            policy = ?self.config.effort_policy,
            "seeded entry points"
        );

        while let Some(step) = worklist.pop_front() {
            for (_, child) in graph.neighbors(step) {
                outcome.relaxations += 1;
                if let Some(limit) = budget {
                    if outcome.relaxations > limit {
                        warn!(limit, "relaxation budget exhausted before fixed point");
                        return Err(AttackError::RelaxationBudgetExceeded { limit });
                    }
                }

                match transition(graph, states, child, relax) {
                    Transition::Unchanged => {}
                    Transition::Compromised(class) => {
                        trace!(step = %graph.step(child).id, %class, "compromised");
                        outcome.newly_compromised.push(child);
                        worklist.push_back(child);
                    }
                    Transition::Lowered { from, to } => {
                        trace!(step = %graph.step(child).id, %from, %to, "effort lowered");
                        outcome.lowered += 1;
                        worklist.push_back(child);
                    }
                }
            }
        }

        info!(
            compromised = outcome.newly_compromised.len(),
            lowered = outcome.lowered,
            relaxations = outcome.relaxations,
            "attack reached fixed point"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classification;
    use crate::graph::{DefenseValue, Guard};
    use crate::state::Gate;
    use crate::GraphBuilder;

    struct Chain {
        model: Model,
        a: StepId,
        b: StepId,
        c: StepId,
    }

    /// a -(inst)-> b -(effort)-> c
    fn chain() -> Chain {
        let mut g = GraphBuilder::new();
        let h = g.add_asset("h", "Host").unwrap();
        let a = g.add_attack_step(h, "a", Gate::Or).unwrap();
        let b = g.add_attack_step(h, "b", Gate::Or).unwrap();
        let c = g.add_attack_step(h, "c", Gate::Or).unwrap();
        g.add_edge(a, b, EffortClass::Instantaneous, true).unwrap();
        g.add_edge(b, c, EffortClass::WithEffort, true).unwrap();
        Chain {
            model: Model::new(g.build().unwrap()),
            a,
            b,
            c,
        }
    }

    #[test]
    fn propagates_along_chain() {
        let Chain { mut model, a, b, c } = chain();
        let mut attacker = Attacker::new();
        attacker.add_attack_point(a);
        let outcome = attacker.attack(&mut model).unwrap();

        assert_eq!(outcome.seeded, vec![a]);
        assert_eq!(outcome.newly_compromised, vec![a, b, c]);
        assert_eq!(outcome.relaxations, 2);
        assert_eq!(
            model.classification(b),
            Classification::CompromisedInstantaneously
        );
        assert_eq!(model.classification(c), Classification::CompromisedWithEffort);
    }

    #[test]
    fn entry_point_bypasses_gate_and_is_instantaneous() {
        let Chain { mut model, c, .. } = chain();
        let mut attacker = Attacker::new();
        attacker.add_attack_point(c);
        attacker.attack(&mut model).unwrap();
        assert_eq!(
            model.classification(c),
            Classification::CompromisedInstantaneously
        );
    }

    #[test]
    fn unknown_entry_fails_without_mutation() {
        let Chain { mut model, a, .. } = chain();
        let mut attacker = Attacker::new();
        attacker.add_attack_point(a).add_attack_point(StepId(99));
        let err = attacker.attack(&mut model).unwrap_err();
        assert_eq!(
            err,
            AttackError::UnknownAttackPoint {
                step: "step#99".into()
            }
        );
        assert_eq!(model.compromised().count(), 0);
    }

    #[test]
    fn second_attack_is_idempotent() {
        let Chain { mut model, a, .. } = chain();
        let mut attacker = Attacker::new();
        attacker.add_attack_point(a);
        attacker.attack(&mut model).unwrap();
        let first: Vec<Classification> = model
            .graph()
            .step_ids()
            .map(|s| model.classification(s))
            .collect();
        let again = attacker.attack(&mut model).unwrap();
        let second: Vec<Classification> = model
            .graph()
            .step_ids()
            .map(|s| model.classification(s))
            .collect();
        assert_eq!(first, second);
        assert!(again.newly_compromised.is_empty());
    }

    #[test]
    fn reseeding_an_effort_step_counts_as_lowered() {
        let Chain { mut model, a, c, .. } = chain();
        let mut first = Attacker::new();
        first.add_attack_point(a);
        first.attack(&mut model).unwrap();
        assert_eq!(model.classification(c), Classification::CompromisedWithEffort);

        let mut second = Attacker::new();
        second.add_attack_point(c);
        let outcome = second.attack(&mut model).unwrap();
        assert_eq!(second.config().effort_policy, EffortPolicy::FirstTransition);
        assert_eq!(outcome.lowered, 1);
        assert!(outcome.newly_compromised.is_empty());
        assert_eq!(
            model.classification(c),
            Classification::CompromisedInstantaneously
        );
    }

    #[test]
    fn disabled_entry_is_skipped() {
        let mut g = GraphBuilder::new();
        let h = g.add_asset("h", "Host").unwrap();
        let patched = g.add_defense(h, "patched", DefenseValue::Flag(true)).unwrap();
        let a = g.add_attack_step(h, "a", Gate::Or).unwrap();
        let b = g.add_attack_step(h, "b", Gate::Or).unwrap();
        g.add_edge(a, b, EffortClass::Instantaneous, true).unwrap();
        g.disable_step_when(a, Guard::enabled(patched)).unwrap();
        let mut model = Model::new(g.build().unwrap());

        let mut attacker = Attacker::new();
        attacker.add_attack_point(a);
        let outcome = attacker.attack(&mut model).unwrap();
        assert_eq!(outcome.skipped_disabled, vec![a]);
        assert_eq!(model.classification(a), Classification::Uncompromised);
        assert_eq!(model.classification(b), Classification::Uncompromised);
    }

    #[test]
    fn budget_caps_relaxations() {
        let Chain { mut model, a, .. } = chain();
        let mut attacker = Attacker::with_config(EngineConfig {
            max_relaxations: Some(1),
            ..EngineConfig::default()
        });
        attacker.add_attack_point(a);
        assert_eq!(
            attacker.attack(&mut model).unwrap_err(),
            AttackError::RelaxationBudgetExceeded { limit: 1 }
        );
    }

    #[test]
    fn relax_policy_lowers_late_cheap_paths() {
        // slow -(effort)-> target ; fast -(inst)-> hop -(inst)-> target
        let mut g = GraphBuilder::new();
        let h = g.add_asset("h", "Host").unwrap();
        let slow = g.add_attack_step(h, "slow", Gate::Or).unwrap();
        let fast = g.add_attack_step(h, "fast", Gate::Or).unwrap();
        let hop = g.add_attack_step(h, "hop", Gate::Or).unwrap();
        let target = g.add_attack_step(h, "target", Gate::Or).unwrap();
        let after = g.add_attack_step(h, "after", Gate::Or).unwrap();
        g.add_edge(slow, target, EffortClass::WithEffort, true).unwrap();
        g.add_edge(fast, hop, EffortClass::Instantaneous, true).unwrap();
        g.add_edge(hop, target, EffortClass::Instantaneous, true).unwrap();
        g.add_edge(target, after, EffortClass::Instantaneous, true).unwrap();
        let base = Model::new(g.build().unwrap());

        let mut first = base.fork();
        let mut attacker = Attacker::new();
        attacker.add_attack_point(slow).add_attack_point(fast);
        attacker.attack(&mut first).unwrap();
        assert_eq!(first.classification(target), Classification::CompromisedWithEffort);
        assert_eq!(first.classification(after), Classification::CompromisedWithEffort);

        let mut relaxed = base.fork();
        let mut attacker = Attacker::with_config(EngineConfig {
            effort_policy: EffortPolicy::Relax,
            ..EngineConfig::default()
        });
        attacker.add_attack_point(slow).add_attack_point(fast);
        let outcome = attacker.attack(&mut relaxed).unwrap();
        assert_eq!(
            relaxed.classification(target),
            Classification::CompromisedInstantaneously
        );
        assert_eq!(
            relaxed.classification(after),
            Classification::CompromisedInstantaneously
        );
        assert_eq!(outcome.lowered, 2);
    }
}
