//! Attack-step state machine.
//!
//! A step starts `Uncompromised` and may transition exactly once to
//! `Compromised`, carrying the effort class it was reached with. Gate
//! evaluation decides whether (and how cheaply) a step may transition given
//! the current states of its parents.

use crate::graph::{Graph, StepId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cost of reaching a step, or of crossing an edge.
///
/// Ordered so that `Instantaneous < WithEffort`: `min` picks the cheaper
/// class, `max` the more expensive one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffortClass {
    Instantaneous,
    WithEffort,
}

impl fmt::Display for EffortClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instantaneous => f.write_str("instantaneous"),
            Self::WithEffort => f.write_str("with_effort"),
        }
    }
}

/// How a step's prerequisites combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gate {
    /// Any contributing parent suffices.
    Or,
    /// Every required parent must be compromised.
    And,
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Or => f.write_str("OR"),
            Self::And => f.write_str("AND"),
        }
    }
}

/// Per-step runtime state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "effort", rename_all = "snake_case")]
pub enum StepState {
    #[default]
    Uncompromised,
    Compromised(EffortClass),
}

impl StepState {
    #[must_use]
    pub fn is_compromised(self) -> bool {
        matches!(self, Self::Compromised(_))
    }

    /// `None` while uncompromised.
    #[must_use]
    pub fn effort_class(self) -> Option<EffortClass> {
        match self {
            Self::Uncompromised => None,
            Self::Compromised(class) => Some(class),
        }
    }
}

/// What re-evaluating a step against the current states produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Gate not satisfied, step disabled, or nothing cheaper on offer.
    Unchanged,
    /// First transition into `Compromised`.
    Compromised(EffortClass),
    /// Already compromised; a cheaper class is now available.
    Lowered {
        from: EffortClass,
        to: EffortClass,
    },
}

/// Evaluates the gate of `step` against `states`.
///
/// Returns the class the step would be compromised with right now, or `None`
/// if its gate is not satisfied. The contribution of a parent edge is the
/// more expensive of the parent's own class and the edge's cost class;
/// blocked edges never contribute.
#[must_use]
pub fn evaluate_gate(graph: &Graph, states: &[StepState], step: StepId) -> Option<EffortClass> {
    let node = graph.step(step);
    if !node.enabled {
        return None;
    }

    let contribution = |edge: &crate::graph::Edge| -> Option<EffortClass> {
        if edge.blocked {
            return None;
        }
        states[edge.parent.index()]
            .effort_class()
            .map(|parent_class| parent_class.max(edge.cost))
    };

    let class = match node.gate {
        Gate::Or => graph
            .incoming(step)
            .filter_map(contribution)
            .min()?,
        Gate::And => {
            let mut required = graph.incoming(step).filter(|edge| edge.required_for_and);
            let mut worst = contribution(required.next()?)?;
            for edge in required {
                worst = worst.max(contribution(edge)?);
            }
            worst
        }
    };

    if node.forced_effort {
        Some(EffortClass::WithEffort)
    } else {
        Some(class)
    }
}

/// Applies the state machine rule to `step`.
///
/// With `relax == false` a compromised step is never revisited. With
/// `relax == true` a compromised step whose gate now yields a cheaper class
/// is lowered.
pub fn transition(graph: &Graph, states: &mut [StepState], step: StepId, relax: bool) -> Transition {
    let current = states[step.index()];
    if current.is_compromised() && !relax {
        return Transition::Unchanged;
    }

    let Some(offered) = evaluate_gate(graph, states, step) else {
        return Transition::Unchanged;
    };

    match current {
        StepState::Uncompromised => {
            states[step.index()] = StepState::Compromised(offered);
            Transition::Compromised(offered)
        }
        StepState::Compromised(existing) if offered < existing => {
            states[step.index()] = StepState::Compromised(offered);
            Transition::Lowered {
                from: existing,
                to: offered,
            }
        }
        StepState::Compromised(_) => Transition::Unchanged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DefenseValue, Guard};
    use crate::GraphBuilder;

    fn states_for(graph: &Graph) -> Vec<StepState> {
        vec![StepState::Uncompromised; graph.step_count()]
    }

    #[test]
    fn effort_class_ordering() {
        assert!(EffortClass::Instantaneous < EffortClass::WithEffort);
        assert_eq!(
            EffortClass::Instantaneous.max(EffortClass::WithEffort),
            EffortClass::WithEffort
        );
    }

    #[test]
    fn or_gate_takes_cheapest_contribution() {
        let mut b = GraphBuilder::new();
        let a = b.add_asset("host", "Host").unwrap();
        let p1 = b.add_attack_step(a, "p1", Gate::Or).unwrap();
        let p2 = b.add_attack_step(a, "p2", Gate::Or).unwrap();
        let c = b.add_attack_step(a, "c", Gate::Or).unwrap();
        b.add_edge(p1, c, EffortClass::WithEffort, true).unwrap();
        b.add_edge(p2, c, EffortClass::Instantaneous, true).unwrap();
        let graph = b.build().unwrap();

        let mut states = states_for(&graph);
        assert_eq!(evaluate_gate(&graph, &states, c), None);

        states[p1.index()] = StepState::Compromised(EffortClass::Instantaneous);
        assert_eq!(
            evaluate_gate(&graph, &states, c),
            Some(EffortClass::WithEffort)
        );

        states[p2.index()] = StepState::Compromised(EffortClass::Instantaneous);
        assert_eq!(
            evaluate_gate(&graph, &states, c),
            Some(EffortClass::Instantaneous)
        );
    }

    #[test]
    fn expensive_parent_taints_cheap_edge() {
        let mut b = GraphBuilder::new();
        let a = b.add_asset("host", "Host").unwrap();
        let p = b.add_attack_step(a, "p", Gate::Or).unwrap();
        let c = b.add_attack_step(a, "c", Gate::Or).unwrap();
        b.add_edge(p, c, EffortClass::Instantaneous, true).unwrap();
        let graph = b.build().unwrap();

        let mut states = states_for(&graph);
        states[p.index()] = StepState::Compromised(EffortClass::WithEffort);
        assert_eq!(
            evaluate_gate(&graph, &states, c),
            Some(EffortClass::WithEffort)
        );
    }

    #[test]
    fn and_gate_needs_all_required_and_takes_max() {
        let mut b = GraphBuilder::new();
        let a = b.add_asset("host", "Host").unwrap();
        let p1 = b.add_attack_step(a, "p1", Gate::Or).unwrap();
        let p2 = b.add_attack_step(a, "p2", Gate::Or).unwrap();
        let extra = b.add_attack_step(a, "extra", Gate::Or).unwrap();
        let c = b.add_attack_step(a, "c", Gate::And).unwrap();
        b.add_edge(p1, c, EffortClass::Instantaneous, true).unwrap();
        b.add_edge(p2, c, EffortClass::WithEffort, true).unwrap();
        // Informational edge: neither gates nor costs the AND step.
        b.add_edge(extra, c, EffortClass::WithEffort, false).unwrap();
        let graph = b.build().unwrap();

        let mut states = states_for(&graph);
        states[p1.index()] = StepState::Compromised(EffortClass::Instantaneous);
        assert_eq!(evaluate_gate(&graph, &states, c), None);

        states[p2.index()] = StepState::Compromised(EffortClass::Instantaneous);
        assert_eq!(
            evaluate_gate(&graph, &states, c),
            Some(EffortClass::WithEffort)
        );
    }

    #[test]
    fn and_gate_without_required_edges_is_never_derived() {
        let mut b = GraphBuilder::new();
        let a = b.add_asset("host", "Host").unwrap();
        let p = b.add_attack_step(a, "p", Gate::Or).unwrap();
        let c = b.add_attack_step(a, "c", Gate::And).unwrap();
        b.add_edge(p, c, EffortClass::Instantaneous, false).unwrap();
        let graph = b.build().unwrap();

        let mut states = states_for(&graph);
        states[p.index()] = StepState::Compromised(EffortClass::Instantaneous);
        assert_eq!(evaluate_gate(&graph, &states, c), None);
    }

    #[test]
    fn forced_effort_overrides_cheap_paths() {
        let mut b = GraphBuilder::new();
        let a = b.add_asset("host", "Host").unwrap();
        let mfa = b.add_defense(a, "mfa", DefenseValue::Flag(true)).unwrap();
        let p = b.add_attack_step(a, "p", Gate::Or).unwrap();
        let c = b.add_attack_step(a, "c", Gate::Or).unwrap();
        b.add_edge(p, c, EffortClass::Instantaneous, true).unwrap();
        b.force_effort_when(c, Guard::enabled(mfa)).unwrap();
        let graph = b.build().unwrap();

        let mut states = states_for(&graph);
        states[p.index()] = StepState::Compromised(EffortClass::Instantaneous);
        assert_eq!(
            evaluate_gate(&graph, &states, c),
            Some(EffortClass::WithEffort)
        );
    }

    #[test]
    fn transition_first_wins_unless_relaxing() {
        let mut b = GraphBuilder::new();
        let a = b.add_asset("host", "Host").unwrap();
        let slow = b.add_attack_step(a, "slow", Gate::Or).unwrap();
        let fast = b.add_attack_step(a, "fast", Gate::Or).unwrap();
        let c = b.add_attack_step(a, "c", Gate::Or).unwrap();
        b.add_edge(slow, c, EffortClass::WithEffort, true).unwrap();
        b.add_edge(fast, c, EffortClass::Instantaneous, true).unwrap();
        let graph = b.build().unwrap();

        let mut states = states_for(&graph);
        states[slow.index()] = StepState::Compromised(EffortClass::Instantaneous);
        assert_eq!(
            transition(&graph, &mut states, c, false),
            Transition::Compromised(EffortClass::WithEffort)
        );

        states[fast.index()] = StepState::Compromised(EffortClass::Instantaneous);
        assert_eq!(
            transition(&graph, &mut states, c, false),
            Transition::Unchanged
        );
        assert_eq!(
            transition(&graph, &mut states, c, true),
            Transition::Lowered {
                from: EffortClass::WithEffort,
                to: EffortClass::Instantaneous
            }
        );
        assert_eq!(
            states[c.index()],
            StepState::Compromised(EffortClass::Instantaneous)
        );
    }
}
