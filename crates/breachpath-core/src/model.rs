//! A graph plus the mutable per-step state of one simulation.

use crate::classify::Classification;
use crate::graph::{Graph, StepId};
use crate::state::StepState;
use std::sync::Arc;

/// Step states over a shared, immutable [`Graph`].
///
/// [`Attacker::attack`](crate::Attacker::attack) borrows the model mutably for
/// the whole run. Independent runs use [`Model::fork`], which shares the graph
/// and starts from a clean state vector.
#[derive(Debug, Clone)]
pub struct Model {
    graph: Arc<Graph>,
    states: Vec<StepState>,
}

impl Model {
    #[must_use]
    pub fn new(graph: Graph) -> Self {
        Self::from_shared(Arc::new(graph))
    }

    #[must_use]
    pub fn from_shared(graph: Arc<Graph>) -> Self {
        let states = vec![StepState::Uncompromised; graph.step_count()];
        Self { graph, states }
    }

    /// Fresh model over the same graph.
    #[must_use]
    pub fn fork(&self) -> Self {
        Self::from_shared(Arc::clone(&self.graph))
    }

    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    #[must_use]
    pub fn shared_graph(&self) -> Arc<Graph> {
        Arc::clone(&self.graph)
    }

    /// Resolves a qualified `<asset>.<step>` id.
    #[must_use]
    pub fn resolve(&self, qualified: &str) -> Option<StepId> {
        self.graph.lookup(qualified)
    }

    /// # Panics
    ///
    /// When `step` does not belong to this model's graph.
    #[must_use]
    pub fn state(&self, step: StepId) -> StepState {
        self.states[step.index()]
    }

    #[must_use]
    pub fn classification(&self, step: StepId) -> Classification {
        Classification::from(self.state(step))
    }

    /// Steps currently compromised, in step order.
    pub fn compromised(&self) -> impl Iterator<Item = StepId> + '_ {
        self.graph
            .step_ids()
            .filter(|id| self.states[id.index()].is_compromised())
    }

    /// Clears every state back to `Uncompromised`.
    pub fn reset(&mut self) {
        self.states.fill(StepState::Uncompromised);
    }

    pub(crate) fn split_mut(&mut self) -> (&Graph, &mut [StepState]) {
        (&self.graph, &mut self.states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{EffortClass, Gate};
    use crate::GraphBuilder;

    fn model() -> (Model, StepId) {
        let mut b = GraphBuilder::new();
        let h = b.add_asset("h", "Host").unwrap();
        let s = b.add_attack_step(h, "s", Gate::Or).unwrap();
        (Model::new(b.build().unwrap()), s)
    }

    #[test]
    fn starts_uncompromised() {
        let (model, s) = model();
        assert_eq!(model.state(s), StepState::Uncompromised);
        assert_eq!(model.classification(s), Classification::Uncompromised);
        assert_eq!(model.compromised().count(), 0);
        assert_eq!(model.resolve("h.s"), Some(s));
    }

    #[test]
    fn fork_shares_graph_but_not_state() {
        let (mut model, s) = model();
        model.split_mut().1[s.index()] = StepState::Compromised(EffortClass::Instantaneous);
        let fork = model.fork();
        assert!(Arc::ptr_eq(&model.shared_graph(), &fork.shared_graph()));
        assert!(model.state(s).is_compromised());
        assert!(!fork.state(s).is_compromised());

        model.reset();
        assert!(!model.state(s).is_compromised());
    }
}
