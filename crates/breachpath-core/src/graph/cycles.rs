//! AND-dependency cycle detection.
//!
//! OR cycles are harmless: revisiting a compromised OR step yields no new
//! information. A cycle that feeds an AND step through one of its required
//! edges would make the step its own prerequisite, so the graph is rejected.
//! Non-required edges into AND steps neither gate nor cost them, so they are
//! left out of the dependency graph.
//!
//! Strongly connected components are computed with an iterative Kosaraju
//! pass (no recursion, so deep graphs cannot blow the stack).

use super::{AttackStep, Edge, EdgeId, StepId};
use crate::state::Gate;

/// Returns the steps of the first offending component, sorted by id.
pub(super) fn find_and_cycle(
    steps: &[AttackStep],
    edges: &[Edge],
    outgoing: &[Vec<EdgeId>],
) -> Option<Vec<StepId>> {
    let depends =
        |edge: &Edge| steps[edge.child.index()].gate == Gate::Or || edge.required_for_and;
    let component = strongly_connected(steps.len(), edges, outgoing, depends);

    let mut offending: Option<usize> = None;
    for edge in edges.iter().filter(|&e| depends(e)) {
        let (p, c) = (edge.parent.index(), edge.child.index());
        if component[p] != component[c] {
            continue;
        }
        if steps[c].gate == Gate::And {
            offending = Some(component[c]);
            break;
        }
    }

    let target = offending?;
    Some(
        (0..steps.len())
            .filter(|&i| component[i] == target)
            .map(StepId::from_index)
            .collect(),
    )
}

fn strongly_connected(
    n: usize,
    edges: &[Edge],
    outgoing: &[Vec<EdgeId>],
    depends: impl Fn(&Edge) -> bool,
) -> Vec<usize> {
    // Pass 1: finish order on the forward graph.
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    for root in 0..n {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        let mut stack = vec![(root, 0usize)];
        while let Some(top) = stack.last_mut() {
            let (node, next) = *top;
            if let Some(edge) = outgoing[node].get(next) {
                top.1 += 1;
                let edge = &edges[edge.index()];
                if !depends(edge) {
                    continue;
                }
                let child = edge.child.index();
                if !visited[child] {
                    visited[child] = true;
                    stack.push((child, 0));
                }
            } else {
                order.push(node);
                stack.pop();
            }
        }
    }

    // Pass 2: assign components on the reversed graph.
    let mut reverse = vec![Vec::new(); n];
    for edge in edges.iter().filter(|&e| depends(e)) {
        reverse[edge.child.index()].push(edge.parent.index());
    }

    const UNASSIGNED: usize = usize::MAX;
    let mut component = vec![UNASSIGNED; n];
    let mut next_component = 0;
    for &root in order.iter().rev() {
        if component[root] != UNASSIGNED {
            continue;
        }
        component[root] = next_component;
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            for &parent in &reverse[node] {
                if component[parent] == UNASSIGNED {
                    component[parent] = next_component;
                    stack.push(parent);
                }
            }
        }
        next_component += 1;
    }
    component
}
