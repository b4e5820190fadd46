//! Read-only assertion API over a finished run.
//!
//! The engine itself never fails on a classification; these helpers compare
//! the true classification with an expectation and report the difference.

use crate::classify::Classification;
use crate::graph::StepId;
use crate::model::Model;
use serde::Serialize;

/// A step whose classification differs from what the caller expected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{step}: expected {expected}, got {actual}")]
pub struct AssertionMismatch {
    pub step: String,
    pub expected: Classification,
    pub actual: Classification,
}

/// Expected label for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Expectation {
    pub step: StepId,
    pub expected: Classification,
}

impl Model {
    /// Compares `step`'s classification with `expected`.
    pub fn expect(&self, step: StepId, expected: Classification) -> Result<(), AssertionMismatch> {
        let actual = self.classification(step);
        if actual == expected {
            Ok(())
        } else {
            Err(AssertionMismatch {
                step: self.graph().step(step).id.clone(),
                expected,
                actual,
            })
        }
    }

    pub fn assert_uncompromised(&self, step: StepId) -> Result<(), AssertionMismatch> {
        self.expect(step, Classification::Uncompromised)
    }

    pub fn assert_compromised_with_effort(&self, step: StepId) -> Result<(), AssertionMismatch> {
        self.expect(step, Classification::CompromisedWithEffort)
    }

    pub fn assert_compromised_instantaneously(
        &self,
        step: StepId,
    ) -> Result<(), AssertionMismatch> {
        self.expect(step, Classification::CompromisedInstantaneously)
    }

    /// Checks every expectation; returns all mismatches, in input order.
    #[must_use]
    pub fn check(&self, expectations: &[Expectation]) -> Vec<AssertionMismatch> {
        expectations
            .iter()
            .filter_map(|e| self.expect(e.step, e.expected).err())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{EffortClass, Gate};
    use crate::{Attacker, GraphBuilder};

    fn attacked() -> (Model, StepId, StepId, StepId) {
        let mut b = GraphBuilder::new();
        let app = b.add_asset("app", "WebApplication").unwrap();
        let crawl = b.add_attack_step(app, "crawl", Gate::Or).unwrap();
        let brute = b.add_attack_step(app, "bruteForce", Gate::Or).unwrap();
        let found = b.add_attack_step(app, "found", Gate::Or).unwrap();
        b.add_edge(crawl, found, EffortClass::WithEffort, true)
            .unwrap();
        let mut model = Model::new(b.build().unwrap());
        let mut attacker = Attacker::new();
        attacker.add_attack_point(crawl);
        attacker.attack(&mut model).unwrap();
        (model, crawl, brute, found)
    }

    #[test]
    fn predicates_match_classification() {
        let (model, crawl, brute, found) = attacked();
        model.assert_compromised_instantaneously(crawl).unwrap();
        model.assert_uncompromised(brute).unwrap();
        model.assert_compromised_with_effort(found).unwrap();
    }

    #[test]
    fn mismatch_reports_step_expected_and_actual() {
        let (model, _, brute, _) = attacked();
        let err = model.assert_compromised_instantaneously(brute).unwrap_err();
        assert_eq!(err.step, "app.bruteForce");
        assert_eq!(err.expected, Classification::CompromisedInstantaneously);
        assert_eq!(err.actual, Classification::Uncompromised);
        assert_eq!(
            err.to_string(),
            "app.bruteForce: expected compromised_instantaneously, got uncompromised"
        );
    }

    #[test]
    fn check_collects_every_mismatch() {
        let (model, crawl, brute, found) = attacked();
        let mismatches = model.check(&[
            Expectation {
                step: crawl,
                expected: Classification::CompromisedInstantaneously,
            },
            Expectation {
                step: brute,
                expected: Classification::CompromisedWithEffort,
            },
            Expectation {
                step: found,
                expected: Classification::Uncompromised,
            },
        ]);
        let steps: Vec<&str> = mismatches.iter().map(|m| m.step.as_str()).collect();
        assert_eq!(steps, vec!["app.bruteForce", "app.found"]);
    }
}
