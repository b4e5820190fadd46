//! Serialisable summary of one attack run, with a plain-text rendering.

use crate::classify::Classification;
use crate::engine::AttackOutcome;
use crate::model::Model;
use crate::query::AssertionMismatch;
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Serialize, Clone)]
pub struct AttackReport {
    pub entry_points: Vec<String>,
    pub skipped_entry_points: Vec<String>,
    pub relaxations: u64,
    pub summary: ReportSummary,
    pub steps: Vec<StepReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mismatches: Vec<AssertionMismatch>,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub total: usize,
    pub uncompromised: usize,
    pub compromised_with_effort: usize,
    pub compromised_instantaneously: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub id: String,
    pub asset_kind: String,
    pub enabled: bool,
    pub classification: Classification,
}

impl AttackReport {
    /// Snapshot of every step in `model`, in step order.
    #[must_use]
    pub fn from_model(model: &Model, outcome: &AttackOutcome) -> Self {
        let graph = model.graph();
        let mut summary = ReportSummary::default();
        let mut steps = Vec::with_capacity(graph.step_count());

        for id in graph.step_ids() {
            let step = graph.step(id);
            let classification = model.classification(id);
            summary.total += 1;
            match classification {
                Classification::Uncompromised => summary.uncompromised += 1,
                Classification::CompromisedWithEffort => summary.compromised_with_effort += 1,
                Classification::CompromisedInstantaneously => {
                    summary.compromised_instantaneously += 1;
                }
            }
            steps.push(StepReport {
                id: step.id.clone(),
                asset_kind: graph.asset(step.asset).kind.clone(),
                enabled: step.enabled,
                classification,
            });
        }

        let name = |s: &crate::graph::StepId| graph.step(*s).id.clone();
        Self {
            entry_points: outcome.seeded.iter().map(name).collect(),
            skipped_entry_points: outcome.skipped_disabled.iter().map(name).collect(),
            relaxations: outcome.relaxations,
            summary,
            steps,
            mismatches: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_mismatches(mut self, mismatches: Vec<AssertionMismatch>) -> Self {
        self.mismatches = mismatches;
        self
    }

    /// Only compromised steps, for compact output.
    pub fn compromised(&self) -> impl Iterator<Item = &StepReport> + '_ {
        self.steps
            .iter()
            .filter(|s| s.classification.is_compromised())
    }

    /// Plain-text rendering: one line per compromised step, then a summary.
    #[must_use]
    pub fn render_text(&self, all_steps: bool) -> String {
        let mut out = String::new();
        let width = self.steps.iter().map(|s| s.id.len()).max().unwrap_or(0);

        let _ = writeln!(out, "Entry points: {}", self.entry_points.join(", "));
        if !self.skipped_entry_points.is_empty() {
            let _ = writeln!(
                out,
                "Skipped (disabled): {}",
                self.skipped_entry_points.join(", ")
            );
        }
        let _ = writeln!(out);

        for step in &self.steps {
            if !all_steps && !step.classification.is_compromised() {
                continue;
            }
            let marker = if step.enabled { "" } else { " (disabled)" };
            let _ = writeln!(
                out,
                "  {:<width$}  {}{}",
                step.id, step.classification, marker
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{} steps: {} instantaneous, {} with effort, {} uncompromised ({} relaxations)",
            self.summary.total,
            self.summary.compromised_instantaneously,
            self.summary.compromised_with_effort,
            self.summary.uncompromised,
            self.relaxations
        );
        for m in &self.mismatches {
            let _ = writeln!(out, "MISMATCH {m}");
        }
        out
    }
}
