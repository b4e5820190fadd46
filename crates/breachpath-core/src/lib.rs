//! Attack-graph compromise propagation.
//!
//! Build a [`Graph`] with a [`GraphBuilder`], wrap it in a [`Model`], seed an
//! [`Attacker`] with entry points and run [`Attacker::attack`]. Every step
//! then classifies as uncompromised, compromised with effort, or compromised
//! instantaneously.

pub mod classify;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod graph;
pub mod model;
pub mod query;
pub mod report;
pub mod state;

pub use classify::Classification;
pub use config::{load_engine_config, EffortPolicy, EngineConfig, EngineConfigOverrides};
pub use document::{load_document, LoadedModel, ModelDocument, Scenario, ScenarioResult};
pub use engine::{AttackOutcome, Attacker};
pub use error::{AttackError, AttackResult, ModelError, ModelResult};
pub use graph::{
    AssetId, AttackStep, DefenseId, DefenseValue, Edge, EdgeId, Graph, GraphBuilder, Guard, StepId,
};
pub use model::Model;
pub use query::{AssertionMismatch, Expectation};
pub use report::AttackReport;
pub use state::{EffortClass, Gate, StepState};
