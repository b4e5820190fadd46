//! Error types for model construction and attack runs.

/// Result type for graph construction.
pub type ModelResult<T> = Result<T, ModelError>;

/// Result type for attack runs.
pub type AttackResult<T> = Result<T, AttackError>;

/// Structural errors. Detected while building; no [`Graph`](crate::Graph)
/// is produced when one occurs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// An edge, step or guard refers to something that does not exist.
    #[error("reference to unknown {entity}: {reference}")]
    Reference {
        entity: &'static str,
        reference: String,
    },

    /// Two entities of the same kind share an id.
    #[error("duplicate {entity} id: {id}")]
    DuplicateId { entity: &'static str, id: String },

    /// Step names are the last segment of `<asset>.<step>` and may not
    /// contain a dot or be empty.
    #[error("invalid {entity} name '{name}' on asset '{asset}'")]
    InvalidName {
        entity: &'static str,
        asset: String,
        name: String,
    },

    /// A step is (transitively) its own AND prerequisite.
    #[error("AND-dependency cycle through: {}", steps.join(" -> "))]
    AndCycle { steps: Vec<String> },
}

impl ModelError {
    pub(crate) fn unknown(entity: &'static str, reference: impl ToString) -> Self {
        Self::Reference {
            entity,
            reference: reference.to_string(),
        }
    }

    pub(crate) fn duplicate(entity: &'static str, id: impl Into<String>) -> Self {
        Self::DuplicateId {
            entity,
            id: id.into(),
        }
    }

    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference { .. })
    }

    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateId { .. })
    }
}

/// Errors raised by [`Attacker::attack`](crate::Attacker::attack).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttackError {
    /// An entry point is not part of the attacked graph.
    #[error("unknown attack point: {step}")]
    UnknownAttackPoint { step: String },

    /// The configured relaxation bound was hit before the fixed point.
    #[error("relaxation budget exceeded: {limit} edge relaxations")]
    RelaxationBudgetExceeded { limit: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = ModelError::unknown("step", "step#9");
        assert_eq!(err.to_string(), "reference to unknown step: step#9");
        assert!(err.is_reference());

        let err = ModelError::duplicate("attack step", "app.crawl");
        assert_eq!(err.to_string(), "duplicate attack step id: app.crawl");
        assert!(err.is_duplicate());

        let err = ModelError::InvalidName {
            entity: "attack step",
            asset: "app".into(),
            name: "v1.crawl".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid attack step name 'v1.crawl' on asset 'app'"
        );

        let err = ModelError::AndCycle {
            steps: vec!["a.x".into(), "a.y".into()],
        };
        assert_eq!(err.to_string(), "AND-dependency cycle through: a.x -> a.y");
    }
}
