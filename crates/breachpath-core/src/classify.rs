//! Externally observable label of a step after a run.

use crate::state::{EffortClass, StepState};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Uncompromised,
    #[serde(alias = "compromised-with-effort", alias = "with_effort")]
    CompromisedWithEffort,
    #[serde(alias = "compromised-instantaneously", alias = "instantaneous")]
    CompromisedInstantaneously,
}

impl Classification {
    pub const ALL: [Classification; 3] = [
        Self::Uncompromised,
        Self::CompromisedWithEffort,
        Self::CompromisedInstantaneously,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uncompromised => "uncompromised",
            Self::CompromisedWithEffort => "compromised_with_effort",
            Self::CompromisedInstantaneously => "compromised_instantaneously",
        }
    }

    #[must_use]
    pub fn is_compromised(self) -> bool {
        !matches!(self, Self::Uncompromised)
    }
}

impl From<StepState> for Classification {
    fn from(state: StepState) -> Self {
        match state {
            StepState::Uncompromised => Self::Uncompromised,
            StepState::Compromised(EffortClass::WithEffort) => Self::CompromisedWithEffort,
            StepState::Compromised(EffortClass::Instantaneous) => Self::CompromisedInstantaneously,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Classification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "uncompromised" => Ok(Self::Uncompromised),
            "compromised_with_effort" | "with_effort" => Ok(Self::CompromisedWithEffort),
            "compromised_instantaneously" | "instantaneous" => {
                Ok(Self::CompromisedInstantaneously)
            }
            other => Err(format!(
                "unknown classification '{other}' (expected one of: uncompromised, compromised_with_effort, compromised_instantaneously)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_every_state() {
        assert_eq!(
            Classification::from(StepState::Uncompromised),
            Classification::Uncompromised
        );
        assert_eq!(
            Classification::from(StepState::Compromised(EffortClass::WithEffort)),
            Classification::CompromisedWithEffort
        );
        assert_eq!(
            Classification::from(StepState::Compromised(EffortClass::Instantaneous)),
            Classification::CompromisedInstantaneously
        );
    }

    #[test]
    fn parses_cli_spellings() {
        assert_eq!(
            "compromised-with-effort".parse::<Classification>().unwrap(),
            Classification::CompromisedWithEffort
        );
        assert_eq!(
            "Instantaneous".parse::<Classification>().unwrap(),
            Classification::CompromisedInstantaneously
        );
        assert!("owned".parse::<Classification>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for c in Classification::ALL {
            assert_eq!(c.to_string().parse::<Classification>().unwrap(), c);
        }
    }
}
