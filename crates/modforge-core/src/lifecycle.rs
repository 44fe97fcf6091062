use crate::CoreError;
use serde::{Deserialize, Serialize};

/// Construction state of a module descriptor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorState {
    Empty,
    Configuring,
    Finalized,
}

impl std::fmt::Display for DescriptorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DescriptorState::Empty => write!(f, "empty"),
            DescriptorState::Configuring => write!(f, "configuring"),
            DescriptorState::Finalized => write!(f, "finalized"),
        }
    }
}

pub fn validate_transition(from: DescriptorState, to: DescriptorState) -> Result<(), CoreError> {
    let valid = matches!(
        (from, to),
        (
            DescriptorState::Empty | DescriptorState::Configuring,
            DescriptorState::Configuring | DescriptorState::Finalized
        )
    );

    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}
