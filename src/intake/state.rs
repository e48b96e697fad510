//! Collection state machine: tracks whether a profile may be persisted.

use serde::{Deserialize, Serialize};

/// Phases of a profile collection.
///
/// Progresses linearly: Collecting → ReadyToPersist → Persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionPhase {
    #[default]
    Collecting,
    ReadyToPersist,
    Persisted,
}

impl CollectionPhase {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: CollectionPhase) -> bool {
        use CollectionPhase::*;
        matches!(
            (self, target),
            (Collecting, ReadyToPersist) | (ReadyToPersist, Persisted)
        )
    }

    /// Whether no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Persisted)
    }

    /// The phase that matches a completeness check. Never leaves `Persisted`.
    pub fn settle(self, complete: bool) -> CollectionPhase {
        match (self, complete) {
            (Self::Persisted, _) => Self::Persisted,
            (_, true) => Self::ReadyToPersist,
            (_, false) => Self::Collecting,
        }
    }
}

impl std::fmt::Display for CollectionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Collecting => "collecting",
            Self::ReadyToPersist => "ready_to_persist",
            Self::Persisted => "persisted",
        };
        write!(f, "{s}")
    }
}
