//! The five-label importance scale for career priorities.

use serde::{Deserialize, Serialize};

/// Ordinal importance rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriorityLevel {
    #[serde(rename = "Not important")]
    NotImportant,
    #[serde(rename = "Slightly important")]
    SlightlyImportant,
    #[serde(rename = "Moderately important")]
    ModeratelyImportant,
    #[serde(rename = "Important")]
    Important,
    #[serde(rename = "Very important")]
    VeryImportant,
}

impl PriorityLevel {
    /// Lowest to highest.
    pub const SCALE: [PriorityLevel; 5] = [
        Self::NotImportant,
        Self::SlightlyImportant,
        Self::ModeratelyImportant,
        Self::Important,
        Self::VeryImportant,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::NotImportant => "Not important",
            Self::SlightlyImportant => "Slightly important",
            Self::ModeratelyImportant => "Moderately important",
            Self::Important => "Important",
            Self::VeryImportant => "Very important",
        }
    }

    /// Position on the scale, 1 through 5.
    pub fn rank(&self) -> u8 {
        match self {
            Self::NotImportant => 1,
            Self::SlightlyImportant => 2,
            Self::ModeratelyImportant => 3,
            Self::Important => 4,
            Self::VeryImportant => 5,
        }
    }

    /// Comma-separated list of every label.
    pub fn allowed_labels() -> String {
        Self::SCALE
            .iter()
            .map(|p| p.label())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Match a label case-insensitively, treating `_` and `-` as spaces.
    pub fn parse_label(raw: &str) -> Option<Self> {
        let normalized = raw
            .trim()
            .replace(['_', '-'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        Self::SCALE
            .into_iter()
            .find(|p| p.label().to_lowercase() == normalized)
    }
}

impl std::fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
