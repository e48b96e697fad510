//! Error types for candidate intake.

use crate::intake::field::FieldName;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Sink unavailable: {0}")]
    Unavailable(String),
}

/// Tool execution errors.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Tool {name} not found")]
    NotFound { name: String },

    #[error("Invalid parameters for tool {name}: {reason}")]
    InvalidParameters { name: String, reason: String },

    #[error("Tool {name} timed out after {timeout:?}")]
    Timeout {
        name: String,
        timeout: std::time::Duration,
    },
}

/// A rejected answer. The field stays exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field {field} is not collected by the {variant} profile")]
    NotInVariant { field: FieldName, variant: String },

    #[error("Field {field} is required and cannot be left empty or unsure")]
    EmptyRequired { field: FieldName },

    #[error("Field {field} must be one of: {allowed}")]
    OutOfScale { field: FieldName, allowed: String },

    #[error("Field {field} has an invalid value: {reason}")]
    InvalidValue { field: FieldName, reason: String },
}

impl ValidationError {
    /// The field the rejection refers to, when it is a recognised one.
    pub fn field(&self) -> Option<FieldName> {
        match self {
            Self::UnknownField(_) => None,
            Self::NotInVariant { field, .. }
            | Self::EmptyRequired { field }
            | Self::OutOfScale { field, .. }
            | Self::InvalidValue { field, .. } => Some(*field),
        }
    }
}

/// Errors raised by the profile collection controller.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Profile incomplete, missing: {}", format_fields(missing))]
    Incomplete { missing: Vec<FieldName> },

    #[error("Persistence failed: {0}")]
    Persistence(#[from] DatabaseError),

    #[error("Conversation already ended without a saved profile")]
    ConversationEnded,
}

impl IntakeError {
    /// Text that is safe to hand to the conversational layer.
    ///
    /// Never includes field keys, storage details, or error payloads.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation(_) => {
                "Sorry, I didn't quite catch that. Could you tell me that one more time?"
            }
            Self::Incomplete { .. } => {
                "I just need a couple more details from you before I can save your profile."
            }
            Self::Persistence(_) => {
                "Sorry, something went wrong on my side while saving your profile. \
                 Could we try that again in a moment?"
            }
            Self::ConversationEnded => "Thanks for your time today. We can pick this up again soon.",
        }
    }

    /// Whether a later `persist()` may succeed without new answers.
    ///
    /// A constraint violation needs a different answer, so it is not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(e) if !matches!(e, DatabaseError::Constraint(_)))
    }
}

fn format_fields(fields: &[FieldName]) -> String {
    fields
        .iter()
        .map(|f| f.key())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Session driver errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid transcript line {line}: {reason}")]
    InvalidTranscript { line: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
