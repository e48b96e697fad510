//! Candidate profile collection: the conversational intake core.
//!
//! A realtime dialogue engine interviews the candidate and hands extracted
//! answers to a `ProfileCollectionController`, which validates them, tracks
//! completeness, and persists the finished profile exactly once.

pub mod controller;
pub mod field;
pub mod model;
pub mod policy;
pub mod priority;
pub mod prompts;
pub mod state;
pub mod value;

pub use controller::{
    ConversationOutcome, IntakeStatus, PersistOutcome, ProfileCollectionController, RecordOutcome,
};
pub use field::{FieldGroup, FieldKind, FieldName};
pub use model::{CandidateProfile, ProfileRecord, ProfileVariant, Slot};
pub use priority::PriorityLevel;
pub use state::CollectionPhase;
pub use value::FieldValue;
