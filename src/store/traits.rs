//! `ProfileSink` trait: the single durable-storage seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DatabaseError;
use crate::intake::model::ProfileRecord;

/// Identifier the sink assigns to a stored profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// External durable storage for completed profiles.
///
/// The sink carries no dedup key; callers must insert at most once per
/// conversation.
#[async_trait]
pub trait ProfileSink: Send + Sync {
    /// Persist one profile record.
    async fn insert(&self, record: &ProfileRecord) -> Result<RecordId, DatabaseError>;
}
