//! Session context handed to tool execution.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::session::options::ParticipantKind;

/// Who is on the other end of an intake conversation.
#[derive(Debug, Clone, Serialize)]
pub struct SessionContext {
    /// Unique session ID. Matches the controller's conversation ID.
    pub session_id: Uuid,
    /// Room the conversation runs in.
    pub room: String,
    /// Identity of the remote participant, if the transport reports one.
    pub participant_identity: Option<String>,
    pub participant_kind: ParticipantKind,
    pub started_at: DateTime<Utc>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            room: "local".to_string(),
            participant_identity: None,
            participant_kind: ParticipantKind::Standard,
            started_at: Utc::now(),
        }
    }
}

impl SessionContext {
    pub fn new(session_id: Uuid, room: impl Into<String>) -> Self {
        Self {
            session_id,
            room: room.into(),
            ..Default::default()
        }
    }

    pub fn with_participant(mut self, identity: impl Into<String>, kind: ParticipantKind) -> Self {
        self.participant_identity = Some(identity.into());
        self.participant_kind = kind;
        self
    }
}
