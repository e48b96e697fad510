//! ProfileCollectionController: accumulates answers for one conversation
//! and persists the completed profile exactly once.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::field::FieldName;
use super::model::{CandidateProfile, ProfileRecord, ProfileVariant, Slot};
use super::policy;
use super::state::CollectionPhase;
use super::value::{Answer, parse_answer};
use crate::error::{IntakeError, ValidationError};
use crate::store::{ProfileSink, RecordId};

/// What `record()` did with a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The value was validated and stored.
    Stored,
    /// An optional field was marked as explicitly unknown.
    Skipped,
    /// The profile is already persisted or the conversation ended.
    Discarded,
}

/// Result of a successful `persist()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistOutcome {
    pub record_id: RecordId,
    /// False when the profile had already been persisted and the sink was
    /// not called again.
    pub newly_persisted: bool,
}

/// How a conversation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationOutcome {
    Persisted(RecordId),
    /// The profile was incomplete (or never saved) and was dropped.
    Discarded { missing: Vec<FieldName> },
}

/// Point-in-time view of a collection, safe to serialize.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeStatus {
    pub conversation_id: Uuid,
    pub variant: ProfileVariant,
    pub phase: CollectionPhase,
    pub collected: Vec<FieldName>,
    pub skipped: Vec<FieldName>,
    pub missing_required: Vec<FieldName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_field: Option<FieldName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<RecordId>,
    pub ended: bool,
}

struct Inner {
    profile: CandidateProfile,
    phase: CollectionPhase,
    /// Set exactly when `phase` is `Persisted`.
    record_id: Option<RecordId>,
    ended: bool,
    discarded_values: usize,
}

/// Per-conversation profile collection state machine.
///
/// All state sits behind one async mutex. `persist()` holds it across the
/// sink call, so concurrent completion signals serialize and only the first
/// reaches the sink.
pub struct ProfileCollectionController {
    conversation_id: Uuid,
    variant: ProfileVariant,
    sink: Arc<dyn ProfileSink>,
    inner: Mutex<Inner>,
}

impl ProfileCollectionController {
    pub fn new(variant: ProfileVariant, sink: Arc<dyn ProfileSink>) -> Self {
        Self::with_conversation_id(Uuid::new_v4(), variant, sink)
    }

    pub fn with_conversation_id(
        conversation_id: Uuid,
        variant: ProfileVariant,
        sink: Arc<dyn ProfileSink>,
    ) -> Self {
        Self {
            conversation_id,
            variant,
            sink,
            inner: Mutex::new(Inner {
                profile: CandidateProfile::new(variant),
                phase: CollectionPhase::default(),
                record_id: None,
                ended: false,
                discarded_values: 0,
            }),
        }
    }

    pub fn conversation_id(&self) -> Uuid {
        self.conversation_id
    }

    pub fn variant(&self) -> ProfileVariant {
        self.variant
    }

    /// Validate and store one answer.
    ///
    /// Rejected values leave the field untouched. Placeholder answers
    /// ("not sure", empty) mark optional fields as explicitly unknown and
    /// are rejected for required ones.
    pub async fn record(
        &self,
        field: FieldName,
        raw: &Value,
    ) -> Result<RecordOutcome, ValidationError> {
        let mut inner = self.inner.lock().await;

        if inner.phase.is_terminal() || inner.ended {
            inner.discarded_values += 1;
            tracing::info!(
                conversation = %self.conversation_id,
                field = %field,
                "Ignoring answer after profile was closed"
            );
            return Ok(RecordOutcome::Discarded);
        }

        let variant = inner.profile.variant();
        if !field.in_variant(variant) {
            return Err(ValidationError::NotInVariant {
                field,
                variant: variant.to_string(),
            });
        }

        let outcome = match parse_answer(field, raw)? {
            Answer::Value(value) => {
                inner.profile.set(field, Slot::Set(value));
                RecordOutcome::Stored
            }
            Answer::Unsure if field.is_required(variant) => {
                return Err(ValidationError::EmptyRequired { field });
            }
            Answer::Unsure => {
                inner.profile.set(field, Slot::Skipped);
                RecordOutcome::Skipped
            }
        };

        let before = inner.phase;
        inner.phase = before.settle(inner.profile.is_complete());
        if inner.phase != before {
            debug_assert!(before.can_transition_to(inner.phase));
            tracing::info!(
                conversation = %self.conversation_id,
                from = %before,
                to = %inner.phase,
                "Collection phase changed"
            );
        }
        tracing::debug!(conversation = %self.conversation_id, field = %field, ?outcome, "Answer recorded");
        Ok(outcome)
    }

    /// Record an answer for a field given by key or alias.
    pub async fn record_named(
        &self,
        name: &str,
        raw: &Value,
    ) -> Result<RecordOutcome, ValidationError> {
        let field: FieldName = name.parse()?;
        self.record(field, raw).await
    }

    /// Mark an optional field as explicitly unknown.
    pub async fn skip(&self, field: FieldName) -> Result<RecordOutcome, ValidationError> {
        self.record(field, &Value::Null).await
    }

    /// True iff every required field holds a value.
    pub async fn is_complete(&self) -> bool {
        self.inner.lock().await.profile.is_complete()
    }

    pub async fn phase(&self) -> CollectionPhase {
        self.inner.lock().await.phase
    }

    /// Persist the profile once.
    ///
    /// Fails with `Incomplete` (no sink call) while required fields are
    /// missing. A sink failure leaves the collection in `ReadyToPersist` so
    /// the caller may retry. Once persisted, further calls return the stored
    /// id without touching the sink.
    pub async fn persist(&self) -> Result<PersistOutcome, IntakeError> {
        let mut inner = self.inner.lock().await;

        if let Some(record_id) = &inner.record_id {
            tracing::debug!(
                conversation = %self.conversation_id,
                record_id = %record_id,
                "Profile already persisted, skipping insert"
            );
            return Ok(PersistOutcome {
                record_id: record_id.clone(),
                newly_persisted: false,
            });
        }

        if inner.ended {
            return Err(IntakeError::ConversationEnded);
        }

        let missing = inner.profile.missing_required();
        if !missing.is_empty() {
            return Err(IntakeError::Incomplete { missing });
        }

        let record: ProfileRecord = inner.profile.to_record();
        match self.sink.insert(&record).await {
            Ok(record_id) => {
                debug_assert!(inner.phase.can_transition_to(CollectionPhase::Persisted));
                inner.phase = CollectionPhase::Persisted;
                inner.record_id = Some(record_id.clone());
                tracing::info!(
                    conversation = %self.conversation_id,
                    record_id = %record_id,
                    variant = %record.variant,
                    "Candidate profile persisted"
                );
                Ok(PersistOutcome {
                    record_id,
                    newly_persisted: true,
                })
            }
            Err(e) => {
                tracing::warn!(
                    conversation = %self.conversation_id,
                    error = %e,
                    "Failed to persist candidate profile"
                );
                Err(IntakeError::Persistence(e))
            }
        }
    }

    /// Close the conversation. An unsaved profile is dropped, never
    /// autosaved.
    pub async fn end_conversation(&self) -> ConversationOutcome {
        let mut inner = self.inner.lock().await;
        inner.ended = true;

        if let Some(record_id) = &inner.record_id {
            return ConversationOutcome::Persisted(record_id.clone());
        }

        let missing = inner.profile.missing_required();
        tracing::info!(
            conversation = %self.conversation_id,
            answered = inner.profile.touched().len(),
            missing = missing.len(),
            "Conversation ended before the profile was saved, discarding"
        );
        ConversationOutcome::Discarded { missing }
    }

    /// Suggested next topic for the dialogue engine.
    pub async fn next_field(&self) -> Option<FieldName> {
        let inner = self.inner.lock().await;
        if inner.phase.is_terminal() || inner.ended {
            return None;
        }
        policy::next_field(&inner.profile)
    }

    /// Whether the dialogue engine may raise `field` yet.
    pub async fn may_elicit(&self, field: FieldName) -> bool {
        policy::may_elicit(&self.inner.lock().await.profile, field)
    }

    /// Copy of the current profile.
    pub async fn profile(&self) -> CandidateProfile {
        self.inner.lock().await.profile.clone()
    }

    /// Values dropped because they arrived after the profile closed.
    pub async fn discarded_values(&self) -> usize {
        self.inner.lock().await.discarded_values
    }

    pub async fn status(&self) -> IntakeStatus {
        let inner = self.inner.lock().await;
        let profile = &inner.profile;
        let (mut collected, mut skipped) = (Vec::new(), Vec::new());
        for field in profile.touched() {
            match profile.get(field) {
                Some(Slot::Set(_)) => collected.push(field),
                Some(Slot::Skipped) => skipped.push(field),
                None => {}
            }
        }
        IntakeStatus {
            conversation_id: self.conversation_id,
            variant: profile.variant(),
            phase: inner.phase,
            collected,
            skipped,
            missing_required: profile.missing_required(),
            next_field: if inner.phase.is_terminal() || inner.ended {
                None
            } else {
                policy::next_field(profile)
            },
            record_id: inner.record_id.clone(),
            ended: inner.ended,
        }
    }
}
