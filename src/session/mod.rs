//! Intake session: drives a turn source against one profile controller.
//!
//! The realtime dialogue engine (or a stand-in) produces turns. The session
//! hands answers to the controller, dispatches tool calls through the
//! registry, and decides what happens to the profile when the conversation
//! ends.

pub mod cli;
pub mod options;
pub mod script;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::context::SessionContext;
use crate::error::{IntakeError, SessionError};
use crate::intake::{
    ConversationOutcome, FieldName, ProfileCollectionController, RecordOutcome, prompts,
};
use crate::tools::ToolRegistry;

pub use cli::CliTurnSource;
pub use options::{NoiseCancellation, ParticipantKind, SessionOptions};
pub use script::ScriptTurnSource;

/// One unit of conversational input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Turn {
    /// An answer the dialogue engine extracted for a field.
    Answer { field: String, value: Value },
    /// The candidate declined or did not know.
    Skip { field: String },
    /// A function call from the dialogue engine.
    ToolCall {
        name: String,
        #[serde(default = "empty_arguments")]
        arguments: Value,
    },
    /// Free speech. Logged, never parsed for answers.
    Utterance { text: String },
    /// The participant hung up.
    End,
}

fn empty_arguments() -> Value {
    Value::Object(Default::default())
}

/// Where turns come from.
#[async_trait]
pub trait TurnSource: Send {
    fn name(&self) -> &str;

    /// Next turn, or `None` once the source is exhausted.
    async fn next_turn(&mut self) -> Result<Option<Turn>, SessionError>;

    /// Speak back to the participant.
    async fn reply(&mut self, _text: &str) -> Result<(), SessionError> {
        Ok(())
    }
}

/// What happened during a session.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub conversation_id: Uuid,
    pub outcome: ConversationOutcome,
    pub turns: usize,
    pub rejected_answers: usize,
    pub tool_calls: usize,
    /// The wrap-up timer fired before the conversation ended.
    pub timed_out: bool,
}

#[derive(Debug, Default)]
struct TurnCounts {
    turns: usize,
    rejected_answers: usize,
    tool_calls: usize,
}

/// How the turn loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Close {
    Hangup,
    WrapUp,
    Saved,
}

const CLOSING_LINE: &str =
    "Thank you so much! Your profile is saved and our team will be in touch soon.";

/// Runs one conversation to completion.
pub struct IntakeSession {
    controller: Arc<ProfileCollectionController>,
    tools: Arc<ToolRegistry>,
    ctx: SessionContext,
    wrap_up: Option<Duration>,
    persist_on_hangup: bool,
}

impl IntakeSession {
    pub fn new(
        controller: Arc<ProfileCollectionController>,
        tools: Arc<ToolRegistry>,
        ctx: SessionContext,
    ) -> Self {
        Self {
            controller,
            tools,
            ctx,
            wrap_up: None,
            persist_on_hangup: true,
        }
    }

    /// Close the session after this long, saving the profile if it is complete.
    pub fn with_wrap_up(mut self, after: Duration) -> Self {
        self.wrap_up = Some(after);
        self
    }

    /// Whether a complete but unsaved profile is persisted when the
    /// participant hangs up.
    pub fn persist_on_hangup(mut self, enabled: bool) -> Self {
        self.persist_on_hangup = enabled;
        self
    }

    /// Options for the realtime agent joining the room.
    pub async fn options(&self, voice: &str) -> SessionOptions {
        let profile = self.controller.profile().await;
        SessionOptions::new(
            voice,
            self.ctx.participant_kind,
            prompts::session_instructions(&profile),
            self.tools.tool_definitions().await,
        )
    }

    pub async fn run<S>(&self, source: &mut S) -> Result<SessionSummary, SessionError>
    where
        S: TurnSource + ?Sized,
    {
        tracing::info!(
            session = %self.ctx.session_id,
            room = %self.ctx.room,
            source = source.name(),
            variant = %self.controller.variant(),
            "Intake session started"
        );

        let mut counts = TurnCounts::default();
        let close = match self.drive(source, &mut counts).await {
            Ok(close) => close,
            Err(e) => {
                let outcome = self.controller.end_conversation().await;
                tracing::warn!(
                    session = %self.ctx.session_id,
                    error = %e,
                    saved = matches!(outcome, ConversationOutcome::Persisted(_)),
                    "Turn source failed, conversation closed"
                );
                return Err(e);
            }
        };

        match close {
            Close::WrapUp => {
                tracing::info!(session = %self.ctx.session_id, "Wrap-up timer fired");
                self.try_persist("wrap-up").await;
            }
            Close::Hangup if self.persist_on_hangup => self.try_persist("hangup").await,
            Close::Hangup | Close::Saved => {}
        }

        let turns = counts.turns;
        let outcome = self.controller.end_conversation().await;
        match &outcome {
            ConversationOutcome::Persisted(id) => {
                tracing::info!(session = %self.ctx.session_id, record_id = %id, turns, "Intake session finished");
            }
            ConversationOutcome::Discarded { missing } => {
                tracing::info!(
                    session = %self.ctx.session_id,
                    missing = missing.len(),
                    turns,
                    "Intake session finished without a saved profile"
                );
            }
        }

        Ok(SessionSummary {
            conversation_id: self.controller.conversation_id(),
            outcome,
            turns,
            rejected_answers: counts.rejected_answers,
            tool_calls: counts.tool_calls,
            timed_out: close == Close::WrapUp,
        })
    }

    async fn drive<S>(&self, source: &mut S, counts: &mut TurnCounts) -> Result<Close, SessionError>
    where
        S: TurnSource + ?Sized,
    {
        let deadline = self.wrap_up.map(|d| tokio::time::Instant::now() + d);

        loop {
            let next = match deadline {
                Some(at) => tokio::select! {
                    turn = source.next_turn() => turn?,
                    _ = tokio::time::sleep_until(at) => return Ok(Close::WrapUp),
                },
                None => source.next_turn().await?,
            };

            let Some(turn) = next else {
                return Ok(Close::Hangup);
            };
            counts.turns += 1;

            match turn {
                Turn::Answer { field, value } => {
                    match self.controller.record_named(&field, &value).await {
                        Ok(RecordOutcome::Discarded) => {}
                        Ok(_) => {
                            if let Some(next) = self.controller.next_field().await {
                                source
                                    .reply(&format!("Got it. Next, tell me about {}.", next.topic()))
                                    .await?;
                            }
                        }
                        Err(e) => {
                            counts.rejected_answers += 1;
                            tracing::info!(session = %self.ctx.session_id, error = %e, "Answer rejected");
                            source
                                .reply(IntakeError::Validation(e).user_message())
                                .await?;
                        }
                    }
                }
                Turn::Skip { field } => {
                    let result = match field.parse::<FieldName>() {
                        Ok(field) => self.controller.skip(field).await,
                        Err(e) => Err(e),
                    };
                    if let Err(e) = result {
                        counts.rejected_answers += 1;
                        tracing::info!(session = %self.ctx.session_id, error = %e, "Skip rejected");
                        source
                            .reply("That one I do need from you. Could you share it?")
                            .await?;
                    }
                }
                Turn::ToolCall { name, arguments } => {
                    counts.tool_calls += 1;
                    match self.tools.execute(&name, arguments, &self.ctx).await {
                        Ok(output) => {
                            let status = output.result.get("status").cloned().unwrap_or_default();
                            let message = output
                                .result
                                .get("message")
                                .and_then(|v| v.as_str())
                                .unwrap_or_default();
                            tracing::debug!(
                                session = %self.ctx.session_id,
                                tool = %name,
                                status = %status,
                                "Tool result: {message}"
                            );
                        }
                        Err(e) => {
                            tracing::warn!(session = %self.ctx.session_id, tool = %name, error = %e, "Tool call failed");
                        }
                    }
                    if self.controller.phase().await.is_terminal() {
                        source.reply(CLOSING_LINE).await?;
                        return Ok(Close::Saved);
                    }
                }
                Turn::Utterance { text } => {
                    tracing::debug!(session = %self.ctx.session_id, chars = text.len(), "Participant spoke");
                }
                Turn::End => return Ok(Close::Hangup),
            }
        }
    }

    /// Persist through the controller's guard if the profile is complete.
    async fn try_persist(&self, trigger: &str) {
        if !self.controller.is_complete().await {
            return;
        }
        match self.controller.persist().await {
            Ok(outcome) if outcome.newly_persisted => {
                tracing::info!(session = %self.ctx.session_id, trigger, "Saved complete profile at close");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(session = %self.ctx.session_id, trigger, error = %e, "Could not save profile at close");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::{CollectionPhase, ProfileVariant};
    use crate::store::MemorySink;
    use crate::tools::builtin::InsertUserInformationTool;
    use serde_json::json;

    fn answers() -> Vec<Turn> {
        [
            ("full_name", json!("Ava Chen")),
            ("email", json!("ava@example.com")),
            ("target_role", json!("Data Analyst")),
            ("target_industry", json!("Healthcare")),
            ("target_company_type", json!("Startup")),
            ("target_location", json!("Remote")),
            ("current_role", json!("Junior Analyst")),
            ("preferred_hours_per_week", json!(40)),
        ]
        .into_iter()
        .map(|(field, value)| Turn::Answer {
            field: field.to_string(),
            value,
        })
        .collect()
    }

    async fn build_session(sink: Arc<MemorySink>) -> (IntakeSession, Arc<ProfileCollectionController>) {
        let controller = Arc::new(ProfileCollectionController::new(ProfileVariant::Basic, sink));
        let tools = Arc::new(ToolRegistry::new());
        tools
            .register(Arc::new(InsertUserInformationTool::new(controller.clone())))
            .await;
        let ctx = SessionContext::new(controller.conversation_id(), "test-room");
        (IntakeSession::new(controller.clone(), tools, ctx), controller)
    }

    fn save_call() -> Turn {
        Turn::ToolCall {
            name: prompts::INSERT_TOOL_NAME.to_string(),
            arguments: json!({}),
        }
    }

    #[tokio::test]
    async fn tool_call_saves_and_ends_session() {
        let sink = MemorySink::new();
        let (session, controller) = build_session(sink.clone()).await;
        let mut turns = answers();
        turns.push(save_call());
        turns.push(Turn::Answer {
            field: "target_role".into(),
            value: json!("Ignored"),
        });
        let mut source = ScriptTurnSource::new(turns);

        let summary = session.run(&mut source).await.unwrap();
        assert!(matches!(summary.outcome, ConversationOutcome::Persisted(_)));
        assert_eq!(summary.tool_calls, 1);
        assert_eq!(source.replies().last().map(String::as_str), Some(CLOSING_LINE));
        assert_eq!(controller.phase().await, CollectionPhase::Persisted);
        assert_eq!(sink.attempts(), 1);
    }

    #[tokio::test]
    async fn hangup_with_incomplete_profile_discards() {
        let sink = MemorySink::new();
        let (session, _) = build_session(sink.clone()).await;
        let mut turns = answers();
        turns.truncate(3);
        turns.push(Turn::End);
        let mut source = ScriptTurnSource::new(turns);

        let summary = session.run(&mut source).await.unwrap();
        match summary.outcome {
            ConversationOutcome::Discarded { missing } => {
                assert!(missing.contains(&FieldName::TargetIndustry));
            }
            other => panic!("expected discard, got {other:?}"),
        }
        assert_eq!(sink.attempts(), 0);
    }

    #[tokio::test]
    async fn hangup_with_complete_profile_follows_setting() {
        let sink = MemorySink::new();
        let (first, _) = build_session(sink.clone()).await;
        let mut source = ScriptTurnSource::new(answers());
        let summary = first.run(&mut source).await.unwrap();
        assert!(matches!(summary.outcome, ConversationOutcome::Persisted(_)));

        let sink = MemorySink::new();
        let (second, _) = build_session(sink.clone()).await;
        let second = second.persist_on_hangup(false);
        let mut source = ScriptTurnSource::new(answers());
        let summary = second.run(&mut source).await.unwrap();
        assert!(matches!(summary.outcome, ConversationOutcome::Discarded { .. }));
        assert_eq!(sink.attempts(), 0);
    }

    #[tokio::test]
    async fn rejected_answers_get_a_generic_reply() {
        let sink = MemorySink::new();
        let (session, _) = build_session(sink).await;
        let mut source = ScriptTurnSource::new(vec![
            Turn::Answer {
                field: "email".into(),
                value: json!("ava at example"),
            },
            Turn::Skip {
                field: "target_role".into(),
            },
            Turn::Utterance {
                text: "my email is ava@example.com".into(),
            },
            Turn::End,
        ]);

        let summary = session.run(&mut source).await.unwrap();
        assert_eq!(summary.rejected_answers, 2);
        assert_eq!(summary.turns, 4);
        for reply in source.replies() {
            assert!(!reply.contains("resume_email"));
            assert!(!reply.contains("target_role"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn wrap_up_timer_saves_complete_profile() {
        let sink = MemorySink::new();
        let (session, _) = build_session(sink.clone()).await;
        let session = session.with_wrap_up(Duration::from_secs(60));
        let mut source = ScriptTurnSource::new(answers()).hold_open();

        let summary = session.run(&mut source).await.unwrap();
        assert!(summary.timed_out);
        assert!(matches!(summary.outcome, ConversationOutcome::Persisted(_)));
        assert_eq!(sink.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn wrap_up_racing_tool_call_inserts_once() {
        let sink = MemorySink::new();
        let (session, controller) = build_session(sink.clone()).await;
        let session = session.with_wrap_up(Duration::from_millis(50));
        let mut source = ScriptTurnSource::new(answers())
            .with_delay(Duration::from_millis(1))
            .hold_open();

        let tool_path = {
            let controller = controller.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                controller.persist().await
            })
        };
        let summary = session.run(&mut source).await.unwrap();
        let tool_outcome = tool_path.await.unwrap();

        assert!(matches!(summary.outcome, ConversationOutcome::Persisted(_)));
        if let Ok(outcome) = tool_outcome {
            assert_eq!(
                summary.outcome,
                ConversationOutcome::Persisted(outcome.record_id)
            );
        }
        assert_eq!(sink.attempts(), 1);
    }

    struct BrokenSource {
        turns: Vec<Turn>,
    }

    #[async_trait]
    impl TurnSource for BrokenSource {
        fn name(&self) -> &str {
            "broken"
        }

        async fn next_turn(&mut self) -> Result<Option<Turn>, SessionError> {
            match self.turns.pop() {
                Some(turn) => Ok(Some(turn)),
                None => Err(SessionError::InvalidTranscript {
                    line: 9,
                    reason: "truncated".into(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn source_failure_still_ends_the_conversation() {
        let sink = MemorySink::new();
        let (session, controller) = build_session(sink.clone()).await;
        let mut turns = answers();
        turns.reverse();
        let mut source = BrokenSource { turns };

        let err = session.run(&mut source).await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidTranscript { line: 9, .. }));
        assert!(controller.status().await.ended);
        assert!(matches!(
            controller.persist().await,
            Err(IntakeError::ConversationEnded)
        ));
        assert_eq!(sink.attempts(), 0);
    }

    #[tokio::test]
    async fn options_carry_prompt_and_tool() {
        let sink = MemorySink::new();
        let (session, _) = build_session(sink).await;
        let opts = session.options(options::DEFAULT_VOICE).await;
        assert_eq!(opts.voice, "coral");
        assert_eq!(opts.noise_cancellation, NoiseCancellation::Standard);
        assert!(opts.instructions.contains("Progress so far:"));
        assert_eq!(opts.tools.len(), 1);
        assert_eq!(opts.tools[0].name, prompts::INSERT_TOOL_NAME);
    }
}
