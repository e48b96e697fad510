//! Scripted turn source for replaying transcripts and for tests.

use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use super::{Turn, TurnSource};
use crate::error::SessionError;

/// Replays a fixed list of turns.
pub struct ScriptTurnSource {
    turns: VecDeque<Turn>,
    replies: Vec<String>,
    delay: Option<Duration>,
    hold_open: bool,
}

impl ScriptTurnSource {
    pub fn new(turns: Vec<Turn>) -> Self {
        Self {
            turns: turns.into(),
            replies: Vec::new(),
            delay: None,
            hold_open: false,
        }
    }

    /// Parse a JSON-lines transcript. Blank lines and `#` comments are skipped.
    pub fn from_jsonl(text: &str) -> Result<Self, SessionError> {
        let mut turns = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let turn: Turn =
                serde_json::from_str(line).map_err(|e| SessionError::InvalidTranscript {
                    line: idx + 1,
                    reason: e.to_string(),
                })?;
            turns.push(turn);
        }
        Ok(Self::new(turns))
    }

    pub async fn from_path(path: &Path) -> Result<Self, SessionError> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::from_jsonl(&text)
    }

    /// Wait this long before yielding each turn.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Keep the source pending after the last turn instead of ending, like a
    /// caller who goes quiet without hanging up.
    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    /// Everything the session said back.
    pub fn replies(&self) -> &[String] {
        &self.replies
    }
}

#[async_trait]
impl TurnSource for ScriptTurnSource {
    fn name(&self) -> &str {
        "script"
    }

    async fn next_turn(&mut self) -> Result<Option<Turn>, SessionError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.turns.pop_front() {
            Some(turn) => Ok(Some(turn)),
            None if self.hold_open => std::future::pending().await,
            None => Ok(None),
        }
    }

    async fn reply(&mut self, text: &str) -> Result<(), SessionError> {
        self.replies.push(text.to_string());
        Ok(())
    }
}
