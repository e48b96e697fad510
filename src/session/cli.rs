//! CLI turn source: stdin/stdout REPL standing in for the voice transport.
//!
//! Lines are read as:
//! - `field = value` (value parsed as JSON when possible, else text)
//! - `skip field`
//! - `/save` to call the save tool, `/quit` to hang up
//! - `{"name": ..., "arguments": {...}}` for a raw tool call
//! - anything else is a plain utterance

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::{Turn, TurnSource};
use crate::error::SessionError;
use crate::intake::prompts::INSERT_TOOL_NAME;

/// Reads turns from stdin and prints replies to stdout.
pub struct CliTurnSource {
    rx: mpsc::UnboundedReceiver<String>,
}

impl CliTurnSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let stdin = tokio::io::stdin();
            let reader = BufReader::new(stdin);
            let mut lines = reader.lines();

            eprint!("> ");

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim().to_string();
                        if line.is_empty() {
                            eprint!("> ");
                            continue;
                        }
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::error!("Error reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        Self { rx }
    }
}

impl Default for CliTurnSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Interpret one input line.
pub fn parse_line(line: &str) -> Result<Turn, String> {
    let line = line.trim();
    match line {
        "/quit" | "/exit" | "/hangup" => return Ok(Turn::End),
        "/save" => {
            return Ok(Turn::ToolCall {
                name: INSERT_TOOL_NAME.to_string(),
                arguments: Value::Object(Default::default()),
            });
        }
        _ => {}
    }

    if line.starts_with('{') {
        let call: Value = serde_json::from_str(line).map_err(|e| format!("invalid JSON: {e}"))?;
        let name = call
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or("tool call needs a \"name\"")?;
        let arguments = call
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));
        return Ok(Turn::ToolCall {
            name: name.to_string(),
            arguments,
        });
    }

    if let Some(field) = line.strip_prefix("skip ") {
        return Ok(Turn::Skip {
            field: field.trim().to_string(),
        });
    }

    if let Some((field, value)) = line.split_once('=') {
        let field = field.trim();
        if !field.is_empty() && !field.contains(' ') {
            let value = value.trim();
            let value = serde_json::from_str(value)
                .unwrap_or_else(|_| Value::String(value.to_string()));
            return Ok(Turn::Answer {
                field: field.to_string(),
                value,
            });
        }
    }

    Ok(Turn::Utterance {
        text: line.to_string(),
    })
}

#[async_trait]
impl TurnSource for CliTurnSource {
    fn name(&self) -> &str {
        "cli"
    }

    async fn next_turn(&mut self) -> Result<Option<Turn>, SessionError> {
        while let Some(line) = self.rx.recv().await {
            match parse_line(&line) {
                Ok(turn) => return Ok(Some(turn)),
                Err(reason) => {
                    eprintln!("Could not read that line: {reason}");
                    eprint!("> ");
                }
            }
        }
        Ok(None)
    }

    async fn reply(&mut self, text: &str) -> Result<(), SessionError> {
        println!("\n{}\n", text);
        eprint!("> ");
        Ok(())
    }
}
