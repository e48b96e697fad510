//! `insert_user_information`: the dialogue engine's completion signal.
//!
//! Records every argument on the controller and then asks it to persist.
//! The output handed back to the model carries a status and a plain-language
//! message. Field keys and raw errors stay in the logs.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::context::SessionContext;
use crate::error::{DatabaseError, IntakeError, ValidationError};
use crate::intake::field::{FieldKind, FieldName};
use crate::intake::priority::PriorityLevel;
use crate::intake::value::is_placeholder;
use crate::intake::ProfileCollectionController;
use crate::intake::prompts::INSERT_TOOL_NAME;
use crate::tools::tool::{Tool, ToolError, ToolOutput, require_object};

/// Tool that saves the collected candidate profile.
pub struct InsertUserInformationTool {
    controller: Arc<ProfileCollectionController>,
    description: String,
}

impl InsertUserInformationTool {
    pub fn new(controller: Arc<ProfileCollectionController>) -> Self {
        Self {
            controller,
            description: format!(
                "Save the candidate's profile once every required item has been collected. \
                 Pass every collected value; use null for optional items the candidate \
                 did not know. Call `{INSERT_TOOL_NAME}` only once per conversation."
            ),
        }
    }
}

fn property_schema(field: FieldName) -> Value {
    let mut schema = match field.kind() {
        FieldKind::Text => json!({"type": ["string", "null"]}),
        FieldKind::Email => json!({"type": ["string", "null"], "format": "email"}),
        FieldKind::Hours => json!({"type": ["integer", "null"], "minimum": 1, "maximum": 168}),
        FieldKind::Salary => json!({"type": ["integer", "null"], "minimum": 0}),
        FieldKind::YesNo => json!({"type": ["string", "null"], "enum": ["yes", "no", null]}),
        FieldKind::Priority => {
            let mut labels: Vec<Value> = PriorityLevel::SCALE
                .iter()
                .map(|p| Value::String(p.label().to_string()))
                .collect();
            labels.push(Value::Null);
            json!({"type": ["string", "null"], "enum": labels})
        }
        FieldKind::StringList => {
            json!({"type": ["array", "null"], "items": {"type": "string"}})
        }
        FieldKind::Structured => json!({
            "type": ["array", "object", "null"],
            "items": {"type": "object"}
        }),
    };
    schema["description"] = Value::String(field.description().to_string());
    schema
}

fn topics(fields: &[FieldName]) -> String {
    fields
        .iter()
        .map(|f| f.topic())
        .collect::<Vec<_>>()
        .join("; ")
}

fn reply(status: &str, message: impl Into<String>, start: Instant) -> ToolOutput {
    ToolOutput::success(
        json!({
            "status": status,
            "message": message.into(),
        }),
        start.elapsed(),
    )
}

#[async_trait]
impl Tool for InsertUserInformationTool {
    fn name(&self) -> &str {
        INSERT_TOOL_NAME
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        let variant = self.controller.variant();
        let properties: serde_json::Map<String, Value> = FieldName::for_variant(variant)
            .map(|f| (f.key().to_string(), property_schema(f)))
            .collect();
        let required: Vec<&str> = FieldName::required_for(variant).map(|f| f.key()).collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false
        })
    }

    async fn execute(&self, params: Value, ctx: &SessionContext) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let args = require_object(INSERT_TOOL_NAME, &params)?;

        let captured = self.controller.profile().await;
        let mut rejected: Vec<FieldName> = Vec::new();
        for (key, value) in args {
            // An empty argument never replaces an answer captured earlier.
            if is_placeholder(value)
                && key.parse::<FieldName>().is_ok_and(|f| captured.has_value(f))
            {
                tracing::debug!(session = %ctx.session_id, field = %key, "Keeping earlier answer");
                continue;
            }
            match self.controller.record_named(key, value).await {
                Ok(_) => {}
                Err(ValidationError::UnknownField(name)) => {
                    tracing::warn!(session = %ctx.session_id, field = %name, "Ignoring unknown profile field");
                }
                Err(err @ ValidationError::NotInVariant { .. }) => {
                    tracing::warn!(session = %ctx.session_id, error = %err, "Ignoring field outside the profile variant");
                }
                Err(err) => {
                    tracing::info!(session = %ctx.session_id, error = %err, "Profile argument rejected");
                    if let Some(field) = err.field() {
                        rejected.push(field);
                    }
                }
            }
        }

        if !rejected.is_empty() {
            return Ok(reply(
                "needs_clarification",
                format!(
                    "Some answers need a quick clarification before saving: {}. \
                     Ask the candidate again, then call this tool once more.",
                    topics(&rejected)
                ),
                start,
            ));
        }

        match self.controller.persist().await {
            Ok(outcome) if outcome.newly_persisted => Ok(reply(
                "saved",
                "The profile is saved. Thank the candidate warmly and end the conversation.",
                start,
            )),
            Ok(_) => Ok(reply(
                "already_saved",
                "The profile was already saved. Do not call this tool again. \
                 Thank the candidate and end the conversation.",
                start,
            )),
            Err(IntakeError::Incomplete { missing }) => Ok(reply(
                "incomplete",
                format!(
                    "A few details are still needed: {}. Continue the conversation \
                     and call this tool again once they are collected.",
                    topics(&missing)
                ),
                start,
            )),
            Err(IntakeError::Persistence(DatabaseError::Constraint(reason))) => {
                tracing::warn!(session = %ctx.session_id, error = %reason, "Profile conflicts with a saved one");
                Ok(reply(
                    "needs_clarification",
                    format!(
                        "A profile with this contact detail already exists. Confirm {} \
                         with the candidate, then call this tool once more.",
                        FieldName::ResumeEmail.topic()
                    ),
                    start,
                ))
            }
            Err(err) if err.is_retryable() => {
                tracing::warn!(session = %ctx.session_id, error = %err, "Profile save failed");
                Ok(reply("retry", err.user_message(), start))
            }
            Err(err) => Ok(reply("incomplete", err.user_message(), start)),
        }
    }
}
