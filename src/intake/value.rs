//! Validated field values and the rules that turn raw answers into them.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::field::{FieldKind, FieldName};
use super::priority::PriorityLevel;
use crate::error::ValidationError;

/// Answers that mean "I don't know" rather than a real value.
const PLACEHOLDERS: &[&str] = &[
    "n/a",
    "na",
    "none",
    "null",
    "unknown",
    "not sure",
    "unsure",
    "skip",
    "pass",
    "tbd",
    "?",
    "-",
    "idk",
    "i don't know",
    "prefer not to say",
];

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

const MAX_HOURS_PER_WEEK: i64 = 168;

/// A validated value for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Priority(PriorityLevel),
    List(Vec<String>),
    Structured(Value),
}

impl FieldValue {
    /// JSON form sent to the persistence sink.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Integer(n) => Value::from(*n),
            Self::Priority(p) => Value::String(p.label().to_string()),
            Self::List(items) => Value::from(items.clone()),
            Self::Structured(v) => v.clone(),
        }
    }
}

/// Outcome of interpreting a raw answer.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Value(FieldValue),
    /// The candidate did not know or declined.
    Unsure,
}

/// Whether a raw answer is an empty or "not sure" response.
pub fn is_placeholder(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::String(s) => {
            let s = s.trim().to_lowercase();
            s.is_empty() || PLACEHOLDERS.contains(&s.as_str())
        }
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Interpret a raw answer for `field` according to its kind.
pub fn parse_answer(field: FieldName, raw: &Value) -> Result<Answer, ValidationError> {
    if is_placeholder(raw) {
        return Ok(Answer::Unsure);
    }

    let value = match field.kind() {
        FieldKind::Text => FieldValue::Text(require_text(field, raw)?),
        FieldKind::Email => {
            let email = require_text(field, raw)?;
            if !EMAIL_RE.is_match(&email) {
                return Err(invalid(field, "not an email address"));
            }
            FieldValue::Text(email.to_lowercase())
        }
        FieldKind::Hours => {
            let hours = require_integer(field, raw)?;
            if !(1..=MAX_HOURS_PER_WEEK).contains(&hours) {
                return Err(invalid(field, "hours per week must be between 1 and 168"));
            }
            FieldValue::Integer(hours)
        }
        FieldKind::Salary => {
            let salary = require_integer(field, raw)?;
            if salary < 0 {
                return Err(invalid(field, "salary cannot be negative"));
            }
            FieldValue::Integer(salary)
        }
        FieldKind::YesNo => FieldValue::Text(parse_yes_no(field, raw)?.to_string()),
        FieldKind::Priority => {
            let level = raw
                .as_str()
                .and_then(PriorityLevel::parse_label)
                .ok_or_else(|| ValidationError::OutOfScale {
                    field,
                    allowed: PriorityLevel::allowed_labels(),
                })?;
            FieldValue::Priority(level)
        }
        FieldKind::StringList => FieldValue::List(parse_list(field, raw)?),
        FieldKind::Structured => match raw {
            Value::Object(_) | Value::Array(_) => FieldValue::Structured(raw.clone()),
            _ => return Err(invalid(field, "expected a structured record or list of records")),
        },
    };
    Ok(Answer::Value(value))
}

fn invalid(field: FieldName, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}

fn require_text(field: FieldName, raw: &Value) -> Result<String, ValidationError> {
    match raw {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(invalid(field, "expected text")),
    }
}

fn require_integer(field: FieldName, raw: &Value) -> Result<i64, ValidationError> {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .ok_or_else(|| invalid(field, "expected a whole number")),
        Value::String(s) => s
            .trim()
            .replace(',', "")
            .parse::<i64>()
            .map_err(|_| invalid(field, "expected a whole number")),
        _ => Err(invalid(field, "expected a whole number")),
    }
}

fn parse_yes_no(field: FieldName, raw: &Value) -> Result<&'static str, ValidationError> {
    match raw {
        Value::Bool(true) => Ok("yes"),
        Value::Bool(false) => Ok("no"),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "yes" | "y" | "true" => Ok("yes"),
            "no" | "n" | "false" => Ok("no"),
            _ => Err(invalid(field, "expected yes or no")),
        },
        _ => Err(invalid(field, "expected yes or no")),
    }
}

fn parse_list(field: FieldName, raw: &Value) -> Result<Vec<String>, ValidationError> {
    let items: Vec<String> = match raw {
        Value::Array(items) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(|s| s.trim().to_string())
                    .ok_or_else(|| invalid(field, "list entries must be text"))
            })
            .collect::<Result<_, _>>()?,
        Value::String(s) => s.split(',').map(|s| s.trim().to_string()).collect(),
        _ => return Err(invalid(field, "expected a list")),
    };
    Ok(items.into_iter().filter(|s| !s.is_empty()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn value(field: FieldName, raw: Value) -> FieldValue {
        match parse_answer(field, &raw).unwrap() {
            Answer::Value(v) => v,
            Answer::Unsure => panic!("{raw} parsed as unsure"),
        }
    }

    #[test]
    fn placeholders_are_unsure() {
        for raw in [json!(null), json!(""), json!("  "), json!("Not sure"), json!("N/A"), json!([])] {
            assert_eq!(
                parse_answer(FieldName::MinSalaryFulltime, &raw).unwrap(),
                Answer::Unsure,
                "{raw}"
            );
        }
    }

    #[test]
    fn text_is_trimmed() {
        assert_eq!(
            value(FieldName::TargetRole, json!("  Data Analyst ")),
            FieldValue::Text("Data Analyst".into())
        );
    }

    #[test]
    fn email_is_checked_and_lowercased() {
        assert_eq!(
            value(FieldName::ResumeEmail, json!("Ava@X.com")),
            FieldValue::Text("ava@x.com".into())
        );
        assert!(parse_answer(FieldName::ResumeEmail, &json!("ava at x dot com")).is_err());
    }

    #[test]
    fn hours_accept_numeric_strings_within_range() {
        assert_eq!(
            value(FieldName::PreferredHoursPerWeek, json!("40")),
            FieldValue::Integer(40)
        );
        assert_eq!(
            value(FieldName::PreferredHoursPerWeek, json!(32.0)),
            FieldValue::Integer(32)
        );
        assert!(parse_answer(FieldName::PreferredHoursPerWeek, &json!(0)).is_err());
        assert!(parse_answer(FieldName::PreferredHoursPerWeek, &json!(200)).is_err());
        assert!(parse_answer(FieldName::PreferredHoursPerWeek, &json!("forty")).is_err());
    }

    #[test]
    fn salary_rejects_negatives() {
        assert_eq!(
            value(FieldName::MinSalaryFulltime, json!("85,000")),
            FieldValue::Integer(85_000)
        );
        assert!(parse_answer(FieldName::MinSalaryPartime, &json!(-5)).is_err());
    }

    #[test]
    fn visa_normalises_to_yes_no() {
        assert_eq!(
            value(FieldName::VisaSponsorshipRequired, json!(true)),
            FieldValue::Text("yes".into())
        );
        assert_eq!(
            value(FieldName::VisaSponsorshipRequired, json!("No")),
            FieldValue::Text("no".into())
        );
        assert!(parse_answer(FieldName::VisaSponsorshipRequired, &json!("maybe later")).is_err());
    }

    #[test]
    fn priority_outside_scale_is_rejected() {
        let err = parse_answer(FieldName::TechStackPriority, &json!("super important")).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfScale { .. }));
        let err = parse_answer(FieldName::TechStackPriority, &json!(4)).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfScale { .. }));
        assert_eq!(
            value(FieldName::TechStackPriority, json!("Important")),
            FieldValue::Priority(PriorityLevel::Important)
        );
    }

    #[test]
    fn skills_accept_array_or_comma_list() {
        assert_eq!(
            value(FieldName::ResumeSkills, json!("SQL, Python , ,Tableau")),
            FieldValue::List(vec!["SQL".into(), "Python".into(), "Tableau".into()])
        );
        assert_eq!(
            value(FieldName::ResumeSkills, json!(["Rust"])),
            FieldValue::List(vec!["Rust".into()])
        );
        assert!(parse_answer(FieldName::ResumeSkills, &json!([1, 2])).is_err());
    }

    #[test]
    fn structured_fields_need_records() {
        let edu = json!([{"degree": "BSc Statistics", "school": "UBC"}]);
        assert_eq!(
            value(FieldName::ResumeEducation, edu.clone()),
            FieldValue::Structured(edu)
        );
        assert!(parse_answer(FieldName::ResumeEducation, &json!("BSc")).is_err());
    }

    #[test]
    fn to_json_uses_priority_label() {
        assert_eq!(
            FieldValue::Priority(PriorityLevel::VeryImportant).to_json(),
            json!("Very important")
        );
        assert_eq!(FieldValue::Integer(40).to_json(), json!(40));
    }
}
