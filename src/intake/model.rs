//! Candidate profile data model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::field::{FieldGroup, FieldName};
use super::value::FieldValue;

/// Which field set a conversation collects.
///
/// `Basic` is the identity/target/work-terms set with optional compensation.
/// `Extended` additionally requires availability and work authorization, and
/// collects priorities, soft skills, and resume detail as optional fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileVariant {
    Basic,
    #[default]
    Extended,
}

impl std::fmt::Display for ProfileVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic => write!(f, "basic"),
            Self::Extended => write!(f, "extended"),
        }
    }
}

impl std::str::FromStr for ProfileVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "extended" => Ok(Self::Extended),
            other => Err(format!("unknown profile variant '{other}' (expected basic or extended)")),
        }
    }
}

/// State of a single profile field.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// The candidate answered "not sure" or declined.
    Skipped,
    Set(FieldValue),
}

/// The in-memory profile for one conversation. Fields absent from the map
/// are unset.
#[derive(Debug, Clone)]
pub struct CandidateProfile {
    variant: ProfileVariant,
    slots: BTreeMap<FieldName, Slot>,
}

impl CandidateProfile {
    pub fn new(variant: ProfileVariant) -> Self {
        Self {
            variant,
            slots: BTreeMap::new(),
        }
    }

    pub fn variant(&self) -> ProfileVariant {
        self.variant
    }

    pub fn get(&self, field: FieldName) -> Option<&Slot> {
        self.slots.get(&field)
    }

    /// The value of a field, if one was recorded.
    pub fn value(&self, field: FieldName) -> Option<&FieldValue> {
        match self.slots.get(&field) {
            Some(Slot::Set(value)) => Some(value),
            _ => None,
        }
    }

    pub fn has_value(&self, field: FieldName) -> bool {
        self.value(field).is_some()
    }

    pub(crate) fn set(&mut self, field: FieldName, slot: Slot) {
        self.slots.insert(field, slot);
    }

    /// Required fields of the variant that have no value yet.
    pub fn missing_required(&self) -> Vec<FieldName> {
        FieldName::required_for(self.variant)
            .filter(|f| !self.has_value(*f))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        FieldName::required_for(self.variant).all(|f| self.has_value(f))
    }

    /// Fields that were answered or explicitly skipped.
    pub fn touched(&self) -> Vec<FieldName> {
        self.slots.keys().copied().collect()
    }

    /// Build the flat record persisted for this profile.
    ///
    /// Every field of the variant is present. Unset compensation defaults
    /// to 0; skipped fields and other unset optional fields are `null`.
    pub fn to_record(&self) -> ProfileRecord {
        let mut fields = Map::new();
        for field in FieldName::for_variant(self.variant) {
            let value = match self.slots.get(&field) {
                Some(Slot::Set(value)) => value.to_json(),
                Some(Slot::Skipped) => Value::Null,
                None if field.group() == FieldGroup::Compensation => Value::from(0),
                None => Value::Null,
            };
            fields.insert(field.key().to_string(), value);
        }
        ProfileRecord {
            variant: self.variant,
            fields,
        }
    }
}

/// The single structured record handed to the persistence sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub variant: ProfileVariant,
    pub fields: Map<String, Value>,
}

impl ProfileRecord {
    pub fn get(&self, field: FieldName) -> Option<&Value> {
        self.fields.get(field.key())
    }

    pub fn contains(&self, field: FieldName) -> bool {
        self.fields.contains_key(field.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_profile_is_incomplete() {
        let profile = CandidateProfile::new(ProfileVariant::Basic);
        assert!(!profile.is_complete());
        assert_eq!(profile.missing_required().len(), 8);
        assert!(profile.touched().is_empty());
    }

    #[test]
    fn basic_record_has_exact_field_set() {
        let record = CandidateProfile::new(ProfileVariant::Basic).to_record();
        let mut keys: Vec<&str> = record.fields.keys().map(String::as_str).collect();
        keys.sort_unstable();
        let mut expected = vec![
            "resume_full_name",
            "resume_email",
            "target_role",
            "target_industry",
            "target_company_type",
            "target_location",
            "current_role",
            "preferred_hours_per_week",
            "min_salary_fulltime",
            "min_salary_partime",
        ];
        expected.sort_unstable();
        assert_eq!(keys, expected);
        assert_eq!(record.get(FieldName::MinSalaryFulltime), Some(&json!(0)));
        assert_eq!(record.get(FieldName::ResumeFullName), Some(&Value::Null));
    }

    #[test]
    fn skipped_fields_are_explicit_nulls() {
        let mut profile = CandidateProfile::new(ProfileVariant::Extended);
        profile.set(FieldName::MinSalaryPartime, Slot::Skipped);
        profile.set(FieldName::TechStackPriority, Slot::Skipped);
        let record = profile.to_record();
        assert!(record.contains(FieldName::MinSalaryPartime));
        assert_eq!(record.get(FieldName::MinSalaryPartime), Some(&Value::Null));
        assert_eq!(record.get(FieldName::MinSalaryFulltime), Some(&json!(0)));
        assert_eq!(record.get(FieldName::TechStackPriority), Some(&Value::Null));
        assert_eq!(record.fields.len(), 27);
    }

    #[test]
    fn skipped_required_field_is_still_missing() {
        let mut profile = CandidateProfile::new(ProfileVariant::Basic);
        profile.set(FieldName::TargetRole, Slot::Skipped);
        assert!(profile.missing_required().contains(&FieldName::TargetRole));
    }

    #[test]
    fn variant_parses_case_insensitively() {
        assert_eq!("Basic".parse::<ProfileVariant>().unwrap(), ProfileVariant::Basic);
        assert_eq!(" extended ".parse::<ProfileVariant>().unwrap(), ProfileVariant::Extended);
        assert!("full".parse::<ProfileVariant>().is_err());
    }
}
