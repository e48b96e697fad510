//! Field catalogue for the candidate profile.
//!
//! Every field has a canonical record key (the column name the sink
//! receives), an optional short alias the dialogue layer may use, a group,
//! a value kind, and a requiredness that depends on the profile variant.

use serde::{Deserialize, Serialize};

use super::model::ProfileVariant;
use crate::error::ValidationError;

/// Logical grouping used for prompts and elicitation ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    Identity,
    Target,
    WorkTerms,
    Availability,
    Compensation,
    Priorities,
    SoftSkills,
    ResumeDetail,
}

/// How a raw answer for a field is validated and stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text, trimmed, placeholders rejected.
    Text,
    /// An email address.
    Email,
    /// Hours per week, 1..=168.
    Hours,
    /// Yes/no answer stored as `"yes"` / `"no"`.
    YesNo,
    /// Non-negative salary figure.
    Salary,
    /// One of the five priority labels.
    Priority,
    /// List of strings.
    StringList,
    /// JSON object or array of records.
    Structured,
}

/// A recognised profile field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    #[serde(alias = "full_name")]
    ResumeFullName,
    #[serde(alias = "email")]
    ResumeEmail,
    TargetRole,
    TargetIndustry,
    TargetCompanyType,
    TargetLocation,
    CurrentRole,
    PreferredHoursPerWeek,
    AvailabilityToStart,
    VisaSponsorshipRequired,
    WorkingLanguagePref,
    MinSalaryFulltime,
    MinSalaryPartime,
    #[serde(alias = "work_life_balance")]
    WorkLifeBalancePriority,
    #[serde(alias = "career_growth")]
    CareerGrowthPriority,
    #[serde(alias = "tech_stack")]
    TechStackPriority,
    #[serde(alias = "diversity_inclusion")]
    DiversityInclusionPriority,
    #[serde(alias = "purpose_culture")]
    PurposeCulturePriority,
    #[serde(alias = "location_flexibility")]
    LocationFlexibilityPriority,
    CommunicationStyle,
    TeamworkLeadership,
    AdaptabilityCreativity,
    PersonalityType,
    #[serde(alias = "education")]
    ResumeEducation,
    #[serde(alias = "work_experience")]
    ResumeWorkExperience,
    #[serde(alias = "skills")]
    ResumeSkills,
    #[serde(alias = "certifications")]
    ResumeCertifications,
}

impl FieldName {
    /// All fields in record order.
    pub const ALL: [FieldName; 27] = [
        Self::ResumeFullName,
        Self::ResumeEmail,
        Self::TargetRole,
        Self::TargetIndustry,
        Self::TargetCompanyType,
        Self::TargetLocation,
        Self::CurrentRole,
        Self::PreferredHoursPerWeek,
        Self::AvailabilityToStart,
        Self::VisaSponsorshipRequired,
        Self::WorkingLanguagePref,
        Self::MinSalaryFulltime,
        Self::MinSalaryPartime,
        Self::WorkLifeBalancePriority,
        Self::CareerGrowthPriority,
        Self::TechStackPriority,
        Self::DiversityInclusionPriority,
        Self::PurposeCulturePriority,
        Self::LocationFlexibilityPriority,
        Self::CommunicationStyle,
        Self::TeamworkLeadership,
        Self::AdaptabilityCreativity,
        Self::PersonalityType,
        Self::ResumeEducation,
        Self::ResumeWorkExperience,
        Self::ResumeSkills,
        Self::ResumeCertifications,
    ];

    /// Canonical record key.
    pub fn key(&self) -> &'static str {
        match self {
            Self::ResumeFullName => "resume_full_name",
            Self::ResumeEmail => "resume_email",
            Self::TargetRole => "target_role",
            Self::TargetIndustry => "target_industry",
            Self::TargetCompanyType => "target_company_type",
            Self::TargetLocation => "target_location",
            Self::CurrentRole => "current_role",
            Self::PreferredHoursPerWeek => "preferred_hours_per_week",
            Self::AvailabilityToStart => "availability_to_start",
            Self::VisaSponsorshipRequired => "visa_sponsorship_required",
            Self::WorkingLanguagePref => "working_language_pref",
            Self::MinSalaryFulltime => "min_salary_fulltime",
            Self::MinSalaryPartime => "min_salary_partime",
            Self::WorkLifeBalancePriority => "work_life_balance_priority",
            Self::CareerGrowthPriority => "career_growth_priority",
            Self::TechStackPriority => "tech_stack_priority",
            Self::DiversityInclusionPriority => "diversity_inclusion_priority",
            Self::PurposeCulturePriority => "purpose_culture_priority",
            Self::LocationFlexibilityPriority => "location_flexibility_priority",
            Self::CommunicationStyle => "communication_style",
            Self::TeamworkLeadership => "teamwork_leadership",
            Self::AdaptabilityCreativity => "adaptability_creativity",
            Self::PersonalityType => "personality_type",
            Self::ResumeEducation => "resume_education",
            Self::ResumeWorkExperience => "resume_work_experience",
            Self::ResumeSkills => "resume_skills",
            Self::ResumeCertifications => "resume_certifications",
        }
    }

    /// Short alias accepted in addition to the canonical key.
    pub fn alias(&self) -> Option<&'static str> {
        match self {
            Self::ResumeFullName => Some("full_name"),
            Self::ResumeEmail => Some("email"),
            Self::WorkLifeBalancePriority => Some("work_life_balance"),
            Self::CareerGrowthPriority => Some("career_growth"),
            Self::TechStackPriority => Some("tech_stack"),
            Self::DiversityInclusionPriority => Some("diversity_inclusion"),
            Self::PurposeCulturePriority => Some("purpose_culture"),
            Self::LocationFlexibilityPriority => Some("location_flexibility"),
            Self::ResumeEducation => Some("education"),
            Self::ResumeWorkExperience => Some("work_experience"),
            Self::ResumeSkills => Some("skills"),
            Self::ResumeCertifications => Some("certifications"),
            _ => None,
        }
    }

    pub fn group(&self) -> FieldGroup {
        use FieldName::*;
        match self {
            ResumeFullName | ResumeEmail => FieldGroup::Identity,
            TargetRole | TargetIndustry | TargetCompanyType | TargetLocation | CurrentRole => {
                FieldGroup::Target
            }
            PreferredHoursPerWeek => FieldGroup::WorkTerms,
            AvailabilityToStart | VisaSponsorshipRequired | WorkingLanguagePref => {
                FieldGroup::Availability
            }
            MinSalaryFulltime | MinSalaryPartime => FieldGroup::Compensation,
            WorkLifeBalancePriority
            | CareerGrowthPriority
            | TechStackPriority
            | DiversityInclusionPriority
            | PurposeCulturePriority
            | LocationFlexibilityPriority => FieldGroup::Priorities,
            CommunicationStyle | TeamworkLeadership | AdaptabilityCreativity | PersonalityType => {
                FieldGroup::SoftSkills
            }
            ResumeEducation | ResumeWorkExperience | ResumeSkills | ResumeCertifications => {
                FieldGroup::ResumeDetail
            }
        }
    }

    pub fn kind(&self) -> FieldKind {
        use FieldName::*;
        match self {
            ResumeEmail => FieldKind::Email,
            PreferredHoursPerWeek => FieldKind::Hours,
            VisaSponsorshipRequired => FieldKind::YesNo,
            MinSalaryFulltime | MinSalaryPartime => FieldKind::Salary,
            ResumeSkills => FieldKind::StringList,
            ResumeEducation | ResumeWorkExperience | ResumeCertifications => FieldKind::Structured,
            _ if self.group() == FieldGroup::Priorities => FieldKind::Priority,
            _ => FieldKind::Text,
        }
    }

    /// Whether the variant collects this field at all.
    pub fn in_variant(&self, variant: ProfileVariant) -> bool {
        match variant {
            ProfileVariant::Extended => true,
            ProfileVariant::Basic => matches!(
                self.group(),
                FieldGroup::Identity
                    | FieldGroup::Target
                    | FieldGroup::WorkTerms
                    | FieldGroup::Compensation
            ),
        }
    }

    /// Whether the variant requires a value before persisting.
    pub fn is_required(&self, variant: ProfileVariant) -> bool {
        self.in_variant(variant)
            && matches!(
                self.group(),
                FieldGroup::Identity
                    | FieldGroup::Target
                    | FieldGroup::WorkTerms
                    | FieldGroup::Availability
            )
    }

    /// Human-readable topic, safe to surface in conversation.
    pub fn topic(&self) -> &'static str {
        match self {
            Self::ResumeFullName => "your full name",
            Self::ResumeEmail => "your email address",
            Self::TargetRole => "the role you're aiming for",
            Self::TargetIndustry => "the industry you'd like to work in",
            Self::TargetCompanyType => "the kind of company you're looking for",
            Self::TargetLocation => "where you'd like to work",
            Self::CurrentRole => "your current role",
            Self::PreferredHoursPerWeek => "how many hours a week you'd like to work",
            Self::AvailabilityToStart => "when you could start",
            Self::VisaSponsorshipRequired => "whether you'd need visa sponsorship",
            Self::WorkingLanguagePref => "your preferred working language",
            Self::MinSalaryFulltime => "your minimum salary for a full-time role",
            Self::MinSalaryPartime => "your minimum pay for a part-time role",
            Self::WorkLifeBalancePriority => "how much work-life balance matters to you",
            Self::CareerGrowthPriority => "how much career growth matters to you",
            Self::TechStackPriority => "how much the tech stack matters to you",
            Self::DiversityInclusionPriority => "how much diversity and inclusion matter to you",
            Self::PurposeCulturePriority => "how much mission and culture matter to you",
            Self::LocationFlexibilityPriority => "how much remote or hybrid flexibility matters to you",
            Self::CommunicationStyle => "how you like to communicate",
            Self::TeamworkLeadership => "how you work in a team",
            Self::AdaptabilityCreativity => "how you handle change",
            Self::PersonalityType => "your personality type",
            Self::ResumeEducation => "your education",
            Self::ResumeWorkExperience => "your work experience",
            Self::ResumeSkills => "your skills",
            Self::ResumeCertifications => "your certifications",
        }
    }

    /// Short description used in the tool schema.
    pub fn description(&self) -> &'static str {
        match self {
            Self::ResumeFullName => "Full name of the applicant",
            Self::ResumeEmail => "Email of the applicant",
            Self::TargetRole => "The role the applicant is targeting",
            Self::TargetIndustry => "The industry the applicant is looking for",
            Self::TargetCompanyType => "The company types the applicant is targeting",
            Self::TargetLocation => "The location the applicant is targeting",
            Self::CurrentRole => "The current designation or role of the applicant",
            Self::PreferredHoursPerWeek => "Preferred weekly working hours",
            Self::AvailabilityToStart => {
                "How soon the applicant can start (e.g. immediately, 2_weeks, 1_month)"
            }
            Self::VisaSponsorshipRequired => "Whether visa sponsorship is required (yes or no)",
            Self::WorkingLanguagePref => "Preferred working language",
            Self::MinSalaryFulltime => "Minimum acceptable salary for a full-time role",
            Self::MinSalaryPartime => "Minimum acceptable pay for a part-time role",
            Self::WorkLifeBalancePriority => "Importance of work-life balance",
            Self::CareerGrowthPriority => "Importance of career growth and learning",
            Self::TechStackPriority => "Importance of the technology stack",
            Self::DiversityInclusionPriority => "Importance of diversity and inclusion",
            Self::PurposeCulturePriority => "Importance of mission, values, and culture",
            Self::LocationFlexibilityPriority => "Importance of remote or hybrid flexibility",
            Self::CommunicationStyle => "Communication style inferred from the conversation",
            Self::TeamworkLeadership => "How the applicant collaborates or leads within a team",
            Self::AdaptabilityCreativity => "Assessment of adaptability and creativity",
            Self::PersonalityType => "Optional personality classification (e.g. MBTI-style)",
            Self::ResumeEducation => "Structured education history",
            Self::ResumeWorkExperience => "Structured work experience history",
            Self::ResumeSkills => "List of skills",
            Self::ResumeCertifications => "Structured list of professional certifications",
        }
    }

    /// Fields collected by a variant, in record order.
    pub fn for_variant(variant: ProfileVariant) -> impl Iterator<Item = FieldName> {
        Self::ALL.into_iter().filter(move |f| f.in_variant(variant))
    }

    /// Required fields of a variant, in record order.
    pub fn required_for(variant: ProfileVariant) -> impl Iterator<Item = FieldName> {
        Self::ALL.into_iter().filter(move |f| f.is_required(variant))
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for FieldName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|f| f.key() == needle || f.alias() == Some(needle.as_str()))
            .ok_or_else(|| ValidationError::UnknownField(s.trim().to_string()))
    }
}
