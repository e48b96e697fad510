//! Recruiter instructions handed to the realtime dialogue engine.

use super::field::{FieldGroup, FieldName};
use super::model::{CandidateProfile, ProfileVariant, Slot};
use super::policy;
use super::priority::PriorityLevel;

/// Name of the single persistence tool the dialogue engine may call.
pub const INSERT_TOOL_NAME: &str = "insert_user_information";

const BASE: &str = "\
You are a professional recruiter onboarding a candidate through a natural, friendly voice conversation.

Your goal is to understand the candidate's background, preferences, and priorities without the \
conversation feeling like a form.
Guidelines:
- Sound like an experienced human recruiter. Keep replies short and warm.
- Ask ONE question at a time and acknowledge what the candidate shares.
- Never read field names or lists aloud, and never mention tools, databases, or storage.
- If an answer is vague, ask a brief clarifying follow-up before moving on.
- If the candidate skips a question, move on and come back to it later.
- Paraphrase now and then to confirm you understood.
- Never rush the candidate.";

fn group_heading(group: FieldGroup) -> &'static str {
    match group {
        FieldGroup::Identity => "IDENTITY",
        FieldGroup::Target => "TARGET ROLE",
        FieldGroup::WorkTerms => "WORK TERMS",
        FieldGroup::Availability => "AVAILABILITY & WORK AUTHORIZATION",
        FieldGroup::Compensation => "COMPENSATION",
        FieldGroup::Priorities => "CAREER PRIORITIES",
        FieldGroup::SoftSkills => "SOFT SKILLS",
        FieldGroup::ResumeDetail => "RESUME DETAILS",
    }
}

fn group_guidance(group: FieldGroup) -> Option<String> {
    match group {
        FieldGroup::Compensation => Some(
            "Only ask about compensation once role, location, and availability have been \
             discussed. Accept \"not sure\" and pass null if unknown."
                .to_string(),
        ),
        FieldGroup::Priorities => Some(format!(
            "Ask these conversationally, not as a checklist. Use exactly one of: {}.",
            PriorityLevel::SCALE
                .iter()
                .map(|p| format!("\"{}\"", p.label()))
                .collect::<Vec<_>>()
                .join(", ")
        )),
        FieldGroup::SoftSkills => {
            Some("Infer these from the conversation or probe lightly.".to_string())
        }
        FieldGroup::ResumeDetail => Some(
            "Collect these only if the candidate shares them. Do not push if they prefer to skip."
                .to_string(),
        ),
        _ => None,
    }
}

const GROUP_ORDER: [FieldGroup; 8] = [
    FieldGroup::Identity,
    FieldGroup::Target,
    FieldGroup::WorkTerms,
    FieldGroup::Availability,
    FieldGroup::Compensation,
    FieldGroup::Priorities,
    FieldGroup::SoftSkills,
    FieldGroup::ResumeDetail,
];

/// Full recruiter prompt for a variant.
pub fn recruiter_system_prompt(variant: ProfileVariant) -> String {
    let mut sections = vec![BASE.to_string(), "INFORMATION TO COLLECT".to_string()];

    for group in GROUP_ORDER {
        let fields: Vec<FieldName> = FieldName::for_variant(variant)
            .filter(|f| f.group() == group)
            .collect();
        if fields.is_empty() {
            continue;
        }
        let required = fields.iter().all(|f| f.is_required(variant));
        let mut lines = vec![format!(
            "{} ({})",
            group_heading(group),
            if required { "Required" } else { "Optional" }
        )];
        lines.extend(fields.iter().map(|f| format!("- {}", f.key())));
        if let Some(guidance) = group_guidance(group) {
            lines.push(guidance);
        }
        sections.push(lines.join("\n"));
    }

    sections.push(format!(
        "COMPLETION\n\
         Once every required item is confidently collected:\n\
         - Call `{INSERT_TOOL_NAME}` with all collected values as structured arguments.\n\
         - Pass null for any optional item you could not collect.\n\
         - Call it only ONCE.\n\
         Afterwards thank the candidate, confirm their profile is saved, and end politely. \
         Do not ask further questions."
    ));

    sections.join("\n\n")
}

/// Progress note appended to the instructions as the conversation advances.
///
/// Mentions topics in plain language so nothing internal leaks if the model
/// echoes it.
pub fn progress_overlay(profile: &CandidateProfile) -> String {
    let mut answered = Vec::new();
    let mut unsure = Vec::new();
    for field in profile.touched() {
        match profile.get(field) {
            Some(Slot::Set(_)) => answered.push(field.topic()),
            Some(Slot::Skipped) => unsure.push(field.topic()),
            None => {}
        }
    }
    let missing: Vec<&str> = profile
        .missing_required()
        .iter()
        .map(|f| f.topic())
        .collect();

    let mut parts = vec!["Progress so far:".to_string()];
    if !answered.is_empty() {
        parts.push(format!("- Already covered: {}", answered.join("; ")));
    }
    if !unsure.is_empty() {
        parts.push(format!("- Candidate was unsure about: {}", unsure.join("; ")));
    }
    if missing.is_empty() {
        parts.push("- Every required item is covered. You may save the profile.".to_string());
    } else {
        parts.push(format!("- Still needed: {}", missing.join("; ")));
    }
    if let Some(next) = policy::next_field(profile) {
        parts.push(format!("- A good next topic: {}", next.topic()));
    }
    parts.join("\n")
}

/// Instructions with the progress overlay attached.
pub fn session_instructions(profile: &CandidateProfile) -> String {
    format!(
        "{}\n\n{}",
        recruiter_system_prompt(profile.variant()),
        progress_overlay(profile)
    )
}
