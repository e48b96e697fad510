//! Elicitation policy: which topic the conversation should raise next.
//!
//! The dialogue engine decides how to phrase questions; this module only
//! orders them. Required fields come first, and compensation is held back
//! until role and location are known along with current role (plus
//! availability in the extended profile).

use super::field::{FieldGroup, FieldName};
use super::model::{CandidateProfile, ProfileVariant};

/// Fields that must hold values before compensation is raised.
fn compensation_prerequisites(variant: ProfileVariant) -> &'static [FieldName] {
    match variant {
        ProfileVariant::Basic => &[
            FieldName::TargetRole,
            FieldName::TargetLocation,
            FieldName::CurrentRole,
        ],
        ProfileVariant::Extended => &[
            FieldName::TargetRole,
            FieldName::TargetLocation,
            FieldName::CurrentRole,
            FieldName::AvailabilityToStart,
        ],
    }
}

/// Whether the conversation may ask about `field` yet.
pub fn may_elicit(profile: &CandidateProfile, field: FieldName) -> bool {
    if !field.in_variant(profile.variant()) {
        return false;
    }
    if field.group() != FieldGroup::Compensation {
        return true;
    }
    compensation_prerequisites(profile.variant())
        .iter()
        .all(|f| profile.has_value(*f))
}

/// The next field worth asking about, or `None` when nothing is left.
pub fn next_field(profile: &CandidateProfile) -> Option<FieldName> {
    let variant = profile.variant();

    // Required fields never hold `Skipped`; the controller rejects it.
    let required = FieldName::required_for(variant).find(|f| profile.get(*f).is_none());
    if required.is_some() {
        return required;
    }

    FieldName::for_variant(variant)
        .filter(|f| !f.is_required(variant))
        .find(|f| profile.get(*f).is_none() && may_elicit(profile, *f))
}
