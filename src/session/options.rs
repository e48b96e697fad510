//! Room wiring for a realtime voice session.

use serde::{Deserialize, Serialize};

use crate::tools::ToolDefinition;

/// Realtime voice used when none is configured.
pub const DEFAULT_VOICE: &str = "coral";

/// How the remote participant joined the room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantKind {
    #[default]
    Standard,
    /// Dialled in over a phone line.
    Sip,
}

impl std::str::FromStr for ParticipantKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "web" => Ok(Self::Standard),
            "sip" | "phone" | "telephony" => Ok(Self::Sip),
            other => Err(format!("unknown participant kind: {other}")),
        }
    }
}

/// Input noise filter applied to the participant's audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseCancellation {
    Standard,
    /// Tuned for narrowband phone audio.
    Telephony,
}

impl NoiseCancellation {
    pub fn for_participant(kind: ParticipantKind) -> Self {
        match kind {
            ParticipantKind::Sip => Self::Telephony,
            ParticipantKind::Standard => Self::Standard,
        }
    }
}

/// Everything the transport needs to start the realtime agent.
#[derive(Debug, Clone, Serialize)]
pub struct SessionOptions {
    pub voice: String,
    pub allow_interruptions: bool,
    pub noise_cancellation: NoiseCancellation,
    pub instructions: String,
    pub tools: Vec<ToolDefinition>,
}

impl SessionOptions {
    pub fn new(
        voice: impl Into<String>,
        participant: ParticipantKind,
        instructions: impl Into<String>,
        tools: Vec<ToolDefinition>,
    ) -> Self {
        Self {
            voice: voice.into(),
            allow_interruptions: true,
            noise_cancellation: NoiseCancellation::for_participant(participant),
            instructions: instructions.into(),
            tools,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_callers_get_telephony_filter() {
        let opts = SessionOptions::new(DEFAULT_VOICE, ParticipantKind::Sip, "hi", vec![]);
        assert_eq!(opts.noise_cancellation, NoiseCancellation::Telephony);
        assert!(opts.allow_interruptions);
        assert_eq!(opts.voice, "coral");

        let opts = SessionOptions::new("alloy", ParticipantKind::Standard, "hi", vec![]);
        assert_eq!(opts.noise_cancellation, NoiseCancellation::Standard);
    }

    #[test]
    fn participant_kind_parses() {
        assert_eq!("SIP".parse::<ParticipantKind>().unwrap(), ParticipantKind::Sip);
        assert_eq!("web".parse::<ParticipantKind>().unwrap(), ParticipantKind::Standard);
        assert!("fax".parse::<ParticipantKind>().is_err());
    }
}
