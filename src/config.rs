//! Configuration read from `AI_INTAKE_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::intake::ProfileVariant;
use crate::session::options::{DEFAULT_VOICE, ParticipantKind};

/// Default location of the local profile database.
pub const DEFAULT_DB_PATH: &str = "./data/candidate-intake.db";

/// Default wrap-up timer for a single conversation: 15 minutes.
pub const DEFAULT_WRAP_UP_SECS: u64 = 900;

/// Where completed profiles are written.
#[derive(Debug, Clone)]
pub enum SinkTarget {
    /// Keep records in memory only (`AI_INTAKE_DRY_RUN`).
    Memory,
    Local(PathBuf),
    Remote { url: String, token: SecretString },
}

/// Intake agent configuration.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    pub variant: ProfileVariant,
    pub sink: SinkTarget,
    /// `None` disables the wrap-up timer (`AI_INTAKE_WRAP_UP_SECS=0`).
    pub wrap_up: Option<Duration>,
    pub persist_on_hangup: bool,
    pub voice: String,
    pub participant_kind: ParticipantKind,
    /// Port for the status API. Unset means no HTTP server.
    pub http_port: Option<u16>,
    /// JSON-lines transcript to replay instead of reading stdin.
    pub script: Option<PathBuf>,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            variant: ProfileVariant::default(),
            sink: SinkTarget::Local(PathBuf::from(DEFAULT_DB_PATH)),
            wrap_up: Some(Duration::from_secs(DEFAULT_WRAP_UP_SECS)),
            persist_on_hangup: true,
            voice: DEFAULT_VOICE.to_string(),
            participant_kind: ParticipantKind::default(),
            http_port: None,
            script: None,
        }
    }
}

impl IntakeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let variant = match get("AI_INTAKE_VARIANT") {
            Some(raw) => raw.parse().map_err(|message| invalid("AI_INTAKE_VARIANT", message))?,
            None => defaults.variant,
        };

        let dry_run = match get("AI_INTAKE_DRY_RUN") {
            Some(raw) => parse_bool("AI_INTAKE_DRY_RUN", &raw)?,
            None => false,
        };
        let sink = if dry_run {
            SinkTarget::Memory
        } else if let Some(url) = get("AI_INTAKE_DB_URL") {
            let token = get("AI_INTAKE_DB_TOKEN")
                .ok_or_else(|| ConfigError::MissingEnvVar("AI_INTAKE_DB_TOKEN".to_string()))?;
            SinkTarget::Remote {
                url,
                token: SecretString::from(token),
            }
        } else {
            SinkTarget::Local(
                get("AI_INTAKE_DB_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            )
        };

        let wrap_up = match get("AI_INTAKE_WRAP_UP_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .parse()
                    .map_err(|_| invalid("AI_INTAKE_WRAP_UP_SECS", format!("not a number: {raw}")))?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => defaults.wrap_up,
        };

        let persist_on_hangup = match get("AI_INTAKE_PERSIST_ON_HANGUP") {
            Some(raw) => parse_bool("AI_INTAKE_PERSIST_ON_HANGUP", &raw)?,
            None => defaults.persist_on_hangup,
        };

        let participant_kind = match get("AI_INTAKE_PARTICIPANT_KIND") {
            Some(raw) => raw
                .parse()
                .map_err(|message| invalid("AI_INTAKE_PARTICIPANT_KIND", message))?,
            None => defaults.participant_kind,
        };

        let http_port = get("AI_INTAKE_HTTP_PORT")
            .map(|raw| {
                raw.parse::<u16>()
                    .map_err(|_| invalid("AI_INTAKE_HTTP_PORT", format!("not a port: {raw}")))
            })
            .transpose()?;

        Ok(Self {
            variant,
            sink,
            wrap_up,
            persist_on_hangup,
            voice: get("AI_INTAKE_VOICE").unwrap_or(defaults.voice),
            participant_kind,
            http_port,
            script: get("AI_INTAKE_SCRIPT").map(PathBuf::from),
        })
    }
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.into(),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, format!("expected true or false, got {raw}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<IntakeConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        IntakeConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_without_env() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.variant, ProfileVariant::Extended);
        assert!(matches!(cfg.sink, SinkTarget::Local(ref p) if p == &PathBuf::from(DEFAULT_DB_PATH)));
        assert_eq!(cfg.wrap_up, Some(Duration::from_secs(DEFAULT_WRAP_UP_SECS)));
        assert!(cfg.persist_on_hangup);
        assert_eq!(cfg.voice, "coral");
        assert_eq!(cfg.http_port, None);
        assert!(cfg.script.is_none());
    }

    #[test]
    fn reads_overrides() {
        let cfg = config(&[
            ("AI_INTAKE_VARIANT", "basic"),
            ("AI_INTAKE_DB_PATH", "/tmp/x.db"),
            ("AI_INTAKE_WRAP_UP_SECS", "0"),
            ("AI_INTAKE_PERSIST_ON_HANGUP", "no"),
            ("AI_INTAKE_VOICE", "alloy"),
            ("AI_INTAKE_PARTICIPANT_KIND", "sip"),
            ("AI_INTAKE_HTTP_PORT", "8088"),
            ("AI_INTAKE_SCRIPT", "demo.jsonl"),
        ])
        .unwrap();
        assert_eq!(cfg.variant, ProfileVariant::Basic);
        assert!(matches!(cfg.sink, SinkTarget::Local(ref p) if p.to_str() == Some("/tmp/x.db")));
        assert_eq!(cfg.wrap_up, None);
        assert!(!cfg.persist_on_hangup);
        assert_eq!(cfg.voice, "alloy");
        assert_eq!(cfg.participant_kind, ParticipantKind::Sip);
        assert_eq!(cfg.http_port, Some(8088));
        assert_eq!(cfg.script, Some(PathBuf::from("demo.jsonl")));
    }

    #[test]
    fn remote_sink_needs_token() {
        let err = config(&[("AI_INTAKE_DB_URL", "libsql://db.example.io")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "AI_INTAKE_DB_TOKEN"));

        let cfg = config(&[
            ("AI_INTAKE_DB_URL", "libsql://db.example.io"),
            ("AI_INTAKE_DB_TOKEN", "secret"),
        ])
        .unwrap();
        match cfg.sink {
            SinkTarget::Remote { url, token } => {
                assert_eq!(url, "libsql://db.example.io");
                assert_eq!(token.expose_secret(), "secret");
            }
            other => panic!("unexpected sink {other:?}"),
        }
    }

    #[test]
    fn dry_run_wins_over_db_settings() {
        let cfg = config(&[
            ("AI_INTAKE_DRY_RUN", "true"),
            ("AI_INTAKE_DB_URL", "libsql://db.example.io"),
        ])
        .unwrap();
        assert!(matches!(cfg.sink, SinkTarget::Memory));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            config(&[("AI_INTAKE_VARIANT", "premium")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(config(&[("AI_INTAKE_HTTP_PORT", "99999")]).is_err());
        assert!(config(&[("AI_INTAKE_WRAP_UP_SECS", "soon")]).is_err());
        assert!(config(&[("AI_INTAKE_DRY_RUN", "maybe")]).is_err());
    }

    #[test]
    fn empty_values_count_as_unset() {
        let cfg = config(&[("AI_INTAKE_VOICE", "  "), ("AI_INTAKE_DB_PATH", "")]).unwrap();
        assert_eq!(cfg.voice, "coral");
        assert!(matches!(cfg.sink, SinkTarget::Local(_)));
    }
}
