//! Tracing setup for the intake agent.
//!
//! The CLI transcript owns stdout, so log lines never go there. They go to
//! stderr, or to a daily file under `AI_INTAKE_LOG_DIR` when that is set.
//! `RUST_LOG` filters (default `info`).

use std::path::{Path, PathBuf};
use std::sync::Once;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

pub const LOG_DIR_VAR: &str = "AI_INTAKE_LOG_DIR";

/// Where log lines are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// `<dir>/<app>.log.<date>`, one file per day.
    DailyFile(PathBuf),
}

impl LogTarget {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(LOG_DIR_VAR) {
            Some(dir) if !dir.trim().is_empty() => Self::DailyFile(PathBuf::from(dir.trim())),
            _ => Self::Stderr,
        }
    }
}

fn file_writer(dir: &Path, app: &str) -> std::io::Result<(BoxMakeWriter, WorkerGuard)> {
    std::fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::new(
        tracing_appender::rolling::Rotation::DAILY,
        dir,
        format!("{app}.log"),
    );
    let (writer, guard) = tracing_appender::non_blocking(appender);
    Ok((BoxMakeWriter::new(writer), guard))
}

/// Install the global subscriber.
///
/// Keep the returned guard alive until exit; dropping it stops the file
/// writer. Later calls leave the first subscriber in place.
pub fn init(app: &str, target: &LogTarget) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (writer, guard) = match target {
        LogTarget::Stderr => (BoxMakeWriter::new(std::io::stderr), None),
        LogTarget::DailyFile(dir) => match file_writer(dir, app) {
            Ok((writer, guard)) => (writer, Some(guard)),
            Err(e) => {
                eprintln!("Warning: cannot log to {} ({e}), using stderr", dir.display());
                (BoxMakeWriter::new(std::io::stderr), None)
            }
        },
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(writer)
        .try_init();
    guard
}

/// Log panics as errors before the default hook prints them.
pub fn install_panic_hook() {
    static HOOK: Once = Once::new();

    HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let reason = match info.payload().downcast_ref::<&str>() {
                Some(s) => (*s).to_string(),
                None => info
                    .payload()
                    .downcast_ref::<String>()
                    .cloned()
                    .unwrap_or_default(),
            };
            let thread = std::thread::current();
            tracing::error!(
                thread = thread.name().unwrap_or("unnamed"),
                at = %info.location().map(|l| l.to_string()).unwrap_or_default(),
                reason = %reason,
                "Intake agent panicked"
            );
            previous(info);
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_dir_selects_daily_file() {
        let target = LogTarget::from_lookup(|key| {
            (key == LOG_DIR_VAR).then(|| " /var/log/intake ".to_string())
        });
        assert_eq!(target, LogTarget::DailyFile(PathBuf::from("/var/log/intake")));
    }

    #[test]
    fn blank_or_missing_dir_means_stderr() {
        assert_eq!(LogTarget::from_lookup(|_| None), LogTarget::Stderr);
        assert_eq!(
            LogTarget::from_lookup(|_| Some("  ".to_string())),
            LogTarget::Stderr
        );
    }

    #[test]
    fn file_writer_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("logs");
        let (_writer, _guard) = file_writer(&dir, "candidate-intake").unwrap();
        assert!(dir.is_dir());
    }
}
