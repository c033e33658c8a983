//! Log output for simulation runs.
//!
//! Solvers and exporters emit [`tracing`] events; nothing is printed until a
//! subscriber is installed. [`init`] installs a formatted subscriber at the
//! configured [`LogLevel`]. A `RUST_LOG` environment variable, when set,
//! takes precedence.

use serde::{Deserialize, Serialize};
use tracing::{Level, subscriber::SetGlobalDefaultError};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Verbosity of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    /// Run start and end, created files, progress.
    #[default]
    Info,
    /// Every accepted step.
    Debug,
    Trace,
}

impl LogLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Installs a global formatted subscriber at `level`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(level: LogLevel) -> Result<(), SetGlobalDefaultError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_map_to_tracing() {
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::default()), Level::INFO);
        assert_eq!(LogLevel::Debug.as_str(), "debug");
    }

    #[test]
    fn second_init_fails() {
        // Whichever test installs first wins; a later attempt must fail.
        let _ = init(LogLevel::Warn);
        assert!(init(LogLevel::Warn).is_err());
    }
}
