//! Logging configuration for sqlchat.
//!
//! Interactive sessions log to a file so log lines don't interleave with the
//! chat scrollback. Headless runs log to stderr, next to the piped answers.

use std::fs::{self, File};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::error::{ChatError, Result};

/// Overrides the log file location in interactive mode.
pub const LOG_FILE_ENV: &str = "SQLCHAT_LOG_FILE";

/// Used when `RUST_LOG` is unset. sqlx logs every statement at `info`, which
/// would duplicate the pipeline's own SQL logging.
const DEFAULT_DIRECTIVES: &str = "info,sqlx=warn";

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Truncated on each run.
    File(PathBuf),
    Stderr,
}

impl LogTarget {
    /// Picks the target for a chat session.
    pub fn for_session(headless: bool) -> Self {
        if headless {
            return Self::Stderr;
        }
        match std::env::var_os(LOG_FILE_ENV) {
            Some(path) if !path.is_empty() => Self::File(PathBuf::from(path)),
            _ => Self::File(default_log_path()),
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Installs the global subscriber for the given target.
pub fn init(target: &LogTarget) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter());

    let installed = match target {
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            builder.with_writer(file).with_ansi(false).try_init()
        }
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
    };

    installed.map_err(|e| ChatError::Internal(format!("Could not install logger: {e}")))
}

fn open_log_file(path: &PathBuf) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ChatError::config(format!(
                "Could not create log directory {}: {e}",
                parent.display()
            ))
        })?;
    }
    File::create(path).map_err(|e| {
        ChatError::config(format!("Could not create log file {}: {e}", path.display()))
    })
}

/// `~/.local/state/sqlchat/sqlchat.log` on Linux, the state or config
/// directory elsewhere.
pub fn default_log_path() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::config_dir)
        .map(|dir| dir.join("sqlchat").join("sqlchat.log"))
        .unwrap_or_else(|| std::env::temp_dir().join("sqlchat.log"))
}
