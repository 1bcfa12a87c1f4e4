use std::fmt;

use thiserror::Error;

/// Failures surfaced by the remote session, the update sequencer and the report builder.
///
/// A post-update version mismatch is normally carried as a typed outcome by the
/// sequencer; `VersionMismatch` exists for callers that want to turn that outcome
/// into a hard error.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("connection-failed: {host}:{port}: {reason}")]
    Connection {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("execution-failed: '{command}': {reason}")]
    Execution { command: String, reason: String },

    #[error("version-mismatch: expected '{expected}', found '{observed}'")]
    VersionMismatch { expected: String, observed: String },

    #[error("parse-failed: line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("update-aborted: {source} (rollback {rollback})")]
    UpdateAborted {
        #[source]
        source: Box<DeployError>,
        rollback: RollbackStatus,
    },

    #[error("invalid-config: {0}")]
    Config(String),
}

impl DeployError {
    /// Stable reason code, the token before the first colon of the message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connection-failed",
            Self::Execution { .. } => "execution-failed",
            Self::VersionMismatch { .. } => "version-mismatch",
            Self::Parse { .. } => "parse-failed",
            Self::UpdateAborted { .. } => "update-aborted",
            Self::Config(_) => "invalid-config",
        }
    }

    pub(crate) fn execution(command: &str, reason: impl Into<String>) -> Self {
        Self::Execution {
            command: command.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollbackStatus {
    NotAttempted,
    Restored,
    Failed(String),
}

impl RollbackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotAttempted => "not-attempted",
            Self::Restored => "restored",
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for RollbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(reason) => write!(f, "failed: {reason}"),
            other => f.write_str(other.as_str()),
        }
    }
}
