use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of one started session; never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, for thread names and compact log lines
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SessionStatus {
    Running,
    Completed,
    Failed { failure: SessionFailure },
}

impl SessionStatus {
    pub fn failed(failure: SessionFailure) -> Self {
        SessionStatus::Failed { failure }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Running)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed { .. } => "failed",
        }
    }
}

/// Why a session ended in `Failed`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SessionFailure {
    /// The source did not parse; line and column are 1-based
    Parse {
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },
    /// An error escaped the script
    Runtime { code: String, message: String },
    /// The session thread panicked
    Panicked,
}

impl fmt::Display for SessionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionFailure::Parse {
                line: Some(line),
                column: Some(column),
                ..
            } => write!(f, "parse error at {}:{}", line, column),
            SessionFailure::Parse { message, .. } => write!(f, "parse error: {}", message),
            SessionFailure::Runtime { code, message } => write!(f, "{}: {}", code, message),
            SessionFailure::Panicked => write!(f, "session thread panicked"),
        }
    }
}

/// Point-in-time view of a session, safe to hand to a renderer or log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Short SHA-256 digest of the submitted source
    pub source_digest: String,
}
