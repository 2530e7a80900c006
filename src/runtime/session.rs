//! One script run on its own thread
//!
//! A session owns the source it was given, a host that routes the script's
//! effects into the supervisor's shared queue and broker, and a status cell
//! the supervisor reads. The status moves out of `Running` exactly once.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::{Condvar, Mutex};
use sha2::{Digest, Sha256};
use tracing::{error, info, info_span, warn};

use super::input::InputBroker;
use super::messages::MessageQueue;
use crate::config::RuntimeConfig;
use crate::executor::{errors, run_until_done, Control, HostError, ScriptHost, Val};
use crate::parser::parse_script;
use crate::types::{SessionFailure, SessionId, SessionSnapshot, SessionStatus};

/* ===================== Interrupt Token ===================== */

/// Stop request shared by a session thread and its supervisor
///
/// Scripts check it between statements; `sleep` waits on it so an interrupt
/// cuts a sleep short.
#[derive(Debug, Default)]
pub struct InterruptToken {
    interrupted: Mutex<bool>,
    wake: Condvar,
}

impl InterruptToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interrupt(&self) {
        let mut interrupted = self.interrupted.lock();
        *interrupted = true;
        self.wake.notify_all();
    }

    pub fn is_interrupted(&self) -> bool {
        *self.interrupted.lock()
    }

    /// Wait for `duration`, or until interrupted
    pub fn sleep(&self, duration: Duration) -> Result<(), HostError> {
        let deadline = Instant::now().checked_add(duration);
        let mut interrupted = self.interrupted.lock();

        while !*interrupted {
            match deadline {
                Some(deadline) => {
                    if self.wake.wait_until(&mut interrupted, deadline).timed_out() {
                        return Ok(());
                    }
                }
                None => self.wake.wait(&mut interrupted),
            }
        }

        Err(HostError::Interrupted)
    }
}

/* ===================== Status Cell ===================== */

#[derive(Debug, Clone)]
struct StatusRecord {
    status: SessionStatus,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

/// Shared, write-once-to-terminal status of a session
#[derive(Debug)]
pub(crate) struct StatusCell {
    record: Mutex<StatusRecord>,
}

impl StatusCell {
    pub(crate) fn new() -> Self {
        Self {
            record: Mutex::new(StatusRecord {
                status: SessionStatus::Running,
                started_at: Utc::now(),
                finished_at: None,
            }),
        }
    }

    pub(crate) fn status(&self) -> SessionStatus {
        self.record.lock().status.clone()
    }

    /// Move to a terminal status. Returns `false` if already terminal.
    pub(crate) fn finish(&self, status: SessionStatus) -> bool {
        let mut record = self.record.lock();
        if record.status.is_terminal() || !status.is_terminal() {
            return false;
        }
        record.status = status;
        record.finished_at = Some(Utc::now());
        true
    }

    pub(crate) fn snapshot(&self, id: SessionId, source_digest: &str) -> SessionSnapshot {
        let record = self.record.lock();
        SessionSnapshot {
            id,
            status: record.status.clone(),
            started_at: record.started_at,
            finished_at: record.finished_at,
            source_digest: source_digest.to_string(),
        }
    }
}

/* ===================== Session Host ===================== */

/// Host handed to the interpreter of one session
pub(crate) struct SessionHost {
    id: SessionId,
    queue: Arc<MessageQueue>,
    broker: Arc<InputBroker>,
    token: Arc<InterruptToken>,
}

impl ScriptHost for SessionHost {
    fn emit(&self, text: &str) {
        self.queue.append(self.id, text);
    }

    fn request_input(&self, prompt: &str) -> Result<String, HostError> {
        if self.token.is_interrupted() {
            return Err(HostError::Interrupted);
        }
        self.broker.request_input(self.id, prompt)
    }

    fn sleep(&self, duration: Duration) -> Result<(), HostError> {
        self.token.sleep(duration)
    }

    fn interrupted(&self) -> bool {
        self.token.is_interrupted()
    }
}

/* ===================== Execution Session ===================== */

/// Records a panic as `Failed(Panicked)` and withdraws the session's prompt
pub(crate) struct PanicGuard {
    id: SessionId,
    status: Arc<StatusCell>,
    broker: Arc<InputBroker>,
}

impl PanicGuard {
    pub(crate) fn new(id: SessionId, status: Arc<StatusCell>, broker: Arc<InputBroker>) -> Self {
        Self { id, status, broker }
    }
}

impl Drop for PanicGuard {
    fn drop(&mut self) {
        if !thread::panicking() {
            return;
        }
        self.broker.withdraw(self.id);
        if self.status.finish(SessionStatus::failed(SessionFailure::Panicked)) {
            error!(session = %self.id, "session thread panicked");
        }
    }
}

pub(crate) struct ExecutionSession {
    id: SessionId,
    source: String,
    source_digest: String,
    status: Arc<StatusCell>,
    host: SessionHost,
}

impl ExecutionSession {
    pub(crate) fn new(
        source: String,
        queue: Arc<MessageQueue>,
        broker: Arc<InputBroker>,
        token: Arc<InterruptToken>,
    ) -> Self {
        let id = SessionId::new();
        Self {
            id,
            source_digest: source_digest(&source),
            source,
            status: Arc::new(StatusCell::new()),
            host: SessionHost {
                id,
                queue,
                broker,
                token,
            },
        }
    }

    pub(crate) fn id(&self) -> SessionId {
        self.id
    }

    pub(crate) fn source_digest(&self) -> &str {
        &self.source_digest
    }

    pub(crate) fn status_cell(&self) -> Arc<StatusCell> {
        Arc::clone(&self.status)
    }

    /// Start the session on a dedicated, named thread
    pub(crate) fn spawn(self, config: &RuntimeConfig) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(format!("{}-{}", config.thread_name_prefix, self.id.short()))
            .stack_size(config.stack_size())
            .spawn(move || self.run())
    }

    /// Run to a terminal status on the current thread
    pub(crate) fn run(self) {
        let span = info_span!("session", id = %self.id.short(), digest = %self.source_digest);
        let _enter = span.enter();
        let _guard = PanicGuard::new(
            self.id,
            Arc::clone(&self.status),
            Arc::clone(&self.host.broker),
        );

        info!("session started");
        let outcome = self.execute();

        match &outcome {
            SessionStatus::Failed { failure } => warn!(error = %failure, "session failed"),
            _ => info!("session completed"),
        }
        self.status.finish(outcome);
    }

    fn execute(&self) -> SessionStatus {
        let script = match parse_script(&self.source) {
            Ok(script) => script,
            Err(err) => {
                let span = err.span();
                return SessionStatus::failed(SessionFailure::Parse {
                    message: err.message().to_string(),
                    line: span.map(|s| s.start_line + 1),
                    column: span.map(|s| s.start_col + 1),
                });
            }
        };

        match run_until_done(&script.body, &self.host) {
            Control::Throw(Val::Error(info)) => SessionStatus::failed(SessionFailure::Runtime {
                code: info.code,
                message: info.message,
            }),
            Control::Throw(other) => SessionStatus::failed(SessionFailure::Runtime {
                code: errors::UNCAUGHT.to_string(),
                message: other.to_string(),
            }),
            _ => SessionStatus::Completed,
        }
    }
}

/// First 12 hex digits of the source's SHA-256
pub(crate) fn source_digest(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..12].to_string()
}
