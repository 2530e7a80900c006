//! Render-loop facade over running sessions
//!
//! The supervisor owns the message queue and input broker for its whole
//! lifetime, starts sessions on their own threads, and answers the three
//! questions a frame needs: what to draw, whether to freeze the avatar,
//! and what prompt to show.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::input::InputBroker;
use super::messages::{Message, MessageQueue};
use super::session::{ExecutionSession, InterruptToken, StatusCell};
use crate::config::RuntimeConfig;
use crate::types::{SessionId, SessionSnapshot, SessionStatus};

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("supervisor has been shut down")]
    ShutDown,

    #[error("failed to spawn session thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// What one frame needs from the supervisor
#[derive(Debug, Clone, Default)]
pub struct PollResult {
    /// Unexpired messages, oldest first
    pub messages: Vec<Message>,
    /// True while any session is blocked in `input`
    pub waiting_for_input: bool,
    /// Prompt the next answer will be delivered to
    pub prompt: Option<String>,
}

/// Registry entry for a started session
struct SessionHandle {
    /// Start order, for stable listing
    ordinal: u64,
    status: Arc<StatusCell>,
    token: Arc<InterruptToken>,
    source_digest: String,
    thread: Option<JoinHandle<()>>,
}

impl SessionHandle {
    fn join(&mut self, id: SessionId) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!(session = %id, "session thread ended with a panic");
            }
        }
    }
}

pub struct ExecutionSupervisor {
    config: RuntimeConfig,
    queue: Arc<MessageQueue>,
    broker: Arc<InputBroker>,
    sessions: HashMap<SessionId, SessionHandle>,
    active: Option<SessionId>,
    next_ordinal: u64,
    shut_down: bool,
}

impl ExecutionSupervisor {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            queue: Arc::new(MessageQueue::new()),
            broker: Arc::new(InputBroker::new()),
            sessions: HashMap::new(),
            active: None,
            next_ordinal: 0,
            shut_down: false,
        }
    }

    /// Run `code` in a new session on its own thread
    ///
    /// A session that is still running keeps running, detached, and keeps
    /// printing into the same queue.
    pub fn start(&mut self, code: impl Into<String>) -> Result<SessionId, SupervisorError> {
        if self.shut_down {
            return Err(SupervisorError::ShutDown);
        }

        self.reap_finished();

        if let Some(previous) = self.active {
            if self.session_status(previous) == Some(SessionStatus::Running) {
                info!(session = %previous, "detaching still-running session");
            }
        }

        let token = Arc::new(InterruptToken::new());
        let session = ExecutionSession::new(
            code.into(),
            Arc::clone(&self.queue),
            Arc::clone(&self.broker),
            Arc::clone(&token),
        );
        let id = session.id();
        let status = session.status_cell();
        let source_digest = session.source_digest().to_string();

        let thread = session.spawn(&self.config)?;

        debug!(session = %id, digest = %source_digest, "session spawned");
        self.sessions.insert(
            id,
            SessionHandle {
                ordinal: self.next_ordinal,
                status,
                token,
                source_digest,
                thread: Some(thread),
            },
        );
        self.next_ordinal += 1;
        self.active = Some(id);

        Ok(id)
    }

    /// Drain the queue for this frame. Never blocks on input.
    pub fn poll(&self, now: Instant) -> PollResult {
        PollResult {
            messages: self.queue.drain(now, self.config.message_timeout()),
            waiting_for_input: self.broker.is_waiting(),
            prompt: self.broker.current_prompt(),
        }
    }

    /// Deliver an answer to the oldest pending prompt
    ///
    /// Returns `false`, with no state change, when nothing is waiting.
    pub fn submit_answer(&self, text: impl Into<String>) -> bool {
        let delivered = self.broker.answer(text);
        if !delivered {
            debug!("answer submitted with no pending input request");
        }
        delivered
    }

    pub fn is_waiting_for_input(&self) -> bool {
        self.broker.is_waiting()
    }

    pub fn session_status(&self, id: SessionId) -> Option<SessionStatus> {
        self.sessions.get(&id).map(|handle| handle.status.status())
    }

    /// Running sessions plus the most recent finished ones, in start order
    pub fn sessions(&self) -> Vec<SessionSnapshot> {
        let mut handles: Vec<_> = self.sessions.iter().collect();
        handles.sort_by_key(|(_, handle)| handle.ordinal);
        handles
            .into_iter()
            .map(|(id, handle)| handle.status.snapshot(*id, &handle.source_digest))
            .collect()
    }

    /// The most recently started session
    pub fn active_session(&self) -> Option<SessionId> {
        self.active
    }

    pub fn has_running_sessions(&self) -> bool {
        self.sessions
            .values()
            .any(|handle| !handle.status.status().is_terminal())
    }

    /// True once every session is terminal and the last poll left nothing on screen
    pub fn is_idle(&self) -> bool {
        !self.has_running_sessions() && self.queue.is_empty()
    }

    /// Interrupt every session, wake blocked prompts, and wait for the threads
    ///
    /// Sessions stop at their next statement boundary. Later `start` calls fail.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        for handle in self.sessions.values() {
            handle.token.interrupt();
        }
        let woken = self.broker.close_all();

        for (id, handle) in self.sessions.iter_mut() {
            handle.join(*id);
        }
        info!(sessions = self.sessions.len(), woken, "supervisor shut down");
    }

    /// Join threads whose session has already finished, then forget the
    /// oldest finished sessions beyond `session_history`
    fn reap_finished(&mut self) {
        for (id, handle) in self.sessions.iter_mut() {
            let finished = handle
                .thread
                .as_ref()
                .map_or(false, |thread| thread.is_finished());
            if finished {
                handle.join(*id);
            }
        }

        let mut joined: Vec<(u64, SessionId)> = self
            .sessions
            .iter()
            .filter(|(id, handle)| handle.thread.is_none() && Some(**id) != self.active)
            .map(|(id, handle)| (handle.ordinal, *id))
            .collect();
        if joined.len() <= self.config.session_history {
            return;
        }

        joined.sort_unstable();
        let excess = joined.len() - self.config.session_history;
        for (_, id) in joined.into_iter().take(excess) {
            self.sessions.remove(&id);
        }
        debug!(forgotten = excess, "pruned finished sessions");
    }
}

impl Drop for ExecutionSupervisor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
