//! Time-ordered, auto-expiring buffer of captured output
//!
//! Session threads append; the render loop drains once per frame. Both sides
//! take the same mutex, so an append never interleaves with an eviction.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::types::SessionId;

/// One line of captured output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Monotonic sequence number, assigned under the queue lock
    pub seq: u64,
    pub text: String,
    pub created_at: Instant,
    /// Session that printed the line
    pub session: SessionId,
}

impl Message {
    /// Whether the message is older than `timeout` at `now`
    pub fn is_expired(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.created_at) > timeout
    }
}

#[derive(Debug, Default)]
struct QueueState {
    messages: VecDeque<Message>,
    next_seq: u64,
}

#[derive(Debug, Default)]
pub struct MessageQueue {
    state: Mutex<QueueState>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message stamped at call time. Returns its sequence number.
    pub fn append(&self, session: SessionId, text: impl Into<String>) -> u64 {
        let text = text.into();
        let mut state = self.state.lock();
        let created_at = Instant::now();
        Self::push(&mut state, session, text, created_at)
    }

    /// Evict expired messages and return the survivors, oldest first
    pub fn drain(&self, now: Instant, timeout: Duration) -> Vec<Message> {
        let mut state = self.state.lock();
        state.messages.retain(|m| !m.is_expired(now, timeout));
        state.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().messages.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn append_at(&self, session: SessionId, text: &str, created_at: Instant) -> u64 {
        let mut state = self.state.lock();
        Self::push(&mut state, session, text.to_string(), created_at)
    }

    fn push(state: &mut QueueState, session: SessionId, text: String, created_at: Instant) -> u64 {
        let seq = state.next_seq;
        state.next_seq += 1;
        state.messages.push_back(Message {
            seq,
            text,
            created_at,
            session,
        });
        seq
    }
}
