//! Blocking input requests
//!
//! A session thread that calls `input` registers an [`InputRequest`] with the
//! shared [`InputBroker`] and parks on the request's condvar. The render
//! thread answers through the broker, oldest request first. No lock is held
//! while a thread is parked except the request's own state lock, which the
//! condvar releases.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::debug;

use crate::executor::HostError;
use crate::types::SessionId;

#[derive(Debug, Default)]
struct RequestState {
    answer: Option<String>,
    closed: bool,
}

/// One pending prompt and its eventual answer
#[derive(Debug)]
pub struct InputRequest {
    session: SessionId,
    prompt: String,
    state: Mutex<RequestState>,
    ready: Condvar,
}

impl InputRequest {
    fn new(session: SessionId, prompt: String) -> Self {
        Self {
            session,
            prompt,
            state: Mutex::new(RequestState::default()),
            ready: Condvar::new(),
        }
    }

    fn fulfill(&self, answer: String) {
        let mut state = self.state.lock();
        state.answer = Some(answer);
        self.ready.notify_all();
    }

    fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.ready.notify_all();
    }

    /// Park until answered or closed
    fn wait(&self) -> Result<String, HostError> {
        let mut state = self.state.lock();
        loop {
            if let Some(answer) = state.answer.take() {
                return Ok(answer);
            }
            if state.closed {
                return Err(HostError::InputClosed);
            }
            self.ready.wait(&mut state);
        }
    }
}

#[derive(Debug, Default)]
struct BrokerState {
    pending: VecDeque<Arc<InputRequest>>,
    closed: bool,
}

/// FIFO of outstanding input requests shared by all sessions of one supervisor
#[derive(Debug, Default)]
pub struct InputBroker {
    state: Mutex<BrokerState>,
}

impl InputBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a prompt and block the calling thread until it is answered
    ///
    /// Fails fast with `InputAlreadyPending` if `session` already has a prompt
    /// open, and with `InputClosed` once the broker has been closed.
    pub fn request_input(&self, session: SessionId, prompt: &str) -> Result<String, HostError> {
        let request = {
            let mut state = self.state.lock();
            if state.closed {
                return Err(HostError::InputClosed);
            }
            if state.pending.iter().any(|r| r.session == session) {
                return Err(HostError::InputAlreadyPending);
            }
            let request = Arc::new(InputRequest::new(session, prompt.to_string()));
            state.pending.push_back(Arc::clone(&request));
            request
        };

        debug!(session = %session, prompt = %prompt, "waiting for input");
        request.wait()
    }

    /// Deliver `text` to the oldest pending request
    ///
    /// Returns `false` and changes nothing when no request is outstanding.
    pub fn answer(&self, text: impl Into<String>) -> bool {
        let request = self.state.lock().pending.pop_front();
        match request {
            Some(request) => {
                debug!(session = %request.session, "input answered");
                request.fulfill(text.into());
                true
            }
            None => false,
        }
    }

    pub fn is_waiting(&self) -> bool {
        !self.state.lock().pending.is_empty()
    }

    /// Prompt of the request the next answer will go to
    pub fn current_prompt(&self) -> Option<String> {
        self.state
            .lock()
            .pending
            .front()
            .map(|r| r.prompt.clone())
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Remove and close the request `session` has open, if any
    pub fn withdraw(&self, session: SessionId) -> bool {
        let request = {
            let mut state = self.state.lock();
            let position = state.pending.iter().position(|r| r.session == session);
            position.and_then(|i| state.pending.remove(i))
        };
        match request {
            Some(request) => {
                request.close();
                true
            }
            None => false,
        }
    }

    /// Close every pending request and refuse new ones. Returns how many were woken.
    pub fn close_all(&self) -> usize {
        let drained: Vec<_> = {
            let mut state = self.state.lock();
            state.closed = true;
            state.pending.drain(..).collect()
        };
        for request in &drained {
            request.close();
        }
        drained.len()
    }
}
