//! Host capability handed to a running script
//!
//! The interpreter never touches process-wide state. Everything a script can
//! observably do to the outside world goes through one `ScriptHost`.

use std::time::Duration;

use thiserror::Error;

/// Failures a host can report back to the script
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The same session already has a prompt open
    #[error("an input request is already pending for this session")]
    InputAlreadyPending,

    /// The prompt was withdrawn before an answer arrived
    #[error("input request was closed before it was answered")]
    InputClosed,

    /// The session was asked to stop
    #[error("session interrupted")]
    Interrupted,
}

pub trait ScriptHost {
    /// Redirected `print`. Must not block.
    fn emit(&self, text: &str);

    /// Redirected `input`. Blocks the calling thread until answered.
    fn request_input(&self, prompt: &str) -> Result<String, HostError>;

    /// Redirected `sleep`.
    fn sleep(&self, duration: Duration) -> Result<(), HostError> {
        std::thread::sleep(duration);
        Ok(())
    }

    /// Checked by the interpreter between statements.
    fn interrupted(&self) -> bool {
        false
    }
}
