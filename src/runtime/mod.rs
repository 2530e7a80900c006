//! Concurrent script execution with a frame-polled output overlay
//!
//! ```text
//! render loop ──start(code)──▶ ExecutionSupervisor ──spawn──▶ session thread
//!      ▲                          │        │                      │
//!      │ poll(now)                │        │          print ──────┤──▶ MessageQueue
//!      └──────────────────────────┘        │          input ──────┴──▶ InputBroker (blocks)
//!        submit_answer(text) ──────────────┘
//! ```

pub mod input;
pub mod messages;
pub mod session;
pub mod supervisor;

#[cfg(test)]
mod tests;

pub use input::InputBroker;
pub use messages::{Message, MessageQueue};
pub use session::InterruptToken;
pub use supervisor::{ExecutionSupervisor, PollResult, SupervisorError};
