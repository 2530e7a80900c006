pub mod cli;
pub mod config;
pub mod executor;
pub mod parser;
pub mod runtime;
pub mod types;

// Re-export main types
pub use types::*;

pub use runtime::{ExecutionSupervisor, PollResult};
