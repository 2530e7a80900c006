//! # Executor - tree-walking interpreter for Quill scripts
//!
//! ## Core Principles
//!
//! 1. **Centralized control flow**: every statement yields a `Control`
//!    (none, break, continue, return, throw) that enclosing statements consume or pass on
//! 2. **Coded errors**: runtime failures are `Val::Error(ErrorInfo)` values scripts can catch
//! 3. **Injected effects**: builtins with side effects call the `ScriptHost`, never globals
//! 4. **Blocking is fine**: the interpreter runs on its own thread, so `input` simply blocks

pub mod errors;
pub mod expressions;
pub mod host;
pub mod interpreter;
pub mod statements;
pub mod stdlib;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used items
pub use errors::ErrorInfo;
pub use expressions::EvalResult;
pub use host::{HostError, ScriptHost};
pub use interpreter::Interpreter;
pub use types::{Control, Expr, Stmt, Val};

/// Run a program against a host until it finishes
///
/// Returns the final control state. See [`Interpreter::run`].
pub fn run_until_done(program: &Stmt, host: &dyn ScriptHost) -> Control {
    Interpreter::new(host).run(program)
}
