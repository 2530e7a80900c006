//! Interpreter state
//!
//! The interpreter holds everything one run of a script needs:
//! - host: the capability the script's builtins talk to
//! - scopes: a stack of variable bindings, globals at the bottom
//!
//! Statement handlers live in `statements.rs`, expression evaluation in
//! `expressions.rs`; both extend `Interpreter` with further `impl` blocks.

use std::collections::HashMap;

use super::errors::{self, ErrorInfo};
use super::host::ScriptHost;
use super::stdlib::inject_stdlib;
use super::types::{Control, Stmt, Val};

pub struct Interpreter<'h> {
    pub(crate) host: &'h dyn ScriptHost,
    scopes: Vec<HashMap<String, Val>>,
}

impl<'h> Interpreter<'h> {
    /// Create an interpreter with a fresh global scope and the stdlib injected
    pub fn new(host: &'h dyn ScriptHost) -> Self {
        let mut globals = HashMap::new();
        inject_stdlib(&mut globals);

        Self {
            host,
            scopes: vec![globals],
        }
    }

    /// Run a program to completion
    ///
    /// Returns the final control state: `Control::None` or `Control::Return`
    /// for a normal finish, `Control::Throw` for an uncaught error.
    pub fn run(&mut self, program: &Stmt) -> Control {
        match self.exec_stmt(program) {
            Control::Break | Control::Continue => Control::Throw(Val::Error(ErrorInfo::new(
                errors::SYNTAX_ERROR,
                "'break' or 'continue' used outside of a loop",
            ))),
            other => other,
        }
    }

    /* ===================== Scope Management ===================== */

    pub(crate) fn lookup(&self, name: &str) -> Option<&Val> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub(crate) fn lookup_mut(&mut self, name: &str) -> Option<&mut Val> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
    }

    /// Bind a name in the innermost scope
    pub(crate) fn declare(&mut self, name: &str, value: Val) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), value);
        }
    }

    /// Rebind the nearest existing name; unknown names become globals
    pub(crate) fn assign(&mut self, name: &str, value: Val) {
        if let Some(slot) = self.lookup_mut(name) {
            *slot = value;
        } else if let Some(globals) = self.scopes.first_mut() {
            globals.insert(name.to_string(), value);
        }
    }

    /// Run `f` inside a new innermost scope
    pub(crate) fn with_scope<F>(&mut self, f: F) -> Control
    where
        F: FnOnce(&mut Self) -> Control,
    {
        self.scopes.push(HashMap::new());
        let control = f(self);
        self.scopes.pop();
        control
    }
}
