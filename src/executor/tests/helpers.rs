//! Test helpers for executor tests
//!
//! Parses scripts and runs them against a recording host, so tests can
//! inspect what a script printed, asked, and slept.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::Duration;

use crate::executor::{run_until_done, Control, HostError, ScriptHost, Stmt};
use crate::parser::Script;

/// Host double that records every effect a script performs
#[derive(Default)]
pub struct RecordingHost {
    pub emitted: RefCell<Vec<String>>,
    pub prompts: RefCell<Vec<String>>,
    pub sleeps: RefCell<Vec<Duration>>,
    answers: RefCell<VecDeque<String>>,
    /// Report an interrupt once this many lines have been emitted
    interrupt_after: Cell<Option<usize>>,
}

impl RecordingHost {
    pub fn with_answers(answers: &[&str]) -> Self {
        let host = Self::default();
        host.answers
            .borrow_mut()
            .extend(answers.iter().map(|a| a.to_string()));
        host
    }

    pub fn interrupt_after(self, lines: usize) -> Self {
        self.interrupt_after.set(Some(lines));
        self
    }

    pub fn output(&self) -> Vec<String> {
        self.emitted.borrow().clone()
    }
}

impl ScriptHost for RecordingHost {
    fn emit(&self, text: &str) {
        self.emitted.borrow_mut().push(text.to_string());
    }

    fn request_input(&self, prompt: &str) -> Result<String, HostError> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or(HostError::InputClosed)
    }

    fn sleep(&self, duration: Duration) -> Result<(), HostError> {
        self.sleeps.borrow_mut().push(duration);
        Ok(())
    }

    fn interrupted(&self) -> bool {
        match self.interrupt_after.get() {
            Some(lines) => self.emitted.borrow().len() >= lines,
            None => false,
        }
    }
}

/// Parse script source and round-trip it through JSON
///
/// The round trip checks the AST stays serializable, which `quill check --ast` relies on.
pub fn parse_program(source: &str) -> Stmt {
    let script = crate::parser::parse_script(source).expect("Parse script failed");
    let json = serde_json::to_string(&script).expect("Script serialization failed");
    let script: Script = serde_json::from_str(&json).expect("Script deserialization failed");
    script.body
}

/// Run a script against a fresh recording host
pub fn run_script(source: &str) -> (Control, RecordingHost) {
    run_with_host(source, RecordingHost::default())
}

/// Run a script against the given host
pub fn run_with_host(source: &str, host: RecordingHost) -> (Control, RecordingHost) {
    let program = parse_program(source);
    let control = run_until_done(&program, &host);
    (control, host)
}

/// Assert a run ended by throwing an error with the given code
pub fn assert_thrown_code(control: &Control, code: &str) {
    match control {
        Control::Throw(crate::executor::Val::Error(info)) => assert_eq!(
            info.code, code,
            "expected error code {}, got {:?}",
            code, info
        ),
        other => panic!("Expected thrown {} error, got {:?}", code, other),
    }
}
