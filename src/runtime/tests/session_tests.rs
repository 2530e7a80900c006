//! Tests for individual sessions, their status cell and interrupt token

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::{wait_until, WAIT};
use crate::config::RuntimeConfig;
use crate::executor::{errors, HostError};
use crate::runtime::session::{source_digest, ExecutionSession, PanicGuard, StatusCell};
use crate::runtime::{InputBroker, InterruptToken, MessageQueue};
use crate::types::{SessionFailure, SessionId, SessionStatus};

struct Fixture {
    queue: Arc<MessageQueue>,
    broker: Arc<InputBroker>,
    token: Arc<InterruptToken>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            queue: Arc::new(MessageQueue::new()),
            broker: Arc::new(InputBroker::new()),
            token: Arc::new(InterruptToken::new()),
        }
    }

    fn session(&self, source: &str) -> ExecutionSession {
        ExecutionSession::new(
            source.to_string(),
            Arc::clone(&self.queue),
            Arc::clone(&self.broker),
            Arc::clone(&self.token),
        )
    }

    fn texts(&self) -> Vec<String> {
        self.queue
            .drain(Instant::now(), Duration::from_secs(60))
            .into_iter()
            .map(|m| m.text)
            .collect()
    }
}

fn test_config() -> RuntimeConfig {
    RuntimeConfig {
        thread_name_prefix: "quill-test".to_string(),
        ..Default::default()
    }
}

/* ===================== Status Cell ===================== */

#[test]
fn test_status_moves_to_terminal_exactly_once() {
    let cell = StatusCell::new();
    assert_eq!(cell.status(), SessionStatus::Running);
    assert!(!cell.finish(SessionStatus::Running));

    assert!(cell.finish(SessionStatus::Completed));
    assert!(!cell.finish(SessionStatus::failed(SessionFailure::Panicked)));
    assert_eq!(cell.status(), SessionStatus::Completed);

    let snapshot = cell.snapshot(SessionId::new(), "abc");
    assert!(snapshot.finished_at.is_some());
    assert!(snapshot.finished_at >= Some(snapshot.started_at));
}

/* ===================== Interrupt Token ===================== */

#[test]
fn test_token_sleep_runs_full_duration() {
    let token = InterruptToken::new();
    let started = Instant::now();
    assert_eq!(token.sleep(Duration::from_millis(20)), Ok(()));
    assert!(started.elapsed() >= Duration::from_millis(20));
}

#[test]
fn test_interrupt_cuts_sleep_short() {
    let token = Arc::new(InterruptToken::new());
    let sleeper = {
        let token = Arc::clone(&token);
        thread::spawn(move || token.sleep(Duration::from_secs(60)))
    };

    thread::sleep(Duration::from_millis(20));
    token.interrupt();
    assert_eq!(sleeper.join().unwrap(), Err(HostError::Interrupted));
    assert!(token.is_interrupted());
}

/* ===================== Execution ===================== */

#[test]
fn test_session_prints_then_completes() {
    let fixture = Fixture::new();
    let session = fixture.session(r#"print("a"); print("b")"#);
    let status = session.status_cell();

    session.run();

    assert_eq!(status.status(), SessionStatus::Completed);
    assert_eq!(fixture.texts(), vec!["a", "b"]);
}

#[test]
fn test_session_parse_error_fails_silently() {
    let fixture = Fixture::new();
    let session = fixture.session("print(\"unclosed)");
    let status = session.status_cell();

    session.run();

    match status.status() {
        SessionStatus::Failed {
            failure: SessionFailure::Parse { line, .. },
        } => assert_eq!(line, Some(1)),
        other => panic!("Expected parse failure, got {:?}", other),
    }
    assert!(fixture.texts().is_empty());
}

#[test]
fn test_session_runtime_error_keeps_earlier_output() {
    let fixture = Fixture::new();
    let session = fixture.session("print(\"one\")\nlet x = 1 / 0\nprint(\"two\")");
    let status = session.status_cell();

    session.run();

    assert_eq!(
        status.status(),
        SessionStatus::failed(SessionFailure::Runtime {
            code: errors::DIVISION_BY_ZERO.to_string(),
            message: "Division by zero".to_string(),
        })
    );
    assert_eq!(fixture.texts(), vec!["one"]);
}

#[test]
fn test_session_uncaught_plain_value() {
    let fixture = Fixture::new();
    let session = fixture.session(r#"throw "boom""#);
    let status = session.status_cell();

    session.run();

    assert_eq!(
        status.status(),
        SessionStatus::failed(SessionFailure::Runtime {
            code: errors::UNCAUGHT.to_string(),
            message: "boom".to_string(),
        })
    );
}

#[test]
fn test_session_sleep_is_interruptible() {
    let fixture = Fixture::new();
    let session = fixture.session("print(\"zz\")\nsleep(60)\nprint(\"awake\")");
    let status = session.status_cell();
    let handle = session.spawn(&test_config()).unwrap();

    assert!(wait_until(WAIT, || fixture.queue.len() == 1));
    fixture.token.interrupt();
    handle.join().unwrap();

    assert_eq!(
        status.status(),
        SessionStatus::failed(SessionFailure::Runtime {
            code: errors::INTERRUPTED.to_string(),
            message: HostError::Interrupted.to_string(),
        })
    );
    assert_eq!(fixture.texts(), vec!["zz"]);
}

#[test]
fn test_session_thread_is_named_after_prefix() {
    let fixture = Fixture::new();
    let session = fixture.session("print(1)");
    let short = session.id().short();
    let handle = session.spawn(&test_config()).unwrap();

    assert_eq!(
        handle.thread().name(),
        Some(format!("quill-test-{}", short).as_str())
    );
    handle.join().unwrap();
}

#[test]
fn test_panic_guard_records_failure_and_withdraws_prompt() {
    let broker = Arc::new(InputBroker::new());
    let status = Arc::new(StatusCell::new());
    let id = SessionId::new();

    let waiter = {
        let broker = Arc::clone(&broker);
        thread::spawn(move || broker.request_input(id, "stuck?"))
    };
    assert!(wait_until(WAIT, || broker.is_waiting()));

    let panicking = {
        let broker = Arc::clone(&broker);
        let status = Arc::clone(&status);
        thread::spawn(move || {
            let _guard = PanicGuard::new(id, status, broker);
            panic!("interpreter bug");
        })
    };
    assert!(panicking.join().is_err());

    assert_eq!(status.status(), SessionStatus::failed(SessionFailure::Panicked));
    assert!(!broker.is_waiting());
    assert_eq!(waiter.join().unwrap(), Err(HostError::InputClosed));
}

#[test]
fn test_panic_guard_is_inert_on_normal_exit() {
    let status = Arc::new(StatusCell::new());
    {
        let _guard = PanicGuard::new(SessionId::new(), Arc::clone(&status), Arc::new(InputBroker::new()));
    }
    assert_eq!(status.status(), SessionStatus::Running);
}

#[test]
fn test_source_digest_is_stable_and_short() {
    let digest = source_digest("print(1)");
    assert_eq!(digest.len(), 12);
    assert_eq!(digest, source_digest("print(1)"));
    assert_ne!(digest, source_digest("print(2)"));
}
