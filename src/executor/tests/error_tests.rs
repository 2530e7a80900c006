//! Tests for thrown errors and try/catch

use super::helpers::{assert_thrown_code, run_script, run_with_host, RecordingHost};
use crate::executor::{errors, Control, Val};

#[test]
fn test_catch_runtime_error_exposes_code_and_message() {
    let (control, _) = run_script(
        r#"
        try {
            let x = 1 / 0
        } catch (e) {
            return [e.code, e.message]
        }
    "#,
    );
    assert_eq!(
        control,
        Control::Return(Val::List(vec![
            Val::Str(errors::DIVISION_BY_ZERO.into()),
            Val::Str("Division by zero".into()),
        ]))
    );
}

#[test]
fn test_throw_any_value() {
    let (control, _) = run_script(
        r#"
        try {
            throw { reason: "locked door" }
        } catch (e) {
            return e.reason
        }
    "#,
    );
    assert_eq!(control, Control::Return(Val::Str("locked door".into())));
}

#[test]
fn test_uncaught_throw_ends_run() {
    let (control, host) = run_script(
        r#"
        print("before")
        throw "nope"
        print("after")
    "#,
    );
    assert_eq!(control, Control::Throw(Val::Str("nope".into())));
    assert_eq!(host.output(), vec!["before"]);
}

#[test]
fn test_rethrow_from_catch() {
    let (control, _) = run_script(
        r#"
        try {
            missing()
        } catch (e) {
            throw e
        }
    "#,
    );
    assert_thrown_code(&control, errors::UNDEFINED_VARIABLE);
}

#[test]
fn test_catch_variable_is_scoped() {
    let (control, _) = run_script(
        r#"
        try { throw 1 } catch (err) { print(err) }
        return err
    "#,
    );
    assert_thrown_code(&control, errors::UNDEFINED_VARIABLE);
}

#[test]
fn test_break_passes_through_try() {
    let (_, host) = run_script(
        r#"
        for (n of [1, 2, 3]) {
            try {
                if (n == 2) break
                print(n)
            } catch (e) {
                print("caught")
            }
        }
    "#,
    );
    assert_eq!(host.output(), vec!["1"]);
}

#[test]
fn test_calling_a_non_function() {
    let (control, _) = run_script("let x = 3\nx()");
    assert_thrown_code(&control, errors::NOT_CALLABLE);
}

#[test]
fn test_negating_a_string() {
    let (control, _) = run_script(r#"return -"a""#);
    assert_thrown_code(&control, errors::TYPE_ERROR);
}

#[test]
fn test_interrupt_stops_between_statements() {
    let host = RecordingHost::default().interrupt_after(2);
    let (control, host) = run_with_host(
        r#"
        let i = 0
        while (true) {
            i = i + 1
            print(i)
        }
    "#,
        host,
    );
    assert_thrown_code(&control, errors::INTERRUPTED);
    assert_eq!(host.output(), vec!["1", "2"]);
}

#[test]
fn test_interrupt_cannot_be_swallowed_by_catch() {
    // The catch body is itself a statement, so the interrupt is raised again there
    let host = RecordingHost::default().interrupt_after(1);
    let (control, host) = run_with_host(
        r#"
        try {
            print("once")
            print("twice")
        } catch (e) {
            print("recovered")
        }
    "#,
        host,
    );
    assert_thrown_code(&control, errors::INTERRUPTED);
    assert_eq!(host.output(), vec!["once"]);
}
