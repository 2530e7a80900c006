//! Tests for builtin functions

use std::time::Duration;

use super::helpers::{assert_thrown_code, run_script, run_with_host, RecordingHost};
use crate::executor::{errors, Control, Val};

/* ===================== print / input / sleep ===================== */

#[test]
fn test_print_joins_arguments_with_spaces() {
    let (control, host) = run_script(r#"print("hp:", 3, true); print()"#);
    assert_eq!(control, Control::None);
    assert_eq!(host.output(), vec!["hp: 3 true", ""]);
}

#[test]
fn test_input_returns_answer_and_records_prompt() {
    let host = RecordingHost::with_answers(&["Ada"]);
    let (control, host) = run_with_host(
        r#"
        let name = input("What's your name?")
        print("Hello, " + name)
        return name
    "#,
        host,
    );
    assert_eq!(control, Control::Return(Val::Str("Ada".into())));
    assert_eq!(*host.prompts.borrow(), vec!["What's your name?"]);
    assert_eq!(host.output(), vec!["Hello, Ada"]);
}

#[test]
fn test_input_without_prompt() {
    let host = RecordingHost::with_answers(&["yes"]);
    let (control, host) = run_with_host("return input()", host);
    assert_eq!(control, Control::Return(Val::Str("yes".into())));
    assert_eq!(*host.prompts.borrow(), vec![""]);
}

#[test]
fn test_input_closed_is_catchable() {
    let (control, _) = run_script(
        r#"
        try {
            input("anyone?")
        } catch (e) {
            return e.code
        }
    "#,
    );
    assert_eq!(
        control,
        Control::Return(Val::Str(errors::INPUT_UNAVAILABLE.into()))
    );
}

#[test]
fn test_input_rejects_extra_arguments() {
    let (control, _) = run_script(r#"input("a", "b")"#);
    assert_thrown_code(&control, errors::WRONG_ARG_COUNT);
}

#[test]
fn test_sleep_goes_through_host() {
    let (control, host) = run_script("sleep(1); sleep(0.25)");
    assert_eq!(control, Control::None);
    assert_eq!(
        *host.sleeps.borrow(),
        vec![Duration::from_secs(1), Duration::from_millis(250)]
    );
}

#[test]
fn test_sleep_rejects_bad_durations() {
    let (control, _) = run_script("sleep(-1)");
    assert_thrown_code(&control, errors::WRONG_ARG_TYPE);

    let (control, _) = run_script(r#"sleep("1")"#);
    assert_thrown_code(&control, errors::WRONG_ARG_TYPE);

    let (control, _) = run_script("sleep()");
    assert_thrown_code(&control, errors::WRONG_ARG_COUNT);
}

/* ===================== Conversions ===================== */

#[test]
fn test_str_num_len() {
    let (control, _) = run_script(
        r#"return [str(42), str([1]), num(" 7.5 "), num(true), len("héllo"), len([1, 2]), len({a: 1})]"#,
    );
    assert_eq!(
        control,
        Control::Return(Val::List(vec![
            Val::Str("42".into()),
            Val::Str("[1]".into()),
            Val::Num(7.5),
            Val::Num(1.0),
            Val::Num(5.0),
            Val::Num(2.0),
            Val::Num(1.0),
        ]))
    );
}

#[test]
fn test_num_rejects_garbage() {
    let (control, _) = run_script(r#"num("seven")"#);
    assert_thrown_code(&control, errors::INVALID_NUMBER);

    let (control, _) = run_script("num(null)");
    assert_thrown_code(&control, errors::WRONG_ARG_TYPE);
}

/* ===================== Math ===================== */

#[test]
fn test_math_functions() {
    let (control, _) = run_script(
        r#"return [Math.floor(2.7), Math.ceil(2.1), Math.abs(-4), Math.round(2.5), Math.min(3, 1, 2), Math.max(3, 9)]"#,
    );
    assert_eq!(
        control,
        Control::Return(Val::List(vec![
            Val::Num(2.0),
            Val::Num(3.0),
            Val::Num(4.0),
            Val::Num(3.0),
            Val::Num(1.0),
            Val::Num(9.0),
        ]))
    );
}

#[test]
fn test_math_argument_errors() {
    let (control, _) = run_script("Math.max()");
    assert_thrown_code(&control, errors::WRONG_ARG_COUNT);

    let (control, _) = run_script(r#"Math.floor("2")"#);
    assert_thrown_code(&control, errors::WRONG_ARG_TYPE);
}

#[test]
fn test_builtins_are_values() {
    let (_, host) = run_script(
        r#"
        let say = print
        let ops = { top: Math.max }
        say(ops.top(1, 4))
    "#,
    );
    assert_eq!(host.output(), vec!["4"]);
}
