//! Tests for branching, loops, and early exits

use super::helpers::{assert_thrown_code, run_script};
use crate::executor::{errors, Control, Val};

#[test]
fn test_if_else_chain() {
    let (_, host) = run_script(
        r#"
        for (n of [1, 5, 10]) {
            if (n < 3) print("low")
            else if (n < 8) print("mid")
            else print("high")
        }
    "#,
    );
    assert_eq!(host.output(), vec!["low", "mid", "high"]);
}

#[test]
fn test_while_loop_counts() {
    let (control, _) = run_script(
        r#"
        let i = 0
        let total = 0
        while (i < 5) {
            i = i + 1
            total = total + i
        }
        return total
    "#,
    );
    assert_eq!(control, Control::Return(Val::Num(15.0)));
}

#[test]
fn test_break_and_continue() {
    let (_, host) = run_script(
        r#"
        let i = 0
        while (true) {
            i = i + 1
            if (i % 2 == 0) continue
            if (i > 7) break
            print(i)
        }
    "#,
    );
    assert_eq!(host.output(), vec!["1", "3", "5", "7"]);
}

#[test]
fn test_for_in_visits_keys_in_order() {
    let (_, host) = run_script(
        r#"
        let inventory = { rope: 1, apple: 3 }
        for (let item in inventory) print(item, inventory[item])
    "#,
    );
    assert_eq!(host.output(), vec!["apple 3", "rope 1"]);
}

#[test]
fn test_for_in_over_list_gives_indices() {
    let (control, _) = run_script(
        r#"
        let seen = []
        for (i in ["a", "b"]) seen = seen + [i]
        return seen
    "#,
    );
    assert_eq!(
        control,
        Control::Return(Val::List(vec![Val::Num(0.0), Val::Num(1.0)]))
    );
}

#[test]
fn test_for_of_string_visits_characters() {
    let (_, host) = run_script(r#"for (c of "hey") print(c)"#);
    assert_eq!(host.output(), vec!["h", "e", "y"]);
}

#[test]
fn test_for_over_number_is_type_error() {
    let (control, _) = run_script("for (x of 3) print(x)");
    assert_thrown_code(&control, errors::TYPE_ERROR);
}

#[test]
fn test_return_exits_from_nested_loops() {
    let (control, host) = run_script(
        r#"
        for (a of [1, 2]) {
            for (b of [10, 20]) {
                if (a * b == 20) return [a, b]
                print(a * b)
            }
        }
        print("unreachable")
    "#,
    );
    assert_eq!(
        control,
        Control::Return(Val::List(vec![Val::Num(1.0), Val::Num(20.0)]))
    );
    assert_eq!(host.output(), vec!["10"]);
}

#[test]
fn test_break_only_leaves_inner_loop() {
    let (_, host) = run_script(
        r#"
        for (a of [1, 2]) {
            for (b of [1, 2, 3]) {
                if (b == 2) break
                print(a, b)
            }
        }
    "#,
    );
    assert_eq!(host.output(), vec!["1 1", "2 1"]);
}

#[test]
fn test_break_outside_loop_is_error() {
    let (control, _) = run_script("print(1)\nbreak");
    assert_thrown_code(&control, errors::SYNTAX_ERROR);
}

#[test]
fn test_loop_variable_is_scoped_to_body() {
    let (control, _) = run_script("for (x of [1]) {}\nreturn x");
    assert_thrown_code(&control, errors::UNDEFINED_VARIABLE);
}

#[test]
fn test_finishing_without_return_is_none() {
    let (control, host) = run_script(r#"print("morning"); sleep(1); print("goodnight")"#);
    assert_eq!(control, Control::None);
    assert_eq!(host.output(), vec!["morning", "goodnight"]);
}
