//! Tests for values, operators, and variable scoping

use maplit::btreemap;

use super::helpers::{assert_thrown_code, run_script};
use crate::executor::{errors, Control, Val};

/* ===================== Operators ===================== */

#[test]
fn test_arithmetic_precedence() {
    let (control, _) = run_script("return 1 + 2 * 3 - 8 / 4");
    assert_eq!(control, Control::Return(Val::Num(5.0)));
}

#[test]
fn test_modulo_and_negation() {
    let (control, _) = run_script("return -(7 % 3)");
    assert_eq!(control, Control::Return(Val::Num(-1.0)));
}

#[test]
fn test_string_concatenation_formats_numbers() {
    let (control, _) = run_script(r#"return "day " + 3 + ", hp " + 2.5"#);
    assert_eq!(control, Control::Return(Val::Str("day 3, hp 2.5".into())));
}

#[test]
fn test_list_concatenation() {
    let (control, _) = run_script("return [1] + [2, 3]");
    assert_eq!(
        control,
        Control::Return(Val::List(vec![Val::Num(1.0), Val::Num(2.0), Val::Num(3.0)]))
    );
}

#[test]
fn test_structural_equality() {
    let (control, _) = run_script(r#"return [1, {a: "x"}] == [1, {a: "x"}]"#);
    assert_eq!(control, Control::Return(Val::Bool(true)));
}

#[test]
fn test_comparisons() {
    let (control, _) = run_script(r#"return [1 < 2, 2 <= 2, "b" > "a", 3 >= 4, 1 != 1]"#);
    assert_eq!(
        control,
        Control::Return(Val::List(vec![
            Val::Bool(true),
            Val::Bool(true),
            Val::Bool(true),
            Val::Bool(false),
            Val::Bool(false),
        ]))
    );
}

#[test]
fn test_logical_operators_short_circuit() {
    // The right side would throw if it ran
    let (control, _) = run_script("return [false && missing, true || missing, 0 || \"fallback\"]");
    assert_eq!(
        control,
        Control::Return(Val::List(vec![
            Val::Bool(false),
            Val::Bool(true),
            Val::Str("fallback".into()),
        ]))
    );
}

#[test]
fn test_ternary_and_truthiness() {
    let (control, _) = run_script(r#"return ["" ? 1 : 2, 0 ? 1 : 2, [] ? 1 : 2, !null]"#);
    assert_eq!(
        control,
        Control::Return(Val::List(vec![
            Val::Num(2.0),
            Val::Num(2.0),
            Val::Num(1.0),
            Val::Bool(true),
        ]))
    );
}

#[test]
fn test_compare_mismatched_types_is_type_error() {
    let (control, _) = run_script(r#"return 1 < "2""#);
    assert_thrown_code(&control, errors::TYPE_ERROR);
}

/* ===================== Variables & Scopes ===================== */

#[test]
fn test_assignment_to_undeclared_name_creates_global() {
    let (control, _) = run_script(
        r#"
        {
            counter = 1
        }
        counter = counter + 1
        return counter
    "#,
    );
    assert_eq!(control, Control::Return(Val::Num(2.0)));
}

#[test]
fn test_let_shadows_in_inner_block() {
    let (control, host) = run_script(
        r#"
        let name = "outer"
        {
            let name = "inner"
            print(name)
        }
        print(name)
    "#,
    );
    assert_eq!(control, Control::None);
    assert_eq!(host.output(), vec!["inner", "outer"]);
}

#[test]
fn test_block_locals_do_not_leak() {
    let (control, _) = run_script(
        r#"
        {
            let hidden = 1
        }
        return hidden
    "#,
    );
    assert_thrown_code(&control, errors::UNDEFINED_VARIABLE);
}

/* ===================== Collections ===================== */

#[test]
fn test_object_literal_value() {
    let (control, _) = run_script(r#"let hp = 3
return { hp, "name": "Ada", tags: [] }"#);
    assert_eq!(
        control,
        Control::Return(Val::Obj(btreemap! {
            "hp".to_string() => Val::Num(3.0),
            "name".to_string() => Val::Str("Ada".into()),
            "tags".to_string() => Val::List(vec![]),
        }))
    );
}

#[test]
fn test_nested_path_assignment() {
    let (control, _) = run_script(
        r#"
        let player = { name: "Ada", stats: { hp: 3 }, items: ["map"] }
        player.stats.hp = player.stats.hp - 1
        player["items"][0] = "lamp"
        player.level = 2
        return player
    "#,
    );

    let Control::Return(Val::Obj(player)) = control else {
        panic!("Expected object return, got {:?}", control);
    };
    assert_eq!(player["level"], Val::Num(2.0));
    assert_eq!(player["items"], Val::List(vec![Val::Str("lamp".into())]));
    let Val::Obj(stats) = &player["stats"] else {
        panic!("Expected stats object");
    };
    assert_eq!(stats["hp"], Val::Num(2.0));
}

#[test]
fn test_string_and_list_indexing() {
    let (control, _) = run_script(r#"return ["quill"[0], [4, 5][1], "quill".length, [1, 2].length]"#);
    assert_eq!(
        control,
        Control::Return(Val::List(vec![
            Val::Str("q".into()),
            Val::Num(5.0),
            Val::Num(5.0),
            Val::Num(2.0),
        ]))
    );
}

#[test]
fn test_index_out_of_bounds() {
    let (control, _) = run_script("let xs = [1]\nreturn xs[1]");
    assert_thrown_code(&control, errors::INDEX_OUT_OF_BOUNDS);
}

#[test]
fn test_missing_property() {
    let (control, _) = run_script("let o = {}\nreturn o.nope");
    assert_thrown_code(&control, errors::PROPERTY_NOT_FOUND);
}

#[test]
fn test_display_of_nested_values() {
    let (_, host) = run_script(r#"print([1, "two", null], {b: true, a: "x"}, print)"#);
    assert_eq!(
        host.output(),
        vec![r#"[1, "two", null] {a: "x", b: true} <builtin print>"#]
    );
}
