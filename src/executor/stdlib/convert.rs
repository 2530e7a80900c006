//! Conversion builtins: str, num, len

use crate::executor::errors::{self, raise};
use crate::executor::expressions::EvalResult;
use crate::executor::types::Val;

fn single_arg<'a>(args: &'a [Val], name: &str) -> Result<&'a Val, Val> {
    match args {
        [arg] => Ok(arg),
        _ => raise(
            errors::WRONG_ARG_COUNT,
            format!("{}() expects 1 argument, got {}", name, args.len()),
        ),
    }
}

/// str(value) - display form of any value
pub fn str(args: &[Val]) -> EvalResult {
    let arg = single_arg(args, "str")?;
    Ok(Val::Str(arg.to_string()))
}

/// num(value) - parse strings, pass numbers through, map bools to 0/1
pub fn num(args: &[Val]) -> EvalResult {
    match single_arg(args, "num")? {
        Val::Num(n) => Ok(Val::Num(*n)),
        Val::Bool(b) => Ok(Val::Num(if *b { 1.0 } else { 0.0 })),
        Val::Str(s) => match s.trim().parse::<f64>() {
            Ok(n) => Ok(Val::Num(n)),
            Err(_) => raise(
                errors::INVALID_NUMBER,
                format!("Cannot convert {:?} to a number", s),
            ),
        },
        other => raise(
            errors::WRONG_ARG_TYPE,
            format!("num() cannot convert {}", other.type_name()),
        ),
    }
}

/// len(value) - characters in a string, items in a list, keys in an object
pub fn len(args: &[Val]) -> EvalResult {
    let n = match single_arg(args, "len")? {
        Val::Str(s) => s.chars().count(),
        Val::List(items) => items.len(),
        Val::Obj(map) => map.len(),
        other => {
            return raise(
                errors::WRONG_ARG_TYPE,
                format!("len() is not defined for {}", other.type_name()),
            )
        }
    };
    Ok(Val::Num(n as f64))
}
