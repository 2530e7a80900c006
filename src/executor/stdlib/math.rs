//! Math object methods

use crate::executor::errors::{self, raise};
use crate::executor::expressions::EvalResult;
use crate::executor::types::Val;

fn number_arg(args: &[Val], name: &str) -> Result<f64, Val> {
    match args {
        [Val::Num(n)] => Ok(*n),
        [other] => raise(
            errors::WRONG_ARG_TYPE,
            format!("Math.{}() expects a number, got {}", name, other.type_name()),
        ),
        _ => raise(
            errors::WRONG_ARG_COUNT,
            format!("Expected 1 argument, got {}", args.len()),
        ),
    }
}

fn number_args(args: &[Val], name: &str) -> Result<Vec<f64>, Val> {
    if args.is_empty() {
        return raise(
            errors::WRONG_ARG_COUNT,
            format!("Math.{}() expects at least 1 argument", name),
        );
    }
    args.iter()
        .map(|arg| match arg {
            Val::Num(n) => Ok(*n),
            other => raise(
                errors::WRONG_ARG_TYPE,
                format!("Math.{}() expects numbers, got {}", name, other.type_name()),
            ),
        })
        .collect()
}

pub fn floor(args: &[Val]) -> EvalResult {
    Ok(Val::Num(number_arg(args, "floor")?.floor()))
}

pub fn ceil(args: &[Val]) -> EvalResult {
    Ok(Val::Num(number_arg(args, "ceil")?.ceil()))
}

pub fn abs(args: &[Val]) -> EvalResult {
    Ok(Val::Num(number_arg(args, "abs")?.abs()))
}

pub fn round(args: &[Val]) -> EvalResult {
    Ok(Val::Num(number_arg(args, "round")?.round()))
}

pub fn min(args: &[Val]) -> EvalResult {
    let nums = number_args(args, "min")?;
    Ok(Val::Num(nums.into_iter().fold(f64::INFINITY, f64::min)))
}

pub fn max(args: &[Val]) -> EvalResult {
    let nums = number_args(args, "max")?;
    Ok(Val::Num(nums.into_iter().fold(f64::NEG_INFINITY, f64::max)))
}
