//! Standard library function implementations
//!
//! This module contains all stdlib function implementations organized by category.

pub mod convert;
pub mod io;
pub mod math;

use std::collections::{BTreeMap, HashMap};

use super::expressions::EvalResult;
use super::host::ScriptHost;
use super::types::Val;

/* ===================== Standard Library Function Types ===================== */

/// Standard library function identifiers
///
/// Each variant represents a specific stdlib function. They are stored in the
/// environment as `Val::NativeFunc` so scripts can pass them around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdlibFunc {
    Print,
    Input,
    Sleep,
    Str,
    Num,
    Len,
    MathFloor,
    MathCeil,
    MathAbs,
    MathRound,
    MathMin,
    MathMax,
}

impl StdlibFunc {
    pub fn name(&self) -> &'static str {
        match self {
            StdlibFunc::Print => "print",
            StdlibFunc::Input => "input",
            StdlibFunc::Sleep => "sleep",
            StdlibFunc::Str => "str",
            StdlibFunc::Num => "num",
            StdlibFunc::Len => "len",
            StdlibFunc::MathFloor => "Math.floor",
            StdlibFunc::MathCeil => "Math.ceil",
            StdlibFunc::MathAbs => "Math.abs",
            StdlibFunc::MathRound => "Math.round",
            StdlibFunc::MathMin => "Math.min",
            StdlibFunc::MathMax => "Math.max",
        }
    }
}

/* ===================== Stdlib Dispatcher ===================== */

/// Call a standard library function with arguments
///
/// Host-facing builtins (print, input, sleep) receive the session's host;
/// the rest are pure.
pub fn call_stdlib_func(func: StdlibFunc, args: &[Val], host: &dyn ScriptHost) -> EvalResult {
    match func {
        StdlibFunc::Print => io::print(args, host),
        StdlibFunc::Input => io::input(args, host),
        StdlibFunc::Sleep => io::sleep(args, host),
        StdlibFunc::Str => convert::str(args),
        StdlibFunc::Num => convert::num(args),
        StdlibFunc::Len => convert::len(args),
        StdlibFunc::MathFloor => math::floor(args),
        StdlibFunc::MathCeil => math::ceil(args),
        StdlibFunc::MathAbs => math::abs(args),
        StdlibFunc::MathRound => math::round(args),
        StdlibFunc::MathMin => math::min(args),
        StdlibFunc::MathMax => math::max(args),
    }
}

/* ===================== Environment Injection ===================== */

/// Inject standard library globals into the environment
pub fn inject_stdlib(env: &mut HashMap<String, Val>) {
    for func in [
        StdlibFunc::Print,
        StdlibFunc::Input,
        StdlibFunc::Sleep,
        StdlibFunc::Str,
        StdlibFunc::Num,
        StdlibFunc::Len,
    ] {
        env.insert(func.name().to_string(), Val::NativeFunc(func));
    }

    let mut math_obj = BTreeMap::new();
    math_obj.insert("floor".to_string(), Val::NativeFunc(StdlibFunc::MathFloor));
    math_obj.insert("ceil".to_string(), Val::NativeFunc(StdlibFunc::MathCeil));
    math_obj.insert("abs".to_string(), Val::NativeFunc(StdlibFunc::MathAbs));
    math_obj.insert("round".to_string(), Val::NativeFunc(StdlibFunc::MathRound));
    math_obj.insert("min".to_string(), Val::NativeFunc(StdlibFunc::MathMin));
    math_obj.insert("max".to_string(), Val::NativeFunc(StdlibFunc::MathMax));

    env.insert("Math".to_string(), Val::Obj(math_obj));
}
