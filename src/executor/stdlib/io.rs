//! Host-routed builtins: print, input, sleep

use std::time::Duration;

use crate::executor::errors::{self, raise};
use crate::executor::expressions::EvalResult;
use crate::executor::host::{HostError, ScriptHost};
use crate::executor::types::Val;

/// print(...values) - emit the values joined by single spaces
pub fn print(args: &[Val], host: &dyn ScriptHost) -> EvalResult {
    let text = args
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    host.emit(&text);
    Ok(Val::Null)
}

/// input(prompt?) - block until the player answers, return the answer
pub fn input(args: &[Val], host: &dyn ScriptHost) -> EvalResult {
    let prompt = match args {
        [] => String::new(),
        [prompt] => prompt.to_string(),
        _ => {
            return raise(
                errors::WRONG_ARG_COUNT,
                format!("Expected at most 1 argument, got {}", args.len()),
            )
        }
    };

    host.request_input(&prompt)
        .map(Val::Str)
        .map_err(host_error)
}

/// sleep(seconds) - pause the session thread
pub fn sleep(args: &[Val], host: &dyn ScriptHost) -> EvalResult {
    let [arg] = args else {
        return raise(
            errors::WRONG_ARG_COUNT,
            format!("Expected 1 argument, got {}", args.len()),
        );
    };

    let seconds = match arg {
        Val::Num(n) if n.is_finite() && *n >= 0.0 => *n,
        Val::Num(_) => {
            return raise(
                errors::WRONG_ARG_TYPE,
                "sleep() needs a finite, non-negative number of seconds",
            )
        }
        other => {
            return raise(
                errors::WRONG_ARG_TYPE,
                format!("sleep() expects a number, got {}", other.type_name()),
            )
        }
    };

    let Ok(duration) = Duration::try_from_secs_f64(seconds) else {
        return raise(errors::WRONG_ARG_TYPE, "sleep() duration is too long");
    };

    host.sleep(duration)
        .map(|_| Val::Null)
        .map_err(host_error)
}

fn host_error(err: HostError) -> Val {
    let code = match err {
        HostError::InputAlreadyPending | HostError::InputClosed => errors::INPUT_UNAVAILABLE,
        HostError::Interrupted => errors::INTERRUPTED,
    };
    Val::Error(errors::ErrorInfo::new(code, err.to_string()))
}
