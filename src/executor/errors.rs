//! Runtime error codes
//!
//! Errors raised by the interpreter carry one of these codes so scripts can
//! branch on `e.code` inside a `catch` block.

use std::fmt;

use super::types::Val;

pub const UNDEFINED_VARIABLE: &str = "UNDEFINED_VARIABLE";
pub const TYPE_ERROR: &str = "TYPE_ERROR";
pub const PROPERTY_NOT_FOUND: &str = "PROPERTY_NOT_FOUND";
pub const INDEX_OUT_OF_BOUNDS: &str = "INDEX_OUT_OF_BOUNDS";
pub const DIVISION_BY_ZERO: &str = "DIVISION_BY_ZERO";
pub const NOT_CALLABLE: &str = "NOT_CALLABLE";
pub const WRONG_ARG_COUNT: &str = "WRONG_ARG_COUNT";
pub const WRONG_ARG_TYPE: &str = "WRONG_ARG_TYPE";
pub const INVALID_NUMBER: &str = "INVALID_NUMBER";
pub const INPUT_UNAVAILABLE: &str = "INPUT_UNAVAILABLE";
pub const INTERRUPTED: &str = "INTERRUPTED";
pub const SYNTAX_ERROR: &str = "SYNTAX_ERROR";
/// A non-error value was thrown and never caught
pub const UNCAUGHT: &str = "UNCAUGHT";

/// Error payload: a stable code plus a human readable message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ErrorInfo {}

/// Build a thrown error value in one call
pub fn raise<T>(code: &str, message: impl Into<String>) -> Result<T, Val> {
    Err(Val::Error(ErrorInfo::new(code, message)))
}
