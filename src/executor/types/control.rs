//! Control flow state

use super::values::Val;

/// Control flow state
///
/// Every statement handler returns one of these. Anything other than
/// `Control::None` unwinds enclosing statements until a handler claims it:
/// loops claim Break/Continue, `try` claims Throw, and Return ends the program.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    None,
    Break,
    Continue,
    Return(Val),
    Throw(Val),
}

impl Control {
    pub fn is_none(&self) -> bool {
        matches!(self, Control::None)
    }
}
