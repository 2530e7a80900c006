//! Type definitions for the executor
//!
//! - AST nodes (Stmt, Expr)
//! - Runtime values (Val)
//! - Control flow (Control)

pub mod ast;
pub mod control;
pub mod values;

pub use ast::{BinaryOp, Expr, ForLoopKind, MemberAccess, Span, Stmt, UnaryOp};
pub use control::Control;
pub use values::Val;
