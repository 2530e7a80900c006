//! Statement execution handlers
//!
//! Each statement kind has its own handler. Handlers return the `Control`
//! produced by the statement; loops and `try` consume the kinds they own and
//! pass everything else outward.

use std::collections::BTreeMap;

use super::errors::{self, raise, ErrorInfo};
use super::interpreter::Interpreter;
use super::types::{Control, Expr, ForLoopKind, MemberAccess, Stmt, Val};

/// A resolved assignment path segment
enum PathKey {
    Prop(String),
    Index(Val),
}

impl Interpreter<'_> {
    /// Execute one statement
    pub(crate) fn exec_stmt(&mut self, stmt: &Stmt) -> Control {
        if self.host.interrupted() {
            return Control::Throw(Val::Error(ErrorInfo::new(
                errors::INTERRUPTED,
                "session interrupted",
            )));
        }

        match stmt {
            Stmt::Block { body, .. } => self.with_scope(|interp| interp.execute_block(body)),
            Stmt::Declare { name, init, .. } => self.execute_declare(name, init.as_ref()),
            Stmt::Assign {
                var, path, value, ..
            } => self.execute_assign(var, path, value),
            Stmt::If {
                test,
                then_s,
                else_s,
                ..
            } => self.execute_if(test, then_s, else_s.as_deref()),
            Stmt::While { test, body, .. } => self.execute_while(test, body),
            Stmt::ForLoop {
                kind,
                binding,
                iterable,
                body,
                ..
            } => self.execute_for(*kind, binding, iterable, body),
            Stmt::Return { value, .. } => match value {
                Some(expr) => match self.eval_expr(expr) {
                    Ok(v) => Control::Return(v),
                    Err(error) => Control::Throw(error),
                },
                None => Control::Return(Val::Null),
            },
            Stmt::Throw { value, .. } => match self.eval_expr(value) {
                Ok(v) | Err(v) => Control::Throw(v),
            },
            Stmt::Try {
                body,
                catch_var,
                catch_body,
                ..
            } => self.execute_try(body, catch_var, catch_body),
            Stmt::Expr { expr, .. } => match self.eval_expr(expr) {
                Ok(_) => Control::None,
                Err(error) => Control::Throw(error),
            },
            Stmt::Break { .. } => Control::Break,
            Stmt::Continue { .. } => Control::Continue,
        }
    }

    fn execute_block(&mut self, body: &[Stmt]) -> Control {
        for child in body {
            let control = self.exec_stmt(child);
            if !control.is_none() {
                return control;
            }
        }
        Control::None
    }

    fn execute_declare(&mut self, name: &str, init: Option<&Expr>) -> Control {
        let value = match init {
            Some(expr) => match self.eval_expr(expr) {
                Ok(v) => v,
                Err(error) => return Control::Throw(error),
            },
            None => Val::Null,
        };
        self.declare(name, value);
        Control::None
    }

    fn execute_assign(&mut self, var: &str, path: &[MemberAccess], value: &Expr) -> Control {
        // Path index expressions are evaluated before the right-hand side
        let mut keys = Vec::with_capacity(path.len());
        for segment in path {
            match segment {
                MemberAccess::Prop { property, .. } => keys.push(PathKey::Prop(property.clone())),
                MemberAccess::Index { expr, .. } => match self.eval_expr(expr) {
                    Ok(v) => keys.push(PathKey::Index(v)),
                    Err(error) => return Control::Throw(error),
                },
            }
        }

        let value = match self.eval_expr(value) {
            Ok(v) => v,
            Err(error) => return Control::Throw(error),
        };

        if keys.is_empty() {
            self.assign(var, value);
            return Control::None;
        }

        let Some(target) = self.lookup_mut(var) else {
            return Control::Throw(Val::Error(ErrorInfo::new(
                errors::UNDEFINED_VARIABLE,
                format!("Variable '{}' is not defined", var),
            )));
        };

        match assign_path(target, &keys, value) {
            Ok(()) => Control::None,
            Err(error) => Control::Throw(error),
        }
    }

    fn execute_if(&mut self, test: &Expr, then_s: &Stmt, else_s: Option<&Stmt>) -> Control {
        let test = match self.eval_expr(test) {
            Ok(v) => v,
            Err(error) => return Control::Throw(error),
        };

        if test.is_truthy() {
            self.exec_stmt(then_s)
        } else if let Some(else_s) = else_s {
            self.exec_stmt(else_s)
        } else {
            Control::None
        }
    }

    fn execute_while(&mut self, test: &Expr, body: &Stmt) -> Control {
        loop {
            match self.eval_expr(test) {
                Ok(v) if v.is_truthy() => {}
                Ok(_) => return Control::None,
                Err(error) => return Control::Throw(error),
            }

            match self.exec_stmt(body) {
                Control::None | Control::Continue => continue,
                Control::Break => return Control::None,
                other => return other,
            }
        }
    }

    fn execute_for(
        &mut self,
        kind: ForLoopKind,
        binding: &str,
        iterable: &Expr,
        body: &Stmt,
    ) -> Control {
        let iterable = match self.eval_expr(iterable) {
            Ok(v) => v,
            Err(error) => return Control::Throw(error),
        };

        let items = match iteration_items(kind, iterable) {
            Ok(items) => items,
            Err(error) => return Control::Throw(error),
        };

        for item in items {
            let control = self.with_scope(|interp| {
                interp.declare(binding, item);
                interp.exec_stmt(body)
            });

            match control {
                Control::None | Control::Continue => continue,
                Control::Break => break,
                other => return other,
            }
        }

        Control::None
    }

    fn execute_try(&mut self, body: &Stmt, catch_var: &str, catch_body: &Stmt) -> Control {
        match self.exec_stmt(body) {
            Control::Throw(error) => self.with_scope(|interp| {
                interp.declare(catch_var, error);
                interp.exec_stmt(catch_body)
            }),
            other => other,
        }
    }
}

/// Values a for loop visits, in order
fn iteration_items(kind: ForLoopKind, iterable: Val) -> Result<Vec<Val>, Val> {
    match (kind, iterable) {
        (ForLoopKind::Of, Val::List(items)) => Ok(items),
        (ForLoopKind::Of, Val::Str(s)) => Ok(s.chars().map(|c| Val::Str(c.to_string())).collect()),
        (ForLoopKind::In, Val::Obj(map)) => Ok(map.into_keys().map(Val::Str).collect()),
        (ForLoopKind::In, Val::List(items)) => {
            Ok((0..items.len()).map(|i| Val::Num(i as f64)).collect())
        }
        (ForLoopKind::Of, other) => raise(
            errors::TYPE_ERROR,
            format!("Cannot iterate over {} with 'of'", other.type_name()),
        ),
        (ForLoopKind::In, other) => raise(
            errors::TYPE_ERROR,
            format!("Cannot iterate over {} with 'in'", other.type_name()),
        ),
    }
}

/// Write `value` at `keys` inside `target`
fn assign_path(target: &mut Val, keys: &[PathKey], value: Val) -> Result<(), Val> {
    let Some((key, rest)) = keys.split_first() else {
        *target = value;
        return Ok(());
    };

    match (target, key) {
        (Val::Obj(map), PathKey::Prop(name)) | (Val::Obj(map), PathKey::Index(Val::Str(name))) => {
            assign_property(map, name, rest, value)
        }
        (Val::List(items), PathKey::Index(index)) => {
            let len = items.len();
            let slot = list_index(index, len).and_then(|i| items.get_mut(i));
            match slot {
                Some(slot) => assign_path(slot, rest, value),
                None => raise(
                    errors::INDEX_OUT_OF_BOUNDS,
                    format!("Index {} out of bounds for list of length {}", index, len),
                ),
            }
        }
        (other, _) => raise(
            errors::TYPE_ERROR,
            format!("Cannot assign into {} value", other.type_name()),
        ),
    }
}

fn assign_property(
    map: &mut BTreeMap<String, Val>,
    name: &str,
    rest: &[PathKey],
    value: Val,
) -> Result<(), Val> {
    if rest.is_empty() {
        map.insert(name.to_string(), value);
        return Ok(());
    }
    match map.get_mut(name) {
        Some(child) => assign_path(child, rest, value),
        None => raise(
            errors::PROPERTY_NOT_FOUND,
            format!("Property '{}' not found", name),
        ),
    }
}

/// Convert a numeric index value to a list position, if it is a valid one
pub(crate) fn list_index(index: &Val, len: usize) -> Option<usize> {
    match index {
        Val::Num(n) if n.fract() == 0.0 && *n >= 0.0 && (*n as usize) < len => Some(*n as usize),
        _ => None,
    }
}
