//! Expression evaluation
//!
//! Evaluates expressions to values. A thrown error travels in the `Err`
//! variant so evaluation can use `?` and statements decide what to do with it.

use std::collections::BTreeMap;

use super::errors::{self, raise};
use super::interpreter::Interpreter;
use super::statements::list_index;
use super::stdlib::call_stdlib_func;
use super::types::{BinaryOp, Expr, UnaryOp, Val};

/// Result of evaluating an expression: a value, or a thrown value
pub type EvalResult = Result<Val, Val>;

impl Interpreter<'_> {
    /// Evaluate an expression to a value
    pub(crate) fn eval_expr(&mut self, expr: &Expr) -> EvalResult {
        match expr {
            Expr::LitBool { v, .. } => Ok(Val::Bool(*v)),
            Expr::LitNum { v, .. } => Ok(Val::Num(*v)),
            Expr::LitStr { v, .. } => Ok(Val::Str(v.clone())),
            Expr::LitNull { .. } => Ok(Val::Null),

            Expr::LitList { elements, .. } => {
                let items = elements
                    .iter()
                    .map(|element| self.eval_expr(element))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Val::List(items))
            }

            Expr::LitObj { properties, .. } => {
                let mut map = BTreeMap::new();
                for (key, value_expr) in properties {
                    let value = self.eval_expr(value_expr)?;
                    map.insert(key.clone(), value);
                }
                Ok(Val::Obj(map))
            }

            Expr::Ident { name, .. } => match self.lookup(name) {
                Some(v) => Ok(v.clone()),
                None => raise(
                    errors::UNDEFINED_VARIABLE,
                    format!("Variable '{}' is not defined", name),
                ),
            },

            Expr::Member {
                object, property, ..
            } => {
                let object = self.eval_expr(object)?;
                member(&object, property)
            }

            Expr::Index { object, index, .. } => {
                let object = self.eval_expr(object)?;
                let index = self.eval_expr(index)?;
                index_value(&object, &index)
            }

            Expr::Call { callee, args, .. } => {
                let callee = self.eval_expr(callee)?;
                let Val::NativeFunc(func) = &callee else {
                    return raise(
                        errors::NOT_CALLABLE,
                        format!("Value of type {} is not callable", callee.type_name()),
                    );
                };

                let args = args
                    .iter()
                    .map(|arg| self.eval_expr(arg))
                    .collect::<Result<Vec<_>, _>>()?;

                call_stdlib_func(*func, &args, self.host)
            }

            Expr::Unary { op, operand, .. } => {
                let operand = self.eval_expr(operand)?;
                match (op, operand) {
                    (UnaryOp::Not, v) => Ok(Val::Bool(!v.is_truthy())),
                    (UnaryOp::Neg, Val::Num(n)) => Ok(Val::Num(-n)),
                    (UnaryOp::Neg, other) => raise(
                        errors::TYPE_ERROR,
                        format!("Cannot negate {} value", other.type_name()),
                    ),
                }
            }

            Expr::BinaryOp {
                op, left, right, ..
            } => {
                let left = self.eval_expr(left)?;

                // Short-circuit: the right side only runs when it decides the result
                match op {
                    BinaryOp::And if !left.is_truthy() => return Ok(left),
                    BinaryOp::Or if left.is_truthy() => return Ok(left),
                    _ => {}
                }

                let right = self.eval_expr(right)?;
                if op.is_logical() {
                    return Ok(right);
                }
                binary(*op, left, right)
            }

            Expr::Ternary {
                condition,
                consequent,
                alternate,
                ..
            } => {
                if self.eval_expr(condition)?.is_truthy() {
                    self.eval_expr(consequent)
                } else {
                    self.eval_expr(alternate)
                }
            }
        }
    }
}

/// Property access on a value
fn member(object: &Val, property: &str) -> EvalResult {
    match (object, property) {
        (Val::Obj(map), _) => match map.get(property) {
            Some(v) => Ok(v.clone()),
            None => raise(
                errors::PROPERTY_NOT_FOUND,
                format!("Property '{}' not found", property),
            ),
        },
        (Val::Error(info), "code") => Ok(Val::Str(info.code.clone())),
        (Val::Error(info), "message") => Ok(Val::Str(info.message.clone())),
        (Val::List(items), "length") => Ok(Val::Num(items.len() as f64)),
        (Val::Str(s), "length") => Ok(Val::Num(s.chars().count() as f64)),
        (other, _) => raise(
            errors::TYPE_ERROR,
            format!(
                "Cannot access property '{}' on {} value",
                property,
                other.type_name()
            ),
        ),
    }
}

/// Bracket access on a value
fn index_value(object: &Val, index: &Val) -> EvalResult {
    match (object, index) {
        (Val::Obj(_), Val::Str(key)) => member(object, key),
        (Val::List(items), _) => match list_index(index, items.len()) {
            Some(i) => Ok(items[i].clone()),
            None => raise(
                errors::INDEX_OUT_OF_BOUNDS,
                format!(
                    "Index {} out of bounds for list of length {}",
                    index,
                    items.len()
                ),
            ),
        },
        (Val::Str(s), _) => {
            let len = s.chars().count();
            match list_index(index, len).and_then(|i| s.chars().nth(i)) {
                Some(c) => Ok(Val::Str(c.to_string())),
                None => raise(
                    errors::INDEX_OUT_OF_BOUNDS,
                    format!("Index {} out of bounds for string of length {}", index, len),
                ),
            }
        }
        (other, _) => raise(
            errors::TYPE_ERROR,
            format!(
                "Cannot index {} value with {}",
                other.type_name(),
                index.type_name()
            ),
        ),
    }
}

/// Evaluate a non-logical binary operator on two values
fn binary(op: BinaryOp, left: Val, right: Val) -> EvalResult {
    match op {
        BinaryOp::Eq => Ok(Val::Bool(left == right)),
        BinaryOp::Ne => Ok(Val::Bool(left != right)),
        BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte => compare(op, &left, &right),
        BinaryOp::Add => match (left, right) {
            (Val::Num(l), Val::Num(r)) => Ok(Val::Num(l + r)),
            (Val::List(mut l), Val::List(r)) => {
                l.extend(r);
                Ok(Val::List(l))
            }
            (l @ Val::Str(_), r) | (l, r @ Val::Str(_)) => {
                Ok(Val::Str(format!("{}{}", l, r)))
            }
            (l, r) => raise(
                errors::TYPE_ERROR,
                format!("Cannot add {} and {}", l.type_name(), r.type_name()),
            ),
        },
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            let (Val::Num(l), Val::Num(r)) = (&left, &right) else {
                return raise(
                    errors::TYPE_ERROR,
                    format!(
                        "Arithmetic needs numbers, got {} and {}",
                        left.type_name(),
                        right.type_name()
                    ),
                );
            };
            let (l, r) = (*l, *r);
            match op {
                BinaryOp::Sub => Ok(Val::Num(l - r)),
                BinaryOp::Mul => Ok(Val::Num(l * r)),
                BinaryOp::Div | BinaryOp::Mod if r == 0.0 => {
                    raise(errors::DIVISION_BY_ZERO, "Division by zero")
                }
                BinaryOp::Div => Ok(Val::Num(l / r)),
                _ => Ok(Val::Num(l % r)),
            }
        }
        BinaryOp::And | BinaryOp::Or => Ok(right),
    }
}

fn compare(op: BinaryOp, left: &Val, right: &Val) -> EvalResult {
    let ordering = match (left, right) {
        (Val::Num(l), Val::Num(r)) => l.partial_cmp(r),
        (Val::Str(l), Val::Str(r)) => Some(l.cmp(r)),
        _ => {
            return raise(
                errors::TYPE_ERROR,
                format!(
                    "Cannot compare {} with {}",
                    left.type_name(),
                    right.type_name()
                ),
            )
        }
    };

    let Some(ordering) = ordering else {
        return Ok(Val::Bool(false));
    };

    let result = match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Lte => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        _ => ordering.is_ge(),
    };
    Ok(Val::Bool(result))
}
