//! Binary operator implementations.
//!
//! Direct enum dispatch over `(left, right, op)`. Operators report an
//! [`EvalErrorKind`]; the interpreter attaches the operator token.
//!
//! Rules:
//! - `+` adds numbers, concatenates strings, and stringifies a scalar or
//!   function operand when the other side is a string (either order).
//! - `- * / % **` and the orderings require two numbers. `Int` op `Int`
//!   stays `Int` (checked), except `/`, which always yields a `Float`.
//! - `%` is floored: the result takes the sign of the divisor.
//! - `==`/`!=` use [`Value::equals`].
//! - `and`/`or` combine two already-evaluated operands by truthiness.

use flux_ir::BinaryOp;

use crate::errors::EvalErrorKind;
use crate::value::{int_to_f64, Value};

pub type OpResult = Result<Value, EvalErrorKind>;

/// Evaluate a binary operation on two evaluated operands.
pub fn evaluate_binary(left: &Value, right: &Value, op: BinaryOp) -> OpResult {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(left.equals(right))),
        BinaryOp::NotEq => Ok(Value::Bool(!left.equals(right))),
        BinaryOp::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        BinaryOp::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
        BinaryOp::Add => eval_add(left, right),
        _ => eval_numeric(left, right, op, EvalErrorKind::NumericOperands),
    }
}

fn eval_add(left: &Value, right: &Value) -> OpResult {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => {
            let mut out = String::with_capacity(a.len() + b.len());
            out.push_str(a);
            out.push_str(b);
            Ok(Value::string(out))
        }
        (Value::Str(a), other) if concatenates(other) => {
            Ok(Value::string(format!("{}{other}", a.as_str())))
        }
        (other, Value::Str(b)) if concatenates(other) => {
            Ok(Value::string(format!("{other}{}", b.as_str())))
        }
        _ => eval_numeric(left, right, BinaryOp::Add, EvalErrorKind::InvalidConcat),
    }
}

/// Kinds that stringify when added to a string.
fn concatenates(value: &Value) -> bool {
    matches!(
        value,
        Value::Int(_) | Value::Float(_) | Value::Bool(_) | Value::Function(_)
    )
}

fn eval_numeric(left: &Value, right: &Value, op: BinaryOp, mismatch: EvalErrorKind) -> OpResult {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => eval_int_binary(*a, *b, op),
        (Value::Int(a), Value::Float(b)) => eval_float_binary(int_to_f64(*a), *b, op),
        (Value::Float(a), Value::Int(b)) => eval_float_binary(*a, int_to_f64(*b), op),
        (Value::Float(a), Value::Float(b)) => eval_float_binary(*a, *b, op),
        _ => Err(mismatch),
    }
}

#[inline]
fn checked(result: Option<i64>, operation: &'static str) -> OpResult {
    result
        .map(Value::Int)
        .ok_or(EvalErrorKind::IntegerOverflow { operation })
}

fn eval_int_binary(a: i64, b: i64, op: BinaryOp) -> OpResult {
    match op {
        BinaryOp::Add => checked(a.checked_add(b), "addition"),
        BinaryOp::Sub => checked(a.checked_sub(b), "subtraction"),
        BinaryOp::Mul => checked(a.checked_mul(b), "multiplication"),
        BinaryOp::Div => {
            if b == 0 {
                return Err(EvalErrorKind::DivisionByZero);
            }
            Ok(Value::Float(int_to_f64(a) / int_to_f64(b)))
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(EvalErrorKind::RemainderByZero);
            }
            let rem = a
                .checked_rem(b)
                .ok_or(EvalErrorKind::IntegerOverflow {
                    operation: "remainder",
                })?;
            // Floor toward the divisor's sign.
            if rem != 0 && ((rem < 0) != (b < 0)) {
                Ok(Value::Int(rem + b))
            } else {
                Ok(Value::Int(rem))
            }
        }
        BinaryOp::Pow => match u32::try_from(b) {
            Ok(exp) => checked(a.checked_pow(exp), "exponentiation"),
            // Negative exponents leave the integers.
            Err(_) if b < 0 => Ok(Value::Float(int_to_f64(a).powf(int_to_f64(b)))),
            Err(_) => Err(EvalErrorKind::IntegerOverflow {
                operation: "exponentiation",
            }),
        }
        BinaryOp::Lt => Ok(Value::Bool(a < b)),
        BinaryOp::LtEq => Ok(Value::Bool(a <= b)),
        BinaryOp::Gt => Ok(Value::Bool(a > b)),
        BinaryOp::GtEq => Ok(Value::Bool(a >= b)),
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::And | BinaryOp::Or => {
            Err(EvalErrorKind::NumericOperands)
        }
    }
}

fn eval_float_binary(a: f64, b: f64, op: BinaryOp) -> OpResult {
    match op {
        BinaryOp::Add => Ok(Value::Float(a + b)),
        BinaryOp::Sub => Ok(Value::Float(a - b)),
        BinaryOp::Mul => Ok(Value::Float(a * b)),
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(EvalErrorKind::DivisionByZero);
            }
            Ok(Value::Float(a / b))
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Err(EvalErrorKind::RemainderByZero);
            }
            let rem = a % b;
            if rem != 0.0 && ((rem < 0.0) != (b < 0.0)) {
                Ok(Value::Float(rem + b))
            } else {
                Ok(Value::Float(rem))
            }
        }
        BinaryOp::Pow => Ok(Value::Float(a.powf(b))),
        BinaryOp::Lt => Ok(Value::Bool(a < b)),
        BinaryOp::LtEq => Ok(Value::Bool(a <= b)),
        BinaryOp::Gt => Ok(Value::Bool(a > b)),
        BinaryOp::GtEq => Ok(Value::Bool(a >= b)),
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::And | BinaryOp::Or => {
            Err(EvalErrorKind::NumericOperands)
        }
    }
}
