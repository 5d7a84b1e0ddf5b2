//! Unary operator implementations.

use flux_ir::UnaryOp;

use crate::errors::EvalErrorKind;
use crate::operators::OpResult;
use crate::Value;

/// Evaluate a unary operation.
///
/// `-` needs a number; `not` accepts anything and negates its truthiness.
pub fn evaluate_unary(operand: &Value, op: UnaryOp) -> OpResult {
    match (op, operand) {
        (UnaryOp::Neg, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or(EvalErrorKind::IntegerOverflow {
                operation: "negation",
            }),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Neg, _) => Err(EvalErrorKind::NumericOperand),
        (UnaryOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
    }
}
