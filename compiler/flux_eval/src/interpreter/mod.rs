//! Tree-walking interpreter.
//!
//! Every node evaluates to a [`Flow`]: a plain value, or a non-local
//! transfer (`return`, self tail call) travelling outward. Transfers ride on
//! the `Ok` side; `Err` is reserved for runtime errors.
//!
//! Evaluation state is explicit: the scope a node runs in is an argument,
//! the running function is the top of the call stack, and the tail flag is
//! threaded through each call to `eval`.

/// Unwrap `Flow::Value`, or return any other flow to the caller.
macro_rules! try_value {
    ($flow:expr) => {
        match $flow? {
            Flow::Value(value) => value,
            other => return Ok(other),
        }
    };
}

mod builder;
mod collections;
mod control;
mod function_call;

use std::panic::{self, AssertUnwindSafe};

use smallvec::SmallVec;

use flux_ir::{Block, Node, SharedInterner, Token};
use flux_stack::ensure_sufficient_stack;

pub use builder::InterpreterBuilder;
pub use function_call::Callable;

use crate::diagnostics::CallStack;
use crate::environment::{EnvId, Environment};
use crate::errors::{internal_error, EvalError, EvalResult};
use crate::operators::evaluate_binary;
use crate::unary_operators::evaluate_unary;
use crate::value::{FunctionValue, Heap};
use crate::{SharedPrintHandler, Value};

/// Evaluated call arguments.
pub type CallArgs = SmallVec<[Value; 4]>;

/// Outcome of evaluating one node.
#[derive(Debug)]
pub(crate) enum Flow {
    Value(Value),
    /// `return`: unwinds to the enclosing call, or ends the program.
    Return(Value),
    /// Self call in tail position: unwinds to the running call's trampoline.
    TailCall {
        function: Heap<FunctionValue>,
        args: CallArgs,
    },
}

pub(crate) type EvalFlow = Result<Flow, EvalError>;

/// Evaluates programs.
///
/// Global definitions persist across [`run`](Self::run) calls on the same
/// interpreter.
pub struct Interpreter {
    interner: SharedInterner,
    env: Environment,
    call_stack: CallStack,
    print_handler: SharedPrintHandler,
}

impl Interpreter {
    /// An interpreter with default configuration; see [`InterpreterBuilder`].
    pub fn new() -> Self {
        InterpreterBuilder::new().build()
    }

    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print_handler
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Evaluate `program` in the global scope.
    ///
    /// Yields the value of the last statement, or the value of a top-level
    /// `return`, which ends the program early.
    #[tracing::instrument(level = "debug", skip_all, fields(statements = program.statements.len()))]
    pub fn run(&mut self, program: &Block) -> EvalResult {
        let global = self.env.global();
        match self.eval_statements(program, global, false)? {
            Flow::Value(value) | Flow::Return(value) => Ok(value),
            // Only produced under a running call, which consumes it.
            Flow::TailCall { function, args } => {
                let token = Token::ident(function.label(), 0);
                self.call_function(function, args, &token)
            }
        }
    }

    /// Evaluate `program`, reporting any failure through the print handler.
    ///
    /// Runtime errors print as `[line N] Error at '...': message`. A panic
    /// inside evaluation is caught here and reported as an internal error.
    /// Returns `None` on failure.
    pub fn interpret(&mut self, program: &Block) -> Option<Value> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run(program)));
        match outcome {
            Ok(Ok(value)) => Some(value),
            Ok(Err(err)) => {
                tracing::warn!(line = ?err.line(), error = %err.message(), "runtime error");
                self.print_handler.println(&err.to_string());
                None
            }
            Err(payload) => {
                let detail = panic_detail(payload.as_ref());
                tracing::error!(
                    detail = %detail,
                    backtrace = ?self.call_stack.backtrace(),
                    "internal error during evaluation"
                );
                self.recover();
                self.print_handler.println(&internal_error(detail).message());
                None
            }
        }
    }

    /// Drop the frames and scopes of an evaluation that unwound.
    fn recover(&mut self) {
        self.call_stack.clear();
        self.env.close_all();
    }

    /// Evaluate one node.
    pub(crate) fn eval(&mut self, node: &Node, env: EnvId, tail: bool) -> EvalFlow {
        ensure_sufficient_stack(|| self.eval_inner(node, env, tail))
    }

    fn eval_inner(&mut self, node: &Node, env: EnvId, tail: bool) -> EvalFlow {
        tracing::trace!(node = node.kind_name(), tail, "eval");
        let value = match node {
            Node::Integer(n) => Value::Int(*n),
            Node::Float(x) => Value::Float(*x),
            Node::String(s) => Value::string(s.as_str()),
            Node::Boolean(b) => Value::Bool(*b),
            Node::Nil => Value::Nil,

            Node::Var { name, token } => self.env.get(env, *name, token)?,
            Node::VarAssign { name, value, .. } => {
                let value = try_value!(self.eval(value, env, false));
                self.env.define(env, *name, value.clone());
                value
            }
            Node::VarReassign { name, value, token } => {
                let value = try_value!(self.eval(value, env, false));
                self.env.assign(env, *name, value, token)?
            }

            Node::BinOp {
                op,
                token,
                left,
                right,
            } => {
                // Both sides always run; `and`/`or` do not short-circuit.
                let left = try_value!(self.eval(left, env, false));
                let right = try_value!(self.eval(right, env, false));
                evaluate_binary(&left, &right, *op).map_err(|kind| EvalError::new(kind, token))?
            }
            Node::UnaryOp { op, token, operand } => {
                let operand = try_value!(self.eval(operand, env, false));
                evaluate_unary(&operand, *op).map_err(|kind| EvalError::new(kind, token))?
            }

            Node::Block(block) => return self.eval_block(block, env, tail),
            Node::If {
                condition,
                then_branch,
                else_branch,
            } => {
                return self.eval_if(condition, then_branch, else_branch.as_deref(), env, tail);
            }
            Node::Conditional {
                condition,
                then_expr,
                else_expr,
            } => return self.eval_conditional(condition, then_expr, else_expr, env, tail),
            Node::While { condition, body } => return self.eval_while(condition, body, env),
            Node::For {
                var,
                start,
                end,
                step,
                body,
                token,
            } => return self.eval_for(*var, start, end, step.as_deref(), body, token, env),
            Node::RepeatUntil { body, condition } => {
                return self.eval_repeat_until(body, condition, env);
            }
            Node::Match {
                scrutinee,
                cases,
                token,
            } => return self.eval_match(scrutinee, cases, token, env, tail),

            Node::FuncDef(decl) => {
                let function = self.make_function(decl, env);
                if let Some(name) = decl.name {
                    self.env.define(env, name, function.clone());
                }
                function
            }
            Node::Lambda(decl) => self.make_function(decl, env),
            Node::FuncCall {
                callee,
                args,
                token,
            } => return self.eval_call(callee, args, token, env, tail),
            Node::Return { value, .. } => {
                // The returned expression is in tail position whenever a
                // function is running, even from inside a loop.
                let in_function = !self.call_stack.is_empty();
                return Ok(match self.eval(value, env, in_function)? {
                    Flow::Value(value) => Flow::Return(value),
                    other => other,
                });
            }

            Node::Array(elements) => return self.eval_array(elements, env),
            Node::Dict { entries, token } => return self.eval_dict(entries, token, env),
            Node::ArrayAccess {
                array,
                index,
                token,
            } => return self.eval_index(*array, index, token, env),
            Node::ArrayAssign {
                array,
                index,
                value,
                token,
            } => return self.eval_index_assign(*array, index, value, token, env),

            Node::Print { value, .. } => {
                let value = try_value!(self.eval(value, env, false));
                self.print_handler.println(&value.to_string());
                value
            }
        };
        Ok(Flow::Value(value))
    }

    /// Run `block` in a new child of `parent`.
    fn eval_block(&mut self, block: &Block, parent: EnvId, tail: bool) -> EvalFlow {
        let scope = self.env.child(parent);
        let result = self.eval_statements(block, scope, tail);
        self.env.release(scope);
        result
    }

    /// Run statements in `env` itself. The value is the last statement's
    /// value, or nil for an empty block. Only the last statement inherits
    /// the tail flag.
    pub(crate) fn eval_statements(&mut self, block: &Block, env: EnvId, tail: bool) -> EvalFlow {
        let mut last = Value::Nil;
        let final_index = block.statements.len().saturating_sub(1);
        for (i, statement) in block.statements.iter().enumerate() {
            last = try_value!(self.eval(statement, env, tail && i == final_index));
        }
        Ok(Flow::Value(last))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// The line a host prints after a successful run, if any.
///
/// Nil results print nothing.
pub fn final_result_line(value: &Value) -> Option<String> {
    match value {
        Value::Nil => None,
        value => Some(format!("Final result: {value}")),
    }
}

fn panic_detail(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
