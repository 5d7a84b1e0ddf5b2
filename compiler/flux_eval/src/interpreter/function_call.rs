//! Function creation, calls, and the self tail call trampoline.
//!
//! A call in tail position whose callee is the function currently running
//! does not recurse. `eval_call` returns [`Flow::TailCall`] with the
//! evaluated arguments; the flow unwinds through blocks and branches to the
//! `call_function` loop that owns the running frame, which rebinds the
//! parameters and runs the body again on the same native frame.

#![expect(
    clippy::disallowed_types,
    reason = "FunctionDecl nodes are shared through Rc"
)]

use std::rc::Rc;

use flux_ir::{FunctionDecl, Node, Token};

use super::{CallArgs, EvalFlow, Flow, Interpreter};
use crate::diagnostics::CallFrame;
use crate::environment::EnvId;
use crate::errors::{arity_mismatch, not_callable, EvalResult};
use crate::value::{BuiltinFunction, FunctionValue, Heap};
use crate::Value;

/// Anything that can be called.
#[derive(Clone, Debug)]
pub enum Callable {
    User(Heap<FunctionValue>),
    Builtin(BuiltinFunction),
}

impl Callable {
    /// The callable behind `value`, if it is one.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Function(f) => Some(Callable::User(f.clone())),
            Value::Builtin(b) => Some(Callable::Builtin(*b)),
            _ => None,
        }
    }

    /// Required argument count. Builtins validate their own arguments.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Callable::User(f) => Some(f.arity()),
            Callable::Builtin(_) => None,
        }
    }

    /// Invoke with evaluated arguments.
    pub fn call(self, interp: &mut Interpreter, args: CallArgs, token: &Token) -> EvalResult {
        match self {
            Callable::User(function) => interp.call_function(function, args, token),
            Callable::Builtin(builtin) => builtin.call(&args, token),
        }
    }
}

impl Interpreter {
    /// Build a closure over `env`, pinning the scope chain.
    pub(super) fn make_function(&mut self, decl: &Rc<FunctionDecl>, env: EnvId) -> Value {
        let closure = self.env.capture(env);
        Value::function(FunctionValue::new(Rc::clone(decl), closure, &self.interner))
    }

    pub(super) fn eval_call(
        &mut self,
        callee: &Node,
        args: &[Node],
        token: &Token,
        env: EnvId,
        tail: bool,
    ) -> EvalFlow {
        let callee = try_value!(self.eval(callee, env, false));
        let Some(callable) = Callable::from_value(&callee) else {
            return Err(not_callable(callee.type_name(), token));
        };

        let mut values = CallArgs::with_capacity(args.len());
        for arg in args {
            values.push(try_value!(self.eval(arg, env, false)));
        }

        if tail {
            if let Callable::User(function) = &callable {
                if self.call_stack.is_current(function) {
                    return Ok(Flow::TailCall {
                        function: function.clone(),
                        args: values,
                    });
                }
            }
        }

        callable.call(self, values, token).map(Flow::Value)
    }

    /// Run a user function to completion.
    ///
    /// Self tail calls loop here instead of recursing. The call scope is
    /// reused for the next iteration unless a closure captured it, in which
    /// case the closure keeps it and a fresh scope is opened.
    pub(crate) fn call_function(
        &mut self,
        function: Heap<FunctionValue>,
        args: CallArgs,
        token: &Token,
    ) -> EvalResult {
        check_arity(&function, args.len(), token)?;
        self.call_stack.push(CallFrame {
            function: function.clone(),
            call_token: token.clone(),
        })?;
        let _span = tracing::debug_span!("call", function = function.label()).entered();

        let mut call_env = self.env.child(function.closure());
        self.bind_params(&function, call_env, args);

        let mut iterations: u64 = 0;
        let result = loop {
            match self.eval_statements(function.body(), call_env, true) {
                Ok(Flow::Value(value) | Flow::Return(value)) => break Ok(value),
                Ok(Flow::TailCall { function: target, args }) => {
                    if !Heap::ptr_eq(&target, &function) {
                        // Only self calls are flattened; anything else is an
                        // ordinary call made from this frame.
                        break self.call_function(target, args, token);
                    }
                    if let Err(err) = check_arity(&function, args.len(), token) {
                        break Err(err);
                    }
                    iterations += 1;
                    tracing::trace!(iterations, "self tail call");

                    if self.env.is_captured(call_env) {
                        self.env.release(call_env);
                        call_env = self.env.child(function.closure());
                    } else {
                        self.env.reset(call_env);
                    }
                    self.bind_params(&function, call_env, args);
                }
                Err(err) => break Err(err),
            }
        };

        self.env.release(call_env);
        self.call_stack.pop();
        result
    }

    fn bind_params(&mut self, function: &FunctionValue, env: EnvId, args: CallArgs) {
        for (param, arg) in function.params().iter().zip(args) {
            self.env.define(env, *param, arg);
        }
    }
}

fn check_arity(function: &FunctionValue, got: usize, token: &Token) -> EvalResult<()> {
    let expected = function.arity();
    if expected == got {
        Ok(())
    } else {
        Err(arity_mismatch(expected, got, token))
    }
}
