//! Conditionals, loops and `match`.
//!
//! Branch bodies inherit the caller's tail flag; loop bodies never do, since
//! another iteration or the loop's own result always follows them.

use flux_ir::{BinaryOp, Block, MatchCase, Name, Node, Token};

use super::{EvalFlow, Flow, Interpreter};
use crate::environment::EnvId;
use crate::errors::{
    no_matching_case, non_numeric_loop_bound, zero_step, EvalError, EvalErrorKind, LoopBound,
};
use crate::operators::evaluate_binary;
use crate::Value;

impl Interpreter {
    pub(super) fn eval_if(
        &mut self,
        condition: &Node,
        then_branch: &Node,
        else_branch: Option<&Node>,
        env: EnvId,
        tail: bool,
    ) -> EvalFlow {
        let condition = try_value!(self.eval(condition, env, false));
        if condition.is_truthy() {
            self.eval(then_branch, env, tail)
        } else if let Some(else_branch) = else_branch {
            self.eval(else_branch, env, tail)
        } else {
            Ok(Flow::Value(Value::Nil))
        }
    }

    /// `condition ? then_expr : else_expr`
    pub(super) fn eval_conditional(
        &mut self,
        condition: &Node,
        then_expr: &Node,
        else_expr: &Node,
        env: EnvId,
        tail: bool,
    ) -> EvalFlow {
        let condition = try_value!(self.eval(condition, env, false));
        let chosen = if condition.is_truthy() {
            then_expr
        } else {
            else_expr
        };
        self.eval(chosen, env, tail)
    }

    pub(super) fn eval_while(&mut self, condition: &Node, body: &Node, env: EnvId) -> EvalFlow {
        let mut last = Value::Nil;
        loop {
            let keep_going = try_value!(self.eval(condition, env, false));
            if !keep_going.is_truthy() {
                break;
            }
            last = try_value!(self.eval(body, env, false));
        }
        Ok(Flow::Value(last))
    }

    /// Body first, then repeat while the condition is falsy.
    pub(super) fn eval_repeat_until(
        &mut self,
        body: &Node,
        condition: &Node,
        env: EnvId,
    ) -> EvalFlow {
        loop {
            let last = try_value!(self.eval(body, env, false));
            let done = try_value!(self.eval(condition, env, false));
            if done.is_truthy() {
                return Ok(Flow::Value(last));
            }
        }
    }

    /// Counted loop.
    ///
    /// The counter lives in one loop scope shared by all iterations; each
    /// iteration's body runs in its own child of that scope. The counter
    /// advances from its own running value, so assigning to the loop
    /// variable inside the body does not change the iteration sequence.
    #[expect(
        clippy::too_many_arguments,
        reason = "mirrors the fields of Node::For"
    )]
    pub(super) fn eval_for(
        &mut self,
        var: Name,
        start: &Node,
        end: &Node,
        step: Option<&Node>,
        body: &Block,
        token: &Token,
        env: EnvId,
    ) -> EvalFlow {
        let start = try_value!(self.eval(start, env, false));
        let end = try_value!(self.eval(end, env, false));
        let step = match step {
            Some(step) => try_value!(self.eval(step, env, false)),
            None => Value::Int(1),
        };

        if !start.is_numeric() {
            return Err(non_numeric_loop_bound(LoopBound::Start, token));
        }
        if !end.is_numeric() {
            return Err(non_numeric_loop_bound(LoopBound::End, token));
        }
        let ascending = match step {
            Value::Int(0) => return Err(zero_step(token)),
            Value::Float(x) if x == 0.0 => return Err(zero_step(token)),
            Value::Int(n) => n > 0,
            Value::Float(x) => x > 0.0,
            _ => return Err(non_numeric_loop_bound(LoopBound::Step, token)),
        };
        let in_range = if ascending {
            BinaryOp::LtEq
        } else {
            BinaryOp::GtEq
        };

        let loop_env = self.env.child(env);
        self.env.define(loop_env, var, start.clone());
        let result = self.run_counted_loop(
            CountedLoop {
                var,
                counter: start,
                end,
                step,
                in_range,
            },
            body,
            token,
            loop_env,
        );
        self.env.release(loop_env);
        result
    }

    fn run_counted_loop(
        &mut self,
        mut state: CountedLoop,
        body: &Block,
        token: &Token,
        loop_env: EnvId,
    ) -> EvalFlow {
        let attach = |kind| EvalError::new(kind, token);
        let mut last = Value::Nil;
        while evaluate_binary(&state.counter, &state.end, state.in_range)
            .map_err(attach)?
            .is_truthy()
        {
            let body_env = self.env.child(loop_env);
            let flow = self.eval_statements(body, body_env, false);
            self.env.release(body_env);
            last = try_value!(flow);

            state.counter = match evaluate_binary(&state.counter, &state.step, BinaryOp::Add) {
                Ok(next) => next,
                // Stepping out of the i64 range also steps past `end`.
                Err(EvalErrorKind::IntegerOverflow { .. }) => break,
                Err(kind) => return Err(attach(kind)),
            };
            self.env
                .assign(loop_env, state.var, state.counter.clone(), token)?;
        }
        Ok(Flow::Value(last))
    }

    /// Compare the scrutinee against each pattern in order; run the first
    /// matching body. Patterns after the match are not evaluated.
    pub(super) fn eval_match(
        &mut self,
        scrutinee: &Node,
        cases: &[MatchCase],
        token: &Token,
        env: EnvId,
        tail: bool,
    ) -> EvalFlow {
        let scrutinee = try_value!(self.eval(scrutinee, env, false));
        for case in cases {
            let pattern = try_value!(self.eval(&case.pattern, env, false));
            if scrutinee.equals(&pattern) {
                tracing::trace!(%pattern, "match case taken");
                return self.eval(&case.body, env, tail);
            }
        }
        Err(no_matching_case(token))
    }
}

/// Running state of a `for` loop.
struct CountedLoop {
    var: Name,
    counter: Value,
    end: Value,
    step: Value,
    in_range: BinaryOp,
}
