//! Call stack tracking.
//!
//! One [`CallFrame`] per active user-function call. The stack enforces the
//! recursion limit and answers "which function is running", which is what
//! self tail call detection needs.

use flux_ir::Token;

use crate::errors::{recursion_limit_exceeded, EvalError};
use crate::value::{FunctionValue, Heap};

/// Default maximum call depth.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 3000;

/// A single active call.
#[derive(Clone, Debug)]
pub struct CallFrame {
    pub function: Heap<FunctionValue>,
    /// Where the call was made, for errors and tracing.
    pub call_token: Token,
}

/// Live call stack for the interpreter.
///
/// ```ignore
/// stack.push(CallFrame { function, call_token })?;
/// // ... evaluate body ...
/// stack.pop();
/// ```
#[derive(Clone, Debug)]
pub struct CallStack {
    frames: Vec<CallFrame>,
    max_depth: Option<usize>,
}

impl CallStack {
    /// `None` means unlimited.
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Push a frame, failing with `StackOverflow` at the depth limit.
    ///
    /// The frame is not pushed on failure.
    pub fn push(&mut self, frame: CallFrame) -> Result<(), EvalError> {
        if let Some(max) = self.max_depth {
            if self.frames.len() >= max {
                return Err(recursion_limit_exceeded(max, &frame.call_token));
            }
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) {
        debug_assert!(
            !self.frames.is_empty(),
            "CallStack::pop() called on empty stack"
        );
        self.frames.pop();
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// The function whose body is executing, if any.
    pub fn current_function(&self) -> Option<&Heap<FunctionValue>> {
        self.frames.last().map(|frame| &frame.function)
    }

    /// Whether `function` is the one currently executing.
    pub fn is_current(&self, function: &Heap<FunctionValue>) -> bool {
        self.current_function()
            .is_some_and(|current| Heap::ptr_eq(current, function))
    }

    /// Labels of the active calls, innermost first.
    pub fn backtrace(&self) -> Vec<String> {
        self.frames
            .iter()
            .rev()
            .map(|f| format!("{} (line {})", f.function.label(), f.call_token.line))
            .collect()
    }

    /// Drop every frame. Used after an aborted run.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new(Some(DEFAULT_MAX_CALL_DEPTH))
    }
}
