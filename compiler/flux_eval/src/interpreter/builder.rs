//! `InterpreterBuilder` for creating Interpreter instances with various configurations.

use flux_ir::SharedInterner;

use super::Interpreter;
use crate::diagnostics::{CallStack, DEFAULT_MAX_CALL_DEPTH};
use crate::environment::Environment;
use crate::{builtins, stdout_handler, SharedPrintHandler};

/// Builder for [`Interpreter`].
///
/// Defaults: a fresh interner, stdout output, and a call depth limit of
/// [`DEFAULT_MAX_CALL_DEPTH`].
pub struct InterpreterBuilder {
    interner: Option<SharedInterner>,
    print_handler: Option<SharedPrintHandler>,
    max_call_depth: Option<usize>,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self {
            interner: None,
            print_handler: None,
            max_call_depth: Some(DEFAULT_MAX_CALL_DEPTH),
        }
    }

    /// Share the interner the program's tree was built with.
    ///
    /// Required whenever the tree was built outside the interpreter, so that
    /// names in the tree and names of builtins agree.
    #[must_use]
    pub fn interner(mut self, interner: SharedInterner) -> Self {
        self.interner = Some(interner);
        self
    }

    /// Where `print` output and error reports go.
    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    /// Maximum depth of nested user-function calls; `None` for unlimited.
    /// Self tail calls do not count toward the depth.
    #[must_use]
    pub fn max_call_depth(mut self, depth: Option<usize>) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn build(self) -> Interpreter {
        let interner = self.interner.unwrap_or_default();
        let mut env = Environment::new();
        builtins::install(&mut env, &interner);
        tracing::debug!(
            builtins = builtins::BUILTINS.len(),
            max_call_depth = ?self.max_call_depth,
            "interpreter built"
        );

        Interpreter {
            interner,
            env,
            call_stack: CallStack::new(self.max_call_depth),
            print_handler: self.print_handler.unwrap_or_else(stdout_handler),
        }
    }
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
