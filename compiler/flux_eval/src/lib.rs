//! Flux evaluator.
//!
//! Walks a [`flux_ir::Block`] and produces output and a final value.
//!
//! - [`Value`]: runtime values and their canonical stringification
//! - [`Environment`]: arena of lexical scopes addressed by [`EnvId`]
//! - [`Interpreter`]: dispatch, control flow, calls, self tail calls
//! - [`builtins`]: host functions installed into the global scope
//!
//! ```ignore
//! let interner = SharedInterner::new();
//! let b = AstBuilder::new(&interner);
//! let program = b.block(vec![b.print(b.add(b.string("x="), b.int(5)))]);
//!
//! let mut interp = Interpreter::builder().interner(interner.clone()).build();
//! interp.interpret(&program);
//! ```

pub mod builtins;
mod diagnostics;
mod environment;
pub mod errors;
mod interpreter;
mod operators;
mod print_handler;
mod unary_operators;
mod value;

#[cfg(test)]
mod tests;

use std::sync::Once;

pub use diagnostics::{CallFrame, CallStack, DEFAULT_MAX_CALL_DEPTH};
pub use environment::{EnvId, Environment, ScopePin};
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use interpreter::{final_result_line, CallArgs, Callable, Interpreter, InterpreterBuilder};
pub use operators::{evaluate_binary, OpResult};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, BufferPrintHandler, PrintHandlerImpl,
    SharedPrintHandler, StdoutPrintHandler,
};
pub use unary_operators::evaluate_unary;
pub use value::{BuiltinFn, BuiltinFunction, DictValue, FunctionValue, Heap, Shared, Value};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set, e.g.
/// `RUST_LOG=flux_eval=debug` for calls or `RUST_LOG=flux_eval=trace` for
/// every evaluated node.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
