//! Native stack growth for the Flux evaluator.
//!
//! The evaluator walks the syntax tree recursively: every nested expression,
//! block, and non-tail function call costs native stack frames. Call depth is
//! bounded by the evaluator's own `CallStack` limit, so the native stack must
//! never be the thing that gives out first. Every recursive evaluation step is
//! wrapped in [`ensure_sufficient_stack`], which switches to a freshly
//! allocated segment when the current one runs low.
//!
//! On `wasm32` the guard is a passthrough; the host manages the stack there.

/// Remaining-stack threshold below which a new segment is allocated.
pub const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
pub const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the native stack if less than [`RED_ZONE`] bytes remain.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// Passthrough on WASM.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Bytes of native stack left on the current segment, when the platform can tell.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn remaining_stack() -> Option<usize> {
    stacker::remaining_stack()
}

/// WASM cannot report remaining stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn remaining_stack() -> Option<usize> {
    None
}
