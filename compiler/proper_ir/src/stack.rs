//! Stack growth for the recursive parser and evaluator.
//!
//! Configuration values nest arbitrarily (`div(div(div(...)))`, deeply nested
//! list literals), and both the parser and the interpreter recurse once per
//! level. Entry points wrap themselves in [`ensure_sufficient_stack`] so deep
//! nesting grows the stack instead of overflowing it.

/// Remaining stack below which we allocate a new segment (64KB).
const RED_ZONE: usize = 64 * 1024;

/// Size of each freshly allocated stack segment (1MB).
const SEGMENT_SIZE: usize = 1024 * 1024;

/// Run `f`, growing the stack first if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack; call straight through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
