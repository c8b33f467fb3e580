//! Evaluation and reading recurse on the native stack. Wrapping each recursive step
//! in [`ensure_sufficient_stack`] moves onto a freshly allocated segment when the
//! current one runs low, so only the configured depth limit can stop a deep script.

/// Stack left below which a new segment is allocated.
const RED_ZONE: usize = 128 * 1024;

/// Size of each new segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
