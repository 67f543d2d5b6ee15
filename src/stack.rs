//! Raw call-stack capture.
//!
//! Only instruction pointers are recorded here; mapping them to source
//! locations is deferred to [`StackFrame`] so error construction stays cheap.

use crate::frame::StackFrame;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Default maximum number of stack frames captured per error.
pub const DEFAULT_MAX_STACK_DEPTH: usize = 50;

/// Frames contributed by `backtrace::trace`, [`capture`] itself, and one
/// constructor level. Best-effort: inlining can merge some of these, in
/// which case the trace starts a frame or two below the construction site.
pub(crate) const BASE_SKIP: usize = 4;

static MAX_STACK_DEPTH: AtomicUsize = AtomicUsize::new(DEFAULT_MAX_STACK_DEPTH);

/// Current process-wide capture depth limit.
pub fn max_stack_depth() -> usize {
    MAX_STACK_DEPTH.load(Ordering::Relaxed)
}

/// Set the process-wide capture depth limit.
///
/// Read at construction time only: changing it affects errors constructed
/// after the call, never existing ones.
pub fn set_max_stack_depth(depth: usize) {
    MAX_STACK_DEPTH.store(depth, Ordering::Relaxed);
}

/// Capture up to `max_depth` raw instruction pointers from the current call
/// stack, skipping the innermost `skip` frames.
pub(crate) fn capture(skip: usize, max_depth: usize) -> Vec<usize> {
    if max_depth == 0 {
        return Vec::new();
    }
    let mut addresses = Vec::new();
    let mut to_skip = skip;
    backtrace::trace(|frame| {
        if to_skip > 0 {
            to_skip -= 1;
            return true;
        }
        addresses.push(frame.ip() as usize);
        addresses.len() < max_depth
    });
    addresses
}

/// Render a snapshot of the current call stack, independent of any error.
///
/// Intended for ad-hoc diagnostic logging at an arbitrary program point.
pub fn current_stack() -> String {
    let mut out = String::new();
    for address in capture(BASE_SKIP, max_stack_depth()) {
        out.push_str(&StackFrame::resolve(address).to_string());
    }
    out
}
