//! # stackerr
//!
//! Errors that carry the call stack from the point where they were created.
//!
//! ## Design Philosophy
//!
//! - **Capture eagerly, resolve lazily**: raw instruction pointers are
//!   recorded the moment an error is constructed; symbol resolution only
//!   runs when a trace is actually rendered, and the result is cached.
//! - **Total operations**: construction, wrapping, and rendering never fail
//!   and never panic. An address that cannot be resolved renders as a
//!   placeholder frame instead of aborting the trace.
//! - **Idempotent wrapping**: wrapping an already-annotated error is a
//!   no-op that preserves the original stack, so helpers can wrap freely.
//! - **Identity comparison**: [`is`] compares errors by unwrapped identity,
//!   not by message text.
//!
//! ## Usage
//!
//! ```rust
//! use stackerr::{Error, Result};
//!
//! fn load_config(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .map_err(|e| Error::wrap_prefix(e, "loading config", 0))
//! }
//!
//! if let Err(err) = load_config("missing.conf") {
//!     // "loading config: <io message>" followed by the captured stack
//!     let _report = err.error_stack();
//! }
//! ```

mod error;
mod frame;
mod macros;
mod stack;

pub use error::{is, unwrap_cause, Error};
pub use frame::StackFrame;
pub use stack::{current_stack, max_stack_depth, set_max_stack_depth, DEFAULT_MAX_STACK_DEPTH};

/// Result type alias using the annotated [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
