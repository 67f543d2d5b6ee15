//! The annotated error type: an error value plus the call stack captured
//! where it was created.

use crate::frame::StackFrame;
use crate::stack::{self, BASE_SKIP};
use once_cell::sync::OnceCell;
use std::any::{self, Any};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error as ThisError;

/// Type name reported for errors built from a recovered panic payload.
const PANIC_TYPE_NAME: &str = "panic";

/// An error with an attached stack trace.
///
/// Wraps any [`std::error::Error`] or plain message, recording raw
/// instruction pointers at construction time. Resolution of those pointers
/// to source locations happens lazily on first access and is cached for the
/// lifetime of the value. Cloning is cheap and shares the captured stack,
/// the cache, and the underlying cause.
///
/// # Example
///
/// ```rust
/// use stackerr::Error;
///
/// let err = Error::new("boom");
/// assert_eq!(err.to_string(), "boom");
/// assert!(err.error_stack().starts_with("boom\n"));
/// ```
#[derive(Clone)]
pub struct Error {
    inner: Arc<Inner>,
    prefix: Option<String>,
}

struct Inner {
    cause: Arc<dyn StdError + Send + Sync>,
    type_name: &'static str,
    stack: Vec<usize>,
    frames: OnceCell<Vec<StackFrame>>,
}

/// Payload recovered from a panic, carried as the underlying error.
#[derive(Debug, ThisError)]
#[error("{0}")]
struct PanicError(String);

impl Error {
    /// Make an `Error` from the given value.
    ///
    /// An error value is used directly as the cause; a string or other
    /// convertible value is turned into one. The captured stack points at
    /// the line of code that called `new`.
    pub fn new<E>(value: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        let type_name = any::type_name::<E>();
        Self::annotate(value.into(), type_name, BASE_SKIP, stack::max_stack_depth())
    }

    /// Make an `Error` from the given value, skipping `skip` extra caller
    /// frames from the captured stack (0 = from the caller of `wrap`).
    ///
    /// Idempotent: a value that is already an annotated `Error` is returned
    /// unchanged, original stack and prefix preserved.
    pub fn wrap<E>(value: E, skip: usize) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        let type_name = any::type_name::<E>();
        match value.into().downcast::<Error>() {
            Ok(already) => *already,
            Err(other) => {
                Self::annotate(other, type_name, BASE_SKIP + skip, stack::max_stack_depth())
            }
        }
    }

    /// Like [`Error::wrap`], then set the message prefix.
    ///
    /// If the wrapped error already carries a prefix, the new one is joined
    /// in front of it with `": "`.
    pub fn wrap_prefix<E>(value: E, prefix: impl Into<String>, skip: usize) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        let mut err = Self::wrap(value, skip + 1);
        err.prefix = Some(match err.prefix.take() {
            Some(existing) => format!("{}: {}", prefix.into(), existing),
            None => prefix.into(),
        });
        err
    }

    /// Like [`Error::wrap`] with an explicit capture depth instead of the
    /// process-wide limit. Lets tests vary the depth without touching
    /// global state.
    pub fn wrap_with_depth<E>(value: E, skip: usize, max_depth: usize) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        let type_name = any::type_name::<E>();
        match value.into().downcast::<Error>() {
            Ok(already) => *already,
            Err(other) => Self::annotate(other, type_name, BASE_SKIP + skip, max_depth),
        }
    }

    /// Make an `Error` from a payload recovered via
    /// [`std::panic::catch_unwind`].
    ///
    /// `&str` and `String` payloads keep their message; anything else
    /// renders as a generic one. [`Error::type_name`] reports `"panic"`.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::annotate(
            Box::new(PanicError(message)),
            PANIC_TYPE_NAME,
            BASE_SKIP,
            stack::max_stack_depth(),
        )
    }

    fn annotate(
        cause: Box<dyn StdError + Send + Sync>,
        type_name: &'static str,
        skip: usize,
        max_depth: usize,
    ) -> Self {
        Error {
            inner: Arc::new(Inner {
                cause: Arc::from(cause),
                type_name,
                stack: stack::capture(skip, max_depth),
                frames: OnceCell::new(),
            }),
            prefix: None,
        }
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// The underlying error this one annotates.
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.inner.cause
    }

    /// The message prefix, if one was set by [`Error::wrap_prefix`].
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// The raw instruction pointers captured at construction.
    pub fn addresses(&self) -> &[usize] {
        &self.inner.stack
    }

    /// The captured stack resolved to source locations.
    ///
    /// Resolution runs once, on first call, and the cached slice is
    /// returned thereafter; its length always equals
    /// [`addresses`](Error::addresses).
    pub fn stack_frames(&self) -> &[StackFrame] {
        self.inner.frames.get_or_init(|| {
            self.inner
                .stack
                .iter()
                .map(|&address| StackFrame::resolve(address))
                .collect()
        })
    }

    /// The rendered stack trace: every frame block concatenated in capture
    /// order, construction site first.
    pub fn stack(&self) -> String {
        let mut out = String::new();
        for frame in self.stack_frames() {
            out.push_str(&frame.to_string());
        }
        out
    }

    /// The error message followed by the rendered stack trace.
    pub fn error_stack(&self) -> String {
        format!("{}\n{}", self, self.stack())
    }

    /// The underlying type name, a space, then [`Error::error_stack`].
    pub fn type_error_stack(&self) -> String {
        format!("{} {}", self.type_name(), self.error_stack())
    }

    /// The type identifier of the underlying value, captured at
    /// construction, or the sentinel `"panic"` for panic-derived errors.
    pub fn type_name(&self) -> &'static str {
        self.inner.type_name
    }

    fn cause_ptr(&self) -> *const () {
        Arc::as_ptr(&self.inner.cause) as *const ()
    }
}

/// Detect whether two errors are the same after unwrapping.
///
/// Errors are equal if they are the same object, or if their fully
/// unwrapped underlying values are the same object. This is identity, not
/// message equality: two independently constructed errors with identical
/// text are not equal.
pub fn is(a: &(dyn StdError + 'static), b: &(dyn StdError + 'static)) -> bool {
    innermost(a) == innermost(b)
}

fn innermost(e: &(dyn StdError + 'static)) -> *const () {
    match e.downcast_ref::<Error>() {
        Some(annotated) => {
            let cause: &(dyn StdError + 'static) = annotated.cause();
            // The cause may itself be an annotated error when one was
            // passed to `new` rather than `wrap`.
            if cause.downcast_ref::<Error>().is_some() {
                innermost(cause)
            } else {
                annotated.cause_ptr()
            }
        }
        None => e as *const dyn StdError as *const (),
    }
}

/// Return the innermost underlying error of the given value.
///
/// An annotated [`Error`] yields its shared cause; a plain error or message
/// is converted and returned as-is.
pub fn unwrap_cause<E>(value: E) -> Arc<dyn StdError + Send + Sync>
where
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    match value.into().downcast::<Error>() {
        Ok(annotated) => annotated.inner.cause.clone(),
        Err(other) => Arc::from(other),
    }
}

// =============================================================================
// Display - the prefixed message; Debug - message plus stack trace
// =============================================================================

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}: {}", prefix, self.inner.cause),
            None => write!(f, "{}", self.inner.cause),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{self}")?;
        writeln!(f)?;
        writeln!(f, "Stack trace:")?;
        write!(f, "{}", self.stack())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        let cause: &(dyn StdError + 'static) = &*self.inner.cause;
        Some(cause)
    }
}
