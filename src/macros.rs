//! Convenience macros for building annotated errors in place.

/// Create an [`Error`](crate::Error) from a format string.
///
/// Expands at the call site, so the captured stack points at the caller,
/// not at a helper. Drop-in replacement for building a message error by
/// hand:
///
/// ```rust
/// use stackerr::format_err;
///
/// let step = 3;
/// let err = format_err!("failed at step {}", step);
/// assert_eq!(err.to_string(), "failed at step 3");
/// ```
#[macro_export]
macro_rules! format_err {
    ($($arg:tt)*) => {
        $crate::Error::wrap(::std::format!($($arg)*), 0)
    };
}

/// Return early with a formatted [`Error`](crate::Error).
///
/// ```rust
/// use stackerr::{bail, Result};
///
/// fn validate(value: i32) -> Result<()> {
///     if value < 0 {
///         bail!("invalid input: {}", value);
///     }
///     Ok(())
/// }
///
/// assert!(validate(-1).is_err());
/// ```
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return ::std::result::Result::Err($crate::format_err!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use crate::Result;

    #[test]
    fn test_format_err_message() {
        let err = format_err!("failed at step {}", 3);
        assert_eq!(err.to_string(), "failed at step 3");
        assert!(!err.addresses().is_empty());
    }

    #[test]
    fn test_bail_returns_early() {
        fn guarded(flag: bool) -> Result<u32> {
            if flag {
                bail!("refused: flag was {}", flag);
            }
            Ok(7)
        }

        assert_eq!(guarded(false).unwrap(), 7);
        let err = guarded(true).unwrap_err();
        assert_eq!(err.to_string(), "refused: flag was true");
    }
}
