//! Resolution of raw instruction pointers to source locations.

use std::ffi::c_void;
use std::fmt;

/// Placeholder for fields an address could not be resolved to.
pub const UNKNOWN: &str = "unknown";

/// A single call-stack frame resolved to human-readable source info.
///
/// All fields are best-effort: an address the symbol tables cannot map
/// yields placeholder values and `resolved == false` rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Raw instruction pointer this frame was resolved from.
    pub address: usize,
    /// Source file path, or `"unknown"`.
    pub file: String,
    /// 1-based line number, or 0 when unresolved.
    pub line_number: u32,
    /// Function name without its module path, or `"unknown"`.
    pub function_name: String,
    /// Module path of the function, or `"unknown"`.
    pub module_name: String,
    /// Whether symbol resolution produced real location info.
    pub resolved: bool,
}

impl StackFrame {
    /// Resolve a raw instruction pointer to source info.
    ///
    /// Never fails: an unmappable address yields a placeholder frame.
    pub fn resolve(address: usize) -> Self {
        let mut frame = StackFrame::unresolved(address);
        let mut seen = false;
        backtrace::resolve(address as *mut c_void, |symbol| {
            // An address can map to several inlined symbols; keep the
            // innermost one, which is reported first.
            if seen {
                return;
            }
            seen = true;
            if let Some(name) = symbol.name() {
                let demangled = format!("{name:#}");
                let (module, function) = split_symbol(&demangled);
                frame.module_name = module;
                frame.function_name = function;
                frame.resolved = true;
            }
            if let Some(file) = symbol.filename() {
                frame.file = file.display().to_string();
                frame.resolved = true;
            }
            if let Some(line) = symbol.lineno() {
                frame.line_number = line;
            }
        });
        frame
    }

    fn unresolved(address: usize) -> Self {
        StackFrame {
            address,
            file: UNKNOWN.to_string(),
            line_number: 0,
            function_name: UNKNOWN.to_string(),
            module_name: UNKNOWN.to_string(),
            resolved: false,
        }
    }
}

/// Split a demangled symbol into module path and bare function name.
fn split_symbol(demangled: &str) -> (String, String) {
    match demangled.rfind("::") {
        Some(idx) => (demangled[..idx].to_string(), demangled[idx + 2..].to_string()),
        None => (UNKNOWN.to_string(), demangled.to_string()),
    }
}

impl fmt::Display for StackFrame {
    /// Renders the conventional two-line block:
    ///
    /// ```text
    /// module::function (0x1234)
    ///     file.rs:42
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.module_name == UNKNOWN {
            writeln!(f, "{} (0x{:x})", self.function_name, self.address)?;
        } else {
            writeln!(
                f,
                "{}::{} (0x{:x})",
                self.module_name, self.function_name, self.address
            )?;
        }
        writeln!(f, "\t{}:{}", self.file, self.line_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmappable_address_yields_placeholder() {
        let frame = StackFrame::resolve(1);
        assert!(!frame.resolved);
        assert_eq!(frame.function_name, UNKNOWN);
        assert_eq!(frame.file, UNKNOWN);
        assert_eq!(frame.line_number, 0);
    }

    #[test]
    fn test_display_is_two_line_block() {
        let frame = StackFrame::resolve(1);
        let rendered = frame.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("(0x1)"));
        assert!(lines[1].starts_with('\t'));
        assert!(lines[1].contains("unknown:0"));
    }

    #[test]
    fn test_split_symbol() {
        let (module, function) = split_symbol("app::storage::save");
        assert_eq!(module, "app::storage");
        assert_eq!(function, "save");

        let (module, function) = split_symbol("main");
        assert_eq!(module, UNKNOWN);
        assert_eq!(function, "main");
    }
}
