use pl_core::diagnostics::{Diagnostic, DiagnosticCode};
use pl_core::error::Error;
use pl_core::span::Span;

/// Create an expansion error carrying a stable diagnostic code.
pub fn expand_error(code: DiagnosticCode, message: impl Into<String>) -> Error {
    Error::Expand(Diagnostic::error(code, message))
}

/// Create an expansion error anchored at a source span.
pub fn expand_error_with_span(
    code: DiagnosticCode,
    message: impl Into<String>,
    span: Span,
) -> Error {
    Error::Expand(Diagnostic::error(code, message).with_span(span))
}

/// Create a generic error (when there is no specific diagnostic to attach)
pub fn generic_error(message: impl Into<eyre::Error>) -> Error {
    Error::from(message.into().to_string())
}

// Convenience macros for generating expansion errors

/// Macro to return early with an expansion error
#[macro_export]
macro_rules! expand_bail {
    ($code:expr, $message:expr) => {
        return Err($crate::error::expand_error($code, $message))
    };
    ($code:expr, $message:expr, $span:expr) => {
        return Err($crate::error::expand_error_with_span($code, $message, $span))
    };
}

/// Macro to ensure a condition holds, or return an expansion error
#[macro_export]
macro_rules! expand_ensure {
    ($cond:expr, $code:expr, $message:expr) => {
        if !($cond) {
            $crate::expand_bail!($code, $message);
        }
    };
    ($cond:expr, $code:expr, $message:expr, $span:expr) => {
        if !($cond) {
            $crate::expand_bail!($code, $message, $span);
        }
    };
}
