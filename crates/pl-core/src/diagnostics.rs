use crate::span::Span;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

/// Stable numeric codes for expansion failures. The set is extendable but
/// existing numbers never change meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DiagnosticCode {
    /// Pipeline entry referenced but never invoked as a call.
    EntryNotInvoked,
    /// Pipeline entry invoked with more than one argument.
    EntryArity,
    /// A chain never reaches its finalizing call.
    UnterminatedChain,
    /// Member on a chain is not a recognized stage name.
    UnknownStage,
    /// Unsupported continuation after a recognized stage name.
    StageNotInvoked,
    /// `await` stage invoked with arguments.
    SuspendArity,
    /// Suspend stage used where the enclosing context cannot suspend.
    SuspendContext,
    /// Inline callback parameter/argument count mismatch.
    InlineArity,
    /// Stage invoked without its callable/predicate argument.
    StageArity,
    /// Finalizing call invoked with arguments.
    TerminalArity,
}

impl DiagnosticCode {
    pub fn code(&self) -> u16 {
        match self {
            DiagnosticCode::EntryNotInvoked => 1,
            DiagnosticCode::EntryArity => 2,
            DiagnosticCode::UnterminatedChain => 3,
            DiagnosticCode::UnknownStage => 4,
            DiagnosticCode::StageNotInvoked => 5,
            DiagnosticCode::SuspendArity => 6,
            DiagnosticCode::SuspendContext => 7,
            DiagnosticCode::InlineArity => 8,
            DiagnosticCode::StageArity => 9,
            DiagnosticCode::TerminalArity => 10,
        }
    }
}

impl Display for DiagnosticCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ERR{}", self.code())
    }
}

/// Structured expansion diagnostic. Presentation beyond the plain rendering
/// is the caller's concern; the excerpt is attached only when the caller
/// supplied unit source.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub code: DiagnosticCode,
    pub message: String,
    pub span: Option<Span>,
    pub source_context: Option<String>,
}

impl Diagnostic {
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            code,
            message: message.into(),
            span: None,
            source_context: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach a rendered excerpt of `source` around this diagnostic's span.
    /// A dummy or missing span leaves the diagnostic unchanged.
    pub fn with_excerpt_from(mut self, source: &str) -> Self {
        if let Some(span) = self.span.filter(|span| !span.is_dummy()) {
            self.source_context = render_excerpt(source, span);
        }
        self
    }

    /// Single-line rendering: `ERR3: Unterminated pipe chain`.
    pub fn render_plain(&self) -> String {
        match self.span {
            Some(span) if !span.is_dummy() => {
                format!("{}: {} [{}]", self.code, self.message, span)
            }
            _ => format!("{}: {}", self.code, self.message),
        }
    }

    /// Multi-line rendering including the source excerpt when present.
    pub fn render_pretty(&self) -> String {
        let mut out = self.render_plain();
        if let Some(context) = &self.source_context {
            out.push('\n');
            out.push_str(context);
        }
        out
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render_plain())
    }
}

impl std::error::Error for Diagnostic {}

/// Render the source lines covered by `span` with a caret marker under the
/// offending range, e.g.
///
/// ```text
///   3 | Pipe(10).thru(f).tap
///     |                  ^^^
/// ```
pub fn render_excerpt(source: &str, span: Span) -> Option<String> {
    let lo = span.lo as usize;
    let hi = (span.hi as usize).min(source.len()).max(lo);
    if lo > source.len() {
        return None;
    }

    let line_start = source[..lo].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = source[hi..]
        .find('\n')
        .map(|i| hi + i)
        .unwrap_or(source.len());
    let line_no = source[..lo].matches('\n').count() + 1;

    let mut out = String::new();
    let mut offset = line_start;
    for (idx, line) in source[line_start..line_end].split('\n').enumerate() {
        let no = line_no + idx;
        out.push_str(&format!("{:>4} | {}\n", no, line));
        let caret_lo = lo.max(offset) - offset;
        let caret_hi = (hi.min(offset + line.len())).max(lo.max(offset)) - offset;
        let width = (caret_hi - caret_lo).max(1);
        out.push_str(&format!(
            "     | {}{}\n",
            " ".repeat(caret_lo),
            "^".repeat(width)
        ));
        offset += line.len() + 1;
    }
    Some(out.trim_end_matches('\n').to_string())
}
