//! Unified, `miette`-based diagnostics for the MDX pipeline.
//!
//! Every failure produced by parsing, analysis, transformation or the I/O
//! boundary is an [`MdxError`]. Variants carry the data a caller needs to file
//! an actionable report (offending token, reverted subtree text, operand
//! position) plus an [`ErrorContext`] that lets `miette` point at the source.
//!
//! Construction goes through the [`ErrorReporting`] trait so call sites never
//! assemble contexts by hand.

use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

use crate::syntax::Span;

pub type SourceArc = Arc<NamedSource<String>>;

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Type-safe error classification, used by tests and the CLI exit path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    Syntax,
    InternalParser,
    StructuralInvariant,
    MalformedMember,
    UnknownSetExpression,
    UnsupportedOperator,
    MalformedOperandType,
    Io,
    Config,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Syntax => "syntax",
            ErrorType::InternalParser => "internal_parser",
            ErrorType::StructuralInvariant => "structural_invariant",
            ErrorType::MalformedMember => "malformed_member",
            ErrorType::UnknownSetExpression => "unknown_set_expression",
            ErrorType::UnsupportedOperator => "unsupported_operator",
            ErrorType::MalformedOperandType => "malformed_operand_type",
            ErrorType::Io => "io",
            ErrorType::Config => "config",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CONTEXT
// ============================================================================

/// Minimal, composable error context for diagnostics.
#[derive(Debug, Default, Clone)]
pub struct ErrorContext {
    /// The primary source for this error (if any).
    pub source: Option<SourceArc>,
    /// The primary span for this error (if any).
    pub span: Option<Span>,
    /// An optional help message.
    pub help: Option<String>,
}

impl ErrorContext {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_source_and_span(source: SourceArc, span: Span) -> Self {
        Self {
            source: Some(source),
            span: Some(span),
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Converts a source string into an `Arc<NamedSource<String>>` for error contexts.
pub fn to_error_source(name: &str, source: &str) -> SourceArc {
    Arc::new(NamedSource::new(name, source.to_string()))
}

// ============================================================================
// ERROR TYPE
// ============================================================================

#[derive(Debug, Error)]
pub enum MdxError {
    /// Malformed query text. Surfaced verbatim, never recovered.
    #[error("Syntax error: unexpected '{token}' at line {line}, column {column}")]
    Syntax {
        token: String,
        line: usize,
        column: usize,
        raw_text: String,
        ctx: ErrorContext,
    },

    /// The parser failed for a reason other than malformed input.
    #[error("Internal parser error: {cause}")]
    InternalParser {
        cause: String,
        raw_text: String,
        ctx: ErrorContext,
    },

    /// A CST shape the extractor relies on does not hold.
    #[error("Structural invariant violated: {message}")]
    StructuralInvariant { message: String, ctx: ErrorContext },

    #[error("Malformed member '{text}': expected 2 or 3 identifiers, found {found}")]
    MalformedMember {
        text: String,
        found: usize,
        ctx: ErrorContext,
    },

    #[error("Unknown set expression '{tag}' in '{text}'")]
    UnknownSetExpression {
        tag: String,
        text: String,
        ctx: ErrorContext,
    },

    #[error("Unsupported operator '{name}': {reason}")]
    UnsupportedOperator {
        name: String,
        reason: String,
        text: String,
        ctx: ErrorContext,
    },

    #[error("Malformed operand for '{operator}': position {position} expected {expected}, found {actual}")]
    MalformedOperandType {
        operator: String,
        position: usize,
        expected: String,
        actual: String,
        ctx: ErrorContext,
    },

    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
        ctx: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config { message: String, ctx: ErrorContext },
}

impl MdxError {
    fn get_ctx(&self) -> &ErrorContext {
        match self {
            MdxError::Syntax { ctx, .. }
            | MdxError::InternalParser { ctx, .. }
            | MdxError::StructuralInvariant { ctx, .. }
            | MdxError::MalformedMember { ctx, .. }
            | MdxError::UnknownSetExpression { ctx, .. }
            | MdxError::UnsupportedOperator { ctx, .. }
            | MdxError::MalformedOperandType { ctx, .. }
            | MdxError::Io { ctx, .. }
            | MdxError::Config { ctx, .. } => ctx,
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            MdxError::Syntax { .. } => ErrorType::Syntax,
            MdxError::InternalParser { .. } => ErrorType::InternalParser,
            MdxError::StructuralInvariant { .. } => ErrorType::StructuralInvariant,
            MdxError::MalformedMember { .. } => ErrorType::MalformedMember,
            MdxError::UnknownSetExpression { .. } => ErrorType::UnknownSetExpression,
            MdxError::UnsupportedOperator { .. } => ErrorType::UnsupportedOperator,
            MdxError::MalformedOperandType { .. } => ErrorType::MalformedOperandType,
            MdxError::Io { .. } => ErrorType::Io,
            MdxError::Config { .. } => ErrorType::Config,
        }
    }

    /// Builds an I/O error for the export and configuration boundary.
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        MdxError::Io {
            message: message.into(),
            source: Some(source),
            ctx: ErrorContext::none(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        MdxError::Config {
            message: message.into(),
            ctx: ErrorContext::none(),
        }
    }

    fn label(&self) -> String {
        match self {
            MdxError::Syntax { .. } => "unexpected token".into(),
            MdxError::InternalParser { .. } => "parser failed here".into(),
            MdxError::StructuralInvariant { .. } => "unexpected structure".into(),
            MdxError::MalformedMember { found, .. } => format!("{found} identifier(s)"),
            MdxError::UnknownSetExpression { tag, .. } => format!("'{tag}' is not a set expression"),
            MdxError::UnsupportedOperator { name, .. } => format!("'{name}' is not supported"),
            MdxError::MalformedOperandType { expected, .. } => format!("expected {expected}"),
            MdxError::Io { .. } => "i/o failure".into(),
            MdxError::Config { .. } => "invalid configuration".into(),
        }
    }
}

impl Diagnostic for MdxError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(format!("mdx::{}", self.error_type())))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.get_ctx()
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.get_ctx()
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.get_ctx().span?;
        let len = if span.end > span.start {
            span.end - span.start
        } else {
            1
        };
        let label = LabeledSpan::new(Some(self.label()), span.start, len);
        Some(Box::new(std::iter::once(label)))
    }
}

// ============================================================================
// CONTEXT-AWARE CONSTRUCTION
// ============================================================================

/// Context-aware error creation. Implementors know the source text errors
/// should point into; the provided methods build every semantic error kind.
pub trait ErrorReporting {
    /// Named source used for labels.
    fn error_source(&self) -> SourceArc;

    fn context(&self, span: Span) -> ErrorContext {
        ErrorContext::with_source_and_span(self.error_source(), span)
    }

    fn structural_invariant(&self, message: impl Into<String>, span: Span) -> MdxError {
        MdxError::StructuralInvariant {
            message: message.into(),
            ctx: self
                .context(span)
                .with_help("This indicates a defect in the grammar or CST provider, not in the query."),
        }
    }

    fn malformed_member(&self, text: &str, found: usize, span: Span) -> MdxError {
        MdxError::MalformedMember {
            text: text.to_string(),
            found,
            ctx: self
                .context(span)
                .with_help("Members are written [dimension].[element] or [dimension].[hierarchy].[element]."),
        }
    }

    fn unknown_set_expression(&self, tag: &str, text: &str, span: Span) -> MdxError {
        MdxError::UnknownSetExpression {
            tag: tag.to_string(),
            text: text.to_string(),
            ctx: self.context(span),
        }
    }

    fn unsupported_operator(&self, name: &str, reason: &str, text: &str, span: Span) -> MdxError {
        MdxError::UnsupportedOperator {
            name: name.to_string(),
            reason: reason.to_string(),
            text: text.to_string(),
            ctx: self.context(span).with_help(format!(
                "If '{text}' is valid MDX, report it together with the full query."
            )),
        }
    }

    fn malformed_operand(
        &self,
        operator: &str,
        position: usize,
        expected: &str,
        actual: &str,
        span: Span,
    ) -> MdxError {
        MdxError::MalformedOperandType {
            operator: operator.to_string(),
            position,
            expected: expected.to_string(),
            actual: actual.to_string(),
            ctx: self.context(span),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl ErrorReporting for Fixed {
        fn error_source(&self) -> SourceArc {
            to_error_source("query.mdx", "SELECT [A] FROM [C]")
        }
    }

    #[test]
    fn diagnostic_code_follows_error_type() {
        let err = Fixed.malformed_member("[A]", 1, Span::new(7, 10));
        assert_eq!(err.error_type(), ErrorType::MalformedMember);
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("mdx::malformed_member"));
    }

    #[test]
    fn labels_point_at_span() {
        let err = Fixed.unknown_set_expression("tuple", "([A])", Span::new(7, 10));
        let labels: Vec<_> = err.labels().map(|l| l.collect()).unwrap_or_default();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), 7);
        assert_eq!(labels[0].len(), 3);
    }

    #[test]
    fn empty_span_still_gets_a_label() {
        let err = Fixed.structural_invariant("missing cube", Span::new(4, 4));
        let labels: Vec<_> = err.labels().map(|l| l.collect()).unwrap_or_default();
        assert_eq!(labels[0].len(), 1);
    }

    #[test]
    fn message_names_operand_position() {
        let err = Fixed.malformed_operand("filter_by_level", 2, "number", "string", Span::new(0, 1));
        assert_eq!(
            err.to_string(),
            "Malformed operand for 'filter_by_level': position 2 expected number, found string"
        );
    }
}
