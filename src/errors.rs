//! Spoof error handling.
//!
//! The rewriting pass itself never fails: malformed markers degrade to
//! ordinary code. Everything around it (parsing, file access, configuration)
//! reports through the single `SpoofError` type, rendered by `miette`.

use std::path::PathBuf;
use std::sync::Arc;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::syntax::Span;

// ============================================================================
// SOURCE CONTEXT
// ============================================================================

/// Named source text used to attach snippets to parse diagnostics.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: Arc<str>,
}

impl SourceContext {
    pub fn from_file(name: impl Into<String>, content: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Convert to `NamedSource` for miette reporting.
    pub fn to_named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.name.clone(), self.content.to_string())
    }

    /// Build a parse error pointing at `span`.
    pub fn parse_error(
        &self,
        message: impl Into<String>,
        span: Span,
        help: Option<String>,
    ) -> SpoofError {
        SpoofError::Parse {
            message: message.into(),
            src: self.to_named_source(),
            span: to_source_span(span),
            help,
        }
    }
}

// ============================================================================
// ERROR TYPE
// ============================================================================

#[derive(Debug, Error, Diagnostic)]
pub enum SpoofError {
    #[error("{message}")]
    #[diagnostic(code(spoof::parse))]
    Parse {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
    },

    /// A string escape the parser cannot turn into Unicode scalar values.
    ///
    /// Literals are held as Rust strings, so a `\u` escape naming an unpaired
    /// surrogate (`"\uD800x"`) is rejected here even though TypeScript accepts
    /// it. This is a limitation of the supported source subset.
    #[error("invalid escape sequence `{sequence}` in string literal")]
    #[diagnostic(code(spoof::parse::escape))]
    InvalidEscape {
        sequence: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("in this string")]
        span: SourceSpan,
    },

    #[error("failed to access `{}`", path.display())]
    #[diagnostic(code(spoof::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid pass configuration: {message}")]
    #[diagnostic(code(spoof::config))]
    Config { message: String },
}

impl SpoofError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SpoofError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        SpoofError::Config {
            message: message.into(),
        }
    }

    /// Stable diagnostic code, as shown by miette.
    pub fn code_str(&self) -> &'static str {
        match self {
            SpoofError::Parse { .. } => "spoof::parse",
            SpoofError::InvalidEscape { .. } => "spoof::parse::escape",
            SpoofError::Io { .. } => "spoof::io",
            SpoofError::Config { .. } => "spoof::config",
        }
    }
}

pub fn to_source_span(span: Span) -> SourceSpan {
    (span.start..span.end.max(span.start)).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_carries_named_source() {
        let ctx = SourceContext::from_file("main.ts", "const x = ;");
        let err = ctx.parse_error("expected expression", Span::new(10, 11), None);
        assert_eq!(err.code_str(), "spoof::parse");
        assert_eq!(err.to_string(), "expected expression");
        let SpoofError::Parse { span, .. } = err else {
            panic!("expected a parse error");
        };
        assert_eq!(span.offset(), 10);
        assert_eq!(span.len(), 1);
    }

    #[test]
    fn io_error_names_the_path() {
        let err = SpoofError::io(
            "missing.ts",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.to_string(), "failed to access `missing.ts`");
    }
}
