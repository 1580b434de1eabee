use std::fmt::Display;

use crate::ast::Span;

/// Whether a parse succeeded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParseStatus {
    Success,
    Failed,
}

/// A single human-readable problem found while parsing.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.message, self.span)
    }
}

/// The outcome of one of the `parse_*` entry points.
///
/// A successful parse either carries a root node, or is empty when the input contained nothing
/// but whitespace and the entry point accepts empty input. A failed parse carries at least one
/// [`Diagnostic`] and never a root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseResult<T> {
    status: ParseStatus,
    errors: Vec<Diagnostic>,
    root: Option<T>,
}

impl<T> ParseResult<T> {
    pub(crate) fn success(root: T) -> ParseResult<T> {
        ParseResult {
            status: ParseStatus::Success,
            errors: vec![],
            root: Some(root),
        }
    }

    pub(crate) fn empty() -> ParseResult<T> {
        ParseResult {
            status: ParseStatus::Success,
            errors: vec![],
            root: None,
        }
    }

    pub(crate) fn failed(errors: Vec<Diagnostic>) -> ParseResult<T> {
        debug_assert!(!errors.is_empty());

        ParseResult {
            status: ParseStatus::Failed,
            errors,
            root: None,
        }
    }

    pub fn status(&self) -> ParseStatus {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == ParseStatus::Success
    }

    /// Whether the parse succeeded without producing a node.
    pub fn is_empty(&self) -> bool {
        self.is_success() && self.root.is_none()
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn root(&self) -> Option<&T> {
        self.root.as_ref()
    }

    pub fn into_root(self) -> Option<T> {
        self.root
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParseResult<U> {
        ParseResult {
            status: self.status,
            errors: self.errors,
            root: self.root.map(f),
        }
    }

    /// Convert into a [`Result`], where an empty parse is `Ok(None)`.
    pub fn into_result(self) -> Result<Option<T>, ParseError> {
        match self.status {
            ParseStatus::Success => Ok(self.root),
            ParseStatus::Failed => Err(ParseError {
                diagnostics: self.errors,
            }),
        }
    }
}

/// The error form of a failed [`ParseResult`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{}", render(.diagnostics))]
pub struct ParseError {
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    pub(crate) fn single(message: impl Into<String>, span: Span) -> ParseError {
        ParseError {
            diagnostics: vec![Diagnostic {
                message: message.into(),
                span,
            }],
        }
    }
}

fn render(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|diagnostic| diagnostic.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
