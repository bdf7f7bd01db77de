// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::source::Span;
use crate::Rc;
use thiserror::Error;

type String = Rc<str>;

/// Errors raised while resolving a statement tree into an effective model.
///
/// Inference errors carry the span of the offending statement or argument;
/// [`Error::report`] renders them anchored to the source line. Registration
/// errors have no source location.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Constraint boundary that parses as neither a number nor `min`/`max`
    #[error("value '{value}' is not a valid {expected}")]
    MalformedConstraint {
        value: String,
        expected: String,
        span: Span,
    },
    /// Sub-range with lower boundary above its upper boundary
    #[error("range constraint '{range}' has descending order of boundaries; should be ascending")]
    DescendingBounds { range: String, span: Span },
    /// Sub-range with more than two `..`-separated boundaries
    #[error("wrong number of boundaries in range constraint '{range}'")]
    TooManyBoundaries { range: String, span: Span },
    /// Sub-ranges that are not disjoint and ascending left to right
    #[error("some of the value ranges in '{expression}' are not disjoint")]
    OverlappingRanges { expression: String, span: Span },
    /// Identity derivation reached a parent whose path is not yet resolved
    #[error("parent path of '{keyword}' has not been resolved")]
    MissingParentPath { keyword: String, span: Span },
    /// Statement kind with no registered support
    #[error("unknown statement kind '{keyword}'")]
    UnknownStatementKind { keyword: String, span: Span },
    /// Substatement set violates the parent kind's cardinality table
    #[error("{detail}")]
    SubstatementValidation { detail: String, span: Span },

    /// Source text too large for u32 spans
    #[error("{file} exceeds maximum allowed schema source size")]
    SourceTooLarge { file: String },
    /// Support registration under a kind that is already taken
    #[error("support registration failed: kind '{keyword}' is already registered")]
    AlreadyRegistered { keyword: String },
    /// Support registration under an empty or whitespace-only kind
    #[error("support registration failed: kind '{keyword}' is invalid (empty or whitespace-only kinds are not allowed)")]
    InvalidKeyword { keyword: String },
}

impl Error {
    /// Span of the offending text, when the error is anchored to one.
    pub fn span(&self) -> Option<&Span> {
        match self {
            Error::MalformedConstraint { span, .. }
            | Error::DescendingBounds { span, .. }
            | Error::TooManyBoundaries { span, .. }
            | Error::OverlappingRanges { span, .. }
            | Error::MissingParentPath { span, .. }
            | Error::UnknownStatementKind { span, .. }
            | Error::SubstatementValidation { span, .. } => Some(span),
            Error::SourceTooLarge { .. }
            | Error::AlreadyRegistered { .. }
            | Error::InvalidKeyword { .. } => None,
        }
    }

    /// Diagnostic with the source line and a caret pointing at the
    /// offending text, in the form emitted by [`Source::message`].
    ///
    /// [`Source::message`]: crate::Source::message
    pub fn report(&self) -> std::string::String {
        match self.span() {
            Some(span) => span.message("error", &self.to_string()),
            None => self.to_string(),
        }
    }
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
