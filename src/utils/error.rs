//! Error handling for the pattern generator
//!
//! Errors fall into three tiers: the input could not be parsed, an
//! implementor rejected the input shape, or a template produced bad code.
//! The last tier is a defect in the generator itself and is never
//! suppressed.

use crate::utils::Span;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification used for exit codes and probe filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Parse,
    Validation,
    Template,
    Usage,
    Io,
}

/// Generator error
#[derive(Error, Debug, Clone)]
pub enum Error {
    // ==================== Parser Errors ====================

    #[error("{span}: unexpected token: expected {expected}, got {got}")]
    UnexpectedToken {
        expected: String,
        got: String,
        span: Span,
    },

    #[error("{span}: expected identifier, got {got}")]
    ExpectedIdent { got: String, span: Span },

    #[error("{span}: expected type, got {got}")]
    ExpectedType { got: String, span: Span },

    #[error("{span}: unsupported type: {what}")]
    UnsupportedType { what: String, span: Span },

    #[error("{span}: unbalanced block")]
    UnbalancedBlock { span: Span },

    #[error("{span}: unexpected character {ch:?}")]
    UnknownChar { ch: char, span: Span },

    #[error("input is neither an interface nor a function type: {source}")]
    NoTemplateParsed { source: Box<Error> },

    // ==================== Validation Errors ====================

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("unknown implementation: {name}")]
    UnknownImplementor { name: String },

    // ==================== Template Errors ====================

    #[error("template references unbound placeholder {{{{{key}}}}}")]
    MissingKey { key: String },

    #[error("template binding {key} is never referenced")]
    UnusedKey { key: String },

    #[error("unterminated placeholder at offset {offset}")]
    UnterminatedPlaceholder { offset: usize },

    #[error("invalid placeholder {text:?}")]
    InvalidPlaceholder { text: String },

    #[error("generated {kind} does not parse: {source}\n{text}")]
    Reparse {
        kind: &'static str,
        text: String,
        source: Box<Error>,
    },

    // ==================== IO Errors ====================

    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Get the span associated with this error
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnexpectedToken { span, .. } => Some(*span),
            Self::ExpectedIdent { span, .. } => Some(*span),
            Self::ExpectedType { span, .. } => Some(*span),
            Self::UnsupportedType { span, .. } => Some(*span),
            Self::UnbalancedBlock { span } => Some(*span),
            Self::UnknownChar { span, .. } => Some(*span),
            Self::NoTemplateParsed { source } => source.span(),
            _ => None,
        }
    }

    /// Which tier this error belongs to
    pub fn tier(&self) -> Tier {
        match self {
            Self::UnexpectedToken { .. }
            | Self::ExpectedIdent { .. }
            | Self::ExpectedType { .. }
            | Self::UnsupportedType { .. }
            | Self::UnbalancedBlock { .. }
            | Self::UnknownChar { .. }
            | Self::NoTemplateParsed { .. } => Tier::Parse,
            Self::Validation(_) => Tier::Validation,
            Self::UnknownImplementor { .. } => Tier::Usage,
            Self::MissingKey { .. }
            | Self::UnusedKey { .. }
            | Self::UnterminatedPlaceholder { .. }
            | Self::InvalidPlaceholder { .. }
            | Self::Reparse { .. } => Tier::Template,
            Self::Io(_) => Tier::Io,
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self.tier() {
            Tier::Parse => 2,
            Tier::Usage => 3,
            Tier::Validation => 4,
            Tier::Template => 70,
            Tier::Io => 74,
        }
    }
}

/// Reasons an implementor refuses an input shape
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no interface or function type found in input")]
    NothingToImplement,

    #[error("{name} is not an interface")]
    NotAnInterface { name: String },

    #[error("{name} is not a function type")]
    NotAFunctionType { name: String },

    #[error("{name} has no methods")]
    NoMethods { name: String },

    #[error("{name} should have exactly one method, found {count}")]
    NotSingleMethod { name: String, count: usize },

    #[error("{method}: expected {expected}, found {found} results")]
    ResultCount {
        method: String,
        expected: &'static str,
        found: usize,
    },

    #[error("{method}: last result must be error")]
    MissingError { method: String },

    #[error("{method}: first parameter must be context.Context")]
    MissingContext { method: String },

    #[error("{method}: expected no parameters other than a context")]
    UnexpectedParams { method: String },

    #[error("{method}: {what} must be a slice or a map")]
    NotEnumerable { method: String, what: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_map_to_exit_codes() {
        let parse = Error::ExpectedType { got: "}".into(), span: Span::dummy() };
        let validation = Error::from(ValidationError::NothingToImplement);
        let template = Error::UnusedKey { key: "x".into() };

        assert_eq!(parse.tier(), Tier::Parse);
        assert_eq!(validation.tier(), Tier::Validation);
        assert_eq!(template.tier(), Tier::Template);
        assert_eq!(template.exit_code(), 70);
        assert_eq!(parse.exit_code(), 2);
    }

    #[test]
    fn test_missing_key_message() {
        let err = Error::MissingKey { key: "Name".into() };
        assert_eq!(err.to_string(), "template references unbound placeholder {{Name}}");
    }

    #[test]
    fn test_wrapped_parse_error_keeps_span() {
        let inner = Error::UnknownChar { ch: '#', span: Span::new(3, 4, 2) };
        let err = Error::NoTemplateParsed { source: Box::new(inner) };
        assert_eq!(err.span(), Some(Span::new(3, 4, 2)));
        assert_eq!(err.tier(), Tier::Parse);
    }
}
