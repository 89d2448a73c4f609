use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::ast::Span;

/// Parse failures. Spans are byte offsets into the parsed source.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("invalid syntax: {message}")]
    #[diagnostic(code(astrewrite::syntax::invalid))]
    Invalid {
        message: String,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("unexpected indent")]
    #[diagnostic(code(astrewrite::syntax::unexpected_indent))]
    UnexpectedIndent {
        #[label("this line is indented deeper than its block")]
        span: SourceSpan,
    },

    #[error("expected an indented block after `{header}`")]
    #[diagnostic(code(astrewrite::syntax::expected_block))]
    ExpectedIndentedBlock {
        header: &'static str,
        #[label("block header")]
        span: SourceSpan,
    },

    #[error("`{clause}` without a matching statement")]
    #[diagnostic(
        code(astrewrite::syntax::unexpected_clause),
        help("`elif` must follow `if`; `else` must follow `if`, `for` or `while`")
    )]
    UnexpectedClause {
        clause: &'static str,
        #[label("dangling clause")]
        span: SourceSpan,
    },

    #[error("invalid {literal_type} literal `{value}`")]
    #[diagnostic(code(astrewrite::syntax::invalid_literal))]
    InvalidLiteral {
        literal_type: &'static str,
        value: String,
        #[label("literal")]
        span: SourceSpan,
    },

    #[error("unterminated string literal")]
    #[diagnostic(code(astrewrite::syntax::unterminated_string))]
    UnterminatedString {
        #[label("string starts here")]
        span: SourceSpan,
    },

    #[error("no top-level function named `{name}`")]
    #[diagnostic(code(astrewrite::syntax::function_not_found))]
    FunctionNotFound { name: String },
}

impl SyntaxError {
    pub(crate) fn invalid(message: impl Into<String>, span: Span) -> Self {
        SyntaxError::Invalid {
            message: message.into(),
            span: span.into(),
        }
    }
}
