//! Rewrite diagnostics.
//!
//! Every fatal condition raised by a transformation pass is a [`RewriteError`]
//! variant. Each variant carries the span of the offending node so the CLI can
//! render a labelled `miette` report once the source is attached with
//! [`miette::Report::with_source_code`].
//!
//! Iterator expressions that fail constant evaluation are *not* errors: the
//! unrollers treat an [`crate::runtime::EvalError`] as "leave the loop alone"
//! and never surface it.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Fatal, user-facing failures of a rewrite pass.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum RewriteError {
    #[error("unrolling range({start}, {stop}, {step}) is not supported: only ranges with step 1 or -1 can be unrolled by a factor")]
    #[diagnostic(code(astrewrite::unroll::unsupported_step))]
    UnsupportedStep {
        start: i64,
        stop: i64,
        step: i64,
        #[label("unsupported step")]
        span: SourceSpan,
    },

    #[error("factor {factor} is larger than the iteration range of {extent}")]
    #[diagnostic(
        code(astrewrite::unroll::factor_too_large),
        help("pick a factor no larger than the iteration range")
    )]
    FactorTooLarge {
        factor: u64,
        extent: u64,
        #[label("loop iterator")]
        span: SourceSpan,
    },

    #[error("the iteration range {extent} is not exactly divisible by factor {factor}")]
    #[diagnostic(
        code(astrewrite::unroll::factor_not_divisible),
        help("pick a factor that divides the iteration range")
    )]
    FactorNotDivisible {
        factor: u64,
        extent: u64,
        #[label("loop iterator")]
        span: SourceSpan,
    },

    #[error("unrolling by factor {factor} would emit {copies} statements, more than the limit of {limit}")]
    #[diagnostic(
        code(astrewrite::unroll::too_many_copies),
        help("pick a smaller factor")
    )]
    TooManyCopies {
        factor: u64,
        copies: u64,
        limit: usize,
        #[label("loop iterator")]
        span: SourceSpan,
    },

    #[error("unroll factor must be non-zero")]
    #[diagnostic(code(astrewrite::unroll::invalid_factor))]
    InvalidFactor,

    #[error("cannot unroll over non-int element {element} of type {type_name}")]
    #[diagnostic(code(astrewrite::unroll::unsupported_element))]
    UnsupportedUnrollElement {
        element: String,
        #[label("iterator yields this element")]
        span: SourceSpan,
        type_name: &'static str,
    },

    #[error("cannot unroll a loop whose target is a {kind}; only plain names are supported")]
    #[diagnostic(code(astrewrite::unroll::unsupported_target))]
    UnsupportedLoopTarget {
        kind: &'static str,
        #[label("loop target")]
        span: SourceSpan,
    },

    #[error("unsupported node {kind}: no replacement key can be derived from it")]
    #[diagnostic(code(astrewrite::replace::unsupported_node))]
    UnsupportedNodeKind {
        kind: &'static str,
        #[label("no key for this node")]
        span: SourceSpan,
    },

    #[error("not implemented: {feature}")]
    #[diagnostic(
        code(astrewrite::unroll::not_implemented),
        help("only `for` loops over a range, eg `for i in range(22)`, can be unrolled by a factor")
    )]
    NotImplemented {
        feature: &'static str,
        #[label("unroll-marked iterator")]
        span: SourceSpan,
    },
}

/// A pass failure, tagged with the pass that raised it.
#[derive(Error, Diagnostic, Debug)]
#[error("pass `{pass}` failed")]
#[diagnostic(code(astrewrite::pipeline::pass_failed))]
pub struct PipelineError {
    pub pass: String,
    #[source]
    #[diagnostic_source]
    pub error: RewriteError,
}

/// Wraps source text for attaching to a report with `with_source_code`.
pub fn to_error_source(name: impl AsRef<str>, source: impl Into<String>) -> NamedSource<String> {
    NamedSource::new(name.as_ref(), source.into())
}
