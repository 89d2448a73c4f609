//! Python-subset parser.
//!
//! Parsing runs in three steps: the source is split into logical lines
//! (`lines.rs`), each line is parsed on its own by the pest grammar into
//! either simple statements or a block header, and the block builder below
//! nests headers and bodies by indentation.

use std::iter::Peekable;
use std::vec::IntoIter;

use pest::{error::Error, iterators::Pair, Parser};
use pest_derive::Parser;

use super::error::SyntaxError;
use super::lines::{split_lines, LogicalLine};
use crate::ast::{
    BinOp, BoolOp, CmpOp, Constant, Expr, ExprContext, ExprNode, Keyword, Module, Span, Stmt, StmtNode,
    UnaryOp, WithSpan,
};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct PySubsetParser;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses a whole source file.
pub fn parse(source: &str) -> Result<Module, SyntaxError> {
    let lines = split_lines(source)?
        .iter()
        .map(parse_line)
        .collect::<Result<Vec<_>, _>>()?;
    let mut lines = lines.into_iter().peekable();
    let body = build_block(&mut lines, 0)?;
    // A dedent below column 0 cannot happen, so anything left over is an
    // indent that matched no enclosing block.
    if let Some(line) = lines.next() {
        return Err(SyntaxError::UnexpectedIndent {
            span: line.span.into(),
        });
    }
    Ok(Module::new(body))
}

/// Parses a single expression (or bare tuple) such as `unroll(range(4))`.
pub fn parse_expr(source: &str) -> Result<ExprNode, SyntaxError> {
    let mut pairs =
        PySubsetParser::parse(Rule::expr_input, source).map_err(|e| convert_parse_error(e, 0))?;
    let input = next_inner(&mut pairs, Span::new(0, source.len()))?;
    let exprs = input
        .into_inner()
        .next()
        .ok_or_else(|| SyntaxError::invalid("expected an expression", Span::new(0, 0)))?;
    build_sequence(exprs, 0)
}

/// Parses `source` and keeps only the top-level function called `name`.
pub fn parse_function(source: &str, name: &str) -> Result<Module, SyntaxError> {
    extract_function(&parse(source)?, name)
}

/// A module holding only the top-level function `name` of `module`.
pub fn extract_function(module: &Module, name: &str) -> Result<Module, SyntaxError> {
    let function = module
        .function(name)
        .cloned()
        .ok_or_else(|| SyntaxError::FunctionNotFound {
            name: name.to_string(),
        })?;
    Ok(Module::new(vec![function]))
}

// ============================================================================
// LINE PARSING
// ============================================================================

struct ParsedLine {
    indent: usize,
    span: Span,
    kind: LineKind,
}

enum LineKind {
    Simple(Vec<StmtNode>),
    Header {
        header: Header,
        inline: Option<Vec<StmtNode>>,
    },
}

enum Header {
    Def { name: String, params: Vec<String> },
    For { target: ExprNode, iter: ExprNode },
    While(ExprNode),
    If(ExprNode),
    Elif(ExprNode),
    Else,
}

impl Header {
    fn keyword(&self) -> &'static str {
        match self {
            Header::Def { .. } => "def",
            Header::For { .. } => "for",
            Header::While(_) => "while",
            Header::If(_) => "if",
            Header::Elif(_) => "elif",
            Header::Else => "else",
        }
    }
}

fn parse_line(line: &LogicalLine) -> Result<ParsedLine, SyntaxError> {
    let base = line.offset;
    let span = line.span();
    let mut pairs =
        PySubsetParser::parse(Rule::line, &line.text).map_err(|e| convert_parse_error(e, base))?;
    let line_pair = next_inner(&mut pairs, span)?;
    let content = next_inner(&mut line_pair.into_inner(), span)?;

    let kind = match content.as_rule() {
        Rule::simple_stmts => LineKind::Simple(build_simple_stmts(content, base)?),
        Rule::compound => {
            let mut inner = content.into_inner();
            let header = build_header(next_inner(&mut inner, span)?, base)?;
            let inline = inner
                .next()
                .map(|stmts| build_simple_stmts(stmts, base))
                .transpose()?;
            LineKind::Header { header, inline }
        }
        rule => return Err(unexpected_rule(rule, span)),
    };
    Ok(ParsedLine {
        indent: line.indent,
        span,
        kind,
    })
}

fn build_header(pair: Pair<Rule>, base: usize) -> Result<Header, SyntaxError> {
    let span = span_of(&pair, base);
    let rule = pair.as_rule();
    let mut inner = pair.into_inner().filter(|p| !is_keyword(p.as_rule()));
    match rule {
        Rule::def_header => {
            let name = next_inner(&mut inner, span)?.as_str().to_string();
            let params = inner
                .next()
                .map(|params| params.into_inner().map(|p| p.as_str().to_string()).collect())
                .unwrap_or_default();
            Ok(Header::Def { name, params })
        }
        Rule::for_header => {
            let target = into_target(build_sequence(next_inner(&mut inner, span)?, base)?)?;
            let iter = build_sequence(next_inner(&mut inner, span)?, base)?;
            Ok(Header::For { target, iter })
        }
        Rule::while_header => Ok(Header::While(build_expr(next_inner(&mut inner, span)?, base)?)),
        Rule::if_header => Ok(Header::If(build_expr(next_inner(&mut inner, span)?, base)?)),
        Rule::elif_header => Ok(Header::Elif(build_expr(next_inner(&mut inner, span)?, base)?)),
        Rule::else_header => Ok(Header::Else),
        rule => Err(unexpected_rule(rule, span)),
    }
}

// ============================================================================
// BLOCK BUILDER
// ============================================================================

type Lines = Peekable<IntoIter<ParsedLine>>;

/// Collects consecutive statements at exactly `indent`, stopping at the first
/// dedent.
fn build_block(lines: &mut Lines, indent: usize) -> Result<Vec<StmtNode>, SyntaxError> {
    let mut body = Vec::new();
    while let Some(line) = lines.peek() {
        if line.indent < indent {
            break;
        }
        if line.indent > indent {
            return Err(SyntaxError::UnexpectedIndent {
                span: line.span.into(),
            });
        }
        let Some(line) = lines.next() else { break };
        let (header, inline) = match line.kind {
            LineKind::Simple(stmts) => {
                body.extend(stmts);
                continue;
            }
            LineKind::Header { header, inline } => (header, inline),
        };

        let keyword = header.keyword();
        let stmt = match header {
            Header::Def { name, params } => {
                let block = clause_body(lines, indent, keyword, line.span, inline)?;
                Stmt::FunctionDef { name, params, body: block }
            }
            Header::For { target, iter } => {
                let block = clause_body(lines, indent, keyword, line.span, inline)?;
                let orelse = else_clause(lines, indent)?;
                Stmt::For {
                    target,
                    iter,
                    body: block,
                    orelse,
                }
            }
            Header::While(test) => {
                let block = clause_body(lines, indent, keyword, line.span, inline)?;
                let orelse = else_clause(lines, indent)?;
                Stmt::While {
                    test,
                    body: block,
                    orelse,
                }
            }
            Header::If(test) => {
                let block = clause_body(lines, indent, keyword, line.span, inline)?;
                let orelse = if_tail(lines, indent)?;
                Stmt::If {
                    test,
                    body: block,
                    orelse,
                }
            }
            Header::Elif(_) | Header::Else => {
                return Err(SyntaxError::UnexpectedClause {
                    clause: keyword,
                    span: line.span.into(),
                })
            }
        };
        body.push(WithSpan::new(stmt, line.span));
        extend_span(body.last_mut());
    }
    Ok(body)
}

/// Body of a block header: the inline statements, or the indented block that
/// follows.
fn clause_body(
    lines: &mut Lines,
    indent: usize,
    keyword: &'static str,
    header_span: Span,
    inline: Option<Vec<StmtNode>>,
) -> Result<Vec<StmtNode>, SyntaxError> {
    if let Some(stmts) = inline {
        return Ok(stmts);
    }
    match lines.peek().map(|next| next.indent) {
        Some(inner) if inner > indent => build_block(lines, inner),
        _ => Err(SyntaxError::ExpectedIndentedBlock {
            header: keyword,
            span: header_span.into(),
        }),
    }
}

fn else_clause(lines: &mut Lines, indent: usize) -> Result<Vec<StmtNode>, SyntaxError> {
    let is_else = matches!(
        lines.peek(),
        Some(ParsedLine {
            indent: i,
            kind: LineKind::Header { header: Header::Else, .. },
            ..
        }) if *i == indent
    );
    if !is_else {
        return Ok(Vec::new());
    }
    match lines.next() {
        Some(ParsedLine {
            span,
            kind: LineKind::Header { inline, .. },
            ..
        }) => clause_body(lines, indent, "else", span, inline),
        _ => Ok(Vec::new()),
    }
}

/// Folds an `elif`/`else` chain into nested `orelse` blocks.
fn if_tail(lines: &mut Lines, indent: usize) -> Result<Vec<StmtNode>, SyntaxError> {
    let is_elif = matches!(
        lines.peek(),
        Some(ParsedLine {
            indent: i,
            kind: LineKind::Header { header: Header::Elif(_), .. },
            ..
        }) if *i == indent
    );
    if !is_elif {
        return else_clause(lines, indent);
    }
    let Some(ParsedLine {
        span,
        kind: LineKind::Header {
            header: Header::Elif(test),
            inline,
        },
        ..
    }) = lines.next()
    else {
        return Ok(Vec::new());
    };
    let body = clause_body(lines, indent, "elif", span, inline)?;
    let orelse = if_tail(lines, indent)?;
    let mut chained = vec![WithSpan::new(Stmt::If { test, body, orelse }, span)];
    extend_span(chained.last_mut());
    Ok(chained)
}

/// Stretches a compound statement's span over its last nested statement.
fn extend_span(stmt: Option<&mut StmtNode>) {
    let Some(stmt) = stmt else { return };
    let last = match &stmt.value {
        Stmt::For { body, orelse, .. }
        | Stmt::While { body, orelse, .. }
        | Stmt::If { body, orelse, .. } => orelse.last().or(body.last()),
        Stmt::FunctionDef { body, .. } => body.last(),
        _ => None,
    };
    if let Some(last) = last {
        stmt.span = stmt.span.to(last.span);
    }
}

// ============================================================================
// STATEMENT BUILDERS
// ============================================================================

fn build_simple_stmts(pair: Pair<Rule>, base: usize) -> Result<Vec<StmtNode>, SyntaxError> {
    pair.into_inner().map(|p| build_simple_stmt(p, base)).collect()
}

fn build_simple_stmt(pair: Pair<Rule>, base: usize) -> Result<StmtNode, SyntaxError> {
    let span = span_of(&pair, base);
    let rule = pair.as_rule();
    let mut inner = pair.into_inner().filter(|p| !is_keyword(p.as_rule()));
    let stmt = match rule {
        Rule::pass_stmt => Stmt::Pass,
        Rule::break_stmt => Stmt::Break,
        Rule::continue_stmt => Stmt::Continue,
        Rule::return_stmt => Stmt::Return(inner.next().map(|p| build_sequence(p, base)).transpose()?),
        Rule::aug_assign => {
            let target = build_expr(next_inner(&mut inner, span)?, base)?;
            if matches!(target.value, Expr::Tuple { .. } | Expr::List { .. }) {
                return Err(SyntaxError::invalid(
                    "augmented assignment needs a single target",
                    target.span,
                ));
            }
            let target = into_target(target)?;
            let op_pair = next_inner(&mut inner, span)?;
            let op = aug_op(op_pair.as_str()).ok_or_else(|| {
                SyntaxError::invalid(format!("unknown operator `{}`", op_pair.as_str()), span)
            })?;
            let value = build_sequence(next_inner(&mut inner, span)?, base)?;
            Stmt::AugAssign { target, op, value }
        }
        Rule::assign => {
            let mut parts = inner
                .map(|p| build_sequence(p, base))
                .collect::<Result<Vec<_>, _>>()?;
            let value = parts
                .pop()
                .ok_or_else(|| SyntaxError::invalid("expected a value", span))?;
            let targets = parts
                .into_iter()
                .map(into_target)
                .collect::<Result<Vec<_>, _>>()?;
            Stmt::Assign { targets, value }
        }
        Rule::expr_stmt => Stmt::Expr(build_sequence(next_inner(&mut inner, span)?, base)?),
        rule => return Err(unexpected_rule(rule, span)),
    };
    Ok(WithSpan::new(stmt, span))
}

fn aug_op(text: &str) -> Option<BinOp> {
    let op = match text {
        "+=" => BinOp::Add,
        "-=" => BinOp::Sub,
        "*=" => BinOp::Mult,
        "/=" => BinOp::Div,
        "//=" => BinOp::FloorDiv,
        "%=" => BinOp::Mod,
        "**=" => BinOp::Pow,
        _ => return None,
    };
    Some(op)
}

/// Switches an expression to store context, rejecting non-assignable ones.
fn into_target(mut expr: ExprNode) -> Result<ExprNode, SyntaxError> {
    check_assignable(&expr)?;
    expr.value.set_context(ExprContext::Store);
    Ok(expr)
}

fn check_assignable(expr: &ExprNode) -> Result<(), SyntaxError> {
    match &expr.value {
        Expr::Name { .. } | Expr::Attribute { .. } | Expr::Subscript { .. } => Ok(()),
        Expr::List { elts, .. } | Expr::Tuple { elts, .. } => elts.iter().try_for_each(check_assignable),
        other => Err(SyntaxError::invalid(
            format!("cannot assign to {}", other.kind_name()),
            expr.span,
        )),
    }
}

// ============================================================================
// EXPRESSION BUILDERS
// ============================================================================

/// Builds `exprs` and `target_list`: a lone element stays itself, anything
/// with a comma becomes a tuple.
fn build_sequence(pair: Pair<Rule>, base: usize) -> Result<ExprNode, SyntaxError> {
    let span = span_of(&pair, base);
    let mut elts = Vec::new();
    let mut trailing_comma = false;
    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::trailing_comma => trailing_comma = true,
            _ => elts.push(build_expr(item, base)?),
        }
    }
    if elts.len() == 1 && !trailing_comma {
        if let Some(only) = elts.pop() {
            return Ok(only);
        }
    }
    Ok(WithSpan::new(
        Expr::Tuple {
            elts,
            ctx: ExprContext::Load,
        },
        span,
    ))
}

fn build_expr(pair: Pair<Rule>, base: usize) -> Result<ExprNode, SyntaxError> {
    let span = span_of(&pair, base);
    match pair.as_rule() {
        Rule::disjunction => build_bool_op(pair, base, BoolOp::Or),
        Rule::conjunction => build_bool_op(pair, base, BoolOp::And),
        Rule::inversion => {
            let mut inner = pair.into_inner();
            let first = next_inner(&mut inner, span)?;
            if first.as_rule() != Rule::kw_not {
                return build_expr(first, base);
            }
            let operand = build_expr(next_inner(&mut inner, span)?, base)?;
            Ok(WithSpan::new(
                Expr::UnaryOp {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                span,
            ))
        }
        Rule::comparison => {
            let mut inner = pair.into_inner();
            let left = build_expr(next_inner(&mut inner, span)?, base)?;
            let mut ops = Vec::new();
            let mut comparators = Vec::new();
            while let Some(op) = inner.next() {
                ops.push(comparison_op(&op, base)?);
                comparators.push(build_expr(next_inner(&mut inner, span)?, base)?);
            }
            if ops.is_empty() {
                return Ok(left);
            }
            Ok(WithSpan::new(
                Expr::Compare {
                    left: Box::new(left),
                    ops,
                    comparators,
                },
                span,
            ))
        }
        Rule::sum | Rule::term => {
            let mut inner = pair.into_inner();
            let mut left = build_expr(next_inner(&mut inner, span)?, base)?;
            while let Some(op) = inner.next() {
                let op = arith_op(op.as_str()).ok_or_else(|| {
                    SyntaxError::invalid(format!("unknown operator `{}`", op.as_str()), span)
                })?;
                let right = build_expr(next_inner(&mut inner, span)?, base)?;
                let joined = left.span.to(right.span);
                left = WithSpan::new(
                    Expr::BinOp {
                        left: Box::new(left),
                        op,
                        right: Box::new(right),
                    },
                    joined,
                );
            }
            Ok(left)
        }
        Rule::factor => {
            let mut inner = pair.into_inner();
            let first = next_inner(&mut inner, span)?;
            if first.as_rule() != Rule::unary_op {
                return build_expr(first, base);
            }
            let op = match first.as_str() {
                "-" => UnaryOp::USub,
                "+" => UnaryOp::UAdd,
                _ => UnaryOp::Invert,
            };
            let operand = build_expr(next_inner(&mut inner, span)?, base)?;
            Ok(WithSpan::new(
                Expr::UnaryOp {
                    op,
                    operand: Box::new(operand),
                },
                span,
            ))
        }
        Rule::power => {
            let mut inner = pair.into_inner();
            let left = build_expr(next_inner(&mut inner, span)?, base)?;
            match inner.next() {
                None => Ok(left),
                Some(exponent) => Ok(WithSpan::new(
                    Expr::BinOp {
                        left: Box::new(left),
                        op: BinOp::Pow,
                        right: Box::new(build_expr(exponent, base)?),
                    },
                    span,
                )),
            }
        }
        Rule::postfix => build_postfix(pair, base),
        Rule::target => build_expr(next_inner(&mut pair.into_inner(), span)?, base),
        Rule::paren => match pair.into_inner().next() {
            None => Ok(WithSpan::new(
                Expr::Tuple {
                    elts: Vec::new(),
                    ctx: ExprContext::Load,
                },
                span,
            )),
            Some(exprs) => {
                let mut expr = build_sequence(exprs, base)?;
                if matches!(expr.value, Expr::Tuple { .. }) {
                    expr.span = span;
                }
                Ok(expr)
            }
        },
        Rule::list_display => {
            let elts = pair
                .into_inner()
                .map(|p| build_expr(p, base))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(WithSpan::new(
                Expr::List {
                    elts,
                    ctx: ExprContext::Load,
                },
                span,
            ))
        }
        Rule::integer => Ok(WithSpan::new(
            Expr::Constant(Constant::Int(parse_int(pair.as_str(), span)?)),
            span,
        )),
        Rule::float => {
            let text = pair.as_str().replace('_', "");
            let value = text.parse::<f64>().map_err(|_| SyntaxError::InvalidLiteral {
                literal_type: "float",
                value: pair.as_str().to_string(),
                span: span.into(),
            })?;
            Ok(WithSpan::new(Expr::Constant(Constant::Float(value)), span))
        }
        Rule::strings => {
            let mut value = String::new();
            for part in pair.into_inner() {
                value.push_str(&unescape_string(part.as_str()));
            }
            Ok(WithSpan::new(Expr::Constant(Constant::Str(value)), span))
        }
        Rule::true_lit => Ok(WithSpan::new(Expr::Constant(Constant::Bool(true)), span)),
        Rule::false_lit => Ok(WithSpan::new(Expr::Constant(Constant::Bool(false)), span)),
        Rule::none_lit => Ok(WithSpan::new(Expr::Constant(Constant::None), span)),
        Rule::identifier => Ok(WithSpan::new(Expr::name(pair.as_str()), span)),
        rule => Err(unexpected_rule(rule, span)),
    }
}

fn build_bool_op(
    pair: Pair<Rule>,
    base: usize,
    op: BoolOp,
) -> Result<ExprNode, SyntaxError> {
    let span = span_of(&pair, base);
    let mut values = pair
        .into_inner()
        .filter(|p| !is_keyword(p.as_rule()))
        .map(|p| build_expr(p, base))
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() == 1 {
        if let Some(only) = values.pop() {
            return Ok(only);
        }
    }
    Ok(WithSpan::new(Expr::BoolOp { op, values }, span))
}

fn build_postfix(pair: Pair<Rule>, base: usize) -> Result<ExprNode, SyntaxError> {
    let span = span_of(&pair, base);
    let mut inner = pair.into_inner();
    let mut expr = build_expr(next_inner(&mut inner, span)?, base)?;
    for trailer in inner {
        let trailer_span = span_of(&trailer, base);
        let joined = Span::new(expr.span.start, trailer_span.end);
        let value = match trailer.as_rule() {
            Rule::call => {
                let (args, keywords) = match trailer.into_inner().next() {
                    Some(call_args) => build_call_args(call_args, base)?,
                    None => (Vec::new(), Vec::new()),
                };
                Expr::Call {
                    func: Box::new(expr),
                    args,
                    keywords,
                }
            }
            Rule::subscript => {
                let index = build_sequence(next_inner(&mut trailer.into_inner(), trailer_span)?, base)?;
                Expr::Subscript {
                    value: Box::new(expr),
                    index: Box::new(index),
                    ctx: ExprContext::Load,
                }
            }
            Rule::attribute => {
                let attr = next_inner(&mut trailer.into_inner(), trailer_span)?;
                Expr::Attribute {
                    value: Box::new(expr),
                    attr: attr.as_str().to_string(),
                    ctx: ExprContext::Load,
                }
            }
            rule => return Err(unexpected_rule(rule, trailer_span)),
        };
        expr = WithSpan::new(value, joined);
    }
    Ok(expr)
}

fn build_call_args(
    pair: Pair<Rule>,
    base: usize,
) -> Result<(Vec<ExprNode>, Vec<Keyword>), SyntaxError> {
    let mut args = Vec::new();
    let mut keywords: Vec<Keyword> = Vec::new();
    for arg in pair.into_inner() {
        let span = span_of(&arg, base);
        if arg.as_rule() == Rule::keyword_arg {
            let mut inner = arg.into_inner();
            let name = next_inner(&mut inner, span)?.as_str().to_string();
            let value = build_expr(next_inner(&mut inner, span)?, base)?;
            keywords.push(Keyword { arg: name, value });
        } else if !keywords.is_empty() {
            return Err(SyntaxError::invalid(
                "positional argument follows keyword argument",
                span,
            ));
        } else {
            args.push(build_expr(arg, base)?);
        }
    }
    Ok((args, keywords))
}

fn comparison_op(pair: &Pair<Rule>, base: usize) -> Result<CmpOp, SyntaxError> {
    if let Some(inner) = pair.clone().into_inner().next() {
        return match inner.as_rule() {
            Rule::not_in => Ok(CmpOp::NotIn),
            Rule::is_not => Ok(CmpOp::IsNot),
            Rule::kw_in => Ok(CmpOp::In),
            Rule::kw_is => Ok(CmpOp::Is),
            rule => Err(unexpected_rule(rule, span_of(&inner, base))),
        };
    }
    let op = match pair.as_str() {
        "==" => CmpOp::Eq,
        "!=" => CmpOp::NotEq,
        "<" => CmpOp::Lt,
        "<=" => CmpOp::LtE,
        ">" => CmpOp::Gt,
        ">=" => CmpOp::GtE,
        other => {
            return Err(SyntaxError::invalid(
                format!("unknown comparison `{other}`"),
                span_of(pair, base),
            ))
        }
    };
    Ok(op)
}

fn arith_op(text: &str) -> Option<BinOp> {
    let op = match text {
        "+" => BinOp::Add,
        "-" => BinOp::Sub,
        "*" => BinOp::Mult,
        "/" => BinOp::Div,
        "//" => BinOp::FloorDiv,
        "%" => BinOp::Mod,
        _ => return None,
    };
    Some(op)
}

// ============================================================================
// LITERALS
// ============================================================================

fn parse_int(text: &str, span: Span) -> Result<i64, SyntaxError> {
    let digits = text.replace('_', "");
    let parsed = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => digits.parse::<i64>(),
    };
    parsed.map_err(|_| SyntaxError::InvalidLiteral {
        literal_type: "int",
        value: text.to_string(),
        span: span.into(),
    })
}

/// Strips the quotes of one string token and resolves its escapes.
fn unescape_string(text: &str) -> String {
    let quote_len = if text.starts_with("\"\"\"") || text.starts_with("'''") {
        3
    } else {
        1
    };
    let inner = text
        .get(quote_len..text.len().saturating_sub(quote_len))
        .unwrap_or_default();
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('0') => result.push('\0'),
            Some('\\') => result.push('\\'),
            Some('\'') => result.push('\''),
            Some('"') => result.push('"'),
            Some('\n') => {}
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

// ============================================================================
// UTILITIES
// ============================================================================

fn span_of(pair: &Pair<Rule>, base: usize) -> Span {
    let span = pair.as_span();
    Span::new(base + span.start(), base + span.end())
}

fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_def
            | Rule::kw_for
            | Rule::kw_in
            | Rule::kw_while
            | Rule::kw_if
            | Rule::kw_elif
            | Rule::kw_else
            | Rule::kw_return
            | Rule::kw_pass
            | Rule::kw_break
            | Rule::kw_continue
            | Rule::kw_and
            | Rule::kw_or
            | Rule::kw_not
            | Rule::kw_is
    )
}

/// Next child pair, or an error if the grammar produced fewer than expected.
fn next_inner<'i>(
    pairs: &mut impl Iterator<Item = Pair<'i, Rule>>,
    span: Span,
) -> Result<Pair<'i, Rule>, SyntaxError> {
    pairs
        .next()
        .ok_or_else(|| SyntaxError::invalid("incomplete statement", span))
}

fn unexpected_rule(rule: Rule, span: Span) -> SyntaxError {
    SyntaxError::invalid(format!("unexpected {rule:?}"), span)
}

fn convert_parse_error(error: Error<Rule>, base: usize) -> SyntaxError {
    let span = match error.location {
        pest::error::InputLocation::Pos(pos) => Span::new(base + pos, base + pos),
        pest::error::InputLocation::Span((start, end)) => Span::new(base + start, base + end),
    };
    SyntaxError::invalid(error.variant.message().into_owned(), span)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_is_an_empty_module() {
        assert!(parse("").unwrap().body.is_empty());
        assert!(parse("\n# only a comment\n").unwrap().body.is_empty());
    }

    #[test]
    fn spans_are_source_offsets() {
        let source = "def f():\n    x = a + 1\n";
        let module = parse(source).unwrap();
        let Stmt::FunctionDef { body, .. } = &module.body[0].value else {
            panic!("expected a function");
        };
        let span = body[0].span;
        assert_eq!(&source[span.start..span.end], "x = a + 1");
        assert_eq!(module.body[0].span, Span::new(0, source.len() - 1));
    }

    #[test]
    fn strings_unescape_and_concatenate() {
        let expr = parse_expr(r#"'a\n' "b""#).unwrap();
        assert_eq!(expr.value, Expr::Constant(Constant::Str("a\nb".into())));
    }

    #[test]
    fn unmatched_paren_is_an_error() {
        assert!(matches!(parse("x = (1\n"), Err(SyntaxError::Invalid { .. })));
    }
}
