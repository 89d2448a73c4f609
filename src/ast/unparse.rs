//! Source renderer for the AST.
//!
//! Produces canonical source: four-space indentation, single-quoted strings,
//! tuples always parenthesized, and only the parentheses operator precedence
//! requires. An empty nested block renders as `pass` so the output stays valid
//! source even after a rewrite deleted every statement of a block.

use super::{BinOp, BoolOp, CmpOp, Constant, Expr, ExprNode, Module, Stmt, StmtNode, UnaryOp};

const INDENT: &str = "    ";

// Binding strength, weakest first.
const PREC_TUPLE: u8 = 0;
const PREC_OR: u8 = 1;
const PREC_AND: u8 = 2;
const PREC_NOT: u8 = 3;
const PREC_CMP: u8 = 4;
const PREC_ARITH: u8 = 5;
const PREC_TERM: u8 = 6;
const PREC_UNARY: u8 = 7;
const PREC_POWER: u8 = 8;
const PREC_ATOM: u8 = 9;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Renders a module, one line per statement, each terminated by `\n`.
pub fn unparse(module: &Module) -> String {
    let mut out = String::new();
    for stmt in &module.body {
        write_stmt(&mut out, stmt, 0);
    }
    out
}

/// Renders a single expression.
pub fn unparse_expr(expr: &ExprNode) -> String {
    let mut out = String::new();
    write_expr(&mut out, &expr.value, PREC_TUPLE);
    out
}

// ============================================================================
// STATEMENTS
// ============================================================================

fn write_stmt(out: &mut String, stmt: &StmtNode, level: usize) {
    let pad = INDENT.repeat(level);
    match &stmt.value {
        Stmt::FunctionDef { name, params, body } => {
            out.push_str(&format!("{pad}def {name}({}):\n", params.join(", ")));
            write_block(out, body, level + 1);
        }
        Stmt::For {
            target,
            iter,
            body,
            orelse,
        } => {
            out.push_str(&format!(
                "{pad}for {} in {}:\n",
                render(&target.value, PREC_TUPLE),
                render(&iter.value, PREC_TUPLE)
            ));
            write_block(out, body, level + 1);
            write_else(out, orelse, level);
        }
        Stmt::While { test, body, orelse } => {
            out.push_str(&format!("{pad}while {}:\n", render(&test.value, PREC_TUPLE)));
            write_block(out, body, level + 1);
            write_else(out, orelse, level);
        }
        Stmt::If { test, body, orelse } => {
            out.push_str(&format!("{pad}if {}:\n", render(&test.value, PREC_TUPLE)));
            write_block(out, body, level + 1);
            write_if_tail(out, orelse, level);
        }
        Stmt::Assign { targets, value } => {
            out.push_str(&pad);
            for target in targets {
                out.push_str(&render(&target.value, PREC_TUPLE));
                out.push_str(" = ");
            }
            out.push_str(&render(&value.value, PREC_TUPLE));
            out.push('\n');
        }
        Stmt::AugAssign { target, op, value } => {
            out.push_str(&format!(
                "{pad}{} {}= {}\n",
                render(&target.value, PREC_TUPLE),
                binop_symbol(*op),
                render(&value.value, PREC_TUPLE)
            ));
        }
        Stmt::Return(None) => out.push_str(&format!("{pad}return\n")),
        Stmt::Return(Some(value)) => {
            out.push_str(&format!("{pad}return {}\n", render(&value.value, PREC_TUPLE)));
        }
        Stmt::Expr(expr) => {
            out.push_str(&format!("{pad}{}\n", render(&expr.value, PREC_TUPLE)));
        }
        Stmt::Pass => out.push_str(&format!("{pad}pass\n")),
        Stmt::Break => out.push_str(&format!("{pad}break\n")),
        Stmt::Continue => out.push_str(&format!("{pad}continue\n")),
    }
}

fn write_block(out: &mut String, body: &[StmtNode], level: usize) {
    if body.is_empty() {
        out.push_str(&format!("{}pass\n", INDENT.repeat(level)));
        return;
    }
    for stmt in body {
        write_stmt(out, stmt, level);
    }
}

fn write_else(out: &mut String, orelse: &[StmtNode], level: usize) {
    if orelse.is_empty() {
        return;
    }
    out.push_str(&format!("{}else:\n", INDENT.repeat(level)));
    write_block(out, orelse, level + 1);
}

/// An `else` holding exactly one `if` is printed as `elif`.
fn write_if_tail(out: &mut String, orelse: &[StmtNode], level: usize) {
    if let [only] = orelse {
        if let Stmt::If { test, body, orelse } = &only.value {
            out.push_str(&format!(
                "{}elif {}:\n",
                INDENT.repeat(level),
                render(&test.value, PREC_TUPLE)
            ));
            write_block(out, body, level + 1);
            write_if_tail(out, orelse, level);
            return;
        }
    }
    write_else(out, orelse, level);
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

fn render(expr: &Expr, min_prec: u8) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr, min_prec);
    out
}

fn write_expr(out: &mut String, expr: &Expr, min_prec: u8) {
    let wrap = precedence(expr) < min_prec;
    if wrap {
        out.push('(');
    }
    match expr {
        Expr::Name { id, .. } => out.push_str(id),
        Expr::Constant(constant) => out.push_str(&render_constant(constant)),
        Expr::BinOp { left, op, right } => {
            let prec = binop_precedence(*op);
            let (left_min, right_min) = match op {
                BinOp::Pow => (PREC_ATOM, PREC_UNARY),
                _ => (prec, prec + 1),
            };
            write_expr(out, &left.value, left_min);
            out.push_str(&format!(" {} ", binop_symbol(*op)));
            write_expr(out, &right.value, right_min);
        }
        Expr::UnaryOp { op, operand } => {
            let operand_min = match op {
                UnaryOp::Not => PREC_NOT,
                _ => PREC_UNARY,
            };
            out.push_str(unary_symbol(*op));
            write_expr(out, &operand.value, operand_min);
        }
        Expr::BoolOp { op, values } => {
            let keyword = match op {
                BoolOp::And => " and ",
                BoolOp::Or => " or ",
            };
            let operand_min = precedence(expr) + 1;
            let parts: Vec<String> = values.iter().map(|v| render(&v.value, operand_min)).collect();
            out.push_str(&parts.join(keyword));
        }
        Expr::Compare {
            left,
            ops,
            comparators,
        } => {
            write_expr(out, &left.value, PREC_ARITH);
            for (op, comparator) in ops.iter().zip(comparators) {
                out.push_str(&format!(" {} ", cmp_symbol(*op)));
                write_expr(out, &comparator.value, PREC_ARITH);
            }
        }
        Expr::Call {
            func,
            args,
            keywords,
        } => {
            write_expr(out, &func.value, PREC_ATOM);
            let mut parts: Vec<String> = args.iter().map(|a| render(&a.value, PREC_OR)).collect();
            parts.extend(
                keywords
                    .iter()
                    .map(|kw| format!("{}={}", kw.arg, render(&kw.value.value, PREC_OR))),
            );
            out.push_str(&format!("({})", parts.join(", ")));
        }
        Expr::Attribute { value, attr, .. } => {
            match &value.value {
                // `0.real` would lex as a float literal.
                Expr::Constant(Constant::Int(_) | Constant::Float(_)) => {
                    out.push_str(&format!("({})", render(&value.value, PREC_OR)));
                }
                receiver => write_expr(out, receiver, PREC_ATOM),
            }
            out.push('.');
            out.push_str(attr);
        }
        Expr::Subscript { value, index, .. } => {
            write_expr(out, &value.value, PREC_ATOM);
            out.push_str(&format!("[{}]", render(&index.value, PREC_TUPLE)));
        }
        Expr::List { elts, .. } => {
            let parts: Vec<String> = elts.iter().map(|e| render(&e.value, PREC_OR)).collect();
            out.push_str(&format!("[{}]", parts.join(", ")));
        }
        Expr::Tuple { elts, .. } => {
            let parts: Vec<String> = elts.iter().map(|e| render(&e.value, PREC_OR)).collect();
            match parts.len() {
                1 => out.push_str(&format!("({},)", parts[0])),
                _ => out.push_str(&format!("({})", parts.join(", "))),
            }
        }
    }
    if wrap {
        out.push(')');
    }
}

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Constant(Constant::Int(n)) if *n < 0 => PREC_UNARY,
        Expr::Constant(Constant::Float(f)) if f.is_sign_negative() => PREC_UNARY,
        Expr::BinOp { op, .. } => binop_precedence(*op),
        Expr::UnaryOp { op: UnaryOp::Not, .. } => PREC_NOT,
        Expr::UnaryOp { .. } => PREC_UNARY,
        Expr::BoolOp { op: BoolOp::Or, .. } => PREC_OR,
        Expr::BoolOp { op: BoolOp::And, .. } => PREC_AND,
        Expr::Compare { .. } => PREC_CMP,
        _ => PREC_ATOM,
    }
}

fn binop_precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Add | BinOp::Sub => PREC_ARITH,
        BinOp::Mult | BinOp::Div | BinOp::FloorDiv | BinOp::Mod => PREC_TERM,
        BinOp::Pow => PREC_POWER,
    }
}

pub(crate) fn binop_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mult => "*",
        BinOp::Div => "/",
        BinOp::FloorDiv => "//",
        BinOp::Mod => "%",
        BinOp::Pow => "**",
    }
}

fn unary_symbol(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Not => "not ",
        UnaryOp::USub => "-",
        UnaryOp::UAdd => "+",
        UnaryOp::Invert => "~",
    }
}

fn cmp_symbol(op: CmpOp) -> &'static str {
    match op {
        CmpOp::Eq => "==",
        CmpOp::NotEq => "!=",
        CmpOp::Lt => "<",
        CmpOp::LtE => "<=",
        CmpOp::Gt => ">",
        CmpOp::GtE => ">=",
        CmpOp::In => "in",
        CmpOp::NotIn => "not in",
        CmpOp::Is => "is",
        CmpOp::IsNot => "is not",
    }
}

fn render_constant(constant: &Constant) -> String {
    match constant {
        Constant::Int(n) => n.to_string(),
        Constant::Float(f) => format!("{f:?}"),
        Constant::Str(s) => quote_str(s),
        Constant::Bool(true) => "True".to_string(),
        Constant::Bool(false) => "False".to_string(),
        Constant::None => "None".to_string(),
    }
}

fn quote_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}
