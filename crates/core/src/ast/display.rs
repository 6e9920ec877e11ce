//! Human-readable renderings of IR for diagnostics and trace dumps.

use super::expr::*;
use super::file::SourceFile;
use super::stmt::*;
use std::fmt::Write;

/// Convert an expression to a concise, human-readable string
/// for use in diagnostics.
pub fn expr_to_string(expr: &Expr) -> String {
    match expr {
        Expr::Literal(l) => format_literal(&l.value),
        Expr::Array(a) => format_sequence("[", "]", &a.elements),
        Expr::Dictionary(d) => {
            if d.keys.is_empty() {
                "[:]".to_string()
            } else if d.keys.len() <= 2 {
                let pairs: Vec<String> = d
                    .keys
                    .iter()
                    .zip(d.values.iter())
                    .map(|(k, v)| format!("{}: {}", expr_to_string(k), expr_to_string(v)))
                    .collect();
                format!("[{}]", pairs.join(", "))
            } else {
                format!("[...{} entries...]", d.keys.len())
            }
        }
        Expr::DeclRef(d) => d.name.clone(),
        Expr::Member(m) => format!("{}.{}", expr_to_string(&m.base), m.member),
        Expr::Call(c) => format!(
            "{}{}",
            expr_to_string(&c.function),
            expr_to_string(&c.arguments)
        ),
        Expr::Closure(c) => {
            let params: Vec<&str> = c.parameters.iter().map(|p| p.name.as_str()).collect();
            if params.is_empty() {
                "{ ... }".to_string()
            } else {
                format!("{{ {} in ... }}", params.join(", "))
            }
        }
        Expr::Subscript(s) => format!("{}[{}]", expr_to_string(&s.base), expr_to_string(&s.index)),
        Expr::Prefix(p) => format!("{}{}", p.op, expr_to_string(&p.operand)),
        Expr::Postfix(p) => format!("{}{}", expr_to_string(&p.operand), p.op),
        Expr::Binary(b) => format!(
            "{} {} {}",
            expr_to_string(&b.lhs),
            b.op,
            expr_to_string(&b.rhs)
        ),
        Expr::Ternary(t) => format!(
            "{} ? {} : {}",
            expr_to_string(&t.condition),
            expr_to_string(&t.then_expr),
            expr_to_string(&t.else_expr)
        ),
        Expr::TypeRef(t) => t.name.clone(),
        Expr::Tuple(t) => {
            let items: Vec<String> = t.pairs.iter().map(format_labeled).collect();
            format!("({})", items.join(", "))
        }
        Expr::TupleShuffle(s) => {
            let items: Vec<String> = s
                .slots()
                .map(|(label, index, exprs)| {
                    let value = match index {
                        ShuffleIndex::Absent => "<default>".to_string(),
                        _ => exprs.iter().map(expr_to_string).collect::<Vec<_>>().join(", "),
                    };
                    match label {
                        Some(label) => format!("{}: {}", label, value),
                        None => value,
                    }
                })
                .collect();
            format!("({})", items.join(", "))
        }
        Expr::Paren(p) => format!("({})", expr_to_string(&p.expr)),
        Expr::OptionalUnwrap(o) => format!("{}?", expr_to_string(&o.expr)),
        Expr::ForceUnwrap(f) => format!("{}!", expr_to_string(&f.expr)),
        Expr::Interpolation(_) => "\"\\(...)\"".to_string(),
        Expr::LiteralCode(l) => l.code.clone(),
        Expr::Error(e) => format!("<<error: {}>>", e.diagnostic.message),
    }
}

fn format_labeled(pair: &LabeledExpr) -> String {
    match &pair.label {
        Some(label) => format!("{}: {}", label, expr_to_string(&pair.expr)),
        None => expr_to_string(&pair.expr),
    }
}

/// Format a literal value
fn format_literal(value: &LiteralValue) -> String {
    match value {
        LiteralValue::Int(i) => i.to_string(),
        LiteralValue::UInt(u) => u.to_string(),
        LiteralValue::Double(d) => format!("{:?}", d),
        LiteralValue::Float(f) => format!("{:?}", f),
        LiteralValue::Bool(b) => b.to_string(),
        LiteralValue::String(s) | LiteralValue::Character(s) => {
            // Truncate very long string constants
            if s.chars().count() > 50 {
                let head: String = s.chars().take(47).collect();
                format!("\"{}...\"", head)
            } else {
                format!("\"{}\"", s)
            }
        }
        LiteralValue::Nil => "nil".to_string(),
    }
}

/// Format a sequence (array literal)
fn format_sequence(open: &str, close: &str, elts: &[Expr]) -> String {
    if elts.is_empty() {
        format!("{}{}", open, close)
    } else if elts.len() <= 3 {
        let items: Vec<String> = elts.iter().map(expr_to_string).collect();
        format!("{}{}{}", open, items.join(", "), close)
    } else {
        format!("{}...{} items...{}", open, elts.len(), close)
    }
}

/// Indented tree dump of a whole file, used by the pass trace hook.
pub fn dump_file(file: &SourceFile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "file {}", file.path.display());
    if !file.declarations.is_empty() {
        out.push_str("  declarations\n");
        dump_into(&mut out, &file.declarations, 2);
    }
    if !file.statements.is_empty() {
        out.push_str("  statements\n");
        dump_into(&mut out, &file.statements, 2);
    }
    for (tag, path) in &file.outputs {
        let _ = writeln!(out, "  output {} -> {}", tag, path.display());
    }
    out
}

/// Indented tree dump of a statement list.
pub fn dump_stmts(stmts: &[Stmt]) -> String {
    let mut out = String::new();
    dump_into(&mut out, stmts, 0);
    out
}

fn dump_into(out: &mut String, stmts: &[Stmt], depth: usize) {
    for stmt in stmts {
        dump_stmt(out, stmt, depth);
    }
}

fn line(out: &mut String, depth: usize, text: impl AsRef<str>) {
    let _ = writeln!(out, "{}{}", "  ".repeat(depth), text.as_ref());
}

fn dump_stmt(out: &mut String, stmt: &Stmt, depth: usize) {
    match stmt {
        Stmt::Import(i) => line(out, depth, format!("import {}", i.module)),
        Stmt::Class(c) => {
            line(out, depth, format!("class {} : {}", c.name, c.inherits.join(", ")));
            dump_into(out, &c.members, depth + 1);
        }
        Stmt::Struct(s) => {
            line(out, depth, format!("struct {} : {}", s.name, s.inherits.join(", ")));
            dump_into(out, &s.members, depth + 1);
        }
        Stmt::Protocol(p) => {
            line(out, depth, format!("protocol {}", p.name));
            dump_into(out, &p.members, depth + 1);
        }
        Stmt::Enum(e) => {
            line(out, depth, format!("enum {} {:?}", e.name, e.kind));
            for element in &e.elements {
                let values: Vec<String> = element
                    .associated_values
                    .iter()
                    .map(|v| match &v.label {
                        Some(label) => format!("{}: {}", label, v.ty),
                        None => v.ty.clone(),
                    })
                    .collect();
                line(out, depth + 1, format!("case {}({})", element.name, values.join(", ")));
            }
            dump_into(out, &e.members, depth + 1);
        }
        Stmt::Extension(e) => {
            line(out, depth, format!("extension {}", e.type_name));
            dump_into(out, &e.members, depth + 1);
        }
        Stmt::Companion(c) => {
            line(out, depth, "companion");
            dump_into(out, &c.members, depth + 1);
        }
        Stmt::Function(f) => {
            let params: Vec<String> = f
                .parameters
                .iter()
                .map(|p| format!("{} {}: {}", p.label.as_deref().unwrap_or("_"), p.name, p.ty))
                .collect();
            line(
                out,
                depth,
                format!(
                    "func {}({}) -> {}{}",
                    f.name,
                    params.join(", "),
                    f.return_type.as_deref().unwrap_or("()"),
                    if f.is_static { " static" } else { "" }
                ),
            );
            if let Some(body) = &f.body {
                dump_into(out, body, depth + 1);
            }
        }
        Stmt::Variable(v) => line(out, depth, format_variable(v)),
        Stmt::If(i) => {
            let conditions: Vec<String> = i
                .conditions
                .iter()
                .map(|c| match c {
                    IfCondition::Condition(e) => expr_to_string(e),
                    IfCondition::Declaration(v) => format_variable(v),
                })
                .collect();
            let keyword = if i.is_guard { "guard" } else { "if" };
            line(out, depth, format!("{} {}", keyword, conditions.join(", ")));
            dump_into(out, &i.statements, depth + 1);
            if let Some(else_statements) = &i.else_statements {
                line(out, depth, "else");
                dump_into(out, else_statements, depth + 1);
            }
        }
        Stmt::Switch(s) => {
            let target = match &s.converts_to {
                None => String::new(),
                Some(SwitchTarget::Return) => " => return".to_string(),
                Some(SwitchTarget::Assign(e)) => format!(" => {} =", expr_to_string(e)),
                Some(SwitchTarget::Declare(v)) => format!(" => {}", format_variable(v)),
            };
            line(out, depth, format!("switch {}{}", expr_to_string(&s.subject), target));
            for case in &s.cases {
                if case.is_default() {
                    line(out, depth + 1, "default");
                } else {
                    let exprs: Vec<String> = case.expressions.iter().map(expr_to_string).collect();
                    line(out, depth + 1, format!("case {}", exprs.join(", ")));
                }
                dump_into(out, &case.statements, depth + 2);
            }
        }
        Stmt::ForEach(f) => {
            line(
                out,
                depth,
                format!("for {} in {}", expr_to_string(&f.variable), expr_to_string(&f.collection)),
            );
            dump_into(out, &f.statements, depth + 1);
        }
        Stmt::While(w) => {
            line(out, depth, format!("while {}", expr_to_string(&w.condition)));
            dump_into(out, &w.statements, depth + 1);
        }
        Stmt::Do(d) => {
            line(out, depth, "do");
            dump_into(out, &d.statements, depth + 1);
            if !d.finally_statements.is_empty() {
                line(out, depth, "finally");
                dump_into(out, &d.finally_statements, depth + 1);
            }
        }
        Stmt::Catch(c) => {
            match &c.variable {
                Some(v) => line(out, depth, format!("catch {}", format_variable(v))),
                None => line(out, depth, "catch"),
            }
            dump_into(out, &c.statements, depth + 1);
        }
        Stmt::Defer(d) => {
            line(out, depth, "defer");
            dump_into(out, &d.statements, depth + 1);
        }
        Stmt::Throw(t) => line(out, depth, format!("throw {}", expr_to_string(&t.expr))),
        Stmt::Return(r) => match &r.expr {
            Some(e) => line(out, depth, format!("return {}", expr_to_string(e))),
            None => line(out, depth, "return"),
        },
        Stmt::Break(_) => line(out, depth, "break"),
        Stmt::Continue(_) => line(out, depth, "continue"),
        Stmt::Assignment(a) => line(
            out,
            depth,
            format!("{} = {}", expr_to_string(&a.lhs), expr_to_string(&a.rhs)),
        ),
        Stmt::Expression(e) => line(out, depth, expr_to_string(&e.expr)),
        Stmt::Comment(c) => line(out, depth, format!("// {}", c.text)),
        Stmt::Error(e) => line(out, depth, format!("<<error: {}>>", e.diagnostic.message)),
    }
}

fn format_variable(v: &VariableDecl) -> String {
    let mut text = format!("{} {}", if v.is_let { "let" } else { "var" }, v.name);
    if let Some(ty) = &v.ty {
        let _ = write!(text, ": {}", ty);
    }
    if let Some(init) = &v.initializer {
        let _ = write!(text, " = {}", expr_to_string(init));
    }
    if v.is_computed() {
        text.push_str(" { get }");
    }
    text
}
