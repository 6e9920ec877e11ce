//! Walking functions for read-only traversal.
//!
//! These functions provide the default traversal behavior for each node type.
//! They are called by the default implementations of the Visitor trait methods.

use super::Visitor;
use crate::ast::*;

/// Walk a file, visiting all declarations and then all statements.
pub fn walk_file<V: Visitor + ?Sized>(visitor: &V, file: &SourceFile) {
    for stmt in &file.declarations {
        visitor.visit_stmt(stmt);
    }
    for stmt in &file.statements {
        visitor.visit_stmt(stmt);
    }
}

fn walk_stmts<V: Visitor + ?Sized>(visitor: &V, stmts: &[Stmt]) {
    for stmt in stmts {
        visitor.visit_stmt(stmt);
    }
}

fn walk_variable<V: Visitor + ?Sized>(visitor: &V, decl: &VariableDecl) {
    if let Some(init) = &decl.initializer {
        visitor.visit_expr(init);
    }
    if let Some(getter) = &decl.getter {
        walk_stmts(visitor, getter);
    }
    if let Some(setter) = &decl.setter {
        walk_stmts(visitor, setter);
    }
}

/// Walk a statement, visiting all child nodes.
pub fn walk_stmt<V: Visitor + ?Sized>(visitor: &V, stmt: &Stmt) {
    match stmt {
        Stmt::Class(c) => walk_stmts(visitor, &c.members),
        Stmt::Struct(s) => walk_stmts(visitor, &s.members),
        Stmt::Protocol(p) => walk_stmts(visitor, &p.members),
        Stmt::Enum(e) => {
            for element in &e.elements {
                if let Some(raw) = &element.raw_value {
                    visitor.visit_expr(raw);
                }
            }
            walk_stmts(visitor, &e.members);
        }
        Stmt::Extension(e) => walk_stmts(visitor, &e.members),
        Stmt::Companion(c) => walk_stmts(visitor, &c.members),
        Stmt::Function(f) => {
            for param in &f.parameters {
                if let Some(default) = &param.default {
                    visitor.visit_expr(default);
                }
            }
            if let Some(body) = &f.body {
                walk_stmts(visitor, body);
            }
        }
        Stmt::Variable(v) => walk_variable(visitor, v),
        Stmt::If(i) => {
            for condition in &i.conditions {
                match condition {
                    IfCondition::Condition(e) => visitor.visit_expr(e),
                    IfCondition::Declaration(v) => walk_variable(visitor, v),
                }
            }
            walk_stmts(visitor, &i.statements);
            if let Some(else_statements) = &i.else_statements {
                walk_stmts(visitor, else_statements);
            }
        }
        Stmt::Switch(s) => {
            visitor.visit_expr(&s.subject);
            match &s.converts_to {
                Some(SwitchTarget::Assign(e)) => visitor.visit_expr(e),
                Some(SwitchTarget::Declare(v)) => walk_variable(visitor, v),
                Some(SwitchTarget::Return) | None => {}
            }
            for case in &s.cases {
                for e in &case.expressions {
                    visitor.visit_expr(e);
                }
                walk_stmts(visitor, &case.statements);
            }
        }
        Stmt::ForEach(f) => {
            visitor.visit_expr(&f.variable);
            visitor.visit_expr(&f.collection);
            walk_stmts(visitor, &f.statements);
        }
        Stmt::While(w) => {
            visitor.visit_expr(&w.condition);
            walk_stmts(visitor, &w.statements);
        }
        Stmt::Do(d) => {
            walk_stmts(visitor, &d.statements);
            walk_stmts(visitor, &d.finally_statements);
        }
        Stmt::Catch(c) => {
            if let Some(v) = &c.variable {
                walk_variable(visitor, v);
            }
            walk_stmts(visitor, &c.statements);
        }
        Stmt::Defer(d) => walk_stmts(visitor, &d.statements),
        Stmt::Throw(t) => visitor.visit_expr(&t.expr),
        Stmt::Return(r) => {
            if let Some(e) = &r.expr {
                visitor.visit_expr(e);
            }
        }
        Stmt::Assignment(a) => {
            visitor.visit_expr(&a.lhs);
            visitor.visit_expr(&a.rhs);
        }
        Stmt::Expression(e) => visitor.visit_expr(&e.expr),
        Stmt::Import(_)
        | Stmt::Break(_)
        | Stmt::Continue(_)
        | Stmt::Comment(_)
        | Stmt::Error(_) => {}
    }
}

/// Walk an expression, visiting all child nodes.
pub fn walk_expr<V: Visitor + ?Sized>(visitor: &V, expr: &Expr) {
    match expr {
        Expr::Array(a) => {
            for e in &a.elements {
                visitor.visit_expr(e);
            }
        }
        Expr::Dictionary(d) => {
            for (k, v) in d.keys.iter().zip(d.values.iter()) {
                visitor.visit_expr(k);
                visitor.visit_expr(v);
            }
        }
        Expr::Member(m) => visitor.visit_expr(&m.base),
        Expr::Call(c) => {
            visitor.visit_expr(&c.function);
            visitor.visit_expr(&c.arguments);
        }
        Expr::Closure(c) => walk_stmts(visitor, &c.statements),
        Expr::Subscript(s) => {
            visitor.visit_expr(&s.base);
            visitor.visit_expr(&s.index);
        }
        Expr::Prefix(p) => visitor.visit_expr(&p.operand),
        Expr::Postfix(p) => visitor.visit_expr(&p.operand),
        Expr::Binary(b) => {
            visitor.visit_expr(&b.lhs);
            visitor.visit_expr(&b.rhs);
        }
        Expr::Ternary(t) => {
            visitor.visit_expr(&t.condition);
            visitor.visit_expr(&t.then_expr);
            visitor.visit_expr(&t.else_expr);
        }
        Expr::Tuple(t) => {
            for pair in &t.pairs {
                visitor.visit_expr(&pair.expr);
            }
        }
        Expr::TupleShuffle(s) => {
            for e in s.expressions() {
                visitor.visit_expr(e);
            }
        }
        Expr::Paren(p) => visitor.visit_expr(&p.expr),
        Expr::OptionalUnwrap(o) => visitor.visit_expr(&o.expr),
        Expr::ForceUnwrap(f) => visitor.visit_expr(&f.expr),
        Expr::Interpolation(i) => {
            for part in &i.parts {
                if let InterpolationPart::Expr(e) = part {
                    visitor.visit_expr(e);
                }
            }
        }
        Expr::Literal(_)
        | Expr::DeclRef(_)
        | Expr::TypeRef(_)
        | Expr::LiteralCode(_)
        | Expr::Error(_) => {}
    }
}
