//! Declaration-level rewrites: extensions, failable initializers and static
//! members.

use crate::ast::*;
use crate::visitor::{Rewriter, Visitor, mut_walk, walk};
use std::cell::Cell;

/// Extension members become top-level members with a receiver type.
pub struct RemoveExtensions;

impl Rewriter for RemoveExtensions {
    fn replace_extension(&mut self, decl: ExtensionDecl) -> Vec<Stmt> {
        let decl = mut_walk::walk_extension(self, decl);
        decl.members
            .into_iter()
            .map(|member| match member {
                Stmt::Function(mut f) => {
                    f.extends_type.get_or_insert_with(|| decl.type_name.clone());
                    Stmt::Function(f)
                }
                Stmt::Variable(mut v) => {
                    v.extends_type.get_or_insert_with(|| decl.type_name.clone());
                    Stmt::Variable(v)
                }
                other => other,
            })
            .collect()
    }
}

/// Failable initializers become a static `invoke` factory returning an
/// optional, with each `self = value` turned into `return value`.
///
/// Only initializers that never assign to a stored property are converted;
/// anything else is left for the emitter to report.
#[derive(Default)]
pub struct OptionalInitsToFactories {
    owner: Option<String>,
}

/// Finds `self.property = …` anywhere in a body.
struct AssignsStoredProperty {
    found: Cell<bool>,
}

fn is_self(expr: &Expr) -> bool {
    expr.as_decl_name() == Some("self")
}

impl Visitor for AssignsStoredProperty {
    fn visit_stmt(&self, stmt: &Stmt) {
        if let Stmt::Assignment(a) = stmt
            && let Expr::Member(m) = a.lhs.unparenthesized()
            && is_self(&m.base)
        {
            self.found.set(true);
        }
        walk::walk_stmt(self, stmt);
    }
}

struct SelfAssignmentsToReturns<'a> {
    owner: &'a str,
}

impl Rewriter for SelfAssignmentsToReturns<'_> {
    fn replace_assignment(&mut self, stmt: AssignmentStmt) -> Vec<Stmt> {
        if is_self(&stmt.lhs) {
            return vec![Stmt::Return(ReturnStmt {
                expr: Some(stmt.rhs),
                range: stmt.range,
            })];
        }
        vec![Stmt::Assignment(stmt)]
    }

    // `self.init(…)` delegates to another initializer.
    fn replace_expression_statement(&mut self, stmt: ExpressionStmt) -> Vec<Stmt> {
        match stmt.expr {
            Expr::Call(mut call)
                if matches!(call.function.as_ref(), Expr::Member(m) if m.member == "init" && is_self(&m.base)) =>
            {
                call.function = Box::new(Expr::TypeRef(TypeRefExpr {
                    name: self.owner.to_string(),
                    ty: None,
                    range: call.function.range(),
                }));
                vec![Stmt::Return(ReturnStmt {
                    expr: Some(Expr::Call(call)),
                    range: stmt.range,
                })]
            }
            expr => vec![Stmt::Expression(ExpressionStmt {
                expr,
                range: stmt.range,
            })],
        }
    }

    fn replace_closure(&mut self, closure: ClosureExpr) -> Expr {
        Expr::Closure(closure)
    }
}

impl OptionalInitsToFactories {
    fn in_type<T>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = self.owner.replace(name.to_string());
        let result = f(self);
        self.owner = previous;
        result
    }
}

impl Rewriter for OptionalInitsToFactories {
    fn reset(&mut self) {
        self.owner = None;
    }

    fn replace_class(&mut self, decl: ClassDecl) -> Vec<Stmt> {
        let name = decl.name.clone();
        vec![Stmt::Class(self.in_type(&name, |this| mut_walk::walk_class(this, decl)))]
    }

    fn replace_struct(&mut self, decl: StructDecl) -> Vec<Stmt> {
        let name = decl.name.clone();
        vec![Stmt::Struct(self.in_type(&name, |this| mut_walk::walk_struct(this, decl)))]
    }

    fn replace_enum(&mut self, decl: EnumDecl) -> Vec<Stmt> {
        let name = decl.name.clone();
        vec![Stmt::Enum(self.in_type(&name, |this| mut_walk::walk_enum(this, decl)))]
    }

    fn replace_function(&mut self, decl: FunctionDecl) -> Vec<Stmt> {
        let mut decl = mut_walk::walk_function(self, decl);
        let failable = matches!(decl.kind, FunctionKind::Initializer { failable: true });
        let (Some(owner), true) = (self.owner.as_deref(), failable && decl.body.is_some()) else {
            return vec![Stmt::Function(decl)];
        };
        let body = decl.body.take().unwrap_or_default();

        let scan = AssignsStoredProperty {
            found: Cell::new(false),
        };
        for stmt in &body {
            scan.visit_stmt(stmt);
        }
        if scan.found.get() {
            decl.body = Some(body);
            return vec![Stmt::Function(decl)];
        }

        let mut rewrite = SelfAssignmentsToReturns { owner };
        decl.body = Some(rewrite.replace_statements(body));
        decl.name = "invoke".to_string();
        decl.kind = FunctionKind::Function;
        decl.is_static = true;
        decl.return_type = Some(format!("{}?", owner));
        vec![Stmt::Function(decl)]
    }
}

/// Hoists the static members of each type into one companion container,
/// placed first among the members.
pub struct StaticMembersToCompanion;

fn hoist_statics(members: Vec<Stmt>) -> Vec<Stmt> {
    let (statics, mut rest): (Vec<Stmt>, Vec<Stmt>) =
        members.into_iter().partition(Stmt::is_static);
    if statics.is_empty() {
        return rest;
    }

    if let Some(Stmt::Companion(existing)) = rest.iter_mut().find(|s| matches!(s, Stmt::Companion(_))) {
        existing.members.extend(statics);
        return rest;
    }

    let mut members = Vec::with_capacity(rest.len() + 1);
    members.push(Stmt::Companion(CompanionDecl {
        members: statics,
        range: None,
    }));
    members.append(&mut rest);
    members
}

impl Rewriter for StaticMembersToCompanion {
    fn replace_class(&mut self, decl: ClassDecl) -> Vec<Stmt> {
        let mut decl = mut_walk::walk_class(self, decl);
        decl.members = hoist_statics(decl.members);
        vec![Stmt::Class(decl)]
    }

    fn replace_struct(&mut self, decl: StructDecl) -> Vec<Stmt> {
        let mut decl = mut_walk::walk_struct(self, decl);
        decl.members = hoist_statics(decl.members);
        vec![Stmt::Struct(decl)]
    }

    fn replace_enum(&mut self, decl: EnumDecl) -> Vec<Stmt> {
        let mut decl = mut_walk::walk_enum(self, decl);
        decl.members = hoist_statics(decl.members);
        vec![Stmt::Enum(decl)]
    }
}
