use super::Adapter;
use super::patterns::{PatternContext, PatternMatch};
use crate::syntax::{SyntaxKind, SyntaxNode};
use std::collections::HashMap;
use tarn_core::ast::*;
use tarn_core::error::ErrorCode;
use tarn_core::visitor::Rewriter;

/// Replaces pattern-bound names with the projections they were bound to.
struct SubstituteBindings<'b> {
    bindings: &'b HashMap<String, Expr>,
}

impl Rewriter for SubstituteBindings<'_> {
    fn replace_decl_ref(&mut self, decl_ref: DeclRefExpr) -> Expr {
        match self.bindings.get(&decl_ref.name) {
            Some(value) => value.clone(),
            None => Expr::DeclRef(decl_ref),
        }
    }
}

fn and(lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary(BinaryExpr {
        lhs: Box::new(lhs),
        op: "&&".to_string(),
        rhs: Box::new(rhs),
        ty: None,
        range: None,
    })
}

/// A bare case value turned into a test against the subject, so it can be
/// joined with a `where` clause.
fn as_condition(subject: &Expr, value: Expr) -> Expr {
    match value.unparenthesized() {
        Expr::Binary(b) if matches!(b.op.as_str(), "is" | "==" | "&&" | "||") => value,
        _ => Expr::Binary(BinaryExpr {
            lhs: Box::new(subject.clone()),
            op: "==".to_string(),
            rhs: Box::new(value),
            ty: None,
            range: None,
        }),
    }
}

impl Adapter<'_> {
    pub(super) fn adapt_statement(&mut self, node: &SyntaxNode) -> Vec<Stmt> {
        let range = Some(node.range());
        let stmt = match node.kind {
            SyntaxKind::Comment => Stmt::Comment(CommentStmt {
                text: node.text().to_string(),
                range,
            }),
            SyntaxKind::CodeBlock => return self.adapt_block(Some(node)),
            SyntaxKind::IfStmt => Stmt::If(self.adapt_if(node)),
            SyntaxKind::GuardStmt => return self.adapt_guard(node),
            SyntaxKind::SwitchStmt => self.adapt_switch(node),
            SyntaxKind::ForInStmt => self.adapt_for_in(node),
            SyntaxKind::WhileStmt => match node.child("condition") {
                Some(condition) if condition.kind == SyntaxKind::OptionalBinding => {
                    self.error_stmt(node, ErrorCode::E1002, "`while let` loops are not supported")
                }
                Some(condition) => Stmt::While(WhileStmt {
                    condition: self.adapt_condition_expr(condition),
                    statements: self.adapt_block(node.child("body")),
                    range,
                }),
                None => self.error_stmt(node, ErrorCode::E1001, "`while` without a condition"),
            },
            SyntaxKind::RepeatWhileStmt => {
                self.error_stmt(node, ErrorCode::E1001, "`repeat`-`while` loops are not supported")
            }
            SyntaxKind::DoStmt => return self.adapt_do(node),
            SyntaxKind::DeferStmt => Stmt::Defer(DeferStmt {
                statements: self.adapt_block(node.child("body")),
                range,
            }),
            SyntaxKind::ThrowStmt => match node.child("value") {
                Some(value) => Stmt::Throw(ThrowStmt {
                    expr: self.adapt_expr(value),
                    range,
                }),
                None => self.error_stmt(node, ErrorCode::E1001, "`throw` without a value"),
            },
            SyntaxKind::ReturnStmt => Stmt::Return(ReturnStmt {
                expr: node.child("value").map(|v| self.adapt_expr(v)),
                range,
            }),
            SyntaxKind::BreakStmt => Stmt::Break(BreakStmt { range }),
            SyntaxKind::ContinueStmt => Stmt::Continue(ContinueStmt { range }),
            kind if kind.is_expression() => match self.adapt_expr(node) {
                Expr::Binary(b) if b.op == "=" => Stmt::Assignment(AssignmentStmt {
                    lhs: *b.lhs,
                    rhs: *b.rhs,
                    range,
                }),
                expr => Stmt::Expression(ExpressionStmt { expr, range }),
            },
            kind => self.error_stmt(node, ErrorCode::E1001, format!("unsupported statement `{:?}`", kind)),
        };
        vec![stmt]
    }

    /// A `Condition` wrapper or a bare expression.
    fn adapt_condition_expr(&mut self, node: &SyntaxNode) -> Expr {
        match node.kind {
            SyntaxKind::Condition => match node.children.first() {
                Some(inner) => self.adapt_expr(inner),
                None => self.error_expr(node, ErrorCode::E1001, "empty condition"),
            },
            _ => self.adapt_expr(node),
        }
    }

    /// Conditions of an `if` or `guard`, and the declarations `case` patterns
    /// in them bind.
    fn adapt_conditions(&mut self, node: &SyntaxNode) -> (Vec<IfCondition>, Vec<Stmt>) {
        let mut conditions = Vec::new();
        let mut bound = Vec::new();
        for condition in node.children_in("condition") {
            match condition.kind {
                SyntaxKind::OptionalBinding => {
                    let name = condition.text().to_string();
                    let initializer = match condition.child("initializer") {
                        Some(value) => self.adapt_expr(value),
                        // `if let x` shorthand.
                        None => Expr::DeclRef(DeclRefExpr {
                            name: name.clone(),
                            is_standard_library: false,
                            is_implicit: false,
                            ty: None,
                            range: Some(condition.range()),
                        }),
                    };
                    let mut declaration = VariableDecl::simple(
                        name,
                        Self::type_name(condition, "type"),
                        Some(initializer),
                        !condition.has_modifier("var"),
                    );
                    declaration.range = Some(condition.range());
                    conditions.push(IfCondition::Declaration(declaration));
                }
                SyntaxKind::CaseCondition => {
                    let (Some(pattern), Some(value)) = (condition.child("pattern"), condition.child("initializer")) else {
                        let error = self.error_expr(condition, ErrorCode::E1002, "`case` condition without a pattern");
                        conditions.push(IfCondition::Condition(error));
                        continue;
                    };
                    let subject = self.adapt_expr(value);
                    match self.destructure(pattern, &subject, PatternContext::Condition, true) {
                        Ok(matched) => {
                            if let Some(test) = matched.condition.clone() {
                                conditions.push(IfCondition::Condition(test));
                            }
                            bound.extend(matched.declarations());
                        }
                        Err(diagnostic) => conditions.push(IfCondition::Condition(Expr::Error(ErrorExpr {
                            diagnostic,
                            range: Some(condition.range()),
                        }))),
                    }
                }
                _ => conditions.push(IfCondition::Condition(self.adapt_condition_expr(condition))),
            }
        }
        (conditions, bound)
    }

    fn adapt_if(&mut self, node: &SyntaxNode) -> IfStmt {
        let (conditions, mut statements) = self.adapt_conditions(node);
        statements.extend(self.adapt_block(node.child("then")));
        let else_statements = node.child("else").map(|branch| match branch.kind {
            SyntaxKind::IfStmt => vec![Stmt::If(self.adapt_if(branch))],
            _ => self.adapt_block(Some(branch)),
        });
        IfStmt {
            conditions,
            statements,
            else_statements,
            is_guard: false,
            range: Some(node.range()),
        }
    }

    /// The guard, followed by whatever its `case` patterns bind.
    fn adapt_guard(&mut self, node: &SyntaxNode) -> Vec<Stmt> {
        let (conditions, bound) = self.adapt_conditions(node);
        let guard = Stmt::If(IfStmt {
            conditions,
            statements: self.adapt_block(node.child("body")),
            else_statements: None,
            is_guard: true,
            range: Some(node.range()),
        });
        std::iter::once(guard).chain(bound).collect()
    }

    fn adapt_switch(&mut self, node: &SyntaxNode) -> Stmt {
        let Some(subject) = node.child("subject") else {
            return self.error_stmt(node, ErrorCode::E1001, "`switch` without a subject");
        };
        let subject = self.adapt_expr(subject);
        let cases = node
            .children_of(SyntaxKind::SwitchCase)
            .map(|case| self.adapt_switch_case(case, &subject))
            .collect();
        Stmt::Switch(SwitchStmt {
            subject,
            cases,
            converts_to: None,
            range: Some(node.range()),
        })
    }

    fn adapt_switch_case(&mut self, case: &SyntaxNode, subject: &Expr) -> SwitchCase {
        let mut expressions = Vec::new();
        let mut matches: Vec<PatternMatch> = Vec::new();
        let mut is_default = case.text() == "default";

        for item in case.children_of(SyntaxKind::CaseItem) {
            let Some(pattern) = item.child("pattern") else {
                is_default = true;
                continue;
            };
            let matched = match self.destructure(pattern, subject, PatternContext::SwitchCase, true) {
                Ok(matched) => matched,
                Err(diagnostic) => {
                    expressions.push(Expr::Error(ErrorExpr {
                        diagnostic,
                        range: Some(item.range()),
                    }));
                    continue;
                }
            };

            let guard = item.child("where").map(|clause| {
                let clause = self.adapt_expr(clause);
                let projections: HashMap<String, Expr> = matched
                    .bindings
                    .iter()
                    .map(|(name, value, _)| (name.clone(), value.clone()))
                    .collect();
                SubstituteBindings {
                    bindings: &projections,
                }
                .replace_expression(clause)
            });
            let test = match (matched.condition.clone(), guard) {
                (Some(value), Some(guard)) => Some(and(as_condition(subject, value), guard)),
                (None, Some(guard)) => Some(guard),
                (test, None) => test,
            };
            match test {
                Some(test) => expressions.push(test),
                // A pattern that matches anything.
                None => is_default = true,
            }
            matches.push(matched);
        }

        if is_default || case.children_of(SyntaxKind::CaseItem).next().is_none() {
            // Failed items stay as markers; a failed item next to `_` makes the case non-default.
            expressions.retain(|expression| matches!(expression, Expr::Error(_)));
        }

        let mut items = matches.iter().map(binding_shape);
        let first = items.next();
        if let Some(first) = first
            && items.any(|shape| shape != first)
        {
            return SwitchCase {
                expressions,
                statements: vec![self.error_stmt(
                    case,
                    ErrorCode::E2002,
                    "case items bind the same names to different values",
                )],
                range: Some(case.range()),
            };
        }

        let mut statements = matches.first().map(PatternMatch::declarations).unwrap_or_default();
        statements.extend(self.adapt_block(case.child("body")));
        SwitchCase {
            expressions,
            statements,
            range: Some(case.range()),
        }
    }

    fn adapt_loop_variable(&mut self, pattern: &SyntaxNode) -> Option<Expr> {
        let name = |text: &str| {
            Expr::DeclRef(DeclRefExpr {
                name: text.to_string(),
                is_standard_library: false,
                is_implicit: false,
                ty: None,
                range: Some(pattern.range()),
            })
        };
        match pattern.kind {
            SyntaxKind::IdentifierPattern => Some(name(pattern.text())),
            SyntaxKind::WildcardPattern => Some(name("_")),
            SyntaxKind::ValueBindingPattern => self.adapt_loop_variable(pattern.children.first()?),
            SyntaxKind::TuplePattern => {
                let mut pairs = Vec::new();
                for element in &pattern.children {
                    pairs.push(LabeledExpr {
                        label: None,
                        expr: self.adapt_loop_variable(element)?,
                    });
                }
                Some(Expr::Tuple(TupleExpr {
                    pairs,
                    ty: None,
                    range: Some(pattern.range()),
                }))
            }
            _ => None,
        }
    }

    fn adapt_for_in(&mut self, node: &SyntaxNode) -> Stmt {
        let (Some(pattern), Some(collection)) = (node.child("pattern"), node.child("collection")) else {
            return self.error_stmt(node, ErrorCode::E1001, "`for` without a pattern or a sequence");
        };
        let Some(variable) = self.adapt_loop_variable(pattern) else {
            return self.error_stmt(pattern, ErrorCode::E1002, "unsupported loop pattern");
        };
        let collection = self.adapt_expr(collection);
        let mut statements = self.adapt_block(node.child("body"));
        if let Some(clause) = node.child("where") {
            statements = vec![Stmt::If(IfStmt {
                conditions: vec![IfCondition::Condition(self.adapt_expr(clause))],
                statements,
                else_statements: None,
                is_guard: false,
                range: Some(clause.range()),
            })];
        }
        Stmt::ForEach(ForEachStmt {
            variable,
            collection,
            statements,
            range: Some(node.range()),
        })
    }

    /// The `do` block and one catch statement per clause.
    fn adapt_do(&mut self, node: &SyntaxNode) -> Vec<Stmt> {
        let mut stmts = vec![Stmt::Do(DoStmt {
            statements: self.adapt_block(node.child("body")),
            finally_statements: Vec::new(),
            range: Some(node.range()),
        })];
        for clause in node.children_of(SyntaxKind::CatchClause) {
            let variable = clause
                .child("pattern")
                .map(|p| p.children.first().filter(|_| p.kind == SyntaxKind::ValueBindingPattern).unwrap_or(p))
                .filter(|p| p.kind == SyntaxKind::IdentifierPattern)
                .map(|p| VariableDecl::simple(p.text(), Self::type_name(clause, "type"), None, true));
            stmts.push(Stmt::Catch(CatchStmt {
                variable,
                statements: self.adapt_block(clause.child("body")),
                range: Some(clause.range()),
            }));
        }
        stmts
    }
}

/// What an item binds: each name with its rendered projection, sorted by name.
fn binding_shape(matched: &PatternMatch) -> Vec<(String, String, bool)> {
    let mut shape: Vec<_> = matched
        .bindings
        .iter()
        .map(|(name, value, is_let)| (name.clone(), expr_to_string(value), *is_let))
        .collect();
    shape.sort();
    shape
}

#[cfg(test)]
mod tests {
    use crate::adapter::adapt;
    use crate::syntax::{SyntaxKind, SyntaxNode};
    use crate::tables::SideTables;
    use tarn_core::ast::*;

    fn n(kind: SyntaxKind) -> SyntaxNode {
        SyntaxNode::new(kind)
    }

    fn name(text: &str) -> SyntaxNode {
        n(SyntaxKind::DeclRef).with_text(text)
    }

    fn call(function: &str) -> SyntaxNode {
        n(SyntaxKind::Call).with_child(name(function).with_role("function"))
    }

    fn block(role: &str, children: impl IntoIterator<Item = SyntaxNode>) -> SyntaxNode {
        n(SyntaxKind::CodeBlock).with_role(role).with_children(children)
    }

    fn dump(root: SyntaxNode) -> String {
        let root = n(SyntaxKind::SourceFile).with_child(root);
        dump_stmts(&adapt("stmts.swift", &root, &SideTables::default()).file.statements)
    }

    fn sequence(parts: [SyntaxNode; 3]) -> SyntaxNode {
        n(SyntaxKind::Sequence).with_children(parts)
    }

    fn op(text: &str) -> SyntaxNode {
        n(SyntaxKind::BinaryOperator).with_text(text)
    }

    #[test]
    fn test_if_let_and_else_if() {
        let stmt = n(SyntaxKind::IfStmt).with_children([
            n(SyntaxKind::OptionalBinding)
                .with_text("value")
                .with_role("condition")
                .with_child(call("load").with_role("initializer")),
            block("then", [call("use")]),
            n(SyntaxKind::IfStmt).with_role("else").with_children([
                name("ready").with_role("condition"),
                block("then", [call("wait")]),
            ]),
        ]);
        assert_eq!(dump(stmt), "if let value = load()\n  use()\nelse\n  if ready\n    wait()\n");
    }

    #[test]
    fn test_guard_with_case_pattern_binds_after_guard() {
        let stmt = n(SyntaxKind::GuardStmt).with_children([
            n(SyntaxKind::CaseCondition).with_role("condition").with_children([
                n(SyntaxKind::EnumCasePattern)
                    .with_text("circle")
                    .with_role("pattern")
                    .with_child(n(SyntaxKind::TypeExpr).with_text("Shape").with_role("type"))
                    .with_child(
                        n(SyntaxKind::PatternArgument).with_text("radius").with_child(
                            n(SyntaxKind::ValueBindingPattern)
                                .with_text("let")
                                .with_child(n(SyntaxKind::IdentifierPattern).with_text("r")),
                        ),
                    ),
                name("shape").with_role("initializer"),
            ]),
            block("body", [n(SyntaxKind::ReturnStmt)]),
        ]);
        assert_eq!(
            dump(stmt),
            "guard shape is Shape.circle\n  return\nlet r = shape.radius\n"
        );
    }

    #[test]
    fn test_switch_cases_and_where_clause() {
        let stmt = n(SyntaxKind::SwitchStmt).with_children([
            name("n").with_role("subject"),
            n(SyntaxKind::SwitchCase).with_children([
                n(SyntaxKind::CaseItem).with_child(
                    n(SyntaxKind::ExpressionPattern)
                        .with_role("pattern")
                        .with_child(n(SyntaxKind::IntegerLiteral).with_text("1")),
                ),
                n(SyntaxKind::CaseItem).with_child(
                    n(SyntaxKind::ExpressionPattern)
                        .with_role("pattern")
                        .with_child(n(SyntaxKind::IntegerLiteral).with_text("2")),
                ),
                block("body", [call("small")]),
            ]),
            n(SyntaxKind::SwitchCase).with_children([
                n(SyntaxKind::CaseItem).with_children([
                    n(SyntaxKind::ValueBindingPattern)
                        .with_text("let")
                        .with_role("pattern")
                        .with_child(n(SyntaxKind::IdentifierPattern).with_text("x")),
                    sequence([name("x"), op(">"), n(SyntaxKind::IntegerLiteral).with_text("10")]).with_role("where"),
                ]),
                block("body", [call("large")]),
            ]),
            n(SyntaxKind::SwitchCase)
                .with_text("default")
                .with_child(block("body", [n(SyntaxKind::BreakStmt)])),
        ]);
        assert_eq!(
            dump(stmt),
            "switch n\n  case 1, 2\n    small()\n  case n > 10\n    let x = n\n    large()\n  default\n    break\n"
        );
    }

    fn shape_case(case: &str, label: Option<&str>, binding: &str) -> SyntaxNode {
        let mut argument = n(SyntaxKind::PatternArgument).with_child(
            n(SyntaxKind::ValueBindingPattern)
                .with_text("let")
                .with_child(n(SyntaxKind::IdentifierPattern).with_text(binding)),
        );
        if let Some(label) = label {
            argument = argument.with_text(label);
        }
        n(SyntaxKind::CaseItem).with_child(
            n(SyntaxKind::EnumCasePattern)
                .with_text(case)
                .with_role("pattern")
                .with_child(n(SyntaxKind::TypeExpr).with_text("Shape").with_role("type"))
                .with_child(argument),
        )
    }

    fn shape_switch(case: SyntaxNode) -> SyntaxNode {
        n(SyntaxKind::SwitchStmt).with_children([name("shape").with_role("subject"), case])
    }

    #[test]
    fn test_case_items_sharing_a_projection() {
        let stmt = shape_switch(n(SyntaxKind::SwitchCase).with_children([
            shape_case("circle", Some("radius"), "r"),
            shape_case("ring", Some("radius"), "r"),
            block("body", [call("use")]),
        ]));
        assert_eq!(
            dump(stmt),
            "switch shape\n  case shape is Shape.circle, shape is Shape.ring\n    let r = shape.radius\n    use()\n"
        );
    }

    #[test]
    fn test_case_items_binding_different_projections() {
        let stmt = shape_switch(n(SyntaxKind::SwitchCase).with_children([
            shape_case("circle", Some("radius"), "r"),
            shape_case("square", Some("side"), "r"),
            block("body", [call("use")]),
        ]));
        let root = n(SyntaxKind::SourceFile).with_child(stmt);
        let adaptation = adapt("stmts.swift", &root, &SideTables::default());
        let Stmt::Switch(switch) = &adaptation.file.statements[0] else {
            panic!("expected a switch");
        };
        let case = &switch.cases[0];
        assert_eq!(case.expressions.len(), 2);
        assert_eq!(case.statements.len(), 1);
        let Stmt::Error(error) = &case.statements[0] else {
            panic!("expected a placeholder, got {:?}", case.statements[0]);
        };
        assert_eq!(error.diagnostic.code, Some(tarn_core::ErrorCode::E2002));
        assert!(!dump_stmts(&adaptation.file.statements).contains("shape.radius"));
    }

    #[test]
    fn test_failed_item_beside_wildcard_keeps_its_marker() {
        let stmt = shape_switch(n(SyntaxKind::SwitchCase).with_children([
            shape_case("pair", None, "a"),
            n(SyntaxKind::CaseItem).with_child(n(SyntaxKind::WildcardPattern).with_role("pattern")),
            block("body", [call("fallback")]),
        ]));
        let root = n(SyntaxKind::SourceFile).with_child(stmt);
        let adaptation = adapt("stmts.swift", &root, &SideTables::default());
        let Stmt::Switch(switch) = &adaptation.file.statements[0] else {
            panic!("expected a switch");
        };
        let case = &switch.cases[0];
        assert_eq!(case.expressions.len(), 1);
        let Expr::Error(error) = &case.expressions[0] else {
            panic!("expected a placeholder, got {:?}", case.expressions[0]);
        };
        assert_eq!(error.diagnostic.code, Some(tarn_core::ErrorCode::E2002));
    }

    #[test]
    fn test_for_in_with_tuple_pattern_and_where() {
        let stmt = n(SyntaxKind::ForInStmt).with_children([
            n(SyntaxKind::TuplePattern).with_role("pattern").with_children([
                n(SyntaxKind::IdentifierPattern).with_text("key"),
                n(SyntaxKind::WildcardPattern),
            ]),
            name("table").with_role("collection"),
            name("enabled").with_role("where"),
            block("body", [call("visit")]),
        ]);
        assert_eq!(dump(stmt), "for (key, _) in table\n  if enabled\n    visit()\n");
    }

    #[test]
    fn test_do_catch() {
        let stmt = n(SyntaxKind::DoStmt).with_children([
            block("body", [call("risky")]),
            n(SyntaxKind::CatchClause).with_children([
                n(SyntaxKind::IdentifierPattern).with_text("error").with_role("pattern"),
                n(SyntaxKind::Type).with_text("IOError").with_role("type"),
                block("body", [call("recover")]),
            ]),
            n(SyntaxKind::CatchClause).with_child(block("body", [])),
        ]);
        assert_eq!(dump(stmt), "do\n  risky()\ncatch let error: IOError\n  recover()\ncatch\n");
    }

    #[test]
    fn test_assignment_and_unsupported_loop() {
        let assign = sequence([name("x"), op("="), n(SyntaxKind::IntegerLiteral).with_text("1")]);
        assert_eq!(dump(assign), "x = 1\n");

        let repeat = n(SyntaxKind::RepeatWhileStmt).at(0, 12);
        let root = n(SyntaxKind::SourceFile).with_child(repeat);
        let file = adapt("stmts.swift", &root, &SideTables::default()).file;
        let Stmt::Error(error) = &file.statements[0] else {
            panic!("expected placeholder");
        };
        assert_eq!(error.diagnostic.code, Some(tarn_core::ErrorCode::E1001));
    }
}
