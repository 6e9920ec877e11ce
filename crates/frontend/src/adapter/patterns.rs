//! `case` patterns.
//!
//! A pattern is destructured against the expression it is matched with into a
//! boolean condition plus the names it binds, each bound to a projection of
//! that expression (`subject.radius`, `subject.first`, ...).

use super::Adapter;
use crate::syntax::{SyntaxKind, SyntaxNode};
use tarn_core::ast::*;
use tarn_core::error::{Diagnostic, ErrorCode};

const TUPLE_COMPONENTS: [&str; 3] = ["first", "second", "third"];

/// Where a pattern is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PatternContext {
    /// Directly under a `switch` case: bare values are compared with the subject
    /// by the `when` itself.
    SwitchCase,
    /// Inside another pattern or an `if case` condition.
    Condition,
}

#[derive(Debug, Clone, Default)]
pub(super) struct PatternMatch {
    pub(super) condition: Option<Expr>,
    /// `(name, value, is_let)` in source order.
    pub(super) bindings: Vec<(String, Expr, bool)>,
}

impl PatternMatch {
    fn require(&mut self, condition: Expr) {
        self.condition = Some(match self.condition.take() {
            Some(previous) => binary(previous, "&&", condition),
            None => condition,
        });
    }

    fn absorb(&mut self, other: PatternMatch) {
        if let Some(condition) = other.condition {
            self.require(condition);
        }
        self.bindings.extend(other.bindings);
    }

    /// The bindings as local declarations.
    pub(super) fn declarations(&self) -> Vec<Stmt> {
        self.bindings
            .iter()
            .map(|(name, value, is_let)| {
                Stmt::Variable(VariableDecl::simple(name.clone(), None, Some(value.clone()), *is_let))
            })
            .collect()
    }
}

fn binary(lhs: Expr, op: &str, rhs: Expr) -> Expr {
    Expr::Binary(BinaryExpr {
        lhs: Box::new(lhs),
        op: op.to_string(),
        rhs: Box::new(rhs),
        ty: None,
        range: None,
    })
}

fn type_ref(name: &str) -> Expr {
    Expr::TypeRef(TypeRefExpr {
        name: name.to_string(),
        ty: None,
        range: None,
    })
}

fn member(base: Expr, name: &str) -> Expr {
    Expr::Member(MemberExpr {
        base: Box::new(base),
        member: name.to_string(),
        is_standard_library: false,
        case_style: None,
        ty: None,
        range: None,
    })
}

/// Labels of the associated values in a case declaration such as
/// `case circle(radius: Double)`.
fn declared_labels(declaration: &str) -> Vec<Option<String>> {
    let Some(open) = declaration.find('(') else {
        return Vec::new();
    };
    let inner = declaration[open + 1..].trim_end().trim_end_matches(')');
    super::arguments::split_top_level(inner, ',')
        .into_iter()
        .map(|part| {
            let parts = super::arguments::split_top_level(part, ':');
            match parts.as_slice() {
                [label, _] => Some(label.trim().to_string()).filter(|l| !l.is_empty() && l != "_"),
                _ => None,
            }
        })
        .collect()
}

impl Adapter<'_> {
    pub(super) fn destructure(
        &mut self,
        pattern: &SyntaxNode,
        subject: &Expr,
        context: PatternContext,
        is_let: bool,
    ) -> Result<PatternMatch, Diagnostic> {
        let mut result = PatternMatch::default();
        match pattern.kind {
            SyntaxKind::WildcardPattern => {}
            SyntaxKind::IdentifierPattern => {
                result.bindings.push((pattern.text().to_string(), subject.clone(), is_let));
            }
            SyntaxKind::ValueBindingPattern => {
                let inner = pattern
                    .children
                    .first()
                    .ok_or_else(|| self.diagnostic(pattern, ErrorCode::E1002, "binding without a pattern"))?;
                return self.destructure(inner, subject, context, pattern.text() != "var");
            }
            SyntaxKind::ExpressionPattern => {
                let inner = pattern
                    .children
                    .first()
                    .ok_or_else(|| self.diagnostic(pattern, ErrorCode::E1002, "empty expression pattern"))?;
                let value = self.adapt_expr(inner);
                result.require(match context {
                    PatternContext::SwitchCase => value,
                    PatternContext::Condition => binary(subject.clone(), "==", value),
                });
            }
            SyntaxKind::EnumCasePattern => {
                return self.destructure_case(pattern, subject, context, is_let);
            }
            SyntaxKind::TuplePattern => {
                let elements: Vec<&SyntaxNode> = pattern.children.iter().collect();
                if elements.len() > TUPLE_COMPONENTS.len() {
                    return Err(self.diagnostic(
                        pattern,
                        ErrorCode::E1002,
                        format!("tuple pattern with {} elements", elements.len()),
                    ));
                }
                for (element, component) in elements.into_iter().zip(TUPLE_COMPONENTS) {
                    let projection = member(subject.clone(), component);
                    let matched = self.destructure(element, &projection, PatternContext::Condition, is_let)?;
                    result.absorb(matched);
                }
            }
            SyntaxKind::IsTypePattern => {
                let ty = Self::type_name(pattern, "type").unwrap_or_else(|| pattern.text().to_string());
                result.require(binary(subject.clone(), "is", type_ref(&ty)));
            }
            SyntaxKind::AsPattern => {
                let (Some(inner), Some(ty)) = (pattern.child("pattern"), Self::type_name(pattern, "type")) else {
                    return Err(self.diagnostic(pattern, ErrorCode::E1002, "`as` pattern without a type"));
                };
                result.require(binary(subject.clone(), "is", type_ref(&ty)));
                let cast = binary(subject.clone(), "as", type_ref(&ty));
                result.absorb(self.destructure(inner, &cast, PatternContext::Condition, is_let)?);
            }
            kind => {
                return Err(self.diagnostic(pattern, ErrorCode::E1002, format!("unsupported pattern `{:?}`", kind)));
            }
        }
        Ok(result)
    }

    /// `.circle(let r)`: a subtype check plus one projection per argument.
    fn destructure_case(
        &mut self,
        pattern: &SyntaxNode,
        subject: &Expr,
        context: PatternContext,
        is_let: bool,
    ) -> Result<PatternMatch, Diagnostic> {
        let case_name = pattern.text();
        let owner = Self::type_name(pattern, "type")
            .or_else(|| self.type_of(pattern))
            .or_else(|| subject.ty().map(str::to_string))
            .map(|ty| ty.trim_end_matches(['?', '!']).to_string())
            .filter(|ty| !ty.is_empty())
            .ok_or_else(|| {
                self.diagnostic(
                    pattern,
                    ErrorCode::E1004,
                    format!("cannot resolve the enum of case `.{}`", case_name),
                )
            })?;
        let case = member(type_ref(&owner), case_name);

        let arguments: Vec<&SyntaxNode> = pattern.children_of(SyntaxKind::PatternArgument).collect();
        let mut result = PatternMatch::default();
        if arguments.is_empty() {
            result.require(match context {
                PatternContext::SwitchCase => case,
                PatternContext::Condition => binary(subject.clone(), "==", case),
            });
            return Ok(result);
        }

        result.require(binary(subject.clone(), "is", case));
        let declared = self
            .tables
            .symbols
            .get(pattern.offset)
            .and_then(|entry| entry.declaration.as_deref())
            .map(declared_labels)
            .unwrap_or_default();

        for (index, argument) in arguments.into_iter().enumerate() {
            let Some(inner) = argument.children.first() else {
                continue;
            };
            let label = super::arguments::argument_label(argument)
                .or_else(|| declared.get(index).cloned().flatten());
            let Some(label) = label else {
                // Nothing to project from; a wildcard needs no projection.
                if inner.kind == SyntaxKind::WildcardPattern {
                    continue;
                }
                return Err(self.diagnostic(
                    argument,
                    ErrorCode::E2002,
                    format!("associated value {} of `.{}` has no label to bind through", index, case_name),
                ));
            };
            let projection = member(subject.clone(), &label);
            result.absorb(self.destructure(inner, &projection, PatternContext::Condition, is_let)?);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{SideTables, SymbolEntry, SymbolTable, TypeEntry, TypeTable};

    fn n(kind: SyntaxKind) -> SyntaxNode {
        SyntaxNode::new(kind)
    }

    fn subject(ty: &str) -> Expr {
        Expr::DeclRef(DeclRefExpr {
            name: "shape".into(),
            is_standard_library: false,
            is_implicit: false,
            ty: Some(ty.into()),
            range: None,
        })
    }

    fn bind(name: &str) -> SyntaxNode {
        n(SyntaxKind::ValueBindingPattern)
            .with_text("let")
            .with_child(n(SyntaxKind::IdentifierPattern).with_text(name))
    }

    fn summary(matched: &PatternMatch) -> (String, Vec<String>) {
        let condition = matched.condition.as_ref().map(expr_to_string).unwrap_or_default();
        let bindings = matched
            .bindings
            .iter()
            .map(|(name, value, _)| format!("{} = {}", name, expr_to_string(value)))
            .collect();
        (condition, bindings)
    }

    #[test]
    fn test_case_without_payload() {
        let tables = SideTables::default();
        let mut adapter = Adapter::new(&tables);
        let pattern = n(SyntaxKind::EnumCasePattern).with_text("empty");
        let top = adapter
            .destructure(&pattern, &subject("Shape"), PatternContext::SwitchCase, true)
            .unwrap();
        assert_eq!(summary(&top).0, "Shape.empty");
        let nested = adapter
            .destructure(&pattern, &subject("Shape?"), PatternContext::Condition, true)
            .unwrap();
        assert_eq!(summary(&nested).0, "shape == Shape.empty");
    }

    #[test]
    fn test_labels_come_from_declaration() {
        let tables = SideTables {
            symbols: SymbolTable::new(vec![SymbolEntry {
                offset: 5,
                origin: "App.Shape.rect".into(),
                declaration: Some("case rect(width: Int, height: Int)".into()),
            }]),
            ..Default::default()
        };
        let mut adapter = Adapter::new(&tables);
        let pattern = n(SyntaxKind::EnumCasePattern).with_text("rect").at(5, 20).with_children([
            n(SyntaxKind::PatternArgument).with_child(bind("w")),
            n(SyntaxKind::PatternArgument).with_child(n(SyntaxKind::WildcardPattern)),
        ]);
        let matched = adapter
            .destructure(&pattern, &subject("Shape"), PatternContext::SwitchCase, true)
            .unwrap();
        assert_eq!(summary(&matched), ("shape is Shape.rect".to_string(), vec!["w = shape.width".to_string()]));
    }

    #[test]
    fn test_nested_values_become_conditions() {
        let tables = SideTables::default();
        let mut adapter = Adapter::new(&tables);
        let pattern = n(SyntaxKind::EnumCasePattern).with_text("circle").with_children([
            n(SyntaxKind::PatternArgument)
                .with_text("radius")
                .with_child(n(SyntaxKind::ExpressionPattern).with_child(n(SyntaxKind::IntegerLiteral).with_text("0"))),
        ]);
        let matched = adapter
            .destructure(&pattern, &subject("Shape"), PatternContext::SwitchCase, true)
            .unwrap();
        assert_eq!(summary(&matched).0, "shape is Shape.circle && shape.radius == 0");
    }

    #[test]
    fn test_unlabeled_payload_is_rejected() {
        let tables = SideTables::default();
        let mut adapter = Adapter::new(&tables);
        let pattern = n(SyntaxKind::EnumCasePattern)
            .with_text("pair")
            .with_child(n(SyntaxKind::PatternArgument).with_child(bind("a")));
        let err = adapter
            .destructure(&pattern, &subject("Shape"), PatternContext::SwitchCase, true)
            .unwrap_err();
        assert_eq!(err.code, Some(ErrorCode::E2002));
    }

    #[test]
    fn test_case_owner_from_type_table() {
        let tables = SideTables {
            types: TypeTable::new(vec![TypeEntry {
                offset: 0,
                length: 6,
                ty: "Direction".into(),
            }]),
            ..Default::default()
        };
        let mut adapter = Adapter::new(&tables);
        let pattern = n(SyntaxKind::EnumCasePattern).with_text("north").at(0, 6);
        let untyped = Expr::DeclRef(DeclRefExpr {
            name: "heading".into(),
            is_standard_library: false,
            is_implicit: false,
            ty: None,
            range: None,
        });
        let matched = adapter
            .destructure(&pattern, &untyped, PatternContext::SwitchCase, true)
            .unwrap();
        assert_eq!(summary(&matched).0, "Direction.north");

        let unknown = n(SyntaxKind::EnumCasePattern).with_text("north").at(9, 6);
        let err = adapter
            .destructure(&unknown, &untyped, PatternContext::SwitchCase, true)
            .unwrap_err();
        assert_eq!(err.code, Some(ErrorCode::E1004));
    }

    #[test]
    fn test_tuple_and_type_patterns() {
        let tables = SideTables::default();
        let mut adapter = Adapter::new(&tables);
        let tuple = n(SyntaxKind::TuplePattern).with_children([
            bind("x"),
            n(SyntaxKind::ExpressionPattern).with_child(n(SyntaxKind::IntegerLiteral).with_text("1")),
        ]);
        let matched = adapter
            .destructure(&tuple, &subject("(Int, Int)"), PatternContext::SwitchCase, true)
            .unwrap();
        assert_eq!(
            summary(&matched),
            ("shape.second == 1".to_string(), vec!["x = shape.first".to_string()])
        );

        let cast = n(SyntaxKind::AsPattern).with_children([
            n(SyntaxKind::IdentifierPattern).with_text("c").with_role("pattern"),
            n(SyntaxKind::Type).with_text("Circle").with_role("type"),
        ]);
        let matched = adapter
            .destructure(&cast, &subject("Shape"), PatternContext::SwitchCase, true)
            .unwrap();
        assert_eq!(
            summary(&matched),
            ("shape is Circle".to_string(), vec!["c = shape as Circle".to_string()])
        );

        let wide = n(SyntaxKind::TuplePattern).with_children((0..4).map(|_| n(SyntaxKind::WildcardPattern)));
        let err = adapter
            .destructure(&wide, &subject("(Int, Int, Int, Int)"), PatternContext::SwitchCase, true)
            .unwrap_err();
        assert_eq!(err.code, Some(ErrorCode::E1002));
    }
}
