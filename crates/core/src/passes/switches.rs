//! Switch rewrites: enum case styles, payload `is` checks, switch expressions
//! and dead breaks.

use crate::ast::*;
use crate::error::{Diagnostic, ErrorCode};
use crate::registry::Registry;
use crate::visitor::{Rewriter, mut_walk};

/// Tags every reference to an enum case with the case style its enum needs.
///
/// The spelling itself (`Circle`, `NORTH`) is applied at emission.
pub struct CapitalizeEnumCases<'a> {
    registry: &'a Registry,
}

impl<'a> CapitalizeEnumCases<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        CapitalizeEnumCases { registry }
    }

    /// The enum a member's base names, if it names one.
    fn enum_name<'e>(&self, base: &'e Expr) -> Option<&'e str> {
        let name = match base.unparenthesized() {
            Expr::TypeRef(t) => t.name.rsplit('.').next().unwrap_or(&t.name),
            Expr::DeclRef(d) => d.name.as_str(),
            _ => return None,
        };
        self.registry.enum_kind(name).map(|_| name)
    }
}

impl Rewriter for CapitalizeEnumCases<'_> {
    fn replace_member(&mut self, member: MemberExpr) -> Expr {
        let mut member = mut_walk::walk_member(self, member);
        if member.case_style.is_none()
            && let Some(enum_name) = self.enum_name(&member.base)
            && self.registry.is_enum_case(enum_name, &member.member)
        {
            member.case_style = self.registry.enum_kind(enum_name).map(|kind| match kind {
                EnumKind::HasPayload => CaseStyle::Payload,
                EnumKind::PayloadFree => CaseStyle::PayloadFree,
            });
        }
        Expr::Member(member)
    }
}

/// `case .empty:` over a has-payload enum becomes `case subject is Shape.Empty`.
pub struct IsChecksForPayloadCases;

impl Rewriter for IsChecksForPayloadCases {
    fn replace_switch(&mut self, stmt: SwitchStmt) -> Vec<Stmt> {
        let mut stmt = mut_walk::walk_switch(self, stmt);
        let subject = stmt.subject.clone();
        for case in &mut stmt.cases {
            for expr in &mut case.expressions {
                if matches!(expr, Expr::Member(m) if m.case_style == Some(CaseStyle::Payload)) {
                    let range = expr.range();
                    let member = mut_walk::take_expr(expr);
                    *expr = Expr::Binary(BinaryExpr {
                        lhs: Box::new(subject.clone()),
                        op: "is".to_string(),
                        rhs: Box::new(member),
                        ty: None,
                        range,
                    });
                }
            }
        }
        vec![Stmt::Switch(stmt)]
    }
}

/// Turns a switch whose every case ends by handing a value to the same place
/// into one expression-producing switch.
pub struct SwitchesToExpressions;

/// The value a case hands over and where it goes.
fn case_target(case: &SwitchCase) -> Option<SwitchTarget> {
    match case.statements.last()? {
        Stmt::Return(ReturnStmt { expr: Some(_), .. }) => Some(SwitchTarget::Return),
        Stmt::Assignment(a) => Some(SwitchTarget::Assign(a.lhs.clone())),
        _ => None,
    }
}

fn same_target(a: &SwitchTarget, b: &SwitchTarget) -> bool {
    match (a, b) {
        (SwitchTarget::Return, SwitchTarget::Return) => true,
        (SwitchTarget::Assign(x), SwitchTarget::Assign(y)) => expr_to_string(x) == expr_to_string(y),
        _ => false,
    }
}

fn convert(mut stmt: SwitchStmt) -> SwitchStmt {
    if stmt.converts_to.is_some() || stmt.cases.is_empty() {
        return stmt;
    }
    let Some(target) = case_target(&stmt.cases[0]) else {
        return stmt;
    };
    let uniform = stmt.cases.iter().all(|case| {
        case_target(case).is_some_and(|t| same_target(&t, &target))
    });
    if !uniform {
        return stmt;
    }

    for case in &mut stmt.cases {
        let value = match case.statements.pop() {
            Some(Stmt::Return(ReturnStmt {
                expr: Some(expr),
                range,
            })) => Stmt::Expression(ExpressionStmt { expr, range }),
            Some(Stmt::Assignment(a)) => Stmt::Expression(ExpressionStmt {
                expr: a.rhs,
                range: a.range,
            }),
            Some(other) => other,
            None => continue,
        };
        case.statements.push(value);
    }
    stmt.converts_to = Some(target);
    stmt
}

impl Rewriter for SwitchesToExpressions {
    fn replace_switch(&mut self, stmt: SwitchStmt) -> Vec<Stmt> {
        let stmt = mut_walk::walk_switch(self, stmt);
        vec![Stmt::Switch(convert(stmt))]
    }

    // `var x: T` directly followed by a switch assigning `x` merges into one
    // declaration initialized by the switch.
    fn replace_statements(&mut self, stmts: Vec<Stmt>) -> Vec<Stmt> {
        let stmts = mut_walk::walk_statements(self, stmts);
        let mut out: Vec<Stmt> = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            let Stmt::Switch(mut switch) = stmt else {
                out.push(stmt);
                continue;
            };
            let assigned = match &switch.converts_to {
                Some(SwitchTarget::Assign(lhs)) => lhs.as_decl_name().map(str::to_string),
                _ => None,
            };
            let mergeable = matches!(
                (out.last(), assigned.as_deref()),
                (Some(Stmt::Variable(v)), Some(name))
                    if v.name == name && v.initializer.is_none() && !v.is_computed() && !v.is_static
            );
            if mergeable && let Some(Stmt::Variable(variable)) = out.pop() {
                switch.converts_to = Some(SwitchTarget::Declare(variable));
            }
            out.push(Stmt::Switch(switch));
        }
        out
    }
}

/// Drops trailing `break`s and default cases left with nothing to do.
pub struct RemoveBreaksInSwitches;

impl Rewriter for RemoveBreaksInSwitches {
    fn replace_switch(&mut self, stmt: SwitchStmt) -> Vec<Stmt> {
        let mut stmt = mut_walk::walk_switch(self, stmt);
        for case in &mut stmt.cases {
            if matches!(case.statements.last(), Some(Stmt::Break(_))) {
                case.statements.pop();
            }
        }
        stmt.cases
            .retain(|case| !(case.is_default() && case.statements.is_empty()));
        vec![Stmt::Switch(stmt)]
    }
}

/// Warns when a switch evaluates an impure call subject more than once.
///
/// Condition branches and payload bindings both repeat the subject text, so
/// the call runs once per evaluated branch.
#[derive(Default)]
pub struct ImpureSwitchSubjects {
    diagnostics: Vec<Diagnostic>,
}

fn binds_from_subject(switch: &SwitchStmt) -> bool {
    switch.cases.iter().flat_map(|c| c.statements.iter()).any(|s| {
        matches!(s, Stmt::Variable(v) if v.initializer.as_ref().is_some_and(|i| switch.reads_subject_member(i)))
    })
}

impl Rewriter for ImpureSwitchSubjects {
    fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn replace_switch(&mut self, stmt: SwitchStmt) -> Vec<Stmt> {
        let stmt = mut_walk::walk_switch(self, stmt);
        if let Expr::Call(call) = stmt.subject.unparenthesized()
            && !call.is_pure
            && (stmt.uses_conditions() || binds_from_subject(&stmt))
        {
            self.diagnostics.push(
                Diagnostic::from_code(
                    ErrorCode::W4004,
                    format!(
                        "switch subject `{}` is evaluated once per case",
                        expr_to_string(&stmt.subject)
                    ),
                )
                .with_range(stmt.range),
            );
        }
        vec![Stmt::Switch(stmt)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::build::*;
    use crate::registry::{EnumInfo, RegistryBuilder};

    fn run<R: Rewriter>(rewriter: &mut R, statements: Vec<Stmt>) -> Vec<Stmt> {
        rewriter.rewrite_file(file_with_statements(statements)).statements
    }

    fn shapes() -> Registry {
        let builder = RegistryBuilder::new();
        builder.record_enum(
            "Shape",
            EnumInfo {
                kind: EnumKind::HasPayload,
                cases: vec!["empty".into(), "circle".into()],
            },
        );
        builder.record_enum(
            "Direction",
            EnumInfo {
                kind: EnumKind::PayloadFree,
                cases: vec!["north".into(), "south".into()],
            },
        );
        builder.freeze()
    }

    fn case_style(stmt: &Stmt) -> Option<CaseStyle> {
        match stmt {
            Stmt::Expression(ExpressionStmt { expr: Expr::Member(m), .. }) => m.case_style,
            _ => panic!("expected member"),
        }
    }

    #[test]
    fn test_case_styles_follow_enum_kind() {
        let registry = shapes();
        let out = run(
            &mut CapitalizeEnumCases::new(&registry),
            vec![
                expr_stmt(member(type_ref("Shape"), "empty")),
                expr_stmt(member(type_ref("Direction"), "north")),
                expr_stmt(member(type_ref("Direction"), "east")),
                expr_stmt(member(decl("point"), "north")),
            ],
        );
        assert_eq!(case_style(&out[0]), Some(CaseStyle::Payload));
        assert_eq!(case_style(&out[1]), Some(CaseStyle::PayloadFree));
        assert_eq!(case_style(&out[2]), None);
        assert_eq!(case_style(&out[3]), None);
    }

    #[test]
    fn test_payload_cases_become_is_checks() {
        let registry = shapes();
        let input = vec![switch(
            decl("shape"),
            vec![
                case(vec![member(type_ref("Shape"), "empty")], vec![ret(int(0))]),
                default_case(vec![ret(int(1))]),
            ],
        )];
        let tagged = run(&mut CapitalizeEnumCases::new(&registry), input);
        let out = run(&mut IsChecksForPayloadCases, tagged);

        let Stmt::Switch(s) = &out[0] else {
            panic!("expected switch");
        };
        assert!(s.is_subject_check(&s.cases[0].expressions[0]));
        assert!(!s.uses_conditions());
    }

    #[test]
    fn test_returning_switch_becomes_expression() {
        let out = run(
            &mut SwitchesToExpressions,
            vec![switch(
                decl("x"),
                vec![
                    case(vec![int(1)], vec![ret(string("one"))]),
                    default_case(vec![expr_stmt(call(decl("log"), vec![])), ret(string("many"))]),
                ],
            )],
        );
        assert_eq!(
            dump_stmts(&out),
            "switch x => return\n  case 1\n    \"one\"\n  default\n    log()\n    \"many\"\n"
        );
    }

    #[test]
    fn test_assigning_switch_merges_with_declaration() {
        let out = run(
            &mut SwitchesToExpressions,
            vec![
                var_decl("name", Some("String"), None),
                switch(
                    decl("x"),
                    vec![
                        case(vec![int(1)], vec![assign(decl("name"), string("one"))]),
                        default_case(vec![assign(decl("name"), string("many"))]),
                    ],
                ),
            ],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(
            dump_stmts(&out),
            "switch x => var name: String\n  case 1\n    \"one\"\n  default\n    \"many\"\n"
        );
    }

    #[test]
    fn test_mixed_targets_are_left_alone() {
        let input = vec![switch(
            decl("x"),
            vec![
                case(vec![int(1)], vec![assign(decl("a"), int(1))]),
                case(vec![int(2)], vec![assign(decl("b"), int(2))]),
                default_case(vec![brk()]),
            ],
        )];
        let out = run(&mut SwitchesToExpressions, input.clone());
        assert_eq!(out, input);
    }

    #[test]
    fn test_breaks_removed_after_conversion_check() {
        let input = vec![switch(
            decl("x"),
            vec![
                case(vec![int(1)], vec![ret(int(1))]),
                default_case(vec![brk()]),
            ],
        )];
        // The default case does not return, so no conversion happens.
        let converted = run(&mut SwitchesToExpressions, input);
        let out = run(&mut RemoveBreaksInSwitches, converted);
        assert_eq!(dump_stmts(&out), "switch x\n  case 1\n    return 1\n");
    }

    #[test]
    fn test_impure_subject_with_conditions_warns() {
        let subject = call(decl("next"), vec![]);
        let condition = binary(
            binary(subject.clone(), "is", member(type_ref("Shape"), "circle")),
            "&&",
            binary(member(subject.clone(), "radius"), "==", int(1)),
        );
        let mut pass = ImpureSwitchSubjects::default();
        run(
            &mut pass,
            vec![switch(subject, vec![case(vec![condition], vec![ret(int(1))])])],
        );
        let diagnostics = pass.take_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, Some(ErrorCode::W4004));
    }

    #[test]
    fn test_pure_subject_does_not_warn() {
        let Expr::Call(mut subject) = call(decl("peek"), vec![]) else {
            unreachable!();
        };
        subject.is_pure = true;
        let subject = Expr::Call(subject);
        let condition = binary(subject.clone(), "==", int(1));
        let mut pass = ImpureSwitchSubjects::default();
        run(
            &mut pass,
            vec![switch(subject, vec![case(vec![condition, int(2)], vec![ret(int(1))])])],
        );
        assert!(pass.take_diagnostics().is_empty());
    }
}
