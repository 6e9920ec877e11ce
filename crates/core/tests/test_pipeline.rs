//! Whole-pipeline tests
//!
//! Each test builds the IR the front end would produce for a small source
//! snippet and checks what the default pass order turns it into.

use tarn_core::ast::*;
use tarn_core::helpers::build::*;
use tarn_core::helpers::DiagnosticTestBuilder;
use tarn_core::{PassManager, PassManagerConfig, rewrite, rewrite_with};

#[test]
fn test_return_if_nil_through_full_pipeline() {
    // if (x == nil) { return }
    let result = rewrite(file_with_statements(vec![if_stmt(
        paren(binary(decl("x"), "==", nil())),
        vec![ret_void()],
    )]));
    assert_eq!(dump_stmts(&result.file.statements), "x ?? return\n");
    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_payload_enum_cases_in_switch() {
    // enum Token { case a; case b(n: Int) }
    // switch token { case .a: return 0; case .b: return 1 }
    let token = enum_decl(
        "Token",
        &[],
        vec![element("a", &[]), element("b", &[(Some("n"), "Int")])],
    );
    let body = vec![switch(
        decl("token"),
        vec![
            case(vec![member(type_ref("Token"), "a")], vec![ret(int(0))]),
            case(vec![member(type_ref("Token"), "b")], vec![ret(int(1))]),
        ],
    )];
    let result = rewrite(file_with_declarations(vec![
        token,
        function_with("rank", vec![param(None, "token", "Token")], Some("Int"), body),
    ]));

    assert_eq!(result.registry.enum_kind("Token"), Some(EnumKind::HasPayload));
    let Stmt::Function(rank) = &result.file.declarations[1] else {
        panic!("expected function");
    };
    assert_eq!(
        dump_stmts(rank.body.as_ref().unwrap()),
        "switch token => return\n  case token is Token.a\n    0\n  case token is Token.b\n    1\n"
    );
}

#[test]
fn test_payload_free_enum_cases_are_compared() {
    let direction = enum_decl(
        "Direction",
        &["String"],
        vec![element("north", &[]), element("south", &[])],
    );
    let body = vec![switch(
        decl("d"),
        vec![
            case(vec![member(type_ref("Direction"), "north")], vec![ret(string("up"))]),
            default_case(vec![ret(string("down"))]),
        ],
    )];
    let result = rewrite(file_with_declarations(vec![
        direction,
        function_with("label", vec![param(None, "d", "Direction")], Some("String"), body),
    ]));

    let Stmt::Function(label) = &result.file.declarations[1] else {
        panic!("expected function");
    };
    let Stmt::Switch(s) = &label.body.as_ref().unwrap()[0] else {
        panic!("expected switch");
    };
    let Expr::Member(north) = &s.cases[0].expressions[0] else {
        panic!("expected member");
    };
    assert_eq!(north.case_style, Some(CaseStyle::PayloadFree));
    assert_eq!(s.converts_to, Some(SwitchTarget::Return));
}

#[test]
fn test_failable_initializer_lands_in_companion() {
    let celsius = struct_decl(
        "Celsius",
        &["Equatable"],
        vec![
            let_decl("degrees", Some("Double"), None),
            initializer(
                vec![param(Some("fahrenheit"), "f", "Double")],
                true,
                vec![
                    if_stmt(binary(decl("f"), "<", double(-459.67)), vec![ret(nil())]),
                    assign(
                        decl("self"),
                        call(type_ref("Celsius"), vec![(Some("degrees"), decl("f"))]),
                    ),
                ],
            ),
        ],
    );
    let result = rewrite(file_with_declarations(vec![celsius]));

    assert_eq!(
        dump_stmts(&result.file.declarations),
        "struct Celsius : \n\
         \x20 companion\n\
         \x20   func invoke(fahrenheit f: Double) -> Celsius? static\n\
         \x20     if f < -459.67\n\
         \x20       return nil\n\
         \x20     return Celsius(degrees: f)\n\
         \x20 let degrees: Double\n"
    );
}

#[test]
fn test_defer_and_guard_lowering() {
    let body = vec![
        guard(prefix("!", decl("ready")), vec![ret_void()]),
        defer(vec![expr_stmt(call(decl("close"), vec![]))]),
        expr_stmt(call(decl("work"), vec![])),
    ];
    let result = rewrite(file_with_declarations(vec![function("run", body)]));
    assert_eq!(
        dump_stmts(&result.file.declarations),
        "func run() -> ()\n  if ready\n    return\n  do\n    work()\n  finally\n    close()\n"
    );
}

#[test]
fn test_standard_library_and_labels() {
    let mover = function_with(
        "move",
        vec![param(Some("by"), "offset", "Int")],
        None,
        vec![expr_stmt(call(
            stdlib_decl("print"),
            vec![(None, stdlib_member(decl("offset"), "description"))],
        ))],
    );
    let result = rewrite(source_file(
        "main.swift",
        vec![mover],
        vec![expr_stmt(call(decl("move"), vec![(Some("by"), int(3))]))],
    ));

    assert_eq!(dump_stmts(&result.file.statements), "move(offset: 3)\n");
    let Stmt::Function(mover) = &result.file.declarations[0] else {
        panic!("expected function");
    };
    assert_eq!(
        dump_stmts(mover.body.as_ref().unwrap()),
        "println(offset.toString())\n"
    );
}

#[test]
fn test_error_placeholders_survive_every_pass() {
    let result = rewrite(file_with_statements(vec![
        error_stmt("unsupported repeat-while"),
        expr_stmt(call(decl("f"), vec![(None, error_expr("bad argument"))])),
    ]));
    assert_eq!(
        dump_stmts(&result.file.statements),
        "<<error: unsupported repeat-while>>\nf(<<error: bad argument>>)\n"
    );
    let placeholders = tarn_core::visitor::placeholder_diagnostics(&result.file);
    assert_eq!(placeholders.len(), 2);
}

#[test]
fn test_disabled_pass_is_skipped() {
    let mut config = PassManagerConfig::default();
    config.disabled_passes.insert("return_if_nil".to_string());
    let input = vec![if_stmt(binary(decl("x"), "==", nil()), vec![ret_void()])];
    let result = rewrite_with(file_with_statements(input), config);
    assert_eq!(dump_stmts(&result.file.statements), "if x == nil\n  return\n");
}

#[test]
fn test_mutable_struct_warning() {
    DiagnosticTestBuilder::new(file_with_declarations(vec![struct_decl(
        "Point",
        &[],
        vec![var_decl("x", Some("Int"), Some(int(0)))],
    )]))
    .expect("W4001")
    .expect_not("W4003")
    .assert_all();
}

#[test]
fn test_clean_file_has_no_diagnostics() {
    DiagnosticTestBuilder::new(file_with_declarations(vec![struct_decl(
        "Point",
        &["Hashable"],
        vec![let_decl("x", Some("Int"), None)],
    )]))
    .assert_none();
}

#[test]
fn test_pipeline_is_idempotent() {
    let file = source_file(
        "main.swift",
        vec![class_decl(
            "Counter",
            &[],
            vec![
                static_var("shared", "Counter", call(type_ref("Counter"), vec![])),
                function(
                    "tick",
                    vec![
                        var_decl("label", Some("String"), None),
                        switch(
                            decl("n"),
                            vec![
                                case(vec![int(0)], vec![assign(decl("label"), string("zero"))]),
                                default_case(vec![assign(decl("label"), string("many"))]),
                            ],
                        ),
                    ],
                ),
            ],
        )],
        vec![if_stmt(paren(paren(binary(decl("y"), "==", nil()))), vec![ret_void()])],
    );

    let manager = PassManager::new();
    let (once, _, _) = manager.run_single(file);
    let (twice, _, _) = manager.run_single(once.clone());
    assert_eq!(once, twice);
}
