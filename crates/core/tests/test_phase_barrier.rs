//! Cross-file registry tests
//!
//! Transformation resolves names against registries filled from every file,
//! so every file must be collected before any file is transformed.

use std::thread;
use tarn_core::ast::*;
use tarn_core::helpers::build::*;
use tarn_core::{PassManager, RegistryBuilder};

fn declaring_file() -> SourceFile {
    source_file(
        "geometry.swift",
        vec![
            function_with(
                "move",
                vec![param(Some("from"), "start", "Int"), param(Some("to"), "end", "Int")],
                None,
                vec![],
            ),
            enum_decl(
                "Shape",
                &[],
                vec![element("dot", &[]), element("circle", &[(Some("radius"), "Double")])],
            ),
        ],
        vec![],
    )
}

fn calling_file() -> SourceFile {
    source_file(
        "main.swift",
        vec![],
        vec![
            expr_stmt(call(decl("move"), vec![(Some("from"), int(1)), (Some("to"), int(2))])),
            expr_stmt(member(type_ref("Shape"), "dot")),
        ],
    )
}

fn dot_style(file: &SourceFile) -> Option<CaseStyle> {
    match &file.statements[1] {
        Stmt::Expression(ExpressionStmt {
            expr: Expr::Member(m),
            ..
        }) => m.case_style,
        _ => panic!("expected member"),
    }
}

#[test]
fn test_collecting_every_file_first_resolves_names() {
    let manager = PassManager::new();
    let builder = RegistryBuilder::new();
    let mut files = vec![declaring_file(), calling_file()];
    for file in &mut files {
        manager.run_collection(file, &builder);
    }
    let registry = builder.freeze();

    let (main, _) = manager.run_transformation(files.remove(1), &registry);
    assert_eq!(expr_to_string(match &main.statements[0] {
        Stmt::Expression(e) => &e.expr,
        _ => panic!("expected expression"),
    }), "move(start: 1, end: 2)");
    assert_eq!(dot_style(&main), Some(CaseStyle::Payload));
}

#[test]
fn test_transforming_before_collection_leaks_source_names() {
    // Only the calling file is collected: the callee and the enum are unknown.
    let manager = PassManager::new();
    let (main, _, _) = manager.run_single(calling_file());

    assert_eq!(dump_stmts(&main.statements), "move(from: 1, to: 2)\nShape.dot\n");
    assert_eq!(dot_style(&main), None);
}

#[test]
fn test_parallel_collection_matches_sequential() {
    let manager = PassManager::new();

    let sequential = RegistryBuilder::new();
    for mut file in [declaring_file(), calling_file()] {
        manager.run_collection(&mut file, &sequential);
    }
    let sequential = sequential.freeze();

    let parallel = RegistryBuilder::new();
    thread::scope(|scope| {
        for mut file in [declaring_file(), calling_file()] {
            let manager = &manager;
            let parallel = &parallel;
            scope.spawn(move || manager.run_collection(&mut file, parallel));
        }
    });
    let parallel = parallel.freeze();

    assert_eq!(
        parallel.parameter_names("move(from:to:)"),
        sequential.parameter_names("move(from:to:)")
    );
    assert_eq!(parallel.enum_kind("Shape"), sequential.enum_kind("Shape"));
}
