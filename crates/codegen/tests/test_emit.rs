//! End-to-end emission: IR through the default passes, then to Kotlin text.

use tarn_codegen::{EmitConfig, Translation, emit};
use tarn_core::ast::*;
use tarn_core::helpers::build::*;
use tarn_core::{Registry, rewrite};

fn translate(file: SourceFile) -> Translation {
    let result = rewrite(file);
    emit(&result.file, &result.registry, &EmitConfig::default())
}

fn emit_plain(file: SourceFile) -> String {
    emit(&file, &Registry::default(), &EmitConfig::default()).text
}

#[test]
fn test_return_if_nil() {
    // if (x == nil) { return }
    let file = file_with_statements(vec![if_stmt(
        paren(binary(decl("x"), "==", nil())),
        vec![ret_void()],
    )]);
    assert_eq!(
        translate(file).text,
        "fun main(args: Array<String>) {\n    x ?: return\n}\n"
    );
}

#[test]
fn test_payload_union_and_switch_expression() {
    // enum Token { case a; case b(n: Int) }
    // func rank(_ token: Token) -> Int { switch token { case .a: return 0; case .b: return 1 } }
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
    let file = file_with_declarations(vec![
        token,
        function_with("rank", vec![param(None, "token", "Token")], Some("Int"), body),
    ]);
    assert_eq!(
        translate(file).text,
        "sealed class Token {
    object A : Token()
    class B(val n: Int) : Token()
}

fun rank(token: Token): Int {
    return when (token) {
        is Token.A -> 0
        is Token.B -> 1
    }
}
"
    );
}

#[test]
fn test_variadic_call_binding() {
    // func f(_ x: Int, label: Int, _ v: Int...) {}
    // f(1, label: 2, 3, 4)
    let mut variadic = param(None, "v", "Int");
    variadic.is_variadic = true;
    let declaration = function_with(
        "f",
        vec![param(None, "x", "Int"), param(Some("label"), "label", "Int"), variadic],
        None,
        vec![],
    );
    let shuffle = TupleShuffleExpr::new(
        vec![None, Some("label".into()), None],
        vec![
            ShuffleIndex::Present,
            ShuffleIndex::Present,
            ShuffleIndex::Variadic { count: 2 },
        ],
        vec![int(1), int(2), int(3), int(4)],
    )
    .unwrap();
    let file = source_file(
        "main.swift",
        vec![declaration],
        vec![expr_stmt(call_with(decl("f"), Expr::TupleShuffle(shuffle)))],
    );
    assert_eq!(
        translate(file).text,
        "fun f(x: Int, label: Int, vararg v: Int) {
}

fun main(args: Array<String>) {
    f(1, label = 2, 3, 4)
}
"
    );
}

#[test]
fn test_switch_returning_values_becomes_return_when() {
    let body = vec![switch(
        decl("n"),
        vec![
            case(vec![int(0)], vec![ret(string("zero"))]),
            default_case(vec![ret(string("many"))]),
        ],
    )];
    let file = file_with_declarations(vec![function_with(
        "name",
        vec![param(None, "n", "Int")],
        Some("String"),
        body,
    )]);
    assert_eq!(
        translate(file).text,
        "fun name(n: Int): String {
    return when (n) {
        0 -> \"zero\"
        else -> \"many\"
    }
}
"
    );
}

#[test]
fn test_one_marker_per_failure_site() {
    let file = file_with_declarations(vec![
        function("first", vec![expr_stmt(call(decl("start"), vec![]))]),
        function("broken", vec![error_stmt("unsupported #warning")]),
        function("last", vec![expr_stmt(call(decl("stop"), vec![]))]),
    ]);
    let translation = translate(file);
    assert_eq!(translation.marker_count(), 1);
    assert!(translation.text.contains("fun first() {\n    start()\n}"));
    assert!(translation.text.contains("fun broken() {\n    <<Error: unsupported #warning>>\n}"));
    assert!(translation.text.contains("fun last() {\n    stop()\n}"));
}

#[test]
fn test_precedence_is_preserved() {
    let statements = vec![
        // 1 + 2 * 3
        let_decl("a", None, Some(binary(int(1), "+", binary(int(2), "*", int(3))))),
        // (a - b) - c
        let_decl("b", None, Some(binary(binary(decl("a"), "-", decl("b")), "-", decl("c")))),
        // (1 + 2) * 3
        let_decl("c", None, Some(binary(binary(int(1), "+", int(2)), "*", int(3)))),
        // a == b ? c : d == e
        let_decl(
            "d",
            None,
            Some(ternary(
                binary(decl("a"), "==", decl("b")),
                decl("c"),
                binary(decl("d"), "==", decl("e")),
            )),
        ),
    ];
    assert_eq!(
        emit_plain(file_with_statements(statements)),
        "fun main(args: Array<String>) {
    val a = 1 + 2 * 3
    val b = a - b - c
    val c = (1 + 2) * 3
    val d = if (a == b) c else d == e
}
"
    );
}

#[test]
fn test_narrow_line_limit_breaks_declarations() {
    let file = file_with_declarations(vec![function_with(
        "area",
        vec![param(None, "width", "Double"), param(None, "height", "Double")],
        Some("Double"),
        vec![ret(binary(decl("width"), "*", decl("height")))],
    )]);
    let config = EmitConfig {
        line_limit: 30,
        indentation: "  ".to_string(),
    };
    assert_eq!(
        emit(&file, &Registry::default(), &config).text,
        "fun area(
  width: Double,
  height: Double
): Double {
  return width * height
}
"
    );
}

#[test]
fn test_output_redirection_is_carried() {
    let mut file = file_with_declarations(vec![function("run", vec![])]);
    file.add_output("gen/Run.kt");
    let translation = translate(file);
    assert_eq!(
        translation.redirected_path(),
        Some(std::path::Path::new("gen/Run.kt"))
    );
}
