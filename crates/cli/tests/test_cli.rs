//! Runs the `tarn` binary over syntax-tree fixtures in a scratch directory.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const HELLO_TREE: &str = r#"{"kind": "SourceFile", "children": [
    {"kind": "Call", "offset": 0, "length": 13, "children": [
        {"kind": "DeclRef", "text": "print", "role": "function", "offset": 0, "length": 5},
        {"kind": "Argument", "children": [{"kind": "StringLiteral", "text": "hi", "offset": 6, "length": 4}]}
    ]}
]}"#;

const HELLO_SYMBOLS: &str = r#"[{"offset": 0, "origin": "Swift.print(_:separator:terminator:)"}]"#;

const HELLO_KOTLIN: &str = "fun main(args: Array<String>) {\n    println(\"hi\")\n}\n";

const BROKEN_TREE: &str = r##"{"kind": "SourceFile", "children": [
    {"kind": "FunctionDecl", "text": "run", "offset": 0, "length": 40, "children": [
        {"kind": "CodeBlock", "role": "body", "children": [
            {"kind": "MacroExpansion", "text": "#warning", "offset": 20, "length": 8}
        ]}
    ]}
]}"##;

fn tarn(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tarn"))
        .current_dir(dir)
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run tarn")
}

fn hello(dir: &Path) {
    fs::write(dir.join("hello.ast.json"), HELLO_TREE).unwrap();
    fs::write(dir.join("hello.symbols.json"), HELLO_SYMBOLS).unwrap();
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_translates_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    hello(dir.path());
    let output = tarn(dir.path(), &["translate", "hello.ast.json"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), HELLO_KOTLIN);
}

#[test]
fn test_out_dir() {
    let dir = tempfile::tempdir().unwrap();
    hello(dir.path());
    let output = tarn(dir.path(), &["translate", ".", "--out-dir", "kotlin", "--sequential"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "");
    assert_eq!(
        fs::read_to_string(dir.path().join("kotlin/hello.kt")).unwrap(),
        HELLO_KOTLIN
    );
}

#[test]
fn test_output_directive_wins_over_out_dir() {
    let dir = tempfile::tempdir().unwrap();
    hello(dir.path());
    fs::write(
        dir.path().join("hello.directives.json"),
        r#"[{"offset": 0, "kind": "output", "payload": "gen/Hello.kt"}]"#,
    )
    .unwrap();
    let output = tarn(dir.path(), &["translate", "hello.ast.json", "--out-dir", "kotlin"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        fs::read_to_string(dir.path().join("gen/Hello.kt")).unwrap(),
        HELLO_KOTLIN
    );
    assert!(!dir.path().join("kotlin/hello.kt").exists());
}

#[test]
fn test_fatal_file_does_not_stop_siblings() {
    let dir = tempfile::tempdir().unwrap();
    hello(dir.path());
    fs::write(dir.path().join("bad.ast.json"), "[1, 2").unwrap();
    let output = tarn(dir.path(), &["translate", ".", "--out-dir", "out"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("fatal:"));
    assert!(stderr(&output).contains("bad.ast.json"));
    assert_eq!(fs::read_to_string(dir.path().join("out/hello.kt")).unwrap(), HELLO_KOTLIN);
}

#[test]
fn test_untranslatable_nodes_fail_only_in_strict_mode() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.ast.json"), BROKEN_TREE).unwrap();

    let lenient = tarn(dir.path(), &["translate", "broken.ast.json"]);
    assert!(lenient.status.success(), "{}", stderr(&lenient));
    assert!(stdout(&lenient).contains("<<Error:"));
    assert!(stderr(&lenient).contains("E1001"));

    let strict = tarn(dir.path(), &["translate", "broken.ast.json", "--strict"]);
    assert_eq!(strict.status.code(), Some(1));
    assert!(stdout(&strict).contains("<<Error:"));
    assert!(stderr(&strict).contains("translation failed"));
}

#[test]
fn test_json_report() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.ast.json"), BROKEN_TREE).unwrap();
    let output = tarn(
        dir.path(),
        &["translate", "broken.ast.json", "--out-dir", "out", "--report", "report.json"],
    );
    assert!(output.status.success(), "{}", stderr(&output));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("report.json")).unwrap()).unwrap();
    let file = &report["files"][0];
    assert_eq!(file["markers"], 1);
    assert_eq!(file["diagnostics"][0]["code"], "E1001");
    assert_eq!(file["diagnostics"][0]["severity"], "Error");
    assert!(report["failures"].as_array().unwrap().is_empty());
}

#[test]
fn test_refresh_command_runs_once_before_the_retry() {
    let dir = tempfile::tempdir().unwrap();
    hello(dir.path());
    fs::write(dir.path().join("hello.types.json"), "[{").unwrap();
    fs::write(dir.path().join("fresh.json"), "[]").unwrap();

    let stale = tarn(dir.path(), &["translate", "hello.ast.json"]);
    assert_eq!(stale.status.code(), Some(1));
    assert!(stderr(&stale).contains("type query failed"));

    let refreshed = tarn(
        dir.path(),
        &["translate", "hello.ast.json", "--refresh", "cp fresh.json hello.types.json"],
    );
    assert!(refreshed.status.success(), "{}", stderr(&refreshed));
    assert_eq!(stdout(&refreshed), HELLO_KOTLIN);
}

#[test]
fn test_passes_listing() {
    let dir = tempfile::tempdir().unwrap();
    let output = tarn(dir.path(), &["passes", "--disable-pass", "return_if_nil"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let listing = stdout(&output);
    assert!(listing.starts_with("Rewrite Pass Execution Order:"));
    assert!(listing.contains("(return_if_nil, Transformation) [disabled]"));
}

#[test]
fn test_unknown_pass_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    hello(dir.path());
    let output = tarn(dir.path(), &["translate", "hello.ast.json", "--disable-pass", "nope"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("unknown pass 'nope'"));
}
