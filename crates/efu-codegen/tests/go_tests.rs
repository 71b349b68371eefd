//! Integration tests for the Go backend.
//!
//! Each test runs the full front half of the pipeline (parse + check) and
//! asserts on the emitted Go text.

use efu_codegen::go;
use efu_parser::ast::Node;

/// Parse, check, and emit Go.
fn compile_go(source: &str) -> String {
    let parsed = efu_parser::parse(source);
    assert!(parsed.ok(), "parse failed: {:?}", parsed.errors);
    let mut nodes = parsed.nodes;
    let checked = efu_typeck::check(&mut nodes);
    assert!(checked.ok(), "check failed: {:?}", checked.errors);
    go::emit(&mut nodes).expect("emission failed")
}

/// Parse and check, returning the annotated nodes.
fn checked_nodes(source: &str) -> Vec<Node> {
    let parsed = efu_parser::parse(source);
    assert!(parsed.ok(), "parse failed: {:?}", parsed.errors);
    let mut nodes = parsed.nodes;
    let checked = efu_typeck::check(&mut nodes);
    assert!(checked.ok(), "check failed: {:?}", checked.errors);
    nodes
}

// ── Module framing ─────────────────────────────────────────────────────

#[test]
fn hello_world_frames_the_module() {
    let out = compile_go("fn main() { printnf(`hello'); }");
    assert!(out.starts_with("package main\n\n"), "got:\n{out}");
    assert!(out.contains("import \"fmt\""), "got:\n{out}");
    assert!(out.contains("func main() {"), "got:\n{out}");
    assert!(out.contains("fmt.Printf(\"hello\\n\")"), "got:\n{out}");
}

#[test]
fn no_prints_means_no_import() {
    let out = compile_go("fn main() { let x: = 5; x + 1; }");
    assert!(!out.contains("import"), "got:\n{out}");
}

#[test]
fn top_level_vars_come_before_functions() {
    let out = compile_go("fn main() { }\nlet x: isz = 5;");
    assert!(out.contains("var x int = 5"), "got:\n{out}");
    let var_at = out.find("var x").unwrap();
    let func_at = out.find("func main").unwrap();
    assert!(var_at < func_at, "vars must precede functions:\n{out}");
}

#[test]
fn uninitialized_top_level_var() {
    let out = compile_go("let x: u8;\nfn main() { }");
    assert!(out.contains("var x uint8\n"), "got:\n{out}");
}

// ── Print rewrite ──────────────────────────────────────────────────────

#[test]
fn printf_becomes_fmt_printf_verbatim() {
    let out = compile_go("fn main() { printf(`n=%v', 7); }");
    assert!(out.contains("fmt.Printf(\"n=%v\", 7)"), "got:\n{out}");
}

#[test]
fn printnf_with_no_args_prints_a_newline() {
    let out = compile_go("fn main() { printnf(); }");
    assert!(out.contains("fmt.Printf(\"\\n\")"), "got:\n{out}");
}

#[test]
fn printnf_with_a_literal_appends_in_place() {
    let out = compile_go("fn main() { printnf(`x=%v', 3); }");
    assert!(out.contains("fmt.Printf(\"x=%v\\n\", 3)"), "got:\n{out}");
}

#[test]
fn printnf_with_a_dynamic_format_wraps_in_sprintf() {
    let out = compile_go("fn main() { let s: = `x'; printnf(s); }");
    assert!(out.contains("fmt.Println(fmt.Sprintf(s))"), "got:\n{out}");
}

#[test]
fn piped_printnf_keeps_its_newline() {
    // The pipe stage is a bare identifier; desugaring must run before the
    // print rewrite so the call-site newline rule applies.
    let out = compile_go("fn main() { `hi' |> printnf; }");
    assert!(out.contains("fmt.Printf(\"hi\\n\")"), "got:\n{out}");
}

#[test]
fn piping_into_a_printnf_call_keeps_its_newline() {
    let out = compile_go("fn main() { 7 |> printnf(`n=%v'); }");
    assert!(out.contains("fmt.Printf(\"n=%v\\n\", 7)"), "got:\n{out}");
}

#[test]
fn print_rewrite_is_idempotent() {
    let mut once = checked_nodes("fn main() { printnf(`a'); printf(`b'); printnf(); }");
    let mut twice = once.clone();
    go::rewrite::rewrite_prints(&mut once);
    go::rewrite::rewrite_prints(&mut twice);
    go::rewrite::rewrite_prints(&mut twice);
    assert_eq!(once, twice);
}

// ── Primitive renaming ─────────────────────────────────────────────────

#[test]
fn signatures_use_go_primitive_names() {
    let out = compile_go("fn f(a: u8, b: isz) -> u64 { return 0; }\nfn main() { }");
    assert!(out.contains("func f(a uint8, b int) uint64 {"), "got:\n{out}");
}

#[test]
fn inferred_returns_are_emitted() {
    let out = compile_go("fn one() { return 1; }\nfn main() { }");
    assert!(out.contains("func one() int {"), "got:\n{out}");
}

// ── Statements ─────────────────────────────────────────────────────────

#[test]
fn inferred_body_vars_use_short_declarations() {
    let out = compile_go("fn main() { let y: = 5; y + 1; }");
    assert!(out.contains("\ty := 5\n"), "got:\n{out}");
}

#[test]
fn declared_body_vars_use_var_syntax() {
    let out = compile_go("fn main() { let y: u8 = 5; y + 0; }");
    assert!(out.contains("\tvar y uint8 = 5\n"), "got:\n{out}");
}

#[test]
fn if_else_uses_tab_indentation() {
    let out =
        compile_go("fn main() { let i: = 3; if (i > 2) { printnf(`big'); } else { return; } }");
    assert!(out.contains("\tif (i > 2) {\n"), "got:\n{out}");
    assert!(out.contains("\t\tfmt.Printf(\"big\\n\")\n"), "got:\n{out}");
    assert!(out.contains("\t} else {\n"), "got:\n{out}");
    assert!(out.contains("\t\treturn\n"), "got:\n{out}");
}

#[test]
fn recursive_calls_stay_literal() {
    // The static backend never rewrites tail calls.
    let out = compile_go(
        "fn loop(i: isz, end: isz) { if (i > end) return; loop(i + 1, end); }\nfn main() { loop(0, 3); }",
    );
    assert!(out.contains("loop(i + 1, end)"), "got:\n{out}");
    assert!(!out.contains("while"), "got:\n{out}");
}

// ── Expressions ────────────────────────────────────────────────────────

#[test]
fn pipes_emit_as_their_desugared_call() {
    let out = compile_go(
        "fn fizz(n: isz) -> u8 { return 0; }\nfn main() { 5 |> fizz; }",
    );
    assert!(out.contains("fizz(5)"), "got:\n{out}");
    assert!(!out.contains("|>"), "got:\n{out}");
}

#[test]
fn string_literals_are_json_escaped() {
    let out = compile_go(r#"fn main() { printf(`say \`quote\' twice'); }"#);
    assert!(out.contains(r#"fmt.Printf("say `quote' twice")"#), "got:\n{out}");
    let out = compile_go("fn main() { printf(`tab\\there'); }");
    assert!(out.contains("fmt.Printf(\"tab\\there\")"), "got:\n{out}");
}

#[test]
fn binops_and_groups_emit_plainly() {
    let out = compile_go("fn main() { let x: = (1 + 2) * 3; x + 0; }");
    assert!(out.contains("x := (1 + 2) * 3"), "got:\n{out}");
}
