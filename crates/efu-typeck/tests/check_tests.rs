//! Integration tests for the EFU type checker.
//!
//! Each test parses EFU source, runs `efu_typeck::check`, and asserts on the
//! collected errors or on the annotations written back into the AST.

use efu_parser::ast::Node;
use efu_typeck::error::TypeError;
use efu_typeck::CheckResult;

// ── Helpers ────────────────────────────────────────────────────────────

/// Parse and check; returns the (annotated) nodes and the check result.
fn check_source(source: &str) -> (Vec<Node>, CheckResult) {
    let parsed = efu_parser::parse(source);
    assert!(
        parsed.ok(),
        "parse failed for {source:?}: {:?}",
        parsed.errors
    );
    let mut nodes = parsed.nodes;
    let result = efu_typeck::check(&mut nodes);
    (nodes, result)
}

fn check_ok(source: &str) -> Vec<Node> {
    let (nodes, result) = check_source(source);
    assert!(result.ok(), "unexpected errors: {:?}", result.errors);
    nodes
}

fn check_err(source: &str) -> Vec<TypeError> {
    let (_, result) = check_source(source);
    assert!(!result.ok(), "expected type errors for {source:?}");
    result.errors
}

// ── Literals and variable declarations ─────────────────────────────────

#[test]
fn integer_literals_default_to_isz() {
    let nodes = check_ok("let x: = 5;");
    match &nodes[0] {
        Node::VarDecl(decl) => {
            assert_eq!(decl.ty.name, "isz");
            assert!(decl.ty.inferred_from.is_some());
        }
        other => panic!("expected var decl, got {other:?}"),
    }
}

#[test]
fn string_literals_infer_string() {
    let nodes = check_ok("let s: = `hi';");
    match &nodes[0] {
        Node::VarDecl(decl) => assert_eq!(decl.ty.name, "string"),
        other => panic!("expected var decl, got {other:?}"),
    }
}

#[test]
fn declared_type_accepts_equivalent_init() {
    check_ok("let x: u8 = 5;");
    check_ok("let b: bool;\nlet s: string = `hi';");
}

#[test]
fn bool_initialized_with_integer_is_rejected() {
    let errors = check_err("let x: bool = 5;");
    match &errors[0] {
        TypeError::InitMismatch {
            expected, received, ..
        } => {
            assert_eq!(expected, "bool");
            assert_eq!(received, "isz");
        }
        other => panic!("expected init mismatch, got {other:?}"),
    }
}

#[test]
fn let_without_type_or_init_is_rejected() {
    let errors = check_err("let x;");
    assert!(matches!(errors[0], TypeError::MissingVarType { .. }));
}

#[test]
fn number_sentinel_requires_numeric_init() {
    check_ok("let n: number = 5;");
    let errors = check_err("let n: number = `hi';");
    assert!(matches!(errors[0], TypeError::NumberExpected { .. }));
}

#[test]
fn unknown_declared_type_is_rejected() {
    let errors = check_err("let x: Wat = 5;");
    assert!(matches!(errors[0], TypeError::UnknownType { .. }));
}

#[test]
fn redeclaration_in_same_scope_is_rejected() {
    let errors = check_err("fn main() { let x: = 1; let x: = 2; }");
    assert!(matches!(errors[0], TypeError::Redeclaration { .. }));
}

#[test]
fn shadowing_in_child_scope_is_allowed() {
    check_ok("fn main(f: bool) { let x: = 1; if f { let x: = 2; x + 0; } }");
}

// ── Functions ──────────────────────────────────────────────────────────

#[test]
fn written_signature_checks_body_returns() {
    check_ok("fn add(a: isz, b: isz) -> isz { return a + b; }");
}

#[test]
fn return_type_is_inferred_from_the_body() {
    // `one` has no written return type; `main` uses it as isz.
    check_ok("fn one() -> isz { return 1; }\nfn two() { return 2; }\nfn main() { let x: isz = two(); x + 0; }");
}

#[test]
fn inferred_return_recurses_into_branches() {
    check_ok(
        "fn pick(f: bool) { if f { return 1; } else { return 2; } }\nfn main() { let x: isz = pick(1 > 0); x + 0; }",
    );
}

#[test]
fn return_mismatch_is_rejected() {
    let errors = check_err("fn f() -> u8 { return `hi'; }");
    match &errors[0] {
        TypeError::ReturnMismatch {
            expected, received, ..
        } => {
            assert_eq!(expected, "u8");
            assert_eq!(received, "string");
        }
        other => panic!("expected return mismatch, got {other:?}"),
    }
}

#[test]
fn missing_argument_type_is_rejected() {
    let errors = check_err("fn f(x) { }");
    assert!(matches!(errors[0], TypeError::MissingArgType { .. }));
}

#[test]
fn infinitely_recursive_return_is_flagged() {
    let errors = check_err("fn again(i: isz) { return again(i); }");
    assert!(matches!(errors[0], TypeError::RecursiveReturn { .. }));
}

#[test]
fn self_recursion_with_a_base_return_infers() {
    check_ok(
        "fn count(i: isz) { if (i > 9) return 0; return count(i + 1); }\nfn main() { let x: isz = count(0); x + 0; }",
    );
}

#[test]
fn return_outside_function_is_rejected() {
    let errors = check_err("return 5;");
    assert!(matches!(errors[0], TypeError::ReturnOutsideFunction { .. }));
}

// ── Calls ──────────────────────────────────────────────────────────────

#[test]
fn undeclared_call_target_is_rejected() {
    let errors = check_err("fn main() { nope(); }");
    assert!(matches!(errors[0], TypeError::UndeclaredIdentifier { .. }));
}

#[test]
fn calling_a_non_function_is_rejected() {
    let errors = check_err("let x: = 5;\nfn main() { x(); }");
    assert!(matches!(errors[0], TypeError::NotAFunction { .. }));
}

#[test]
fn arity_is_exact_without_a_variadic_tail() {
    let errors = check_err("fn f(a: isz) { }\nfn main() { f(1, 2); }");
    match &errors[0] {
        TypeError::ArityMismatch {
            expected, found, ..
        } => {
            assert_eq!((*expected, *found), (1, 2));
        }
        other => panic!("expected arity mismatch, got {other:?}"),
    }
}

#[test]
fn argument_mismatch_names_expected_and_received() {
    let errors = check_err("fn f(a: bool) { }\nfn main() { f(`hi'); }");
    match &errors[0] {
        TypeError::ArgMismatch {
            index,
            expected,
            received,
            ..
        } => {
            assert_eq!(*index, 1);
            assert_eq!(expected, "bool");
            assert_eq!(received, "string");
        }
        other => panic!("expected arg mismatch, got {other:?}"),
    }
}

#[test]
fn integer_arguments_interchange() {
    check_ok("fn f(a: u8) { }\nfn main() { let x: i64 = 9; f(x); }");
}

// ── Variadics (scenario F) ─────────────────────────────────────────────

#[test]
fn printf_accepts_a_format_string_and_extras() {
    check_ok("fn main() { printf(`n=%v', 7); }");
    check_ok("fn main() { printf(`bare'); }");
    check_ok("fn main() { printnf(`a %v %v', 1, `two'); }");
}

#[test]
fn printf_rejects_a_non_string_first_argument() {
    let errors = check_err("fn main() { printf(7); }");
    match &errors[0] {
        TypeError::ArgMismatch {
            index, expected, ..
        } => {
            assert_eq!(*index, 1);
            assert_eq!(expected, "string");
        }
        other => panic!("expected arg mismatch, got {other:?}"),
    }
}

#[test]
fn printf_requires_the_format_argument() {
    let errors = check_err("fn main() { printf(); }");
    assert!(matches!(errors[0], TypeError::ArityMismatch { .. }));
}

#[test]
fn fmt_returns_a_string() {
    check_ok("fn main() { let s: string = fmt(`x=%v', 3); s; }");
}

// ── Literal monomorphisation ───────────────────────────────────────────

#[test]
fn integer_literal_coerces_to_a_float_parameter() {
    check_ok("fn takes(x: f64) { }\nfn main() { takes(3); }");
}

#[test]
fn non_literal_arguments_are_not_rewritten() {
    let errors = check_err("fn takes(x: f64) { }\nfn main() { let i: isz = 3; takes(i); }");
    assert!(matches!(errors[0], TypeError::ArgMismatch { .. }));
}

// ── Conditions and binops ──────────────────────────────────────────────

#[test]
fn condition_must_be_bool() {
    let errors = check_err("fn main() { if 1 { return; } }");
    match &errors[0] {
        TypeError::CondNotBool { received, .. } => assert_eq!(received, "isz"),
        other => panic!("expected cond-not-bool, got {other:?}"),
    }
}

#[test]
fn comparisons_produce_bool_conditions() {
    check_ok("fn main() { let i: = 3; if (i > 2) { return; } }");
}

#[test]
fn logic_operators_require_bool_operands() {
    check_ok("fn main() { if (1 > 2 && 3 < 4) { return; } }");
    let errors = check_err("fn main() { if (1 && 2 > 3) { return; } }");
    assert!(matches!(errors[0], TypeError::BinopMismatch { .. }));
}

#[test]
fn math_on_strings_is_rejected() {
    let errors = check_err("fn main() { `a' + `b'; }");
    assert!(matches!(errors[0], TypeError::BinopMismatch { .. }));
}

// ── Pipes ──────────────────────────────────────────────────────────────

#[test]
fn pipe_appends_the_value_as_last_argument() {
    check_ok("fn fizz(n: isz) -> u8 { return 0; }\nfn main() { 5 |> fizz; }");
    check_ok("fn f(a: string, n: isz) { }\nfn main() { 5 |> f(`x'); }");
}

#[test]
fn pipe_chains_thread_the_current_type() {
    check_ok(
        "fn double(n: isz) -> isz { return n * 2; }\nfn show(n: isz) { printnf(`%v', n); }\nfn main() { 5 |> double |> show; }",
    );
}

#[test]
fn pipe_arity_counts_the_piped_value() {
    // `fizz` takes one argument; piping into `fizz(1)` makes two.
    let errors = check_err("fn fizz(n: isz) { }\nfn main() { 5 |> fizz(1); }");
    assert!(matches!(errors[0], TypeError::ArityMismatch { .. }));
}

#[test]
fn pipe_stage_type_mismatch_is_rejected() {
    let errors = check_err("fn wants_string(s: string) { }\nfn main() { 5 |> wants_string; }");
    match &errors[0] {
        TypeError::ArgMismatch {
            expected, received, ..
        } => {
            assert_eq!(expected, "string");
            assert_eq!(received, "isz");
        }
        other => panic!("expected arg mismatch, got {other:?}"),
    }
}

// ── Halting behavior ───────────────────────────────────────────────────

#[test]
fn first_failed_declaration_halts_the_run() {
    // The second function also has an error, but the run stops after the
    // first failed top-level declaration.
    let errors = check_err("fn a() { nope(); }\nfn b() { also_nope(); }");
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        TypeError::UndeclaredIdentifier { name, .. } if name == "nope"
    ));
}

#[test]
fn top_level_declarations_see_each_other_in_any_order() {
    // `main` calls `later`, declared after it.
    check_ok("fn main() { later(); }\nfn later() { }");
}
