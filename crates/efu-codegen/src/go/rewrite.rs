//! AST rewrites the Go backend runs before emission.
//!
//! Three passes, all mutating in place:
//!
//! - **Pipe desugaring.** Every pipe chain is materialized into the call it
//!   stands for. This must run first: a stage like `` `hi' |> printnf `` is
//!   a bare identifier until desugaring turns it into a call, and only call
//!   sites get the newline-injection treatment below.
//! - **Print rewrite.** `printf`/`printnf` call sites become `fmt.Printf` /
//!   `fmt.Println` with the newline-injection rule. Idempotent: rewritten
//!   names no longer match, so a second run changes nothing.
//! - **Primitive renaming.** Written argument and return type names become
//!   the Go primitive names.

use efu_common::span::Span;
use efu_parser::ast::{desugar_pipe, FuncCall, FuncDecl, Literal, LiteralValue, Node, PipeOp};

/// Replace every pipe chain in the tree with its desugared call.
///
/// A chain that does not fold (malformed tree) is left in place; emission
/// reports it.
pub fn desugar_pipes(nodes: &mut [Node]) {
    for node in nodes {
        desugar_node(node);
    }
}

fn desugar_node(node: &mut Node) {
    if let Node::Pipe(pipe) = node {
        if let Some(call) = desugar_pipe(pipe) {
            *node = Node::FuncCall(call);
        }
    }
    // Recurse after replacing, so stages carried into the call are walked.
    match node {
        Node::FuncCall(call) => {
            for arg in &mut call.args {
                desugar_node(arg);
            }
        }
        Node::FuncDecl(decl) => {
            for stmt in &mut decl.body {
                desugar_node(stmt);
            }
        }
        Node::VarDecl(decl) => {
            if let Some(init) = decl.init.as_deref_mut() {
                desugar_node(init);
            }
        }
        Node::Binop(binop) => {
            desugar_node(&mut binop.lhs);
            desugar_node(&mut binop.rhs);
        }
        Node::Group(group) => {
            if let Some(item) = group.item.as_deref_mut() {
                desugar_node(item);
            }
        }
        Node::Keyword(kw) => {
            if let Some(expr) = kw.expr.as_deref_mut() {
                desugar_node(expr);
            }
        }
        Node::IfElse(stmt) => {
            desugar_node(&mut stmt.cond);
            for body_stmt in &mut stmt.body {
                desugar_node(body_stmt);
            }
            if let Some(else_body) = &mut stmt.else_body {
                for body_stmt in else_body {
                    desugar_node(body_stmt);
                }
            }
        }
        Node::Pipe(_) | Node::Literal(_) | Node::Ident(_) | Node::Eof { .. } => {}
    }
}

/// Rewrite every `printf`/`printnf` reference in the tree.
///
/// Returns whether anything was rewritten, which is when the emitted module
/// needs the `fmt` import.
pub fn rewrite_prints(nodes: &mut [Node]) -> bool {
    let mut changed = false;
    for node in nodes {
        rewrite_node(node, &mut changed);
    }
    changed
}

fn rewrite_node(node: &mut Node, changed: &mut bool) {
    match node {
        Node::Ident(ident) => {
            if ident.name == "printf" || ident.name == "printnf" {
                ident.name = "fmt.Printf".to_string();
                *changed = true;
            }
        }
        Node::FuncCall(call) => {
            rewrite_call(call, changed);
            for arg in &mut call.args {
                rewrite_node(arg, changed);
            }
        }
        Node::FuncDecl(decl) => {
            for stmt in &mut decl.body {
                rewrite_node(stmt, changed);
            }
        }
        Node::VarDecl(decl) => {
            if let Some(init) = decl.init.as_deref_mut() {
                rewrite_node(init, changed);
            }
        }
        Node::Binop(binop) => {
            rewrite_node(&mut binop.lhs, changed);
            rewrite_node(&mut binop.rhs, changed);
        }
        Node::Pipe(pipe) => rewrite_pipe(pipe, changed),
        Node::Group(group) => {
            if let Some(item) = group.item.as_deref_mut() {
                rewrite_node(item, changed);
            }
        }
        Node::Keyword(kw) => {
            if let Some(expr) = kw.expr.as_deref_mut() {
                rewrite_node(expr, changed);
            }
        }
        Node::IfElse(stmt) => {
            rewrite_node(&mut stmt.cond, changed);
            for body_stmt in &mut stmt.body {
                rewrite_node(body_stmt, changed);
            }
            if let Some(else_body) = &mut stmt.else_body {
                for body_stmt in else_body {
                    rewrite_node(body_stmt, changed);
                }
            }
        }
        Node::Literal(_) | Node::Eof { .. } => {}
    }
}

fn rewrite_pipe(pipe: &mut PipeOp, changed: &mut bool) {
    rewrite_node(&mut pipe.value, changed);
    if let Some(next) = pipe.next.as_deref_mut() {
        rewrite_pipe(next, changed);
    }
}

fn rewrite_call(call: &mut FuncCall, changed: &mut bool) {
    if call.name == "printf" {
        call.name = "fmt.Printf".to_string();
        *changed = true;
        return;
    }
    if call.name != "printnf" {
        return;
    }
    *changed = true;

    match call.args.first_mut() {
        // No arguments: print just the newline.
        None => {
            call.name = "fmt.Printf".to_string();
            call.args.push(newline_literal(call.span));
        }
        // A literal format string gets the newline appended in place.
        Some(Node::Literal(Literal {
            value: LiteralValue::Str(text),
            ..
        })) => {
            text.push('\n');
            call.name = "fmt.Printf".to_string();
        }
        // Anything else: format first, let Println add the newline.
        Some(_) => {
            let inner = FuncCall {
                name: "fmt.Sprintf".to_string(),
                args: std::mem::take(&mut call.args),
                span: call.span,
            };
            call.name = "fmt.Println".to_string();
            call.args = vec![Node::FuncCall(inner)];
        }
    }
}

fn newline_literal(span: Span) -> Node {
    Node::Literal(Literal {
        value: LiteralValue::Str("\n".to_string()),
        span,
    })
}

/// Rewrite argument and return type names of every function declaration
/// (including nested ones) to the Go primitive names.
pub fn rename_primitives(nodes: &mut [Node]) {
    for node in nodes {
        if let Node::FuncDecl(decl) = node {
            rename_func(decl);
        }
    }
}

fn rename_func(decl: &mut FuncDecl) {
    for arg in &mut decl.args {
        arg.ty.name = go_type_name(&arg.ty.name);
    }
    if !decl.returns.is_unresolved() {
        decl.returns.name = go_type_name(&decl.returns.name);
    }
    rename_primitives(&mut decl.body);
}

/// Map an EFU type name to its Go spelling.
///
/// Primitive renames: `u8 -> uint8`, `i8 -> int8`, `u32 -> uint32`,
/// `i32 -> int32`, `u64 -> uint64`, `i64 -> int64`, `usz -> uint`,
/// `isz -> int`; everything else passes through. Array suffixes move to the
/// front Go-style, innermost last: `u8[3][] -> [][3]uint8`.
pub fn go_type_name(name: &str) -> String {
    let (base, suffixes) = match name.find('[') {
        Some(at) => (&name[..at], &name[at..]),
        None => (name, ""),
    };
    let base = match base {
        "u8" => "uint8",
        "i8" => "int8",
        "u32" => "uint32",
        "i32" => "int32",
        "u64" => "uint64",
        "i64" => "int64",
        "usz" => "uint",
        "isz" => "int",
        other => other,
    };
    if suffixes.is_empty() {
        return base.to_string();
    }
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = suffixes;
    while let Some(end) = rest.find(']') {
        groups.push(&rest[..=end]);
        rest = &rest[end + 1..];
    }
    let mut out = String::new();
    for group in groups.iter().rev() {
        out.push_str(group);
    }
    out.push_str(base);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn go_type_name_maps_primitives() {
        assert_eq!(go_type_name("u8"), "uint8");
        assert_eq!(go_type_name("isz"), "int");
        assert_eq!(go_type_name("usz"), "uint");
        assert_eq!(go_type_name("string"), "string");
        assert_eq!(go_type_name("bool"), "bool");
        // Already-renamed names pass through (idempotence).
        assert_eq!(go_type_name("uint8"), "uint8");
    }

    #[test]
    fn go_type_name_moves_array_suffixes_to_the_front() {
        assert_eq!(go_type_name("u8[]"), "[]uint8");
        assert_eq!(go_type_name("u8[3]"), "[3]uint8");
        assert_eq!(go_type_name("u8[3][]"), "[][3]uint8");
    }
}
