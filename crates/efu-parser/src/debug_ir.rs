//! The `--debug-ir` printer.
//!
//! A concise recursive formatter for AST nodes. The output is for humans and
//! snapshot comparisons, not for parsing back. Lists of children are
//! comma-joined; an absent child prints as `()`.

use crate::ast::{LiteralValue, Node, PipeOp};

/// Format one node (and its subtree) on a single line.
pub fn format_node(node: &Node) -> String {
    match node {
        Node::Eof { .. } => "EoF{}".to_string(),
        Node::Literal(lit) => {
            let json = match &lit.value {
                LiteralValue::Str(text) => {
                    serde_json::to_string(text).expect("string literals always serialize")
                }
                LiteralValue::Int(value) => value.to_string(),
            };
            format!("Literal{{{json}}}")
        }
        Node::Keyword(kw) => match &kw.expr {
            Some(expr) => format!("Keyword{{{}, ({})}}", kw.word.as_str(), format_node(expr)),
            None => format!("Keyword{{{}, ()}}", kw.word.as_str()),
        },
        Node::Ident(ident) => format!("Ident{{{}}}", ident.name),
        Node::FuncDecl(decl) => {
            let args = decl
                .args
                .iter()
                .map(|arg| format!("{}: {}", arg.name, arg.ty.name))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "FnDecl{{{}, Args{{{args}}}, Body{{{}}}}}",
                decl.name,
                join(&decl.body)
            )
        }
        Node::FuncCall(call) => format!("FnCall{{{}, ({})}}", call.name, join(&call.args)),
        Node::Binop(binop) => format!(
            "BinOp{{{}, {}, {}}}",
            format_node(&binop.lhs),
            binop.op.as_str(),
            format_node(&binop.rhs)
        ),
        Node::Group(group) => match &group.item {
            Some(item) => format!("Expr{{{}}}", format_node(item)),
            None => "Expr{()}".to_string(),
        },
        Node::Pipe(pipe) => format_pipe(pipe),
        Node::VarDecl(decl) => match &decl.init {
            Some(init) => format!(
                "VarDecl{{{}, {}, ({})}}",
                decl.name,
                decl.ty.name,
                format_node(init)
            ),
            None => format!("VarDecl{{{}, {}, ()}}", decl.name, decl.ty.name),
        },
        Node::IfElse(stmt) => {
            let else_part = match &stmt.else_body {
                Some(body) => join(body),
                None => "()".to_string(),
            };
            format!(
                "If{{{}, Body{{{}}}, Else{{{else_part}}}}}",
                format_node(&stmt.cond),
                join(&stmt.body)
            )
        }
    }
}

fn format_pipe(pipe: &PipeOp) -> String {
    match &pipe.next {
        Some(next) => format!(
            "Pipe{{{} |> {}}}",
            format_node(&pipe.value),
            format_pipe(next)
        ),
        None => format_node(&pipe.value),
    }
}

fn join(nodes: &[Node]) -> String {
    nodes
        .iter()
        .map(format_node)
        .collect::<Vec<_>>()
        .join(", ")
}
