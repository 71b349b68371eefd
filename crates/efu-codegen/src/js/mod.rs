//! The dynamic backend: EFU to generator-based JavaScript.
//!
//! Every user function becomes a generator (`function*`), every call a
//! `(yield* …)` step, so the whole program runs as one cooperative
//! coroutine tree under the prelude's `exec` driver. A function whose last
//! statement is a call to itself with its own arity is rewritten into a
//! `while (true)` loop with in-place argument reassignment instead of a
//! recursive call. Two-space indentation; no type annotations survive.

pub mod runtime;

use efu_parser::ast::{desugar_pipe, FuncCall, FuncDecl, IfElse, Node, VarDecl};

use crate::EmitError;
pub use runtime::RUNTIME;

/// Emit a checked program as JavaScript source.
pub fn emit(nodes: &[Node]) -> Result<String, EmitError> {
    let mut vars: Vec<&VarDecl> = Vec::new();
    let mut funcs: Vec<&FuncDecl> = Vec::new();
    for node in nodes {
        match node {
            Node::VarDecl(decl) => vars.push(decl),
            Node::FuncDecl(decl) => funcs.push(decl),
            Node::Eof { .. } => {}
            other => {
                return Err(EmitError::new(
                    "unhandled top-level node kind",
                    other.span(),
                ))
            }
        }
    }

    let mut out = String::from(RUNTIME);
    out.push('\n');

    for decl in &vars {
        match decl.init.as_deref() {
            Some(init) => out.push_str(&format!("let {} = {};\n", decl.name, emit_expr(init)?)),
            None => out.push_str(&format!("let {};\n", decl.name)),
        }
    }
    if !vars.is_empty() {
        out.push('\n');
    }

    for decl in &funcs {
        let mut emitter = JsEmitter::new(0);
        emitter.emit_func(decl)?;
        out.push_str(&emitter.out);
        out.push('\n');
    }

    out.push_str("exec(main);\n");
    Ok(out)
}

/// Statement-level text builder with two-space indentation.
struct JsEmitter {
    out: String,
    indent: usize,
}

impl JsEmitter {
    fn new(indent: usize) -> Self {
        Self {
            out: String::new(),
            indent,
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn emit_func(&mut self, decl: &FuncDecl) -> Result<(), EmitError> {
        let args = decl
            .args
            .iter()
            .map(|arg| arg.name.clone())
            .collect::<Vec<_>>()
            .join(", ");
        self.line(&format!("function* {}({args}) {{", decl.name));
        self.indent += 1;
        match split_tail_call(decl) {
            Some((body, tail)) => {
                self.line("while (true) {");
                self.indent += 1;
                for stmt in body {
                    self.emit_stmt(stmt)?;
                }
                for (arg, value) in decl.args.iter().zip(&tail.args) {
                    let value = emit_expr(value)?;
                    self.line(&format!("{} = {};", arg.name, value));
                }
                self.indent -= 1;
                self.line("}");
            }
            None => {
                for stmt in &decl.body {
                    self.emit_stmt(stmt)?;
                }
            }
        }
        self.indent -= 1;
        self.line("}");
        Ok(())
    }

    fn emit_stmt(&mut self, node: &Node) -> Result<(), EmitError> {
        match node {
            Node::VarDecl(decl) => {
                match decl.init.as_deref() {
                    Some(init) => {
                        let init = emit_expr(init)?;
                        self.line(&format!("let {} = {};", decl.name, init));
                    }
                    None => self.line(&format!("let {};", decl.name)),
                }
                Ok(())
            }
            Node::Keyword(kw) => {
                match kw.expr.as_deref() {
                    Some(expr) => {
                        let expr = emit_expr(expr)?;
                        self.line(&format!("return {expr};"));
                    }
                    None => self.line("return;"),
                }
                Ok(())
            }
            Node::IfElse(stmt) => self.emit_if(stmt),
            // Nested function declarations are legal JS; keep them named.
            Node::FuncDecl(decl) => self.emit_func(decl),
            Node::Eof { .. } => Ok(()),
            expr => {
                let text = emit_expr(expr)?;
                self.line(&format!("{text};"));
                Ok(())
            }
        }
    }

    fn emit_if(&mut self, stmt: &IfElse) -> Result<(), EmitError> {
        let cond = cond_text(&stmt.cond)?;
        self.line(&format!("if {cond} {{"));
        self.indent += 1;
        for node in &stmt.body {
            self.emit_stmt(node)?;
        }
        self.indent -= 1;
        if let Some(else_body) = &stmt.else_body {
            self.line("} else {");
            self.indent += 1;
            for node in else_body {
                self.emit_stmt(node)?;
            }
            self.indent -= 1;
        }
        self.line("}");
        Ok(())
    }
}

/// Detect the tail-call shape: the body's last statement is a call to the
/// enclosing function with exactly its arity. Returns the body without that
/// call plus the call itself; the call is never emitted.
fn split_tail_call(decl: &FuncDecl) -> Option<(&[Node], &FuncCall)> {
    let (last, rest) = decl.body.split_last()?;
    match last {
        Node::FuncCall(call) if call.name == decl.name && call.args.len() == decl.args.len() => {
            Some((rest, call))
        }
        _ => None,
    }
}

/// The condition of an `if`: exactly one paren layer.
fn cond_text(cond: &Node) -> Result<String, EmitError> {
    match cond {
        Node::Group(_) => emit_expr(cond),
        other => Ok(format!("({})", emit_expr(other)?)),
    }
}

fn emit_expr(node: &Node) -> Result<String, EmitError> {
    match node {
        Node::Literal(lit) => Ok(match &lit.value {
            efu_parser::ast::LiteralValue::Int(value) => value.to_string(),
            efu_parser::ast::LiteralValue::Str(text) => {
                serde_json::to_string(text).expect("strings always serialize")
            }
        }),
        Node::Ident(ident) => Ok(ident.name.clone()),
        Node::Binop(binop) => Ok(format!(
            "{} {} {}",
            emit_expr(&binop.lhs)?,
            binop.op.as_str(),
            emit_expr(&binop.rhs)?
        )),
        Node::Group(group) => match group.item.as_deref() {
            Some(item) => Ok(format!("({})", emit_expr(item)?)),
            None => Ok("()".to_string()),
        },
        // Every call steps the callee generator.
        Node::FuncCall(call) => {
            let args = call
                .args
                .iter()
                .map(emit_expr)
                .collect::<Result<Vec<_>, _>>()?
                .join(", ");
            Ok(format!("(yield* {}({args}))", call.name))
        }
        Node::Pipe(pipe) => {
            let call = desugar_pipe(pipe)
                .ok_or_else(|| EmitError::new("malformed pipe chain", pipe.span))?;
            emit_expr(&Node::FuncCall(call))
        }
        // A function literal emits as an anonymous generator.
        Node::FuncDecl(decl) => {
            let mut emitter = JsEmitter::new(0);
            emitter.emit_func(decl)?;
            Ok(emitter.out.trim_end().to_string())
        }
        Node::Keyword(_) | Node::VarDecl(_) | Node::IfElse(_) | Node::Eof { .. } => Err(
            EmitError::new("unhandled node kind in expression position", node.span()),
        ),
    }
}
