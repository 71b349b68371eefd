//! The static backend: EFU to Go source.
//!
//! Emission runs after the checker has annotated the AST. Setup mutates the
//! tree ([`rewrite`]): pipe chains become the calls they stand for, print
//! calls become `fmt` calls, and primitive type names become Go names. The
//! module frame is `package main`, imports, top-level vars, then functions,
//! in collection order. Indentation is one tab per nesting level.

pub mod rewrite;

use efu_parser::ast::{desugar_pipe, FuncDecl, IfElse, Node, VarDecl};

use crate::EmitError;
use rewrite::go_type_name;

/// Emit a checked program as Go source.
pub fn emit(nodes: &mut [Node]) -> Result<String, EmitError> {
    rewrite::desugar_pipes(nodes);
    let uses_fmt = rewrite::rewrite_prints(nodes);
    rewrite::rename_primitives(nodes);

    let mut vars: Vec<&VarDecl> = Vec::new();
    let mut funcs: Vec<&FuncDecl> = Vec::new();
    for node in nodes.iter() {
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

    let mut out = String::from("package main\n\n");

    let imports: &[&str] = if uses_fmt { &["fmt"] } else { &[] };
    match imports {
        [] => {}
        [single] => {
            out.push_str(&format!("import \"{single}\"\n\n"));
        }
        many => {
            out.push_str("import (\n");
            for import in many {
                out.push_str(&format!("\t\"{import}\"\n"));
            }
            out.push_str(")\n\n");
        }
    }

    for decl in &vars {
        let ty = go_type_name(&decl.ty.name);
        match decl.init.as_deref() {
            Some(init) => out.push_str(&format!(
                "var {} {} = {}\n",
                decl.name,
                ty,
                emit_expr(init, 0)?
            )),
            None => out.push_str(&format!("var {} {}\n", decl.name, ty)),
        }
    }
    if !vars.is_empty() {
        out.push('\n');
    }

    for (i, decl) in funcs.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let mut emitter = GoEmitter::new(0);
        emitter.emit_func(decl)?;
        out.push_str(&emitter.out);
    }

    Ok(out)
}

/// Statement-level text builder with tab indentation.
struct GoEmitter {
    out: String,
    indent: usize,
}

impl GoEmitter {
    fn new(indent: usize) -> Self {
        Self {
            out: String::new(),
            indent,
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push('\t');
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn emit_func(&mut self, decl: &FuncDecl) -> Result<(), EmitError> {
        self.line(&format!("func {}{}", decl.name, func_signature(decl)));
        self.indent += 1;
        for stmt in &decl.body {
            self.emit_stmt(stmt)?;
        }
        self.indent -= 1;
        self.line("}");
        Ok(())
    }

    fn emit_stmt(&mut self, node: &Node) -> Result<(), EmitError> {
        match node {
            Node::VarDecl(decl) => {
                // An inferred type means short-declaration syntax.
                if decl.ty.inferred_from.is_some() {
                    let init = decl
                        .init
                        .as_deref()
                        .ok_or_else(|| EmitError::new("inferred var without init", decl.span))?;
                    let init = emit_expr(init, self.indent)?;
                    self.line(&format!("{} := {}", decl.name, init));
                } else {
                    let ty = go_type_name(&decl.ty.name);
                    match decl.init.as_deref() {
                        Some(init) => {
                            let init = emit_expr(init, self.indent)?;
                            self.line(&format!("var {} {} = {}", decl.name, ty, init));
                        }
                        None => self.line(&format!("var {} {}", decl.name, ty)),
                    }
                }
                Ok(())
            }
            Node::Keyword(kw) => {
                match kw.expr.as_deref() {
                    Some(expr) => {
                        let expr = emit_expr(expr, self.indent)?;
                        self.line(&format!("return {expr}"));
                    }
                    None => self.line("return"),
                }
                Ok(())
            }
            Node::IfElse(stmt) => self.emit_if(stmt),
            // A nested function becomes a closure binding.
            Node::FuncDecl(decl) => {
                let closure = closure_text(decl, self.indent)?;
                self.line(&format!("{} := {}", decl.name, closure));
                Ok(())
            }
            Node::Eof { .. } => Ok(()),
            expr => {
                let text = emit_expr(expr, self.indent)?;
                self.line(&text);
                Ok(())
            }
        }
    }

    fn emit_if(&mut self, stmt: &IfElse) -> Result<(), EmitError> {
        let cond = cond_text(&stmt.cond, self.indent)?;
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

/// `(ARG TYPE, …) RET {` -- the signature half of a function, shared by
/// declarations and closures. The return is omitted for `void`/`"()"`.
fn func_signature(decl: &FuncDecl) -> String {
    let args = decl
        .args
        .iter()
        .map(|arg| format!("{} {}", arg.name, go_type_name(&arg.ty.name)))
        .collect::<Vec<_>>()
        .join(", ");
    let ret = if decl.returns.is_unresolved() || decl.returns.name == "void" {
        String::new()
    } else {
        format!(" {}", go_type_name(&decl.returns.name))
    };
    format!("({args}){ret} {{")
}

fn closure_text(decl: &FuncDecl, indent: usize) -> Result<String, EmitError> {
    let mut emitter = GoEmitter::new(indent + 1);
    for stmt in &decl.body {
        emitter.emit_stmt(stmt)?;
    }
    let mut text = format!("func{}\n", func_signature(decl));
    text.push_str(&emitter.out);
    text.push_str(&"\t".repeat(indent));
    text.push('}');
    Ok(text)
}

/// The condition of an `if`: exactly one paren layer. A source grouping
/// passes through; anything else is wrapped.
fn cond_text(cond: &Node, indent: usize) -> Result<String, EmitError> {
    match cond {
        Node::Group(_) => emit_expr(cond, indent),
        other => Ok(format!("({})", emit_expr(other, indent)?)),
    }
}

fn emit_expr(node: &Node, indent: usize) -> Result<String, EmitError> {
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
            emit_expr(&binop.lhs, indent)?,
            binop.op.as_str(),
            emit_expr(&binop.rhs, indent)?
        )),
        Node::Group(group) => match group.item.as_deref() {
            Some(item) => Ok(format!("({})", emit_expr(item, indent)?)),
            None => Ok("()".to_string()),
        },
        Node::FuncCall(call) => {
            let args = call
                .args
                .iter()
                .map(|arg| emit_expr(arg, indent))
                .collect::<Result<Vec<_>, _>>()?
                .join(", ");
            Ok(format!("{}({args})", call.name))
        }
        Node::Pipe(pipe) => {
            let call = desugar_pipe(pipe)
                .ok_or_else(|| EmitError::new("malformed pipe chain", pipe.span))?;
            emit_expr(&Node::FuncCall(call), indent)
        }
        Node::FuncDecl(decl) => closure_text(decl, indent),
        Node::Keyword(_) | Node::VarDecl(_) | Node::IfElse(_) | Node::Eof { .. } => Err(
            EmitError::new("unhandled node kind in expression position", node.span()),
        ),
    }
}
