//! The EFU type checker.
//!
//! Two passes over the top-level node list:
//!
//! 1. **Globals.** Every top-level function and variable is registered in
//!    the global scope, in source order. Function types come from their
//!    written argument types and the written or inferred return type.
//! 2. **Check.** Every node is validated recursively. Function bodies and
//!    `if`/`else` branches run in child scopes; variable declarations are
//!    annotated with their inferred types in place.
//!
//! Errors accumulate within a top-level declaration; the first declaration
//! that fails halts the run after its diagnostics are flushed.

use efu_common::span::Span;
use efu_parser::ast::{FuncDecl, IfElse, KeywordStmt, Node, PipeOp, VarDecl};

use crate::builtins;
use crate::env::{TypeEnv, VarEntry};
use crate::error::TypeError;
use crate::resolve;
use crate::ty::{FuncTy, Ty, TyKind};

/// The outcome of checking one program.
#[derive(Debug)]
pub struct CheckResult {
    pub errors: Vec<TypeError>,
}

impl CheckResult {
    /// Whether the program type-checked.
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check a parsed program, annotating inferred types onto the AST.
pub fn check(nodes: &mut [Node]) -> CheckResult {
    let mut checker = Checker::new();
    checker.register_globals(nodes);
    if checker.errors.is_empty() {
        for node in nodes.iter_mut() {
            checker.check_top(node);
            if !checker.errors.is_empty() {
                break;
            }
        }
    }
    CheckResult {
        errors: checker.errors,
    }
}

struct Checker {
    env: TypeEnv,
    errors: Vec<TypeError>,
}

impl Checker {
    fn new() -> Self {
        let mut env = TypeEnv::new();
        builtins::install(&mut env);
        Self {
            env,
            errors: Vec::new(),
        }
    }

    // ── Pass 1: global registration ────────────────────────────────────

    fn register_globals(&mut self, nodes: &[Node]) {
        for node in nodes {
            match node {
                Node::FuncDecl(decl) => {
                    if self.env.var_in_current_scope(&decl.name).is_some() {
                        // First registration wins; pass 2 reports the clash.
                        continue;
                    }
                    if let Some(fty) = self.function_type(decl) {
                        self.env.insert_var(VarEntry {
                            name: decl.name.clone(),
                            span: decl.span,
                            ty: Ty::func(fty),
                        });
                    }
                }
                Node::VarDecl(decl) => {
                    if self.env.var_in_current_scope(&decl.name).is_some() {
                        continue;
                    }
                    if let Some(mut ty) = self.global_var_type(decl) {
                        ty.origin = None;
                        self.env.insert_var(VarEntry {
                            name: decl.name.clone(),
                            span: decl.span,
                            ty,
                        });
                    }
                }
                _ => {}
            }
        }
    }

    /// The registration type of a top-level variable: declared, or quietly
    /// inferred from the initializer. Ill-formed declarations register
    /// nothing here; pass 2 owns their diagnostics.
    fn global_var_type(&mut self, decl: &VarDecl) -> Option<Ty> {
        if !decl.ty.is_unresolved() && decl.ty.name != "number" {
            match resolve::parse_type_name(&decl.ty.name, &self.env, decl.span) {
                Ok(ty) => Some(ty),
                Err(err) => {
                    self.errors.push(err);
                    None
                }
            }
        } else if let Some(init) = decl.init.as_deref() {
            Some(self.infer_quiet(init).unwrap_or_else(Ty::any))
        } else {
            None
        }
    }

    /// Build a function's type: written argument types (arguments are never
    /// inferred) plus the written or body-inferred return type.
    fn function_type(&mut self, decl: &FuncDecl) -> Option<FuncTy> {
        let mut params = Vec::new();
        let mut failed = false;
        for arg in &decl.args {
            if arg.ty.is_unresolved() {
                self.errors.push(TypeError::MissingArgType {
                    func: decl.name.clone(),
                    arg: arg.name.clone(),
                    span: arg.span,
                });
                failed = true;
                continue;
            }
            match resolve::parse_type_name(&arg.ty.name, &self.env, arg.span) {
                Ok(ty) => params.push((arg.name.clone(), ty)),
                Err(err) => {
                    self.errors.push(err);
                    failed = true;
                }
            }
        }
        if failed {
            return None;
        }

        let ret = if decl.returns.is_unresolved() {
            self.infer_return_type(decl, &params)?
        } else {
            match resolve::parse_type_name(&decl.returns.name, &self.env, decl.span) {
                Ok(ty) => ty,
                Err(err) => {
                    self.errors.push(err);
                    return None;
                }
            }
        };

        Some(FuncTy {
            name: decl.name.clone(),
            params,
            ret: Box::new(ret),
            variadic: None,
        })
    }

    /// Infer an unwritten return type: walk the body's `return` statements
    /// (recursing into `if`/`else` branches) in a child scope with the
    /// arguments bound, and take the first type that resolves. A function
    /// whose every return expression calls itself cannot be inferred.
    fn infer_return_type(&mut self, decl: &FuncDecl, params: &[(String, Ty)]) -> Option<Ty> {
        let mut returns = Vec::new();
        collect_returns(&decl.body, &mut returns);
        if returns.is_empty() {
            return Some(Ty::void());
        }

        self.env.push_scope();
        for ((name, ty), arg) in params.iter().zip(&decl.args) {
            self.env.insert_var(VarEntry {
                name: name.clone(),
                span: arg.span,
                ty: ty.clone(),
            });
        }
        let mut inferred = None;
        let mut self_calls = 0;
        for stmt in &returns {
            match stmt.expr.as_deref() {
                None => {
                    inferred = Some(Ty::void());
                    break;
                }
                Some(expr) if is_self_call(expr, &decl.name) => self_calls += 1,
                Some(expr) => {
                    if let Some(ty) = self.infer_quiet(expr) {
                        inferred = Some(ty);
                        break;
                    }
                }
            }
        }
        self.env.pop_scope();

        match inferred {
            Some(ty) => Some(ty),
            None if self_calls == returns.len() => {
                self.errors.push(TypeError::RecursiveReturn {
                    name: decl.name.clone(),
                    span: decl.span,
                });
                None
            }
            // Returns exist but none typed in this signature-only context;
            // the full body check surfaces the real error.
            None => Some(Ty::any()),
        }
    }

    // ── Pass 2: checking ───────────────────────────────────────────────

    fn check_top(&mut self, node: &mut Node) {
        match node {
            Node::FuncDecl(decl) => self.check_func_decl(decl, false),
            Node::Eof { .. } => {}
            other => self.check_stmt(other, None),
        }
    }

    fn check_stmt(&mut self, node: &mut Node, enclosing: Option<&FuncTy>) {
        match node {
            Node::VarDecl(decl) => self.check_var_decl(decl),
            Node::Keyword(kw) => self.check_return(kw, enclosing),
            Node::IfElse(stmt) => self.check_if_else(stmt, enclosing),
            // A nested function registers in the enclosing scope, then
            // checks like any other.
            Node::FuncDecl(decl) => self.check_func_decl(decl, true),
            Node::Eof { .. } => {}
            expr => {
                self.infer_expr(expr);
            }
        }
    }

    fn check_func_decl(&mut self, decl: &mut FuncDecl, register: bool) {
        let Some(fty) = self.function_type(decl) else {
            return;
        };
        if register {
            self.env.insert_var(VarEntry {
                name: decl.name.clone(),
                span: decl.span,
                ty: Ty::func(fty.clone()),
            });
        }
        // Annotate an inferred concrete return so the backends can emit it.
        if decl.returns.is_unresolved() && !matches!(fty.ret.kind, TyKind::Void) {
            decl.returns.name = fty.ret.to_string();
            decl.returns.inferred_from = Some(decl.span);
        }

        self.env.push_scope();
        for ((name, ty), arg) in fty.params.iter().zip(&decl.args) {
            self.env.insert_var(VarEntry {
                name: name.clone(),
                span: arg.span,
                ty: ty.clone(),
            });
        }
        for stmt in &mut decl.body {
            self.check_stmt(stmt, Some(&fty));
        }
        self.env.pop_scope();
    }

    fn check_var_decl(&mut self, decl: &mut VarDecl) {
        let existing = self.env.var_in_current_scope(&decl.name).map(|e| e.span);
        if let Some(original) = existing {
            // Re-declaration at the identical source span is a no-op (the
            // global pass already registered it); anywhere else it is an
            // error.
            if original != decl.span {
                self.errors.push(TypeError::Redeclaration {
                    name: decl.name.clone(),
                    span: decl.span,
                    original,
                });
                return;
            }
        }

        let ty = if decl.ty.is_unresolved() {
            match decl.init.as_deref() {
                None => {
                    self.errors.push(TypeError::MissingVarType {
                        name: decl.name.clone(),
                        span: decl.span,
                    });
                    None
                }
                Some(init) => {
                    let init_span = init.span();
                    let inferred = self.infer_expr(init);
                    if let Some(ty) = &inferred {
                        decl.ty.name = ty.to_string();
                        decl.ty.inferred_from = Some(init_span);
                    }
                    inferred
                }
            }
        } else if decl.ty.name == "number" {
            match decl.init.as_deref() {
                None => {
                    self.errors.push(TypeError::MissingVarType {
                        name: decl.name.clone(),
                        span: decl.span,
                    });
                    None
                }
                Some(init) => {
                    let init_span = init.span();
                    match self.infer_expr(init) {
                        Some(ty) if ty.is_number() => {
                            decl.ty.name = ty.to_string();
                            decl.ty.inferred_from = Some(init_span);
                            Some(ty)
                        }
                        Some(ty) => {
                            self.errors.push(TypeError::NumberExpected {
                                name: decl.name.clone(),
                                received: ty.to_string(),
                                span: init_span,
                            });
                            None
                        }
                        None => None,
                    }
                }
            }
        } else {
            match resolve::parse_type_name(&decl.ty.name, &self.env, decl.span) {
                Err(err) => {
                    self.errors.push(err);
                    None
                }
                Ok(declared) => {
                    if let Some(init) = decl.init.as_deref() {
                        let init_span = init.span();
                        if let Some(init_ty) = self.infer_expr(init) {
                            if !init_ty.equivalent(&declared) {
                                self.errors.push(TypeError::InitMismatch {
                                    name: decl.name.clone(),
                                    expected: declared.to_string(),
                                    received: init_ty.to_string(),
                                    span: init_span,
                                });
                            }
                        }
                    }
                    Some(declared)
                }
            }
        };

        if let Some(mut ty) = ty {
            if existing.is_none() {
                ty.origin = None;
                self.env.insert_var(VarEntry {
                    name: decl.name.clone(),
                    span: decl.span,
                    ty,
                });
            }
        }
    }

    fn check_return(&mut self, kw: &KeywordStmt, enclosing: Option<&FuncTy>) {
        let Some(fty) = enclosing else {
            self.errors.push(TypeError::ReturnOutsideFunction { span: kw.span });
            return;
        };
        let returned = match kw.expr.as_deref() {
            None => Ty::void(),
            Some(expr) => match self.infer_expr(expr) {
                Some(ty) => ty,
                None => return,
            },
        };
        if !returned.equivalent(&fty.ret) {
            self.errors.push(TypeError::ReturnMismatch {
                func: fty.name.clone(),
                expected: fty.ret.to_string(),
                received: returned.to_string(),
                span: kw.span,
            });
        }
    }

    fn check_if_else(&mut self, stmt: &mut IfElse, enclosing: Option<&FuncTy>) {
        let cond_span = stmt.cond.span();
        if let Some(cond_ty) = self.infer_expr(&stmt.cond) {
            if !cond_ty.equivalent(&Ty::bool()) {
                self.errors.push(TypeError::CondNotBool {
                    received: cond_ty.to_string(),
                    span: cond_span,
                });
            }
        }
        self.env.push_scope();
        for node in &mut stmt.body {
            self.check_stmt(node, enclosing);
        }
        self.env.pop_scope();
        if let Some(else_body) = &mut stmt.else_body {
            self.env.push_scope();
            for node in else_body {
                self.check_stmt(node, enclosing);
            }
            self.env.pop_scope();
        }
    }

    // ── Expression typing ──────────────────────────────────────────────

    /// Type an expression, recording errors. `None` means an error was
    /// already recorded somewhere below.
    fn infer_expr(&mut self, node: &Node) -> Option<Ty> {
        match node {
            Node::Literal(lit) => Some(match &lit.value {
                efu_parser::ast::LiteralValue::Str(_) => Ty::string(),
                efu_parser::ast::LiteralValue::Int(_) => Ty::int().with_origin(lit.span),
            }),
            Node::Ident(ident) => match self.env.lookup_var(&ident.name) {
                Some(entry) => Some(entry.ty.clone()),
                None => {
                    self.errors.push(TypeError::UndeclaredIdentifier {
                        name: ident.name.clone(),
                        span: ident.span,
                    });
                    None
                }
            },
            Node::Group(group) => match group.item.as_deref() {
                Some(item) => self.infer_expr(item),
                None => Some(Ty::void()),
            },
            Node::Binop(binop) => self.check_binop(binop),
            Node::FuncCall(call) => self.check_call(call),
            Node::Pipe(pipe) => self.check_pipe(pipe),
            // A function literal types as its function type.
            Node::FuncDecl(decl) => self.function_type(decl).map(Ty::func),
            Node::Keyword(_) | Node::VarDecl(_) | Node::IfElse(_) | Node::Eof { .. } => {
                debug_assert!(false, "statement node in expression position");
                None
            }
        }
    }

    /// Quiet inference: type without recording errors. Used where a failure
    /// only means "not known yet" (global registration, return inference).
    fn infer_quiet(&mut self, node: &Node) -> Option<Ty> {
        let mark = self.errors.len();
        let result = self.infer_expr(node);
        self.errors.truncate(mark);
        result
    }

    fn check_binop(&mut self, binop: &efu_parser::ast::Binop) -> Option<Ty> {
        let lhs = self.infer_expr(&binop.lhs)?;
        let rhs = self.infer_expr(&binop.rhs)?;
        let op = binop.op;
        if op.is_logic() {
            if !lhs.equivalent(&Ty::bool()) || !rhs.equivalent(&Ty::bool()) {
                self.push_binop_mismatch(binop, &lhs, &rhs);
            }
            Some(Ty::bool())
        } else if op.is_comparison() {
            if !lhs.equivalent(&rhs) {
                self.push_binop_mismatch(binop, &lhs, &rhs);
            }
            Some(Ty::bool())
        } else {
            if !lhs.is_number() || !rhs.is_number() || !lhs.equivalent(&rhs) {
                self.push_binop_mismatch(binop, &lhs, &rhs);
            }
            // Prefer the side that is not a bare literal, so `i + 1` keeps
            // `i`'s base.
            Some(if lhs.origin.is_some() && rhs.origin.is_none() {
                rhs
            } else {
                lhs
            })
        }
    }

    fn push_binop_mismatch(&mut self, binop: &efu_parser::ast::Binop, lhs: &Ty, rhs: &Ty) {
        self.errors.push(TypeError::BinopMismatch {
            op: binop.op.as_str().to_string(),
            lhs: lhs.to_string(),
            rhs: rhs.to_string(),
            span: binop.span,
        });
    }

    fn check_call(&mut self, call: &efu_parser::ast::FuncCall) -> Option<Ty> {
        let fty = self.resolve_function(&call.name, call.span)?;
        let mut arg_tys = Vec::new();
        for arg in &call.args {
            arg_tys.push(self.infer_expr(arg)?);
        }
        self.check_args(&fty, &call.name, call.span, &arg_tys)
    }

    /// Walk a pipe chain left to right, threading the current value type
    /// through each stage as its appended last argument.
    fn check_pipe(&mut self, pipe: &PipeOp) -> Option<Ty> {
        let mut current = self.infer_expr(&pipe.value)?;
        let mut stage = pipe.next.as_deref();
        while let Some(s) = stage {
            current = self.check_pipe_stage(s, current)?;
            stage = s.next.as_deref();
        }
        Some(current)
    }

    fn check_pipe_stage(&mut self, stage: &PipeOp, piped: Ty) -> Option<Ty> {
        let (name, span, mut arg_tys) = match stage.value.as_ref() {
            Node::Ident(id) => (id.name.clone(), id.span, Vec::new()),
            Node::FuncCall(call) => {
                let mut tys = Vec::new();
                for arg in &call.args {
                    tys.push(self.infer_expr(arg)?);
                }
                (call.name.clone(), call.span, tys)
            }
            other => {
                self.errors.push(TypeError::PipeStageNotCallable {
                    span: other.span(),
                });
                return None;
            }
        };
        arg_tys.push(piped);
        let fty = self.resolve_function(&name, span)?;
        self.check_args(&fty, &name, span, &arg_tys)
    }

    fn resolve_function(&mut self, name: &str, span: Span) -> Option<FuncTy> {
        let ty = self.env.lookup_var(name).map(|entry| entry.ty.clone());
        match ty {
            None => {
                self.errors.push(TypeError::UndeclaredIdentifier {
                    name: name.to_string(),
                    span,
                });
                None
            }
            Some(ty) => match ty.kind {
                TyKind::Func(fty) => Some(fty),
                _ => {
                    self.errors.push(TypeError::NotAFunction {
                        name: name.to_string(),
                        span,
                    });
                    None
                }
            },
        }
    }

    /// Arity and argument checking against a function type, with literal
    /// monomorphisation: an argument whose type still carries a literal
    /// origin is rewritten to a numeric parameter's base (and loses the
    /// origin) instead of failing on an exact-base comparison.
    fn check_args(
        &mut self,
        fty: &FuncTy,
        name: &str,
        span: Span,
        arg_tys: &[Ty],
    ) -> Option<Ty> {
        let arity = fty.params.len();
        let arity_ok = if fty.variadic.is_some() {
            arg_tys.len() >= arity
        } else {
            arg_tys.len() == arity
        };
        if !arity_ok {
            self.errors.push(TypeError::ArityMismatch {
                name: name.to_string(),
                expected: arity,
                found: arg_tys.len(),
                span,
            });
            return None;
        }

        let mut failed = false;
        for (index, arg_ty) in arg_tys.iter().enumerate() {
            let param_ty = match fty.params.get(index) {
                Some((_, ty)) => ty,
                // Past the declared arity only with a variadic tail.
                None => match &fty.variadic {
                    Some((_, elem)) => elem.as_ref(),
                    None => break,
                },
            };
            let received = self.monomorphise(arg_ty, param_ty);
            if !received.equivalent(param_ty) {
                self.errors.push(TypeError::ArgMismatch {
                    name: name.to_string(),
                    index: index + 1,
                    expected: param_ty.to_string(),
                    received: arg_ty.to_string(),
                    span,
                });
                failed = true;
            }
        }
        if failed {
            None
        } else {
            Some((*fty.ret).clone())
        }
    }

    /// Rewrite a literal-origin numeric argument toward a concrete numeric
    /// parameter of a different base; clears the origin. Non-literal
    /// arguments pass through untouched.
    fn monomorphise(&self, arg: &Ty, param: &Ty) -> Ty {
        if arg.origin.is_none() {
            return arg.clone();
        }
        if let (TyKind::Prim(arg_base), TyKind::Prim(param_base)) = (&arg.kind, &param.kind) {
            let arg_numeric = arg_base.is_integer() || arg_base.is_float();
            let param_numeric = param_base.is_integer() || param_base.is_float();
            if arg_numeric && param_numeric && arg_base != param_base {
                return Ty::prim(*param_base);
            }
        }
        arg.clone()
    }
}

// ── Body walking helpers ───────────────────────────────────────────────

/// Collect every `return` statement in a body, recursing into `if`/`else`
/// branches but not into nested functions.
fn collect_returns<'a>(body: &'a [Node], out: &mut Vec<&'a KeywordStmt>) {
    for node in body {
        match node {
            Node::Keyword(kw) => out.push(kw),
            Node::IfElse(stmt) => {
                collect_returns(&stmt.body, out);
                if let Some(else_body) = &stmt.else_body {
                    collect_returns(else_body, out);
                }
            }
            _ => {}
        }
    }
}

/// Whether an expression is (a grouping of) a call to the named function.
fn is_self_call(expr: &Node, name: &str) -> bool {
    match expr {
        Node::FuncCall(call) => call.name == name,
        Node::Group(group) => group
            .item
            .as_deref()
            .map(|item| is_self_call(item, name))
            .unwrap_or(false),
        _ => false,
    }
}
