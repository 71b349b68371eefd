//! Type environment with scope stack.
//!
//! The environment maps variable names to their entries and type names to
//! their definitions. It uses a scope stack (Vec of frames) so that entering
//! a function body or an `if`/`else` block pushes a frame and leaving pops
//! it. Lookups search from the innermost frame outward. Frame 0 is the
//! global scope, seeded with the builtins; the environment is created per
//! checker invocation, so there is no process-wide state.

use efu_common::span::Span;
use rustc_hash::FxHashMap;

use crate::ty::Ty;

/// A registered variable: its name, declaration site, and type.
#[derive(Debug, Clone)]
pub struct VarEntry {
    pub name: String,
    pub span: Span,
    pub ty: Ty,
}

#[derive(Default)]
struct Frame {
    vars: FxHashMap<String, VarEntry>,
    types: FxHashMap<String, Ty>,
}

/// The scoped name tables of the type checker.
pub struct TypeEnv {
    /// The scope stack. Index 0 is the global scope.
    frames: Vec<Frame>,
}

impl TypeEnv {
    /// Create a new environment with one empty global scope.
    pub fn new() -> Self {
        TypeEnv {
            frames: vec![Frame::default()],
        }
    }

    /// Push a new empty scope onto the stack.
    pub fn push_scope(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Pop the top scope from the stack.
    ///
    /// # Panics
    ///
    /// Panics if called when only the global scope remains.
    pub fn pop_scope(&mut self) {
        assert!(self.frames.len() > 1, "cannot pop the global scope");
        self.frames.pop();
    }

    /// Register a variable in the current (topmost) scope.
    pub fn insert_var(&mut self, entry: VarEntry) {
        self.frames
            .last_mut()
            .expect("scope stack is never empty")
            .vars
            .insert(entry.name.clone(), entry);
    }

    /// Look up a variable, searching from the innermost scope outward.
    pub fn lookup_var(&self, name: &str) -> Option<&VarEntry> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.vars.get(name))
    }

    /// Look up a variable in the current scope only (redeclaration checks).
    pub fn var_in_current_scope(&self, name: &str) -> Option<&VarEntry> {
        self.frames
            .last()
            .expect("scope stack is never empty")
            .vars
            .get(name)
    }

    /// Register a named type in the current scope.
    pub fn insert_type(&mut self, name: impl Into<String>, ty: Ty) {
        self.frames
            .last_mut()
            .expect("scope stack is never empty")
            .types
            .insert(name.into(), ty);
    }

    /// Look up a named type, searching from the innermost scope outward.
    pub fn lookup_type(&self, name: &str) -> Option<&Ty> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.types.get(name))
    }

    /// Number of scopes on the stack.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl Default for TypeEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, ty: Ty) -> VarEntry {
        VarEntry {
            name: name.into(),
            span: Span::new(0, 0),
            ty,
        }
    }

    #[test]
    fn lookup_in_current_scope() {
        let mut env = TypeEnv::new();
        env.insert_var(entry("x", Ty::int()));
        assert!(env.lookup_var("x").is_some());
        assert!(env.lookup_var("y").is_none());
    }

    #[test]
    fn lookup_walks_outward() {
        let mut env = TypeEnv::new();
        env.insert_var(entry("x", Ty::int()));
        env.push_scope();
        assert!(env.lookup_var("x").is_some());
        // But the current-scope probe does not see it.
        assert!(env.var_in_current_scope("x").is_none());
    }

    #[test]
    fn shadowing_and_popping() {
        let mut env = TypeEnv::new();
        env.insert_var(entry("x", Ty::int()));
        env.push_scope();
        env.insert_var(entry("x", Ty::string()));
        assert!(env.lookup_var("x").unwrap().ty.equivalent(&Ty::string()));
        env.pop_scope();
        assert!(env.lookup_var("x").unwrap().ty.equivalent(&Ty::int()));
    }

    #[test]
    fn types_table_is_scoped_too() {
        let mut env = TypeEnv::new();
        env.insert_type("Thing", Ty::int());
        env.push_scope();
        assert!(env.lookup_type("Thing").is_some());
        env.pop_scope();
        assert_eq!(env.depth(), 1);
    }

    #[test]
    #[should_panic(expected = "cannot pop the global scope")]
    fn popping_the_global_scope_panics() {
        let mut env = TypeEnv::new();
        env.pop_scope();
    }
}
