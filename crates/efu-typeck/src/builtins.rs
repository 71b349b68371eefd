//! Builtin registry: the functions every EFU program can see.
//!
//! The global scope contains exactly `printf`, `printnf`, and `fmt`. All
//! three take a format string and a variadic tail of `any`; `fmt` returns
//! the formatted string instead of printing it.

use efu_common::span::Span;

use crate::env::{TypeEnv, VarEntry};
use crate::ty::{FuncTy, Ty};

/// Names of the global builtins, in registration order.
pub const BUILTIN_NAMES: [&str; 3] = ["printf", "printnf", "fmt"];

/// Seed the global scope of a fresh environment.
pub fn install(env: &mut TypeEnv) {
    env.insert_var(builtin_print("printf"));
    env.insert_var(builtin_print("printnf"));
    env.insert_var(VarEntry {
        name: "fmt".into(),
        span: Span::new(0, 0),
        ty: Ty::func(FuncTy {
            name: "fmt".into(),
            params: vec![("fmt".into(), Ty::string())],
            ret: Box::new(Ty::string()),
            variadic: Some(("args".into(), Box::new(Ty::any()))),
        }),
    });
}

fn builtin_print(name: &str) -> VarEntry {
    VarEntry {
        name: name.into(),
        span: Span::new(0, 0),
        ty: Ty::func(FuncTy {
            name: name.into(),
            params: vec![("fmt".into(), Ty::string())],
            ret: Box::new(Ty::void()),
            variadic: Some(("args".into(), Box::new(Ty::any()))),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::TyKind;

    #[test]
    fn globals_contain_exactly_the_builtins() {
        let mut env = TypeEnv::new();
        install(&mut env);
        for name in BUILTIN_NAMES {
            let entry = env.lookup_var(name).expect(name);
            assert!(matches!(entry.ty.kind, TyKind::Func(_)));
        }
        assert!(env.lookup_var("println").is_none());
    }

    #[test]
    fn fmt_returns_string_and_prints_return_void() {
        let mut env = TypeEnv::new();
        install(&mut env);
        let fmt = match &env.lookup_var("fmt").unwrap().ty.kind {
            TyKind::Func(fty) => fty.clone(),
            other => panic!("expected func, got {other:?}"),
        };
        assert!(fmt.ret.equivalent(&Ty::string()));
        assert!(fmt.variadic.is_some());
        let printf = match &env.lookup_var("printf").unwrap().ty.kind {
            TyKind::Func(fty) => fty.clone(),
            other => panic!("expected func, got {other:?}"),
        };
        assert!(printf.ret.equivalent(&Ty::void()));
    }
}
