//! Type-name parsing.
//!
//! Written type annotations are carried through the AST as strings
//! (`u8`, `u8[]`, `u8[3][]`). Resolution tokenizes the string back through
//! the EFU lexer, expects one identifier base, then zero or more `[ INT? ]`
//! groups, each wrapping the running type into an array.

use efu_common::span::Span;
use efu_common::token::TokenKind;
use efu_lexer::Lexer;

use crate::env::TypeEnv;
use crate::error::TypeError;
use crate::ty::{PrimTy, Ty};

/// Parse a type-name string against the environment's type tables.
///
/// `span` is where the annotation appeared; it is attached to any error.
pub fn parse_type_name(text: &str, env: &TypeEnv, span: Span) -> Result<Ty, TypeError> {
    let (tokens, lex_errors) = Lexer::tokenize(text);
    if !lex_errors.is_empty() {
        return Err(TypeError::MalformedTypeName {
            text: text.to_string(),
            span,
        });
    }

    let mut iter = tokens.into_iter();
    let base = match iter.next().map(|t| t.kind) {
        Some(TokenKind::Ident(name)) => resolve_base(&name, env, span)?,
        _ => {
            return Err(TypeError::MalformedTypeName {
                text: text.to_string(),
                span,
            })
        }
    };

    let mut ty = base;
    loop {
        match iter.next().map(|t| t.kind) {
            Some(TokenKind::Eof) | None => return Ok(ty),
            Some(TokenKind::LBracket) => {
                let mut size = None;
                let mut next = iter.next().map(|t| t.kind);
                if let Some(TokenKind::Int(value)) = next {
                    if value < 0 {
                        return Err(TypeError::MalformedTypeName {
                            text: text.to_string(),
                            span,
                        });
                    }
                    size = Some(value as u64);
                    next = iter.next().map(|t| t.kind);
                }
                if next != Some(TokenKind::RBracket) {
                    return Err(TypeError::MalformedTypeName {
                        text: text.to_string(),
                        span,
                    });
                }
                ty = Ty::array(ty, size);
            }
            Some(_) => {
                return Err(TypeError::MalformedTypeName {
                    text: text.to_string(),
                    span,
                })
            }
        }
    }
}

fn resolve_base(name: &str, env: &TypeEnv, span: Span) -> Result<Ty, TypeError> {
    if let Some(prim) = PrimTy::from_source_name(name) {
        return Ok(Ty::prim(prim));
    }
    if let Some(ty) = env.lookup_type(name) {
        return Ok(ty.clone());
    }
    Err(TypeError::UnknownType {
        name: name.to_string(),
        span,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::TyKind;

    fn parse(text: &str) -> Result<Ty, TypeError> {
        parse_type_name(text, &TypeEnv::new(), Span::new(0, 0))
    }

    #[test]
    fn plain_primitives() {
        assert!(parse("isz").unwrap().equivalent(&Ty::int()));
        assert!(parse("string").unwrap().equivalent(&Ty::string()));
    }

    #[test]
    fn array_suffixes_wrap_outward() {
        let ty = parse("u8[3]").unwrap();
        assert!(matches!(ty.kind, TyKind::Array { size: Some(3), .. }));
        // `u8[3][]`: an unsized array of u8[3].
        let ty = parse("u8[3][]").unwrap();
        match ty.kind {
            TyKind::Array { elem, size: None } => {
                assert!(matches!(elem.kind, TyKind::Array { size: Some(3), .. }));
            }
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn named_types_resolve_from_the_environment() {
        let mut env = TypeEnv::new();
        env.insert_type(
            "Color",
            Ty::new(TyKind::Enum {
                name: "Color".into(),
                values: vec![("red".into(), 0)],
            }),
        );
        let ty = parse_type_name("Color", &env, Span::new(0, 0)).unwrap();
        assert!(matches!(ty.kind, TyKind::Enum { .. }));
    }

    #[test]
    fn unknown_and_malformed_names_are_rejected() {
        assert!(matches!(parse("Wat"), Err(TypeError::UnknownType { .. })));
        assert!(matches!(
            parse("u8["),
            Err(TypeError::MalformedTypeName { .. })
        ));
        assert!(matches!(
            parse("u8]3["),
            Err(TypeError::MalformedTypeName { .. })
        ));
        assert!(matches!(
            parse("u8[-1]"),
            Err(TypeError::MalformedTypeName { .. })
        ));
    }
}
