//! Type error taxonomy.
//!
//! Every variant carries the span the diagnostic should point at, plus the
//! expected/received payloads its message needs. Rendering to the
//! `<file>:<line>:<col>: [ERROR] <message>` line lives in
//! [`crate::diagnostics`].

use std::fmt;

use efu_common::span::Span;

/// A type-resolve or type-check error.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeError {
    /// A type name did not resolve to a primitive or a registered type.
    UnknownType { name: String, span: Span },
    /// A type name string did not parse (bad array brackets and the like).
    MalformedTypeName { text: String, span: Span },
    /// A function argument had no written type; arguments are never inferred.
    MissingArgType {
        func: String,
        arg: String,
        span: Span,
    },
    /// `let x;` with neither a type nor an initializer.
    MissingVarType { name: String, span: Span },
    /// An identifier that is not in scope.
    UndeclaredIdentifier { name: String, span: Span },
    /// A call target that is not a function.
    NotAFunction { name: String, span: Span },
    /// Wrong number of call arguments.
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },
    /// A call argument of the wrong type. `index` is 1-based.
    ArgMismatch {
        name: String,
        index: usize,
        expected: String,
        received: String,
        span: Span,
    },
    /// An initializer incompatible with the declared type.
    InitMismatch {
        name: String,
        expected: String,
        received: String,
        span: Span,
    },
    /// The `number` sentinel required a numeric initializer.
    NumberExpected {
        name: String,
        received: String,
        span: Span,
    },
    /// A returned value incompatible with the function's return type.
    ReturnMismatch {
        func: String,
        expected: String,
        received: String,
        span: Span,
    },
    /// `return` outside of any function.
    ReturnOutsideFunction { span: Span },
    /// A second declaration of a name in the same scope.
    Redeclaration {
        name: String,
        span: Span,
        original: Span,
    },
    /// An `if` condition that is not a bool.
    CondNotBool { received: String, span: Span },
    /// A function whose every return expression is a self-recursive call.
    RecursiveReturn { name: String, span: Span },
    /// A pipe stage that is not a callable name or call.
    PipeStageNotCallable { span: Span },
    /// Operands incompatible with a binary operator.
    BinopMismatch {
        op: String,
        lhs: String,
        rhs: String,
        span: Span,
    },
}

impl TypeError {
    /// The span the diagnostic points at.
    pub fn span(&self) -> Span {
        match self {
            Self::UnknownType { span, .. }
            | Self::MalformedTypeName { span, .. }
            | Self::MissingArgType { span, .. }
            | Self::MissingVarType { span, .. }
            | Self::UndeclaredIdentifier { span, .. }
            | Self::NotAFunction { span, .. }
            | Self::ArityMismatch { span, .. }
            | Self::ArgMismatch { span, .. }
            | Self::InitMismatch { span, .. }
            | Self::NumberExpected { span, .. }
            | Self::ReturnMismatch { span, .. }
            | Self::ReturnOutsideFunction { span }
            | Self::Redeclaration { span, .. }
            | Self::CondNotBool { span, .. }
            | Self::RecursiveReturn { span, .. }
            | Self::PipeStageNotCallable { span }
            | Self::BinopMismatch { span, .. } => *span,
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType { name, .. } => write!(f, "unknown type `{name}`"),
            Self::MalformedTypeName { text, .. } => write!(f, "malformed type name `{text}`"),
            Self::MissingArgType { func, arg, .. } => {
                write!(f, "argument `{arg}` of `{func}` needs a type")
            }
            Self::MissingVarType { name, .. } => {
                write!(f, "`{name}` needs a type or an initializer")
            }
            Self::UndeclaredIdentifier { name, .. } => write!(f, "`{name}` is not declared"),
            Self::NotAFunction { name, .. } => write!(f, "`{name}` is not a function"),
            Self::ArityMismatch {
                name,
                expected,
                found,
                ..
            } => write!(
                f,
                "`{name}` expects {expected} argument(s), received {found}"
            ),
            Self::ArgMismatch {
                name,
                index,
                expected,
                received,
                ..
            } => write!(
                f,
                "argument {index} of `{name}`: expected {expected}, received {received}"
            ),
            Self::InitMismatch {
                name,
                expected,
                received,
                ..
            } => write!(
                f,
                "cannot initialize `{name}`: expected {expected}, received {received}"
            ),
            Self::NumberExpected { name, received, .. } => {
                write!(f, "`{name}` expects a number, received {received}")
            }
            Self::ReturnMismatch {
                func,
                expected,
                received,
                ..
            } => write!(
                f,
                "`{func}` returns {expected}, received {received}"
            ),
            Self::ReturnOutsideFunction { .. } => write!(f, "`return` outside of a function"),
            Self::Redeclaration { name, .. } => write!(f, "`{name}` is already declared"),
            Self::CondNotBool { received, .. } => {
                write!(f, "condition: expected bool, received {received}")
            }
            Self::RecursiveReturn { name, .. } => {
                write!(f, "cannot infer infinitely recursive return of `{name}`")
            }
            Self::PipeStageNotCallable { .. } => write!(f, "pipe target is not callable"),
            Self::BinopMismatch { op, lhs, rhs, .. } => {
                write!(f, "operator `{op}` cannot combine {lhs} and {rhs}")
            }
        }
    }
}

impl std::error::Error for TypeError {}
