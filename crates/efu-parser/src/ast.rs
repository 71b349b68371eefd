//! The EFU abstract syntax tree.
//!
//! A parsed program is a flat `Vec<Node>` of top-level declarations ending in
//! `Eof`. Nodes are created by the parser and mutated in place by later
//! passes: the type checker fills in inferred [`TypeName`]s, and the Go
//! backend renames print calls and primitive type names. Every node carries
//! its source span.

use efu_common::span::Span;
use efu_common::token::{Keyword, TokenKind};
use serde::Serialize;

/// One AST node. The variant discriminator exactly determines the payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Node {
    /// Sentinel end of the top level.
    Eof { span: Span },
    FuncDecl(FuncDecl),
    FuncCall(FuncCall),
    VarDecl(VarDecl),
    Binop(Binop),
    Pipe(PipeOp),
    /// A parenthesized grouping, possibly empty (`()`).
    Group(Group),
    /// A keyword statement; currently only `return`.
    Keyword(KeywordStmt),
    IfElse(IfElse),
    Ident(Ident),
    Literal(Literal),
}

impl Node {
    /// The node's source span.
    pub fn span(&self) -> Span {
        match self {
            Node::Eof { span } => *span,
            Node::FuncDecl(n) => n.span,
            Node::FuncCall(n) => n.span,
            Node::VarDecl(n) => n.span,
            Node::Binop(n) => n.span,
            Node::Pipe(n) => n.span,
            Node::Group(n) => n.span,
            Node::Keyword(n) => n.span,
            Node::IfElse(n) => n.span,
            Node::Ident(n) => n.span,
            Node::Literal(n) => n.span,
        }
    }
}

/// A type name as written in source, or the unresolved sentinel `"()"`.
///
/// The checker annotates inference results here: `name` becomes the inferred
/// type's name and `inferred_from` records where the type came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeName {
    pub name: String,
    pub inferred_from: Option<Span>,
}

impl TypeName {
    /// The "not written; to be inferred" sentinel.
    pub const UNRESOLVED: &'static str = "()";

    pub fn unresolved() -> Self {
        Self {
            name: Self::UNRESOLVED.to_string(),
            inferred_from: None,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inferred_from: None,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        self.name == Self::UNRESOLVED
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuncDecl {
    pub name: String,
    pub args: Vec<FuncDeclArg>,
    pub returns: TypeName,
    pub body: Vec<Node>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuncDeclArg {
    pub name: String,
    pub ty: TypeName,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuncCall {
    pub name: String,
    pub args: Vec<Node>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarDecl {
    pub name: String,
    pub ty: TypeName,
    pub init: Option<Box<Node>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binop {
    pub op: BinOp,
    pub lhs: Box<Node>,
    pub rhs: Box<Node>,
    pub span: Span,
}

/// One stage of a pipe chain, as a linked list.
///
/// `a |> f |> g(x)` parses to `Pipe(a, Pipe(f, Pipe(g(x), None)))`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipeOp {
    pub value: Box<Node>,
    pub next: Option<Box<PipeOp>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub item: Option<Box<Node>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordStmt {
    pub word: Keyword,
    pub expr: Option<Box<Node>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfElse {
    pub cond: Box<Node>,
    pub body: Vec<Node>,
    pub else_body: Option<Vec<Node>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Literal {
    pub value: LiteralValue,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    Str(String),
    Int(i64),
}

// ── Binary operators ───────────────────────────────────────────────────

/// The EFU binary operators: math, comparison, and logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Gt,
    Lt,
    EqEq,
    LtEq,
    GtEq,
    NotEq,
    AndAnd,
    OrOr,
}

impl BinOp {
    /// Map an operator token to its binary operator, if it is one.
    pub fn from_token(kind: &TokenKind) -> Option<BinOp> {
        match kind {
            TokenKind::Plus => Some(BinOp::Add),
            TokenKind::Minus => Some(BinOp::Sub),
            TokenKind::Star => Some(BinOp::Mul),
            TokenKind::Slash => Some(BinOp::Div),
            TokenKind::Percent => Some(BinOp::Rem),
            TokenKind::Gt => Some(BinOp::Gt),
            TokenKind::Lt => Some(BinOp::Lt),
            TokenKind::EqEq => Some(BinOp::EqEq),
            TokenKind::LtEq => Some(BinOp::LtEq),
            TokenKind::GtEq => Some(BinOp::GtEq),
            TokenKind::NotEq => Some(BinOp::NotEq),
            TokenKind::AmpAmp => Some(BinOp::AndAnd),
            TokenKind::BarBar => Some(BinOp::OrOr),
            _ => None,
        }
    }

    /// Returns (left_bp, right_bp) for the Pratt loop.
    ///
    /// Left < right means left-associative (the case for every EFU operator).
    /// Classes from loosest to tightest: logic, `%`, comparison, additive,
    /// multiplicative.
    pub fn binding_power(&self) -> (u8, u8) {
        match self {
            BinOp::AndAnd | BinOp::OrOr => (1, 2),
            BinOp::Rem => (3, 4),
            BinOp::Gt | BinOp::Lt | BinOp::EqEq | BinOp::LtEq | BinOp::GtEq | BinOp::NotEq => {
                (5, 6)
            }
            BinOp::Add | BinOp::Sub => (7, 8),
            BinOp::Mul | BinOp::Div => (9, 10),
        }
    }

    /// Source spelling of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Gt => ">",
            BinOp::Lt => "<",
            BinOp::EqEq => "==",
            BinOp::LtEq => "<=",
            BinOp::GtEq => ">=",
            BinOp::NotEq => "!=",
            BinOp::AndAnd => "&&",
            BinOp::OrOr => "||",
        }
    }

    /// Whether this is a comparison operator (result type `bool`).
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinOp::Gt | BinOp::Lt | BinOp::EqEq | BinOp::LtEq | BinOp::GtEq | BinOp::NotEq
        )
    }

    /// Whether this is a logic operator (`&&`, `||`).
    pub fn is_logic(&self) -> bool {
        matches!(self, BinOp::AndAnd | BinOp::OrOr)
    }
}

// ── Pipe desugaring ────────────────────────────────────────────────────

/// Fold a pipe chain into the call it stands for.
///
/// `v0 |> v1 |> … |> vN` folds from the left: at each step an `Ident` stage
/// becomes `Call(name, [prev])` and a `FuncCall(name, args)` stage becomes
/// `Call(name, args ++ [prev])`. The result is the final call. Returns `None`
/// for a chain with no stages or a stage that is not a callable target (the
/// parser rejects those, so `None` here indicates a malformed tree).
///
/// Shared by the type checker and both backends.
pub fn desugar_pipe(pipe: &PipeOp) -> Option<FuncCall> {
    let mut current: Node = (*pipe.value).clone();
    let mut stage = pipe.next.as_deref()?;
    loop {
        let span = current.span().merge(stage.value.span());
        let call = match stage.value.as_ref() {
            Node::Ident(id) => FuncCall {
                name: id.name.clone(),
                args: vec![current],
                span,
            },
            Node::FuncCall(call) => {
                let mut args = call.args.clone();
                args.push(current);
                FuncCall {
                    name: call.name.clone(),
                    args,
                    span,
                }
            }
            _ => return None,
        };
        match stage.next.as_deref() {
            Some(next) => {
                current = Node::FuncCall(call);
                stage = next;
            }
            None => return Some(call),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Node {
        Node::Ident(Ident {
            name: name.into(),
            span: Span::new(0, 0),
        })
    }

    fn int(value: i64) -> Node {
        Node::Literal(Literal {
            value: LiteralValue::Int(value),
            span: Span::new(0, 0),
        })
    }

    fn chain(stages: Vec<Node>) -> PipeOp {
        let mut next = None;
        for stage in stages.into_iter().rev() {
            let span = stage.span();
            next = Some(Box::new(PipeOp {
                value: Box::new(stage),
                next,
                span,
            }));
        }
        *next.expect("at least one stage")
    }

    #[test]
    fn desugar_ident_stage_appends_value() {
        let call = desugar_pipe(&chain(vec![int(5), ident("fizz")])).unwrap();
        assert_eq!(call.name, "fizz");
        assert_eq!(call.args, vec![int(5)]);
    }

    #[test]
    fn desugar_call_stage_appends_as_last_arg() {
        let g = Node::FuncCall(FuncCall {
            name: "g".into(),
            args: vec![int(1)],
            span: Span::new(0, 0),
        });
        let call = desugar_pipe(&chain(vec![int(5), ident("f"), g])).unwrap();
        assert_eq!(call.name, "g");
        assert_eq!(call.args.len(), 2);
        assert_eq!(call.args[0], int(1));
        // Second arg is the folded `f(5)`.
        match &call.args[1] {
            Node::FuncCall(inner) => {
                assert_eq!(inner.name, "f");
                assert_eq!(inner.args, vec![int(5)]);
            }
            other => panic!("expected folded call, got {other:?}"),
        }
    }

    #[test]
    fn desugar_rejects_non_callable_stage() {
        assert!(desugar_pipe(&chain(vec![int(5), int(6)])).is_none());
    }

    #[test]
    fn binding_powers_order_the_classes() {
        assert!(BinOp::AndAnd.binding_power().0 < BinOp::Rem.binding_power().0);
        assert!(BinOp::Rem.binding_power().0 < BinOp::EqEq.binding_power().0);
        assert!(BinOp::EqEq.binding_power().0 < BinOp::Add.binding_power().0);
        assert!(BinOp::Add.binding_power().0 < BinOp::Mul.binding_power().0);
    }
}
