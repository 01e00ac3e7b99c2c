//! Syntax tree produced by the parser.
//!
//! Every node carries a [`Span`]. Names are still plain strings here; the
//! renamer resolves them into the [`plain`](crate::plain) IR.

use crate::sexpr::{SExpr, ToSExpr};
use crate::Span;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete source file: function declarations in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub functions: Vec<FunDecl>,
    pub span: Span,
}

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// `fun name(a, b) { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct FunDecl {
    pub name: Ident,
    pub params: Vec<Ident>,
    pub body: Block,
    pub span: Span,
}

/// `{ stmts... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let(LetStmt),
    Assign(AssignStmt),
    While(WhileStmt),
    If(IfStmt),
    Return(ReturnStmt),
    Expr(ExprStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Let(s) => s.span,
            Stmt::Assign(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Expr(s) => s.span,
        }
    }
}

/// `let name = value`
#[derive(Debug, Clone, PartialEq)]
pub struct LetStmt {
    pub name: Ident,
    pub value: Expr,
    pub span: Span,
}

/// `name = value`
#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub target: Ident,
    pub value: Expr,
    pub span: Span,
}

/// `while condition { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Block,
    pub span: Span,
}

/// `if condition { then } [else ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_block: Block,
    pub else_branch: Option<ElseBranch>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElseBranch {
    Block(Block),
    ElseIf(Box<IfStmt>),
}

/// `return value`
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Expr,
    pub span: Span,
}

/// An expression evaluated for its effect (typically a call).
#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// `42`
    NumberLit(i32),
    /// `true` / `false`
    BoolLit(bool),
    /// `name`
    Identifier(String),
    /// `f(a, b)`
    Call { name: Ident, args: Vec<Expr> },
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    Unary { op: UnaryOp, operand: Box<Expr> },
}

/// Binary operators (in precedence order, lowest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    // Logical
    Or,
    And,
    // Comparison
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinOp {
    /// Operator spelling in source and in the printed IRs.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Or => "or",
            BinOp::And => "and",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Less => "<",
            BinOp::Greater => ">",
            BinOp::LessEq => "<=",
            BinOp::GreaterEq => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
        }
    }

    /// `and` / `or`, which short-circuit.
    pub fn is_logical(&self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `not x`
    Not,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "neg",
            UnaryOp::Not => "not",
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// S-expression rendering (the playground's Syntax view)
// ══════════════════════════════════════════════════════════════════════════════

impl ToSExpr for Program {
    fn to_sexpr(&self) -> SExpr {
        SExpr::form("module", self.functions.iter().map(ToSExpr::to_sexpr))
    }
}

impl ToSExpr for Ident {
    fn to_sexpr(&self) -> SExpr {
        SExpr::symbol(self.name.as_str())
    }
}

impl ToSExpr for FunDecl {
    fn to_sexpr(&self) -> SExpr {
        SExpr::form(
            "fun",
            [
                self.name.to_sexpr(),
                self.params.to_sexpr(),
                self.body.to_sexpr(),
            ],
        )
    }
}

impl ToSExpr for Block {
    fn to_sexpr(&self) -> SExpr {
        self.stmts.to_sexpr()
    }
}

impl ToSExpr for Stmt {
    fn to_sexpr(&self) -> SExpr {
        match self {
            Stmt::Let(s) => SExpr::form("let", [s.name.to_sexpr(), s.value.to_sexpr()]),
            Stmt::Assign(s) => {
                SExpr::form("assign", [s.target.to_sexpr(), s.value.to_sexpr()])
            }
            Stmt::While(s) => {
                SExpr::form("while", [s.condition.to_sexpr(), s.body.to_sexpr()])
            }
            Stmt::If(s) => s.to_sexpr(),
            Stmt::Return(s) => SExpr::form("return", [s.value.to_sexpr()]),
            Stmt::Expr(s) => s.expr.to_sexpr(),
        }
    }
}

impl ToSExpr for IfStmt {
    fn to_sexpr(&self) -> SExpr {
        let mut items = vec![self.condition.to_sexpr(), self.then_block.to_sexpr()];
        match &self.else_branch {
            Some(ElseBranch::Block(block)) => items.push(block.to_sexpr()),
            Some(ElseBranch::ElseIf(nested)) => items.push(SExpr::list([nested.to_sexpr()])),
            None => {}
        }
        SExpr::form("if", items)
    }
}

impl ToSExpr for Expr {
    fn to_sexpr(&self) -> SExpr {
        match &self.kind {
            ExprKind::NumberLit(value) => SExpr::number(*value),
            ExprKind::BoolLit(value) => SExpr::symbol(if *value { "true" } else { "false" }),
            ExprKind::Identifier(name) => SExpr::symbol(name.as_str()),
            ExprKind::Call { name, args } => {
                SExpr::form("call", [name.to_sexpr(), args.to_sexpr()])
            }
            ExprKind::Binary { left, op, right } => {
                SExpr::form(op.as_str(), [left.to_sexpr(), right.to_sexpr()])
            }
            ExprKind::Unary { op, operand } => SExpr::form(op.as_str(), [operand.to_sexpr()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(value: i32) -> Expr {
        Expr::new(ExprKind::NumberLit(value), Span::default())
    }

    fn ident(name: &str) -> Ident {
        Ident::new(name, Span::default())
    }

    #[test]
    fn test_binop_symbols() {
        assert_eq!(BinOp::LessEq.as_str(), "<=");
        assert_eq!(BinOp::And.as_str(), "and");
        assert!(BinOp::Or.is_logical());
        assert!(!BinOp::Mod.is_logical());
    }

    #[test]
    fn test_expr_sexpr() {
        let e = Expr::new(
            ExprKind::Binary {
                left: Box::new(Expr::new(
                    ExprKind::Identifier("n".into()),
                    Span::default(),
                )),
                op: BinOp::Sub,
                right: Box::new(num(1)),
            },
            Span::default(),
        );
        assert_eq!(e.to_pretty_string(), "(- n 1)");
    }

    #[test]
    fn test_function_sexpr() {
        let f = FunDecl {
            name: ident("main"),
            params: vec![],
            body: Block {
                stmts: vec![Stmt::Return(ReturnStmt {
                    value: Expr::new(
                        ExprKind::Call {
                            name: ident("fib"),
                            args: vec![num(10)],
                        },
                        Span::default(),
                    ),
                    span: Span::default(),
                })],
                span: Span::default(),
            },
            span: Span::default(),
        };
        assert_eq!(
            f.to_pretty_string(),
            "(fun main () ((return (call fib (10)))))"
        );
    }
}
