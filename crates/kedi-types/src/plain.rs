//! The Plain IR: the syntax tree after name resolution.
//!
//! Locals are numbered slots (`%n`, parameters first) and call targets are
//! function indices (`@n`, declaration order). Control flow is still nested
//! and expressions are still trees.

use std::fmt;

use crate::ast::{BinOp, UnaryOp};
use crate::sexpr::{SExpr, ToSExpr};

/// A numbered local variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(pub u32);

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// A resolved function, by declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FuncIndex(pub u32);

impl fmt::Display for FuncIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub functions: Vec<Function>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub index: FuncIndex,
    pub arity: u32,
    /// Source name of every slot; `locals[n]` names `%n`.
    pub locals: Vec<String>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Initialise a freshly declared slot.
    Let(Slot, Expr),
    Assign(Slot, Expr),
    While(Expr, Vec<Stmt>),
    If(Expr, Vec<Stmt>, Vec<Stmt>),
    Return(Expr),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(i32),
    Local(Slot),
    Call(FuncIndex, Vec<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
}

impl ToSExpr for Slot {
    fn to_sexpr(&self) -> SExpr {
        SExpr::symbol(self.to_string())
    }
}

impl ToSExpr for FuncIndex {
    fn to_sexpr(&self) -> SExpr {
        SExpr::symbol(self.to_string())
    }
}

impl ToSExpr for Module {
    fn to_sexpr(&self) -> SExpr {
        SExpr::form("module", self.functions.iter().map(ToSExpr::to_sexpr))
    }
}

impl ToSExpr for Function {
    fn to_sexpr(&self) -> SExpr {
        let locals = self
            .locals
            .iter()
            .enumerate()
            .map(|(i, name)| SExpr::list([Slot(i as u32).to_sexpr(), SExpr::symbol(name.as_str())]));
        SExpr::form(
            "fun",
            [
                self.index.to_sexpr(),
                SExpr::symbol(self.name.as_str()),
                SExpr::form("arity", [SExpr::number(self.arity)]),
                SExpr::form("locals", locals),
                self.body.to_sexpr(),
            ],
        )
    }
}

impl ToSExpr for Stmt {
    fn to_sexpr(&self) -> SExpr {
        match self {
            Stmt::Let(slot, value) => SExpr::form("let", [slot.to_sexpr(), value.to_sexpr()]),
            Stmt::Assign(slot, value) => {
                SExpr::form("assign", [slot.to_sexpr(), value.to_sexpr()])
            }
            Stmt::While(condition, body) => {
                SExpr::form("while", [condition.to_sexpr(), body.to_sexpr()])
            }
            Stmt::If(condition, then_body, else_body) => SExpr::form(
                "if",
                [
                    condition.to_sexpr(),
                    then_body.to_sexpr(),
                    else_body.to_sexpr(),
                ],
            ),
            Stmt::Return(value) => SExpr::form("return", [value.to_sexpr()]),
            Stmt::Expr(value) => value.to_sexpr(),
        }
    }
}

impl ToSExpr for Expr {
    fn to_sexpr(&self) -> SExpr {
        match self {
            Expr::Const(value) => SExpr::number(*value),
            Expr::Local(slot) => slot.to_sexpr(),
            Expr::Call(func, args) => SExpr::form("call", [func.to_sexpr(), args.to_sexpr()]),
            Expr::Binary(op, left, right) => {
                SExpr::form(op.as_str(), [left.to_sexpr(), right.to_sexpr()])
            }
            Expr::Unary(op, operand) => SExpr::form(op.as_str(), [operand.to_sexpr()]),
        }
    }
}
