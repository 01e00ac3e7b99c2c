//! The Simple IR: flat three-address instructions over slots.
//!
//! Every operand is a constant or a slot; nested expressions have been
//! spilled into temporaries appended after the named locals. Control flow is
//! structured (`loop`, `if`) so it maps one-to-one onto WebAssembly blocks.

use std::fmt;

use crate::ast::BinOp;
use crate::plain::{FuncIndex, Slot};
use crate::sexpr::{SExpr, ToSExpr};

/// A loop label, unique within its function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Const(i32),
    Slot(Slot),
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
    /// Total slots, parameters included.
    pub slot_count: u32,
    pub body: Vec<Instr>,
}

/// Arithmetic and comparison operators; logical operators are lowered away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ArithOp {
    /// `None` for `and` / `or`.
    pub fn from_binop(op: BinOp) -> Option<Self> {
        Some(match op {
            BinOp::Add => ArithOp::Add,
            BinOp::Sub => ArithOp::Sub,
            BinOp::Mul => ArithOp::Mul,
            BinOp::Div => ArithOp::Div,
            BinOp::Mod => ArithOp::Rem,
            BinOp::Eq => ArithOp::Eq,
            BinOp::NotEq => ArithOp::Ne,
            BinOp::Less => ArithOp::Lt,
            BinOp::LessEq => ArithOp::Le,
            BinOp::Greater => ArithOp::Gt,
            BinOp::GreaterEq => ArithOp::Ge,
            BinOp::And | BinOp::Or => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArithOp::Add => "add",
            ArithOp::Sub => "sub",
            ArithOp::Mul => "mul",
            ArithOp::Div => "div",
            ArithOp::Rem => "rem",
            ArithOp::Eq => "eq",
            ArithOp::Ne => "ne",
            ArithOp::Lt => "lt",
            ArithOp::Le => "le",
            ArithOp::Gt => "gt",
            ArithOp::Ge => "ge",
        }
    }

    /// Evaluate on constants with WebAssembly `i32` semantics.
    ///
    /// Returns `None` when the operation would trap (division by zero,
    /// `i32::MIN / -1`); those must be left for run time.
    pub fn fold(&self, left: i32, right: i32) -> Option<i32> {
        Some(match self {
            ArithOp::Add => left.wrapping_add(right),
            ArithOp::Sub => left.wrapping_sub(right),
            ArithOp::Mul => left.wrapping_mul(right),
            ArithOp::Div => left.checked_div(right)?,
            ArithOp::Rem => {
                if right == 0 {
                    return None;
                }
                left.wrapping_rem(right)
            }
            ArithOp::Eq => (left == right) as i32,
            ArithOp::Ne => (left != right) as i32,
            ArithOp::Lt => (left < right) as i32,
            ArithOp::Le => (left <= right) as i32,
            ArithOp::Gt => (left > right) as i32,
            ArithOp::Ge => (left >= right) as i32,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    /// `target = value`
    Copy { target: Slot, value: Operand },
    /// `target = left op right`
    Arith {
        target: Slot,
        op: ArithOp,
        left: Operand,
        right: Operand,
    },
    /// `target = value == 0`
    IsZero { target: Slot, value: Operand },
    /// `target = func(args...)`
    Call {
        target: Slot,
        func: FuncIndex,
        args: Vec<Operand>,
    },
    /// Repeat `body` until a `BreakUnless` for this label exits.
    Loop { label: Label, body: Vec<Instr> },
    /// Leave loop `label` when `condition` is zero.
    BreakUnless { condition: Operand, label: Label },
    If {
        condition: Operand,
        then_body: Vec<Instr>,
        else_body: Vec<Instr>,
    },
    Return(Operand),
}

impl ToSExpr for Label {
    fn to_sexpr(&self) -> SExpr {
        SExpr::symbol(self.to_string())
    }
}

impl ToSExpr for Operand {
    fn to_sexpr(&self) -> SExpr {
        match self {
            Operand::Const(value) => SExpr::number(*value),
            Operand::Slot(slot) => slot.to_sexpr(),
        }
    }
}

impl ToSExpr for Module {
    fn to_sexpr(&self) -> SExpr {
        SExpr::form("module", self.functions.iter().map(ToSExpr::to_sexpr))
    }
}

impl ToSExpr for Function {
    fn to_sexpr(&self) -> SExpr {
        SExpr::form(
            "fun",
            [
                self.index.to_sexpr(),
                SExpr::symbol(self.name.as_str()),
                SExpr::form("arity", [SExpr::number(self.arity)]),
                SExpr::form("slots", [SExpr::number(self.slot_count)]),
                self.body.to_sexpr(),
            ],
        )
    }
}

impl ToSExpr for Instr {
    fn to_sexpr(&self) -> SExpr {
        match self {
            Instr::Copy { target, value } => {
                SExpr::form("set", [target.to_sexpr(), value.to_sexpr()])
            }
            Instr::Arith {
                target,
                op,
                left,
                right,
            } => SExpr::form(
                "set",
                [
                    target.to_sexpr(),
                    SExpr::form(op.as_str(), [left.to_sexpr(), right.to_sexpr()]),
                ],
            ),
            Instr::IsZero { target, value } => SExpr::form(
                "set",
                [target.to_sexpr(), SExpr::form("eqz", [value.to_sexpr()])],
            ),
            Instr::Call { target, func, args } => SExpr::form(
                "set",
                [
                    target.to_sexpr(),
                    SExpr::form(
                        "call",
                        std::iter::once(func.to_sexpr()).chain(args.iter().map(ToSExpr::to_sexpr)),
                    ),
                ],
            ),
            Instr::Loop { label, body } => {
                SExpr::form("loop", [label.to_sexpr(), body.to_sexpr()])
            }
            Instr::BreakUnless { condition, label } => {
                SExpr::form("break-unless", [condition.to_sexpr(), label.to_sexpr()])
            }
            Instr::If {
                condition,
                then_body,
                else_body,
            } => SExpr::form(
                "if",
                [
                    condition.to_sexpr(),
                    then_body.to_sexpr(),
                    else_body.to_sexpr(),
                ],
            ),
            Instr::Return(value) => SExpr::form("return", [value.to_sexpr()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_arithmetic_wraps() {
        assert_eq!(ArithOp::Add.fold(i32::MAX, 1), Some(i32::MIN));
        assert_eq!(ArithOp::Mul.fold(6, 7), Some(42));
        assert_eq!(ArithOp::Div.fold(-7, 2), Some(-3));
        assert_eq!(ArithOp::Rem.fold(-7, 2), Some(-1));
        assert_eq!(ArithOp::Rem.fold(i32::MIN, -1), Some(0));
    }

    #[test]
    fn test_fold_leaves_traps_for_run_time() {
        assert_eq!(ArithOp::Div.fold(1, 0), None);
        assert_eq!(ArithOp::Rem.fold(1, 0), None);
        assert_eq!(ArithOp::Div.fold(i32::MIN, -1), None);
    }

    #[test]
    fn test_fold_comparisons() {
        assert_eq!(ArithOp::Lt.fold(1, 2), Some(1));
        assert_eq!(ArithOp::Ge.fold(1, 2), Some(0));
        assert_eq!(ArithOp::Ne.fold(3, 3), Some(0));
    }

    #[test]
    fn test_from_binop_drops_logical() {
        assert_eq!(ArithOp::from_binop(BinOp::Mod), Some(ArithOp::Rem));
        assert_eq!(ArithOp::from_binop(BinOp::And), None);
        assert_eq!(ArithOp::from_binop(BinOp::Or), None);
    }

    #[test]
    fn test_instr_sexpr() {
        let loop_instr = Instr::Loop {
            label: Label(0),
            body: vec![
                Instr::Arith {
                    target: Slot(2),
                    op: ArithOp::Gt,
                    left: Operand::Slot(Slot(0)),
                    right: Operand::Const(0),
                },
                Instr::BreakUnless {
                    condition: Operand::Slot(Slot(2)),
                    label: Label(0),
                },
            ],
        };
        assert_eq!(
            loop_instr.to_pretty_string(),
            "(loop L0 ((set %2 (gt %0 0)) (break-unless %2 L0)))"
        );
    }
}
