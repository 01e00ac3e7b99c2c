//! Flattening: plain IR → simple IR.
//!
//! - Nested expressions are spilled into fresh temporaries after the named
//!   locals, one three-address instruction each
//! - Constant operands are folded, except where folding would hide a trap
//! - `and` / `or` short-circuit through structured `if`s and yield 0 or 1
//! - `while` becomes a labelled `loop` that exits through `break-unless`
//! - Branches on a constant condition keep only the taken arm

use kedi_types::ast::{BinOp, UnaryOp};
use kedi_types::plain::{self, Slot};
use kedi_types::simple::{self, ArithOp, Instr, Label, Operand};

/// Flatten every function in `module`.
pub fn simplify(module: &plain::Module) -> simple::Module {
    simple::Module {
        functions: module.functions.iter().map(simplify_function).collect(),
    }
}

fn simplify_function(func: &plain::Function) -> simple::Function {
    let mut simplifier = FunctionSimplifier {
        named_slots: func.locals.len() as u32,
        next_slot: func.locals.len() as u32,
        next_label: 0,
    };
    let mut body = Vec::new();
    simplifier.stmts(&func.body, &mut body);
    simple::Function {
        name: func.name.clone(),
        index: func.index,
        arity: func.arity,
        slot_count: simplifier.next_slot,
        body,
    }
}

struct FunctionSimplifier {
    /// Slots below this belong to source variables.
    named_slots: u32,
    next_slot: u32,
    next_label: u32,
}

impl FunctionSimplifier {
    fn temp(&mut self) -> Slot {
        let slot = Slot(self.next_slot);
        self.next_slot += 1;
        slot
    }

    fn label(&mut self) -> Label {
        let label = Label(self.next_label);
        self.next_label += 1;
        label
    }

    // ── Statements ───────────────────────────────────────────────────────

    fn stmts(&mut self, stmts: &[plain::Stmt], out: &mut Vec<Instr>) {
        for stmt in stmts {
            self.stmt(stmt, out);
        }
    }

    fn stmt(&mut self, stmt: &plain::Stmt, out: &mut Vec<Instr>) {
        match stmt {
            plain::Stmt::Let(slot, value) | plain::Stmt::Assign(slot, value) => {
                let value = self.expr(value, out);
                self.store(*slot, value, out);
            }
            plain::Stmt::While(condition, body) => {
                let label = self.label();
                let mut loop_body = Vec::new();
                match self.expr(condition, &mut loop_body) {
                    // Never entered; nothing in the condition can have effects
                    // worth keeping once it folded to a constant.
                    Operand::Const(0) => return,
                    Operand::Const(_) => {}
                    condition => loop_body.push(Instr::BreakUnless { condition, label }),
                }
                self.stmts(body, &mut loop_body);
                out.push(Instr::Loop {
                    label,
                    body: loop_body,
                });
            }
            plain::Stmt::If(condition, then_stmts, else_stmts) => {
                match self.expr(condition, out) {
                    Operand::Const(0) => self.stmts(else_stmts, out),
                    Operand::Const(_) => self.stmts(then_stmts, out),
                    condition => {
                        let mut then_body = Vec::new();
                        self.stmts(then_stmts, &mut then_body);
                        let mut else_body = Vec::new();
                        self.stmts(else_stmts, &mut else_body);
                        out.push(Instr::If {
                            condition,
                            then_body,
                            else_body,
                        });
                    }
                }
            }
            plain::Stmt::Return(value) => {
                let value = self.expr(value, out);
                out.push(Instr::Return(value));
            }
            plain::Stmt::Expr(value) => {
                self.expr(value, out);
            }
        }
    }

    /// `slot = value`, writing straight into `slot` when `value` is the
    /// temporary the previous instruction just produced.
    fn store(&mut self, slot: Slot, value: Operand, out: &mut Vec<Instr>) {
        if let Operand::Slot(temp) = value {
            if temp.0 >= self.named_slots && temp.0 + 1 == self.next_slot {
                if let Some(target) = out.last_mut().and_then(retargetable) {
                    if *target == temp {
                        *target = slot;
                        self.next_slot -= 1;
                        return;
                    }
                }
            }
        }
        out.push(Instr::Copy {
            target: slot,
            value,
        });
    }

    // ── Expressions ──────────────────────────────────────────────────────

    /// Emit the instructions computing `expr` and return where its value is.
    fn expr(&mut self, expr: &plain::Expr, out: &mut Vec<Instr>) -> Operand {
        match expr {
            plain::Expr::Const(value) => Operand::Const(*value),
            plain::Expr::Local(slot) => Operand::Slot(*slot),
            plain::Expr::Call(func, args) => {
                let args = args.iter().map(|arg| self.expr(arg, out)).collect();
                let target = self.temp();
                out.push(Instr::Call {
                    target,
                    func: *func,
                    args,
                });
                Operand::Slot(target)
            }
            plain::Expr::Unary(op, operand) => {
                let operand = self.expr(operand, out);
                self.unary(*op, operand, out)
            }
            plain::Expr::Binary(op, left, right) => match ArithOp::from_binop(*op) {
                Some(arith) => {
                    let left = self.expr(left, out);
                    let right = self.expr(right, out);
                    self.arith(arith, left, right, out)
                }
                None if *op == BinOp::And => self.and(left, right, out),
                None => self.or(left, right, out),
            },
        }
    }

    fn unary(&mut self, op: UnaryOp, operand: Operand, out: &mut Vec<Instr>) -> Operand {
        match (op, operand) {
            (UnaryOp::Neg, Operand::Const(value)) => Operand::Const(value.wrapping_neg()),
            (UnaryOp::Not, Operand::Const(value)) => Operand::Const((value == 0) as i32),
            (UnaryOp::Neg, value) => self.arith(ArithOp::Sub, Operand::Const(0), value, out),
            (UnaryOp::Not, value) => {
                let target = self.temp();
                out.push(Instr::IsZero { target, value });
                Operand::Slot(target)
            }
        }
    }

    fn arith(&mut self, op: ArithOp, left: Operand, right: Operand, out: &mut Vec<Instr>) -> Operand {
        if let (Operand::Const(l), Operand::Const(r)) = (left, right) {
            if let Some(folded) = op.fold(l, r) {
                return Operand::Const(folded);
            }
        }
        let target = self.temp();
        out.push(Instr::Arith {
            target,
            op,
            left,
            right,
        });
        Operand::Slot(target)
    }

    /// `value != 0` as 0 or 1.
    fn truthy(&mut self, value: Operand, out: &mut Vec<Instr>) -> Operand {
        self.arith(ArithOp::Ne, value, Operand::Const(0), out)
    }

    /// `left and right`: `right` runs only when `left` is non-zero.
    fn and(&mut self, left: &plain::Expr, right: &plain::Expr, out: &mut Vec<Instr>) -> Operand {
        let left = self.expr(left, out);
        match left {
            Operand::Const(0) => Operand::Const(0),
            Operand::Const(_) => {
                let right = self.expr(right, out);
                self.truthy(right, out)
            }
            left => {
                let result = self.temp();
                out.push(Instr::Arith {
                    target: result,
                    op: ArithOp::Ne,
                    left,
                    right: Operand::Const(0),
                });
                let mut then_body = Vec::new();
                let right = self.expr(right, &mut then_body);
                then_body.push(Instr::Arith {
                    target: result,
                    op: ArithOp::Ne,
                    left: right,
                    right: Operand::Const(0),
                });
                out.push(Instr::If {
                    condition: Operand::Slot(result),
                    then_body,
                    else_body: Vec::new(),
                });
                Operand::Slot(result)
            }
        }
    }

    /// `left or right`: `right` runs only when `left` is zero.
    fn or(&mut self, left: &plain::Expr, right: &plain::Expr, out: &mut Vec<Instr>) -> Operand {
        let left = self.expr(left, out);
        match left {
            Operand::Const(0) => {
                let right = self.expr(right, out);
                self.truthy(right, out)
            }
            Operand::Const(_) => Operand::Const(1),
            left => {
                let result = self.temp();
                out.push(Instr::Arith {
                    target: result,
                    op: ArithOp::Ne,
                    left,
                    right: Operand::Const(0),
                });
                let mut else_body = Vec::new();
                let right = self.expr(right, &mut else_body);
                else_body.push(Instr::Arith {
                    target: result,
                    op: ArithOp::Ne,
                    left: right,
                    right: Operand::Const(0),
                });
                out.push(Instr::If {
                    condition: Operand::Slot(result),
                    then_body: Vec::new(),
                    else_body,
                });
                Operand::Slot(result)
            }
        }
    }
}

/// The destination of an instruction whose only effect is writing one slot.
fn retargetable(instr: &mut Instr) -> Option<&mut Slot> {
    match instr {
        Instr::Arith { target, .. } | Instr::IsZero { target, .. } | Instr::Call { target, .. } => {
            Some(target)
        }
        _ => None,
    }
}
