//! Instruction code generation.
//!
//! Each simple-IR instruction leaves the operand stack as it found it;
//! results are always stored to a slot (local).
//!
//! A simple-IR `loop` becomes
//!
//! ```text
//! block        ;; exit target for break-unless
//!   loop       ;; continue target
//!     body...
//!     br 0
//!   end
//! end
//! ```

use kedi_types::simple::{ArithOp, Instr, Label, Operand};
use wasm_encoder::{BlockType, Function, Instruction};

use crate::error::{CodegenError, CodegenResult};

/// One entry per open WASM control frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Exit(Label),
    Continue(Label),
    If,
}

/// Per-function codegen state.
pub(crate) struct FuncContext<'a> {
    func_name: &'a str,
    frames: Vec<Frame>,
}

impl<'a> FuncContext<'a> {
    pub(crate) fn new(func_name: &'a str) -> Self {
        Self {
            func_name,
            frames: Vec::new(),
        }
    }

    pub(crate) fn emit_instrs(&mut self, instrs: &[Instr], f: &mut Function) -> CodegenResult<()> {
        for instr in instrs {
            self.emit_instr(instr, f)?;
        }
        Ok(())
    }

    fn emit_instr(&mut self, instr: &Instr, f: &mut Function) -> CodegenResult<()> {
        match instr {
            Instr::Copy { target, value } => {
                emit_operand(value, f);
                f.instruction(&Instruction::LocalSet(target.0));
            }
            Instr::Arith {
                target,
                op,
                left,
                right,
            } => {
                emit_operand(left, f);
                emit_operand(right, f);
                f.instruction(&arith_instruction(*op));
                f.instruction(&Instruction::LocalSet(target.0));
            }
            Instr::IsZero { target, value } => {
                emit_operand(value, f);
                f.instruction(&Instruction::I32Eqz);
                f.instruction(&Instruction::LocalSet(target.0));
            }
            Instr::Call { target, func, args } => {
                for arg in args {
                    emit_operand(arg, f);
                }
                f.instruction(&Instruction::Call(func.0));
                f.instruction(&Instruction::LocalSet(target.0));
            }
            Instr::Loop { label, body } => {
                f.instruction(&Instruction::Block(BlockType::Empty));
                self.frames.push(Frame::Exit(*label));
                f.instruction(&Instruction::Loop(BlockType::Empty));
                self.frames.push(Frame::Continue(*label));

                self.emit_instrs(body, f)?;
                f.instruction(&Instruction::Br(self.depth_of(Frame::Continue(*label))?));

                f.instruction(&Instruction::End);
                self.frames.pop();
                f.instruction(&Instruction::End);
                self.frames.pop();
            }
            Instr::BreakUnless { condition, label } => {
                let depth = self.depth_of(Frame::Exit(*label))?;
                emit_operand(condition, f);
                f.instruction(&Instruction::I32Eqz);
                f.instruction(&Instruction::BrIf(depth));
            }
            Instr::If {
                condition,
                then_body,
                else_body,
            } => {
                emit_operand(condition, f);
                f.instruction(&Instruction::If(BlockType::Empty));
                self.frames.push(Frame::If);
                self.emit_instrs(then_body, f)?;
                if !else_body.is_empty() {
                    f.instruction(&Instruction::Else);
                    self.emit_instrs(else_body, f)?;
                }
                f.instruction(&Instruction::End);
                self.frames.pop();
            }
            Instr::Return(value) => {
                emit_operand(value, f);
                f.instruction(&Instruction::Return);
            }
        }
        Ok(())
    }

    /// Relative branch depth of the innermost open `frame`.
    fn depth_of(&self, frame: Frame) -> CodegenResult<u32> {
        self.frames
            .iter()
            .rev()
            .position(|open| *open == frame)
            .map(|depth| depth as u32)
            .ok_or_else(|| {
                CodegenError::Internal(format!(
                    "branch to {frame:?} outside its loop in '{}'",
                    self.func_name
                ))
            })
    }
}

fn emit_operand(operand: &Operand, f: &mut Function) {
    match operand {
        Operand::Const(value) => f.instruction(&Instruction::I32Const(*value)),
        Operand::Slot(slot) => f.instruction(&Instruction::LocalGet(slot.0)),
    };
}

fn arith_instruction(op: ArithOp) -> Instruction<'static> {
    match op {
        ArithOp::Add => Instruction::I32Add,
        ArithOp::Sub => Instruction::I32Sub,
        ArithOp::Mul => Instruction::I32Mul,
        ArithOp::Div => Instruction::I32DivS,
        ArithOp::Rem => Instruction::I32RemS,
        ArithOp::Eq => Instruction::I32Eq,
        ArithOp::Ne => Instruction::I32Ne,
        ArithOp::Lt => Instruction::I32LtS,
        ArithOp::Le => Instruction::I32LeS,
        ArithOp::Gt => Instruction::I32GtS,
        ArithOp::Ge => Instruction::I32GeS,
    }
}
