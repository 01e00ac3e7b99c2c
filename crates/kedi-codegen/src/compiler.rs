//! Main WASM module assembler.
//!
//! 1. Intern one function type per distinct arity
//! 2. Declare and export every function
//! 3. Emit bodies from the simple IR
//! 4. Validate with `wasmparser`

use std::borrow::Cow;
use std::collections::BTreeMap;

use kedi_types::simple::{Function as SimpleFunction, Module as SimpleModule};
use wasm_encoder::{
    CodeSection, CustomSection, ExportKind, ExportSection, Function, FunctionSection,
    Instruction, Module, TypeSection, ValType,
};

use crate::error::{CodegenError, CodegenResult};
use crate::instr::FuncContext;

/// Name of the custom section carrying compiler metadata.
pub const CUSTOM_SECTION_NAME: &str = "kedi";

/// Version written into the custom section.
pub const COMPILER_VERSION: &str = env!("CARGO_PKG_VERSION");

// ══════════════════════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════════════════════

/// Compile a simple-IR [`SimpleModule`] into a `.wasm` binary.
///
/// Returns the raw bytes of a valid WebAssembly module on success, or a
/// [`CodegenError`] describing what went wrong.
pub fn compile(module: &SimpleModule) -> CodegenResult<Vec<u8>> {
    Compiler::new(module).compile()
}

// ══════════════════════════════════════════════════════════════════════════════
// Compiler
// ══════════════════════════════════════════════════════════════════════════════

struct Compiler<'a> {
    module: &'a SimpleModule,
    /// Arity → type index.
    type_indices: BTreeMap<u32, u32>,
}

impl<'a> Compiler<'a> {
    fn new(module: &'a SimpleModule) -> Self {
        Self {
            module,
            type_indices: BTreeMap::new(),
        }
    }

    fn compile(&mut self) -> CodegenResult<Vec<u8>> {
        self.check_indices()?;

        let mut wasm = Module::new();

        let types = self.emit_types();
        wasm.section(&types);

        let functions = self.emit_function_decls()?;
        wasm.section(&functions);

        let exports = self.emit_exports();
        wasm.section(&exports);

        let code = self.emit_code()?;
        wasm.section(&code);

        wasm.section(&CustomSection {
            name: Cow::Borrowed(CUSTOM_SECTION_NAME),
            data: Cow::Borrowed(COMPILER_VERSION.as_bytes()),
        });

        let wasm_bytes = wasm.finish();
        wasmparser::validate(&wasm_bytes)
            .map_err(|e| CodegenError::ValidationFailed(format!("{e}")))?;
        Ok(wasm_bytes)
    }

    /// Function indices must match declaration order for calls to resolve.
    fn check_indices(&self) -> CodegenResult<()> {
        for (position, func) in self.module.functions.iter().enumerate() {
            if func.index.0 as usize != position {
                return Err(CodegenError::Internal(format!(
                    "function '{}' has index {} but is declared at position {position}",
                    func.name, func.index
                )));
            }
            if func.slot_count < func.arity {
                return Err(CodegenError::Internal(format!(
                    "function '{}' has {} slots for {} parameters",
                    func.name, func.slot_count, func.arity
                )));
            }
        }
        Ok(())
    }

    // ── Type section ─────────────────────────────────────────────────────

    fn emit_types(&mut self) -> TypeSection {
        let mut types = TypeSection::new();
        for func in &self.module.functions {
            if self.type_indices.contains_key(&func.arity) {
                continue;
            }
            let index = types.len();
            types
                .ty()
                .function(vec![ValType::I32; func.arity as usize], vec![ValType::I32]);
            self.type_indices.insert(func.arity, index);
        }
        types
    }

    // ── Function section ─────────────────────────────────────────────────

    fn emit_function_decls(&self) -> CodegenResult<FunctionSection> {
        let mut functions = FunctionSection::new();
        for func in &self.module.functions {
            let type_index = self.type_indices.get(&func.arity).copied().ok_or_else(|| {
                CodegenError::Internal(format!("no type for arity {}", func.arity))
            })?;
            functions.function(type_index);
        }
        Ok(functions)
    }

    // ── Export section ───────────────────────────────────────────────────

    fn emit_exports(&self) -> ExportSection {
        let mut exports = ExportSection::new();
        for func in &self.module.functions {
            exports.export(&func.name, ExportKind::Func, func.index.0);
        }
        exports
    }

    // ── Code section ─────────────────────────────────────────────────────

    fn emit_code(&self) -> CodegenResult<CodeSection> {
        let mut code = CodeSection::new();
        for func in &self.module.functions {
            code.function(&emit_function(func)?);
        }
        Ok(code)
    }
}

fn emit_function(func: &SimpleFunction) -> CodegenResult<Function> {
    let extra_locals = func.slot_count - func.arity;
    let locals = if extra_locals > 0 {
        vec![(extra_locals, ValType::I32)]
    } else {
        Vec::new()
    };
    let mut f = Function::new(locals);
    let mut ctx = FuncContext::new(&func.name);
    ctx.emit_instrs(&func.body, &mut f)?;

    // Fall-through result.
    f.instruction(&Instruction::I32Const(0));
    f.instruction(&Instruction::End);
    Ok(f)
}
