//! Kedi compiler: orchestrates the full compilation pipeline.
//!
//! ```text
//! Source → Lexer → Parser → Renamer → Simplifier → WASM Codegen → .wasm
//!                    │         │          │             │
//!                  Syntax    Plain      Simple         Wasm (text)
//! ```
//!
//! [`compile`] is the playground's compile service: it always returns a
//! [`CompileResult`], folding every failure into the `Error` variant.
//! [`run_pipeline`] exposes the intermediate stages for tools.

pub mod renamer;
mod scope;
pub mod simplifier;
mod timing;

use std::collections::BTreeMap;

use kedi_lexer::Lexer;
use kedi_parser::Parser;
use kedi_types::sexpr::ToSExpr;
use kedi_types::{
    ast, plain, simple, Artifact, CompileErrors, CompileResult, ErrorCode, KediError,
    RepresentationKind, SourceFile, Span,
};

pub use renamer::{rename, RenameResult};
pub use simplifier::simplify;

use crate::timing::Stopwatch;

/// File name used in diagnostics when the caller does not supply one.
pub const DEFAULT_FILE_NAME: &str = "main.kedi";

/// Every stage's output for one successful compilation.
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    pub syntax: ast::Program,
    pub plain: plain::Module,
    pub simple: simple::Module,
    pub wasm: Vec<u8>,
    pub wat: String,
}

impl CompiledProgram {
    /// The text of each playground view.
    pub fn representations(&self) -> BTreeMap<RepresentationKind, String> {
        BTreeMap::from([
            (RepresentationKind::Syntax, self.syntax.to_pretty_string()),
            (RepresentationKind::Plain, self.plain.to_pretty_string()),
            (RepresentationKind::Simple, self.simple.to_pretty_string()),
            (RepresentationKind::WasmText, self.wat.clone()),
        ])
    }

    /// `true` if the module exports at least one function.
    pub fn has_entry_points(&self) -> bool {
        !self.simple.functions.is_empty()
    }

    pub fn into_compile_result(self) -> CompileResult {
        let representations = self.representations();
        let artifact = self
            .has_entry_points()
            .then(|| Artifact::from(self.wasm));
        CompileResult::Success {
            representations,
            artifact,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════════════════════

/// Compile Kedi source for the playground.
///
/// Deterministic and free of side effects: the same source always yields
/// an identical result.
pub fn compile(source: &str) -> CompileResult {
    match run_pipeline(DEFAULT_FILE_NAME, source) {
        Ok(program) => program.into_compile_result(),
        Err(errors) => CompileResult::error(errors.to_message()),
    }
}

/// Run every stage, stopping at the first stage that reports errors.
///
/// Lexer and parser diagnostics are reported together so a single edit
/// surfaces as many problems as possible.
pub fn run_pipeline(file_name: &str, source: &str) -> Result<CompiledProgram, CompileErrors> {
    let source_file = SourceFile::new(file_name, source);

    let started = Stopwatch::start();
    let lexed = Lexer::new(&source_file).lex();
    let parsed = Parser::new(lexed.tokens, &source_file).parse();
    let mut errors = lexed.errors;
    errors.extend(parsed.errors);
    tracing::debug!(
        stage = "parse",
        elapsed_us = started.elapsed_us(),
        errors = errors.total_errors,
        "stage finished"
    );
    if errors.has_errors() {
        return Err(errors);
    }

    let started = Stopwatch::start();
    let renamed = rename(&parsed.program, &source_file);
    tracing::debug!(
        stage = "rename",
        elapsed_us = started.elapsed_us(),
        errors = renamed.errors.total_errors,
        "stage finished"
    );
    if renamed.errors.has_errors() {
        return Err(renamed.errors);
    }

    let started = Stopwatch::start();
    let simple = simplify(&renamed.module);
    tracing::debug!(
        stage = "simplify",
        elapsed_us = started.elapsed_us(),
        "stage finished"
    );

    let started = Stopwatch::start();
    let wasm = kedi_codegen::compile(&simple).map_err(|e| codegen_failure(&source_file, e))?;
    let wat = kedi_codegen::to_wat(&wasm).map_err(|e| codegen_failure(&source_file, e))?;
    tracing::debug!(
        stage = "codegen",
        elapsed_us = started.elapsed_us(),
        bytes = wasm.len(),
        "stage finished"
    );

    Ok(CompiledProgram {
        syntax: parsed.program,
        plain: renamed.module,
        simple,
        wasm,
        wat,
    })
}

/// A codegen failure is a compiler defect, reported as an E400 diagnostic.
fn codegen_failure(source_file: &SourceFile, error: kedi_codegen::CodegenError) -> CompileErrors {
    tracing::warn!(%error, "code generation failed");
    let span = Span::default();
    let source_line = source_file.line(span.start_line).unwrap_or("");
    let mut errors = CompileErrors::empty();
    errors.push_error(KediError::new(
        &source_file.name,
        ErrorCode::CODEGEN_FAILED,
        error.to_string(),
        span,
        source_line,
    ));
    errors
}
