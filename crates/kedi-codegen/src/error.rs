//! Codegen error types.

use thiserror::Error;

/// Errors that can occur during WASM code generation.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// An internal consistency check on the input IR failed.
    #[error("internal codegen error: {0}")]
    Internal(String),

    /// The generated WASM module failed validation.
    #[error("WASM validation failed: {0}")]
    ValidationFailed(String),

    /// The module could not be rendered as WebAssembly text.
    #[error("WAT rendering failed: {0}")]
    Print(String),
}

/// Codegen result type alias.
pub type CodegenResult<T> = Result<T, CodegenError>;
