//! Shared types for the Kedi compiler and playground.
//!
//! This crate defines source spans, structured diagnostics, the three
//! intermediate representations the compiler prints (syntax, plain, simple),
//! and the [`CompileResult`] data model consumed by the playground.

mod error;
mod result;
mod span;
pub mod ast;
pub mod plain;
pub mod sexpr;
pub mod simple;

pub use error::{CompileErrors, ErrorCategory, ErrorCode, KediError, MAX_ERRORS};
pub use result::{Artifact, CompileResult, RepresentationKind, UnknownRepresentation};
pub use span::{SourceFile, Span};

/// Result type used throughout the Kedi compiler.
pub type Result<T> = std::result::Result<T, KediError>;
