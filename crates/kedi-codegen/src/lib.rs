//! Kedi WASM code generator: compiles the simple IR to a `.wasm` binary.
//!
//! # Module shape
//!
//! - No imports, no memory, no globals
//! - One function per source function, in declaration order, so a
//!   [`FuncIndex`](kedi_types::plain::FuncIndex) is also the WASM function index
//! - Every function has type `(i32 × arity) -> i32` and is exported under
//!   its source name
//! - Falling off the end of a body returns `0`
//! - A `kedi` custom section records the compiler version

pub mod compiler;
pub mod error;
mod instr;
pub mod wat;

pub use compiler::{compile, COMPILER_VERSION, CUSTOM_SECTION_NAME};
pub use error::{CodegenError, CodegenResult};
pub use wat::to_wat;
