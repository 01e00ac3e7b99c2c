//! WebAssembly text rendering for the playground's Wasm view.

use crate::error::{CodegenError, CodegenResult};

/// Render a binary module as WAT.
pub fn to_wat(wasm: &[u8]) -> CodegenResult<String> {
    wasmprinter::print_bytes(wasm).map_err(|e| CodegenError::Print(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(to_wat(b"not wasm"), Err(CodegenError::Print(_))));
    }
}
