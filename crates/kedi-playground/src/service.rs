use kedi_types::CompileResult;

/// Turns source text into a [`CompileResult`].
///
/// Implementations must be deterministic and must report every failure as
/// [`CompileResult::Error`]. Any `Fn(&str) -> CompileResult` qualifies, so
/// `kedi_compiler::compile` can be passed directly.
pub trait CompileService {
    fn compile(&self, source: &str) -> CompileResult;
}

impl<F> CompileService for F
where
    F: Fn(&str) -> CompileResult,
{
    fn compile(&self, source: &str) -> CompileResult {
        self(source)
    }
}
