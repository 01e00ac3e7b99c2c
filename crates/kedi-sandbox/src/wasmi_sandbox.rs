//! [`Sandbox`] backed by the `wasmi` interpreter.

use futures::future::{BoxFuture, FutureExt};
use kedi_types::Artifact;
use wasmi::core::TrapCode;
use wasmi::{Config, Engine, Linker, Module, Store, Val, ValType};

use crate::config::SandboxConfig;
use crate::error::{SandboxError, SandboxResult};
use crate::Sandbox;

/// Fuel-metered WebAssembly sandbox.
///
/// The engine is shared; every execution gets its own store, module and
/// instance, all dropped when the call completes. Artifacts get no
/// imports, so a module that needs any fails to instantiate.
#[derive(Debug, Clone)]
pub struct WasmiSandbox {
    engine: Engine,
    fuel: u64,
}

impl WasmiSandbox {
    pub fn new(config: &SandboxConfig) -> Self {
        let mut engine_config = Config::default();
        engine_config.consume_fuel(true);
        Self {
            engine: Engine::new(&engine_config),
            fuel: config.fuel,
        }
    }

    /// Fuel granted to each execution.
    pub fn fuel(&self) -> u64 {
        self.fuel
    }

    /// Execute on the calling thread.
    pub fn execute_blocking(
        &self,
        wasm: &[u8],
        entry_point: &str,
        args: &[i32],
    ) -> SandboxResult<i32> {
        run(&self.engine, self.fuel, wasm, entry_point, args)
    }
}

impl Default for WasmiSandbox {
    fn default() -> Self {
        Self::new(&SandboxConfig::default())
    }
}

impl Sandbox for WasmiSandbox {
    fn execute(
        &self,
        artifact: Artifact,
        entry_point: &str,
        args: &[i32],
    ) -> BoxFuture<'static, SandboxResult<i32>> {
        let engine = self.engine.clone();
        let fuel = self.fuel;
        let entry_point = entry_point.to_string();
        let args = args.to_vec();
        async move {
            tracing::debug!(%entry_point, fuel, bytes = artifact.len(), "executing artifact");
            tokio::task::spawn_blocking(move || {
                run(&engine, fuel, artifact.bytes(), &entry_point, &args)
            })
            .await
            .map_err(|e| SandboxError::Aborted(e.to_string()))?
        }
        .boxed()
    }
}

fn run(
    engine: &Engine,
    fuel: u64,
    wasm: &[u8],
    entry_point: &str,
    args: &[i32],
) -> SandboxResult<i32> {
    let module =
        Module::new(engine, wasm).map_err(|e| SandboxError::InvalidModule(e.to_string()))?;

    let mut store = Store::new(engine, ());
    store
        .set_fuel(fuel)
        .map_err(|e| SandboxError::Instantiation(e.to_string()))?;
    let linker = Linker::<()>::new(engine);
    let instance = linker
        .instantiate(&mut store, &module)
        .and_then(|pre| pre.start(&mut store))
        .map_err(|e| SandboxError::Instantiation(e.to_string()))?;

    let func = instance
        .get_func(&store, entry_point)
        .ok_or_else(|| SandboxError::MissingEntryPoint(entry_point.to_string()))?;

    let ty = func.ty(&store);
    let expected_params = vec![ValType::I32; args.len()];
    if ty.params() != expected_params.as_slice() || ty.results() != [ValType::I32].as_slice() {
        return Err(SandboxError::SignatureMismatch {
            entry_point: entry_point.to_string(),
            expected: signature(&expected_params, &[ValType::I32]),
            found: signature(ty.params(), ty.results()),
        });
    }

    let params: Vec<Val> = args.iter().copied().map(Val::I32).collect();
    let mut results = [Val::I32(0)];
    if let Err(error) = func.call(&mut store, &params, &mut results) {
        if error.as_trap_code() == Some(TrapCode::OutOfFuel) {
            tracing::debug!(entry_point, fuel, "fuel exhausted");
            return Err(SandboxError::FuelExhausted(fuel));
        }
        let message = error.to_string();
        tracing::debug!(entry_point, reason = %message, "execution trapped");
        return Err(SandboxError::Trap(message));
    }

    let remaining = store.get_fuel().unwrap_or(0);
    tracing::debug!(
        entry_point,
        fuel_used = fuel.saturating_sub(remaining),
        "execution finished"
    );

    match results {
        [Val::I32(value)] => Ok(value),
        _ => Err(SandboxError::Trap(format!(
            "'{entry_point}' returned a non-i32 value"
        ))),
    }
}

/// Renders as `(i32, i32) -> (i32)`.
fn signature(params: &[ValType], results: &[ValType]) -> String {
    let list = |types: &[ValType]| {
        types
            .iter()
            .map(|ty| format!("{ty:?}").to_lowercase())
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("({}) -> ({})", list(params), list(results))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_rendering() {
        assert_eq!(
            signature(&[ValType::I32, ValType::I32], &[ValType::I32]),
            "(i32, i32) -> (i32)"
        );
        assert_eq!(signature(&[], &[ValType::I64]), "() -> (i64)");
    }

    fn wasm(source: &str) -> Vec<u8> {
        match kedi_compiler::compile(source) {
            kedi_types::CompileResult::Success {
                artifact: Some(artifact),
                ..
            } => artifact.bytes().to_vec(),
            other => panic!("expected an artifact, got {other:?}"),
        }
    }

    #[test]
    fn test_out_of_fuel_is_told_apart_from_traps() {
        let sandbox = WasmiSandbox::new(&SandboxConfig { fuel: 1_000 });
        let spin = wasm("fun main() {\n  while true {\n    let x = 1\n  }\n  return 0\n}");
        assert_eq!(
            sandbox.execute_blocking(&spin, "main", &[]),
            Err(SandboxError::FuelExhausted(1_000))
        );

        let divide = wasm("fun main(n) { return 1 / n }");
        match sandbox.execute_blocking(&divide, "main", &[0]) {
            Err(SandboxError::Trap(message)) => assert!(!message.is_empty()),
            other => panic!("expected a trap, got {other:?}"),
        }
        assert_eq!(sandbox.execute_blocking(&divide, "main", &[1]), Ok(1));
    }

    #[test]
    fn test_garbage_is_an_invalid_module() {
        let sandbox = WasmiSandbox::default();
        let err = sandbox.execute_blocking(b"not wasm", "main", &[]).unwrap_err();
        assert!(matches!(err, SandboxError::InvalidModule(_)), "{err:?}");
    }
}
