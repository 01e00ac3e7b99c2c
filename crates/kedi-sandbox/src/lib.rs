//! Isolated execution of compiled Kedi artifacts.
//!
//! A [`Sandbox`] instantiates an artifact from scratch for every call,
//! invokes one exported function with `i32` arguments, and reports either
//! the returned value or a tagged [`SandboxError`]. Nothing is shared
//! between calls.

mod config;
mod error;
mod wasmi_sandbox;

pub use config::{SandboxConfig, DEFAULT_FUEL};
pub use error::{SandboxError, SandboxResult};
pub use wasmi_sandbox::WasmiSandbox;

use futures::future::BoxFuture;
use kedi_types::Artifact;

/// Runs an artifact's entry point.
///
/// Implementations never panic on bad input: a malformed artifact, a
/// missing export, and a runtime trap all resolve to `Err`.
pub trait Sandbox: Send + Sync {
    fn execute(
        &self,
        artifact: Artifact,
        entry_point: &str,
        args: &[i32],
    ) -> BoxFuture<'static, SandboxResult<i32>>;
}

impl<S: Sandbox + ?Sized> Sandbox for std::sync::Arc<S> {
    fn execute(
        &self,
        artifact: Artifact,
        entry_point: &str,
        args: &[i32],
    ) -> BoxFuture<'static, SandboxResult<i32>> {
        (**self).execute(artifact, entry_point, args)
    }
}
