//! Reactive compile/execute orchestration for the Kedi playground.
//!
//! ```text
//! source ─► CompileService ─► CompileResult ─┬─► ResultProjector ─► displayed view
//!                                            └─► ExecutionCoordinator ─► Sandbox ─► displayed output
//! ```
//!
//! [`Playground`] wires the pieces together on a Tokio runtime. The
//! [`ExecutionCoordinator`] is the id fence that keeps a slow, superseded
//! execution from overwriting the output of a newer one.

mod config;
mod coordinator;
mod projector;
mod service;
mod session;

pub use config::PlaygroundConfig;
pub use coordinator::{
    CoordinatorState, Disposition, ExecutionCoordinator, ExecutionId, ExecutionOutcome,
    ExecutionRequest,
};
pub use projector::{project, try_project, ProjectionError};
pub use service::CompileService;
pub use session::{render_output, Playground};
