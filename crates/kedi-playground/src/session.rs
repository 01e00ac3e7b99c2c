//! The playground session: inbound edits and view selections, outbound
//! view and output.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;
use kedi_sandbox::{Sandbox, SandboxError};
use kedi_types::{CompileResult, RepresentationKind};
use tokio::sync::{mpsc, watch};

use crate::config::PlaygroundConfig;
use crate::coordinator::{
    CoordinatorState, Disposition, ExecutionCoordinator, ExecutionOutcome, ExecutionRequest,
};
use crate::projector::project;
use crate::service::CompileService;

fn sandbox_panicked() -> SandboxError {
    SandboxError::Aborted("sandbox panicked".into())
}

/// Text shown for an accepted outcome.
pub fn render_output(outcome: &ExecutionOutcome) -> String {
    match outcome {
        ExecutionOutcome::Value { value, .. } => value.to_string(),
        ExecutionOutcome::Failed { reason, .. } => format!("execution failed: {reason}"),
    }
}

/// A live playground.
///
/// Inbound events are plain method calls. Executions run on spawned Tokio
/// tasks and report back over a channel; their outcomes take effect only
/// when the owner calls [`next_outcome`](Self::next_outcome) or
/// [`drain_ready`](Self::drain_ready), so all state changes happen on the
/// owner's task.
pub struct Playground<C, S> {
    compiler: C,
    sandbox: S,
    timeout: Option<std::time::Duration>,
    coordinator: ExecutionCoordinator,
    result: Option<Arc<CompileResult>>,
    selected: Option<RepresentationKind>,
    view: watch::Sender<String>,
    output: watch::Sender<Option<String>>,
    outcomes_tx: mpsc::UnboundedSender<ExecutionOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<ExecutionOutcome>,
    /// Spawned executions whose outcome has not been received yet.
    pending: usize,
}

impl<C: CompileService, S: Sandbox> Playground<C, S> {
    pub fn new(compiler: C, sandbox: S, config: PlaygroundConfig) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        Self {
            compiler,
            sandbox,
            timeout: config.timeout,
            coordinator: ExecutionCoordinator::new(config.entry_point, config.args),
            result: None,
            selected: None,
            view: watch::Sender::new(String::new()),
            output: watch::Sender::new(None),
            outcomes_tx,
            outcomes_rx,
            pending: 0,
        }
    }

    // ── Inbound ──────────────────────────────────────────────────────────

    /// Recompile `text` and start executing it if it produced an artifact.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn on_source_changed(&mut self, text: &str) {
        let result = Arc::new(self.compiler.compile(text));
        let request = self.coordinator.on_compile_result(&result);
        self.result = Some(result);
        self.refresh_view();
        match request {
            Some(request) => self.spawn(request),
            None => self.set_output(None),
        }
    }

    pub fn on_view_selected(&mut self, kind: Option<RepresentationKind>) {
        self.selected = kind;
        self.refresh_view();
    }

    // ── Outbound ─────────────────────────────────────────────────────────

    pub fn displayed_view(&self) -> String {
        self.view.borrow().clone()
    }

    pub fn displayed_output(&self) -> Option<String> {
        self.output.borrow().clone()
    }

    /// Notified whenever the displayed view text changes.
    pub fn subscribe_view(&self) -> watch::Receiver<String> {
        self.view.subscribe()
    }

    /// Notified whenever the displayed output changes.
    pub fn subscribe_output(&self) -> watch::Receiver<Option<String>> {
        self.output.subscribe()
    }

    pub fn compile_result(&self) -> Option<Arc<CompileResult>> {
        self.result.clone()
    }

    pub fn selected_view(&self) -> Option<RepresentationKind> {
        self.selected
    }

    pub fn state(&self) -> CoordinatorState {
        self.coordinator.state()
    }

    /// Executions started but not yet reported back.
    pub fn pending(&self) -> usize {
        self.pending
    }

    // ── Outcomes ─────────────────────────────────────────────────────────

    /// Wait for the next execution to finish and apply its outcome.
    ///
    /// Returns `None` when nothing is in flight.
    pub async fn next_outcome(&mut self) -> Option<Disposition> {
        if self.pending == 0 {
            return None;
        }
        let outcome = self.outcomes_rx.recv().await?;
        self.pending -= 1;
        Some(self.apply(outcome))
    }

    /// Apply every outcome that has already arrived, without waiting.
    pub fn drain_ready(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.outcomes_rx.try_recv() {
            self.pending = self.pending.saturating_sub(1);
            self.apply(outcome);
            applied += 1;
        }
        applied
    }

    fn apply(&mut self, outcome: ExecutionOutcome) -> Disposition {
        let disposition = self.coordinator.on_outcome(&outcome);
        if disposition == Disposition::Accepted {
            tracing::debug!(id = %outcome.id(), "showing execution outcome");
            self.set_output(Some(render_output(&outcome)));
        }
        disposition
    }

    fn spawn(&mut self, request: ExecutionRequest) {
        let ExecutionRequest {
            id,
            artifact,
            entry_point,
            args,
        } = request;
        tracing::debug!(%id, %entry_point, ?args, "starting execution");

        // A sandbox may panic while starting the call or while running it.
        let started = panic::catch_unwind(AssertUnwindSafe(|| {
            self.sandbox.execute(artifact, &entry_point, &args)
        }));
        let execution = match started {
            Ok(execution) => AssertUnwindSafe(execution)
                .catch_unwind()
                .map(|joined| joined.unwrap_or_else(|_| Err(sandbox_panicked())))
                .boxed(),
            Err(_) => {
                tracing::warn!(%id, "sandbox panicked before execution started");
                self.apply(ExecutionOutcome::from_result(id, Err(sandbox_panicked())));
                return;
            }
        };
        let timeout = self.timeout;
        let outcomes = self.outcomes_tx.clone();
        self.pending += 1;

        tokio::spawn(async move {
            let outcome = match timeout {
                Some(limit) => match tokio::time::timeout(limit, execution).await {
                    Ok(result) => ExecutionOutcome::from_result(id, result),
                    Err(_) => ExecutionOutcome::Failed {
                        id,
                        reason: format!("timed out after {}ms", limit.as_millis()),
                    },
                },
                None => ExecutionOutcome::from_result(id, execution.await),
            };
            if let ExecutionOutcome::Failed { reason, .. } = &outcome {
                tracing::debug!(%id, %reason, "execution failed");
            }
            // The session may already be gone.
            let _ = outcomes.send(outcome);
        });
    }

    // ── Display ──────────────────────────────────────────────────────────

    fn refresh_view(&mut self) {
        let text = match &self.result {
            Some(result) => project(result, self.selected),
            None => String::new(),
        };
        replace_if_changed(&self.view, text);
    }

    fn set_output(&mut self, output: Option<String>) {
        replace_if_changed(&self.output, output);
    }
}

/// Store `value` and notify receivers only if it differs from the current one.
fn replace_if_changed<T: PartialEq>(sender: &watch::Sender<T>, value: T) {
    sender.send_if_modified(|current| {
        if *current == value {
            return false;
        }
        *current = value;
        true
    });
}
