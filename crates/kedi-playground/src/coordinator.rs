//! Execution coordinator: the id fence between compiles and outcomes.
//!
//! Every compile result that carries an artifact gets a fresh, strictly
//! increasing [`ExecutionId`]. Only the outcome carrying the latest id is
//! ever accepted; everything else is stale and dropped. Nothing is
//! cancelled: superseded executions run to completion and are ignored.

use std::fmt;

use kedi_sandbox::SandboxError;
use kedi_types::{Artifact, CompileResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExecutionId(pub u64);

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    AwaitingOutcome(ExecutionId),
}

/// One run of an artifact's entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub id: ExecutionId,
    pub artifact: Artifact,
    pub entry_point: String,
    pub args: Vec<i32>,
}

/// What came back from the sandbox for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Value { id: ExecutionId, value: i32 },
    Failed { id: ExecutionId, reason: String },
}

impl ExecutionOutcome {
    pub fn from_result(id: ExecutionId, result: Result<i32, SandboxError>) -> Self {
        match result {
            Ok(value) => ExecutionOutcome::Value { id, value },
            Err(error) => ExecutionOutcome::Failed {
                id,
                reason: error.to_string(),
            },
        }
    }

    pub fn id(&self) -> ExecutionId {
        match self {
            ExecutionOutcome::Value { id, .. } | ExecutionOutcome::Failed { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The outcome belongs to the latest request and should be shown.
    Accepted,
    /// Stale; displayed state must not change.
    Discarded,
}

/// Synchronous state machine; the owner performs the actual execution.
#[derive(Debug)]
pub struct ExecutionCoordinator {
    state: CoordinatorState,
    last_issued: Option<ExecutionId>,
    entry_point: String,
    args: Vec<i32>,
}

impl ExecutionCoordinator {
    pub fn new(entry_point: impl Into<String>, args: Vec<i32>) -> Self {
        Self {
            state: CoordinatorState::Idle,
            last_issued: None,
            entry_point: entry_point.into(),
            args,
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// Most recently issued id, if any request was ever made.
    pub fn last_issued(&self) -> Option<ExecutionId> {
        self.last_issued
    }

    /// React to a new compile result.
    ///
    /// Returns the request to execute when the result carries an artifact.
    /// `None` means the coordinator is now idle and the displayed output
    /// must be cleared.
    pub fn on_compile_result(&mut self, result: &CompileResult) -> Option<ExecutionRequest> {
        let Some(artifact) = result.artifact() else {
            self.state = CoordinatorState::Idle;
            return None;
        };

        let id = ExecutionId(self.last_issued.map_or(1, |last| last.0 + 1));
        self.last_issued = Some(id);
        self.state = CoordinatorState::AwaitingOutcome(id);
        Some(ExecutionRequest {
            id,
            artifact: artifact.clone(),
            entry_point: self.entry_point.clone(),
            args: self.args.clone(),
        })
    }

    /// Decide whether `outcome` may update the display.
    pub fn on_outcome(&mut self, outcome: &ExecutionOutcome) -> Disposition {
        let id = outcome.id();
        match self.state {
            CoordinatorState::AwaitingOutcome(awaited) if awaited == id => {
                self.state = CoordinatorState::Idle;
                Disposition::Accepted
            }
            state => {
                tracing::debug!(%id, ?state, "discarding stale outcome");
                Disposition::Discarded
            }
        }
    }
}
