use thiserror::Error;

/// Why an artifact did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SandboxError {
    #[error("invalid module: {0}")]
    InvalidModule(String),

    #[error("instantiation failed: {0}")]
    Instantiation(String),

    #[error("no exported function '{0}'")]
    MissingEntryPoint(String),

    #[error("'{entry_point}' has signature {found}, expected {expected}")]
    SignatureMismatch {
        entry_point: String,
        expected: String,
        found: String,
    },

    #[error("fuel exhausted after {0} units")]
    FuelExhausted(u64),

    #[error("trap: {0}")]
    Trap(String),

    #[error("execution aborted: {0}")]
    Aborted(String),
}

pub type SandboxResult<T> = Result<T, SandboxError>;
