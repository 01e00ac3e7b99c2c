//! The compile result consumed by the playground.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The textual views a successful compilation offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepresentationKind {
    /// The parsed syntax tree.
    Syntax,
    /// After name resolution.
    Plain,
    /// After flattening into three-address form.
    Simple,
    /// The WebAssembly text format of the artifact.
    #[serde(rename = "wasm")]
    WasmText,
}

impl RepresentationKind {
    pub const ALL: [RepresentationKind; 4] = [
        RepresentationKind::Syntax,
        RepresentationKind::Plain,
        RepresentationKind::Simple,
        RepresentationKind::WasmText,
    ];

    /// Selector value, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            RepresentationKind::Syntax => "syntax",
            RepresentationKind::Plain => "plain",
            RepresentationKind::Simple => "simple",
            RepresentationKind::WasmText => "wasm",
        }
    }

    /// Human-facing label for view selectors.
    pub fn label(&self) -> &'static str {
        match self {
            RepresentationKind::Syntax => "Syntax",
            RepresentationKind::Plain => "Plain",
            RepresentationKind::Simple => "Simple",
            RepresentationKind::WasmText => "Wasm",
        }
    }
}

impl fmt::Display for RepresentationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown representation '{0}' (expected syntax, plain, simple or wasm)")]
pub struct UnknownRepresentation(pub String);

impl FromStr for RepresentationKind {
    type Err = UnknownRepresentation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RepresentationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownRepresentation(s.to_string()))
    }
}

/// An executable binary produced by a successful compilation.
///
/// The playground never looks inside; it only hands the bytes to the sandbox.
/// Clones share one allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact(Arc<[u8]>);

impl Artifact {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Artifact {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl AsRef<[u8]> for Artifact {
    fn as_ref(&self) -> &[u8] {
        self.bytes()
    }
}

impl Serialize for Artifact {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(self.bytes())
    }
}

impl<'de> Deserialize<'de> for Artifact {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<u8>::deserialize(deserializer).map(Artifact::from)
    }
}

/// Outcome of compiling one version of the source text.
///
/// A compile failure is an ordinary value, not an error path. Results are
/// never patched; every edit produces a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompileResult {
    Success {
        /// One entry for every [`RepresentationKind`].
        representations: BTreeMap<RepresentationKind, String>,
        /// Absent when there is nothing to run.
        artifact: Option<Artifact>,
    },
    Error { message: String },
}

impl CompileResult {
    pub fn error(message: impl Into<String>) -> Self {
        CompileResult::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CompileResult::Success { .. })
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            CompileResult::Success { artifact, .. } => artifact.as_ref(),
            CompileResult::Error { .. } => None,
        }
    }

    /// The stored text for `kind`; `None` on error or if the entry is missing.
    pub fn representation(&self, kind: RepresentationKind) -> Option<&str> {
        match self {
            CompileResult::Success {
                representations, ..
            } => representations.get(&kind).map(String::as_str),
            CompileResult::Error { .. } => None,
        }
    }
}
