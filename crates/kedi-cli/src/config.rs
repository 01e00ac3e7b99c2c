//! CLI configuration

use std::path::Path;

use anyhow::Context;
use kedi_playground::PlaygroundConfig;
use kedi_sandbox::SandboxConfig;
use serde::{Deserialize, Serialize};

/// Contents of a `--config` file. Every table and field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub sandbox: SandboxConfig,
    pub playground: PlaygroundConfig,
}

impl CliConfig {
    /// Load configuration from `path`, or the defaults when none is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("could not read config file {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}
