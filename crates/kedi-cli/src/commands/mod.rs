//! Subcommand implementations.

pub mod compile;
pub mod run;
pub mod watch;

use std::path::Path;

use anyhow::Context;

fn read_source(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))
}
