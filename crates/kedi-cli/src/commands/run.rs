use std::path::PathBuf;

use clap::Args;
use kedi_sandbox::{Sandbox, SandboxConfig, WasmiSandbox};
use kedi_types::CompileResult;

use super::read_source;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Kedi source file
    pub file: PathBuf,

    /// Function to call
    #[arg(long, default_value = "main")]
    pub export: String,

    /// Argument for the function; repeat for each parameter
    #[arg(long = "arg", allow_negative_numbers = true)]
    pub args: Vec<i32>,
}

pub async fn execute(args: RunArgs, config: &SandboxConfig) -> anyhow::Result<()> {
    let value = run_file(&args, config).await?;
    println!("{value}");
    Ok(())
}

/// Compile and execute, returning the entry point's value.
pub async fn run_file(args: &RunArgs, config: &SandboxConfig) -> anyhow::Result<i32> {
    let source = read_source(&args.file)?;
    let artifact = match kedi_compiler::compile(&source) {
        CompileResult::Error { message } => anyhow::bail!("{message}"),
        CompileResult::Success { artifact: None, .. } => {
            anyhow::bail!("nothing to run: {} declares no functions", args.file.display())
        }
        CompileResult::Success {
            artifact: Some(artifact),
            ..
        } => artifact,
    };

    let sandbox = WasmiSandbox::new(config);
    sandbox
        .execute(artifact, &args.export, &args.args)
        .await
        .map_err(|e| anyhow::anyhow!("execution failed: {e}"))
}
