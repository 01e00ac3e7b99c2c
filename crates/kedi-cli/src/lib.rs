//! Kedi command-line front end.
//!
//! - `kedi compile` writes the artifact and any requested views
//! - `kedi run` executes an entry point in the sandbox
//! - `kedi watch` is the terminal playground: it recompiles and reruns the
//!   file on every save

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod commands;
pub mod config;

use commands::{compile, run, watch};
pub use config::CliConfig;

/// Kedi CLI application
#[derive(Debug, Parser)]
#[command(name = "kedi")]
#[command(about = "Compile, run and watch Kedi programs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML with `[sandbox]` and `[playground]` tables)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compile a file to WebAssembly
    Compile(compile::CompileArgs),

    /// Compile a file and execute one of its functions
    Run(run::RunArgs),

    /// Recompile and rerun a file whenever it changes
    Watch(watch::WatchArgs),
}

/// Run using the current process arguments.
pub async fn run() -> anyhow::Result<()> {
    run_with_args(std::env::args_os()).await
}

/// Run using the provided argument iterator.
pub async fn run_with_args<I, T>(args: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    init_tracing(cli.verbose);

    let config = CliConfig::load(cli.config.as_deref())?;
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Compile(args) => compile::execute(args),
        Commands::Run(args) => run::execute(args, &config.sandbox).await,
        Commands::Watch(args) => watch::execute(args, &config).await,
    }
}

/// Log to stderr, filtered by `RUST_LOG` when set.
fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();
}
