use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use kedi_types::RepresentationKind;

use super::read_source;

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Kedi source file
    pub file: PathBuf,

    /// Where to write the `.wasm` artifact
    #[arg(long)]
    pub out: PathBuf,

    #[arg(long)]
    pub out_syntax: Option<PathBuf>,
    #[arg(long)]
    pub out_plain: Option<PathBuf>,
    #[arg(long)]
    pub out_simple: Option<PathBuf>,
    #[arg(long)]
    pub out_wat: Option<PathBuf>,
}

pub fn execute(args: CompileArgs) -> anyhow::Result<()> {
    let source = read_source(&args.file)?;
    let file_name = args.file.display().to_string();
    let program = kedi_compiler::run_pipeline(&file_name, &source)
        .map_err(|errors| anyhow::anyhow!("{}", errors.to_message()))?;

    let views = program.representations();
    let requested = [
        (RepresentationKind::Syntax, &args.out_syntax),
        (RepresentationKind::Plain, &args.out_plain),
        (RepresentationKind::Simple, &args.out_simple),
        (RepresentationKind::WasmText, &args.out_wat),
    ];
    for (kind, path) in requested {
        if let (Some(path), Some(text)) = (path, views.get(&kind)) {
            write(path, format!("{text}\n"))?;
        }
    }

    write(&args.out, &program.wasm)?;
    tracing::info!(
        out = %args.out.display(),
        bytes = program.wasm.len(),
        functions = program.simple.functions.len(),
        "compiled"
    );
    Ok(())
}

fn write(path: &Path, contents: impl AsRef<[u8]>) -> anyhow::Result<()> {
    std::fs::write(path, contents).with_context(|| format!("could not write {}", path.display()))
}
