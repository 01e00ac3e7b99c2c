use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use kedi_playground::Playground;
use kedi_sandbox::WasmiSandbox;
use kedi_types::{CompileResult, RepresentationKind};

use crate::config::CliConfig;

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Kedi source file
    pub file: PathBuf,

    /// View to show: syntax, plain, simple or wasm
    #[arg(long)]
    pub view: Option<RepresentationKind>,

    /// How often to check the file for changes, in milliseconds
    #[arg(long, default_value_t = 250)]
    pub poll_ms: u64,
}

/// Poll the file forever, printing the view and output whenever they change.
pub async fn execute(args: WatchArgs, config: &CliConfig) -> anyhow::Result<()> {
    let compile: fn(&str) -> CompileResult = kedi_compiler::compile;
    let mut playground = Playground::new(
        compile,
        WasmiSandbox::new(&config.sandbox),
        config.playground.clone(),
    );
    playground.on_view_selected(args.view);
    let mut view = playground.subscribe_view();
    let mut output = playground.subscribe_output();

    tracing::info!(file = %args.file.display(), "watching");
    let mut ticker = tokio::time::interval(Duration::from_millis(args.poll_ms.max(10)));
    let mut poller = SourcePoller::new(args.file);

    loop {
        tokio::select! {
            _ = ticker.tick() => match poller.poll() {
                Poll::Changed(source) => {
                    tracing::debug!(bytes = source.len(), "source changed");
                    playground.on_source_changed(&source);
                }
                Poll::NewError(error) => tracing::warn!(%error, "could not read source"),
                Poll::Unchanged | Poll::SameError => {}
            },
            Some(_) = playground.next_outcome() => {}
        }

        if view.has_changed()? {
            let text = view.borrow_and_update().clone();
            if !text.is_empty() {
                println!("{text}");
            }
        }
        if output.has_changed()? {
            let line = render_output_line(output.borrow_and_update().as_deref());
            println!("{line}");
        }
    }
}

/// What one look at the watched file found.
#[derive(Debug, PartialEq, Eq)]
enum Poll {
    Changed(String),
    Unchanged,
    /// A read error different from the previous poll's.
    NewError(String),
    SameError,
}

struct SourcePoller {
    path: PathBuf,
    last_source: Option<String>,
    last_error: Option<String>,
}

impl SourcePoller {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            last_source: None,
            last_error: None,
        }
    }

    fn poll(&mut self) -> Poll {
        match std::fs::read_to_string(&self.path) {
            Ok(source) => {
                self.last_error = None;
                if self.last_source.as_ref() == Some(&source) {
                    return Poll::Unchanged;
                }
                self.last_source = Some(source.clone());
                Poll::Changed(source)
            }
            Err(error) => {
                let message = error.to_string();
                if self.last_error.as_ref() == Some(&message) {
                    return Poll::SameError;
                }
                self.last_error = Some(message.clone());
                Poll::NewError(message)
            }
        }
    }
}

fn render_output_line(output: Option<&str>) -> String {
    format!("output: {}", output.unwrap_or("-"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_errors_are_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.kedi");
        let mut poller = SourcePoller::new(path.clone());

        assert!(matches!(poller.poll(), Poll::NewError(_)));
        assert_eq!(poller.poll(), Poll::SameError);
        assert_eq!(poller.poll(), Poll::SameError);

        std::fs::write(&path, "fun main() { return 1 }").unwrap();
        assert_eq!(poller.poll(), Poll::Changed("fun main() { return 1 }".into()));
        assert_eq!(poller.poll(), Poll::Unchanged);

        std::fs::remove_file(&path).unwrap();
        assert!(matches!(poller.poll(), Poll::NewError(_)));
        assert_eq!(poller.poll(), Poll::SameError);
    }

    #[test]
    fn test_non_utf8_source_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.kedi");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        let mut poller = SourcePoller::new(path.clone());
        assert!(matches!(poller.poll(), Poll::NewError(_)));
        assert_eq!(poller.poll(), Poll::SameError);

        std::fs::write(&path, "fun main() { return 2 }").unwrap();
        assert!(matches!(poller.poll(), Poll::Changed(_)));
    }

    #[test]
    fn test_output_line() {
        assert_eq!(render_output_line(Some("55")), "output: 55");
        assert_eq!(render_output_line(None), "output: -");
    }
}
