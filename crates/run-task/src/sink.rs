use tracing::info;

/// Receives human-readable progress lines from a batch run.
pub trait ProgressSink: Send + Sync {
    fn report(&self, line: &str);
}

/// Prints every line to stdout. Used for headless batch runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn report(&self, line: &str) {
        println!("{}", line);
    }
}

/// Routes lines into the log so they do not fight with a progress bar.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn report(&self, line: &str) {
        info!(target: "progress", "{}", line);
    }
}
