use crate::enums::ScanPath;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cooperative, process-wide cancellation flag.
///
/// Clones share the same flag. Tasks poll it between phases; raising it never
/// interrupts a scan that is already running.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Execution settings shared by every task of a batch.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Disables the accelerator path entirely.
    pub force_host: bool,
    /// Re-run a task on the host path when the accelerator fails to execute it.
    pub retry_on_host: bool,
    /// Worker threads for the host-parallel scan of a single task.
    pub threads: usize,
    /// Batch mode: progress text goes to stdout instead of a progress bar.
    pub headless: bool,
    pub stop: StopSignal,
}

impl RunContext {
    pub fn new(threads: usize) -> Self {
        Self {
            force_host: false,
            retry_on_host: false,
            threads: threads.max(1),
            headless: true,
            stop: StopSignal::new(),
        }
    }

    pub fn with_force_host(mut self, force_host: bool) -> Self {
        self.force_host = force_host;
        self
    }

    pub fn with_retry_on_host(mut self, retry_on_host: bool) -> Self {
        self.retry_on_host = retry_on_host;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// The path a task should try first.
    pub fn preferred_path(&self) -> ScanPath {
        if self.force_host { ScanPath::Host } else { ScanPath::Accelerator }
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_requested()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_signal_is_shared_between_clones() {
        let context = RunContext::new(2);
        let observer = context.clone();
        assert!(!observer.is_stopped());
        context.stop.request();
        assert!(observer.is_stopped());
        observer.stop.reset();
        assert!(!context.is_stopped());
    }

    #[test]
    fn force_host_selects_the_host_path() {
        assert_eq!(RunContext::new(1).preferred_path(), ScanPath::Accelerator);
        assert_eq!(RunContext::new(1).with_force_host(true).preferred_path(), ScanPath::Host);
    }

    #[test]
    fn thread_count_is_at_least_one() {
        assert_eq!(RunContext::new(0).threads, 1);
    }
}
