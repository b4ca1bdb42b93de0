use crate::error::GridError;
use crate::worker::{Queue, Work, progress_bar, run_guarded};
use crate::{CompletedTask, GridSetup, TaskGrid, TaskSpec};
use run_task::RunTask;
use scanner::ScanEngines;
use tracing::info;

/// Runs every task on the calling thread, one after another.
pub struct SequentialGrid {
    setup: GridSetup,
    queue: Queue,
    engines: Option<ScanEngines>,
}

impl SequentialGrid {
    pub fn new(setup: GridSetup) -> Self {
        Self { setup, queue: Queue::new(), engines: None }
    }
}

impl TaskGrid for SequentialGrid {
    fn submit(&mut self, handle: u64, spec: TaskSpec) -> Result<(), GridError> {
        self.queue.insert(handle, Work::Spec(spec))
    }

    fn submit_prepared(&mut self, handle: u64, task: RunTask) -> Result<(), GridError> {
        self.queue.insert(handle, Work::Prepared(task))
    }

    fn deploy(&mut self) -> Result<(), GridError> {
        if self.engines.is_none() {
            self.engines = Some(ScanEngines::initialize(&self.setup.context));
        }
        Ok(())
    }

    fn execute_all(&mut self) -> Result<Vec<CompletedTask>, GridError> {
        self.deploy()?;
        let batch_id = self.queue.batch_id();
        let work = self.queue.drain();
        let Some(engines) = self.engines.as_ref() else {
            return Ok(Vec::new());
        };
        info!(%batch_id, tasks = work.len(), "Starting sequential batch.");

        let bar = progress_bar(work.len(), self.setup.context.headless)?;
        let mut completed = Vec::with_capacity(work.len());
        for (handle, item) in work {
            completed.push(run_guarded(handle, item, &self.setup, engines));
            bar.inc(1);
        }
        bar.finish_with_message("Batch complete.");

        info!(%batch_id, tasks = completed.len(), "Batch complete.");
        Ok(completed)
    }

    fn shutdown(&mut self) {
        let dropped = self.queue.discard();
        if self.engines.take().is_some() || dropped > 0 {
            info!(dropped, "Sequential grid shut down.");
        }
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }
}
