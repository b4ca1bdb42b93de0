use crate::error::GridError;
use crate::worker::{Queue, Work, progress_bar, run_guarded};
use crate::{CompletedTask, GridSetup, TaskGrid, TaskSpec};
use rayon::{ThreadPool, ThreadPoolBuilder};
use run_task::RunTask;
use scanner::ScanEngines;
use std::sync::mpsc;
use tracing::info;

/// Runs tasks concurrently on a dedicated rayon pool of `workers` threads.
///
/// Tasks share the scan engines and the series cache. Completed tasks come
/// back through a channel in whatever order they finish and are sorted by
/// handle before being returned.
pub struct PoolGrid {
    setup: GridSetup,
    workers: usize,
    queue: Queue,
    deployed: Option<(ThreadPool, ScanEngines)>,
}

impl PoolGrid {
    pub fn new(setup: GridSetup, workers: usize) -> Self {
        Self { setup, workers: workers.max(1), queue: Queue::new(), deployed: None }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl TaskGrid for PoolGrid {
    fn submit(&mut self, handle: u64, spec: TaskSpec) -> Result<(), GridError> {
        self.queue.insert(handle, Work::Spec(spec))
    }

    fn submit_prepared(&mut self, handle: u64, task: RunTask) -> Result<(), GridError> {
        self.queue.insert(handle, Work::Prepared(task))
    }

    fn deploy(&mut self) -> Result<(), GridError> {
        if self.deployed.is_some() {
            return Ok(());
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("bubble-task-{}", i))
            .build()
            .map_err(|e| GridError::ThreadPool(e.to_string()))?;
        let engines = ScanEngines::initialize(&self.setup.context);
        info!(workers = self.workers, "Task pool deployed.");
        self.deployed = Some((pool, engines));
        Ok(())
    }

    fn execute_all(&mut self) -> Result<Vec<CompletedTask>, GridError> {
        self.deploy()?;
        let batch_id = self.queue.batch_id();
        let work = self.queue.drain();
        let Some((pool, engines)) = self.deployed.as_ref() else {
            return Ok(Vec::new());
        };
        info!(%batch_id, tasks = work.len(), workers = self.workers, "Starting pooled batch.");

        let bar = progress_bar(work.len(), self.setup.context.headless)?;
        let setup = &self.setup;
        let (tx, rx) = mpsc::channel();

        pool.install(|| {
            rayon::scope(|s| {
                for (handle, item) in work {
                    let tx = tx.clone();
                    let bar = bar.clone();
                    s.spawn(move |_| {
                        let done = run_guarded(handle, item, setup, engines);
                        // The receiver outlives the scope.
                        let _ = tx.send(done);
                        bar.inc(1);
                    });
                }
            });
        });
        drop(tx);
        bar.finish_with_message("Batch complete.");

        let mut completed: Vec<CompletedTask> = rx.into_iter().collect();
        completed.sort_by_key(|c| c.handle);
        info!(%batch_id, tasks = completed.len(), "Batch complete.");
        Ok(completed)
    }

    fn shutdown(&mut self) {
        let dropped = self.queue.discard();
        if self.deployed.take().is_some() || dropped > 0 {
            info!(dropped, "Task pool shut down.");
        }
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }
}
