//! # Bubble Index Task Grid
//!
//! Distributes run tasks across workers and collects them back.
//!
//! ## Architectural Principles
//!
//! - **One contract, several topologies:** callers talk to the `TaskGrid`
//!   trait. `SequentialGrid` runs in place; `PoolGrid` spreads tasks over a
//!   rayon pool.
//! - **Nothing is lost:** every submitted handle comes back exactly once from
//!   `execute_all`, whether its task succeeded, failed, was cancelled or
//!   panicked.
//! - **Shared, read-only resources:** the scan engines, the series cache and
//!   the path layout are built once per grid and borrowed by every task.
//!
//! ## Public API
//!
//! - `TaskGrid`: `submit`, `submit_prepared`, `deploy`, `execute_all`, `shutdown`.
//! - `SequentialGrid`, `PoolGrid`: the two implementations.
//! - `GridSetup`: run context, path resolver, cache and progress sink.
//! - `generate_tasks`: turns the sweep configuration into `TaskSpec`s.

pub mod error;
pub mod generator;
pub mod pool;
pub mod sequential;
mod worker;

pub use error::GridError;
pub use generator::generate_tasks;
pub use pool::PoolGrid;
pub use sequential::SequentialGrid;

use core_types::{ModelParameters, RunContext, Selection};
use datastore::{PathResolver, ReadOptions};
use run_task::{ConsoleSink, LogSink, ProgressSink, RunTask, SeriesCache};
use std::sync::Arc;

/// What to compute: one instrument with one set of model parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSpec {
    pub selection: Selection,
    pub params: ModelParameters,
}

/// A task handed back by `execute_all`, tagged with its submission handle.
#[derive(Debug)]
pub struct CompletedTask {
    pub handle: u64,
    pub task: RunTask,
}

/// Resources shared by every task a grid runs.
#[derive(Clone)]
pub struct GridSetup {
    pub context: RunContext,
    pub resolver: Arc<dyn PathResolver>,
    pub cache: Arc<SeriesCache>,
    pub sink: Arc<dyn ProgressSink>,
}

impl GridSetup {
    /// Headless runs print progress to stdout; interactive ones log it next to the bar.
    pub fn new(context: RunContext, resolver: Arc<dyn PathResolver>) -> Self {
        let sink: Arc<dyn ProgressSink> = if context.headless { Arc::new(ConsoleSink) } else { Arc::new(LogSink) };
        Self {
            context,
            resolver,
            cache: Arc::new(SeriesCache::new(ReadOptions::default())),
            sink,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }
}

/// A task distribution layer.
pub trait TaskGrid {
    /// Queues a task that the grid prepares when a worker picks it up. A
    /// handle that is already queued is rejected and the first submission
    /// kept, as is a second task writing the same (selection, window) output.
    fn submit(&mut self, handle: u64, spec: TaskSpec) -> Result<(), GridError>;

    /// Queues a task the caller already built with `RunTask::prepare`. Only
    /// its execute and write phases run on the grid. Same rejection rules as
    /// `submit`.
    fn submit_prepared(&mut self, handle: u64, task: RunTask) -> Result<(), GridError>;

    /// Brings up the scan engines and workers. Idempotent.
    fn deploy(&mut self) -> Result<(), GridError>;

    /// Runs every queued task and returns all of them, sorted by handle.
    /// Deploys first if needed. A failing task never fails the call.
    fn execute_all(&mut self) -> Result<Vec<CompletedTask>, GridError>;

    /// Releases engines and workers and drops anything still queued.
    /// Safe to call any number of times.
    fn shutdown(&mut self);

    fn pending(&self) -> usize;
}

/// Submits `specs` under handles `0..specs.len()`.
pub fn submit_all(grid: &mut dyn TaskGrid, specs: Vec<TaskSpec>) -> Result<(), GridError> {
    for (handle, spec) in (0u64..).zip(specs) {
        grid.submit(handle, spec)?;
    }
    Ok(())
}
