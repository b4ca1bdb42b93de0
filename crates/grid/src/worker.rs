use crate::error::GridError;
use crate::{CompletedTask, GridSetup, TaskSpec};
use core_types::{ModelParameters, Selection};
use indicatif::{ProgressBar, ProgressStyle};
use run_task::RunTask;
use scanner::ScanEngines;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::warn;
use uuid::Uuid;

/// A queued unit of work.
#[derive(Debug)]
pub(crate) enum Work {
    /// Prepared by the worker that runs it.
    Spec(TaskSpec),
    /// Prepared by the caller before submission.
    Prepared(RunTask),
}

impl Work {
    fn selection(&self) -> &Selection {
        match self {
            Work::Spec(spec) => &spec.selection,
            Work::Prepared(task) => task.selection(),
        }
    }

    fn params(&self) -> &ModelParameters {
        match self {
            Work::Spec(spec) => &spec.params,
            Work::Prepared(task) => task.params(),
        }
    }
}

/// Submitted tasks waiting for the next `execute_all`, keyed by handle.
///
/// At most one queued task may target a given (selection, window) output file.
#[derive(Debug)]
pub(crate) struct Queue {
    batch_id: Uuid,
    pending: BTreeMap<u64, Work>,
    targets: HashMap<(Selection, usize), u64>,
}

impl Queue {
    pub(crate) fn new() -> Self {
        Self { batch_id: Uuid::new_v4(), pending: BTreeMap::new(), targets: HashMap::new() }
    }

    pub(crate) fn batch_id(&self) -> Uuid {
        self.batch_id
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn insert(&mut self, handle: u64, work: Work) -> Result<(), GridError> {
        if self.pending.contains_key(&handle) {
            return Err(GridError::DuplicateHandle(handle));
        }
        let window = work.params().window();
        let target = (work.selection().clone(), window);
        if let Some(&existing) = self.targets.get(&target) {
            return Err(GridError::DuplicateTarget {
                handle,
                existing,
                target: format!("{} window {}", target.0, window),
            });
        }
        self.targets.insert(target, handle);
        self.pending.insert(handle, work);
        Ok(())
    }

    /// Takes every pending task in handle order and starts a new batch.
    pub(crate) fn drain(&mut self) -> Vec<(u64, Work)> {
        self.targets.clear();
        let work = std::mem::take(&mut self.pending).into_iter().collect();
        self.batch_id = Uuid::new_v4();
        work
    }

    pub(crate) fn discard(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        self.targets.clear();
        dropped
    }
}

/// Runs one task to completion. A panic inside the task becomes a failed task.
pub(crate) fn run_guarded(handle: u64, work: Work, setup: &GridSetup, engines: &ScanEngines) -> CompletedTask {
    let selection = work.selection().clone();
    let params = *work.params();
    let outcome = catch_unwind(AssertUnwindSafe(|| match work {
        Work::Spec(spec) => RunTask::run(
            spec.params,
            spec.selection,
            &setup.cache,
            setup.resolver.as_ref(),
            setup.context.clone(),
            engines,
        ),
        Work::Prepared(mut task) => {
            task.execute(engines);
            task.write_output();
            task
        }
    }));

    let task = match outcome {
        Ok(task) => task,
        Err(payload) => {
            let detail = panic_detail(payload.as_ref());
            warn!(handle, %selection, window = params.window(), detail = %detail, "Task worker panicked.");
            RunTask::panicked(params, selection, setup.resolver.as_ref(), setup.context.clone(), &detail)
        }
    };

    for line in task.messages() {
        setup.sink.report(&format!("[{}] {}: {}", handle, task.label(), line));
    }
    CompletedTask { handle, task }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// A bar for interactive runs; hidden in headless mode where the sink prints instead.
pub(crate) fn progress_bar(total: usize, headless: bool) -> Result<ProgressBar, GridError> {
    if headless {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("=>-"),
    );
    Ok(bar)
}
