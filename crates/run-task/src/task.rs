use crate::cache::SeriesCache;
use crate::error::TaskError;
use core_types::{ModelParameters, PriceSeries, RunContext, ScanPath, Selection, TaskStatus};
use datastore::{PathResolver, parse_output, restore, snapshot, verify_prior, write_results};
use scanner::ScanEngines;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Where the scan resumes and how the output file is to be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Resume {
    skip: usize,
    append: bool,
}

impl Resume {
    const FRESH: Resume = Resume { skip: 0, append: false };
}

/// The unit of work: one instrument scanned with one set of model parameters.
///
/// A task moves through three phases, `prepare`, `execute` and
/// `write_output`. None of them return errors; every failure is recorded as
/// the task's status plus a line in `messages`, so a batch keeps going.
#[derive(Debug)]
pub struct RunTask {
    selection: Selection,
    params: ModelParameters,
    context: RunContext,
    output_path: PathBuf,
    series: Option<Arc<PriceSeries>>,
    prior_snapshot: Option<Vec<u8>>,
    resume: Resume,
    results: Option<Vec<f64>>,
    path_used: Option<ScanPath>,
    status: TaskStatus,
    messages: Vec<String>,
}

impl RunTask {
    /// Loads the price series and captures any existing output file.
    pub fn prepare(
        params: ModelParameters,
        selection: Selection,
        cache: &SeriesCache,
        resolver: &dyn PathResolver,
        context: RunContext,
    ) -> Self {
        let mut task = Self::blank(params, selection, resolver, context);
        task.note(format!(
            "Initializing the bubble index. Category = {}, selection = {}, omega = {}, m = {}, t_crit = {}, window = {}",
            task.selection.category,
            task.selection.name,
            task.params.omega(),
            task.params.m_coeff(),
            task.params.t_crit(),
            task.params.window()
        ));

        if task.context.is_stopped() {
            task.cancel(TaskError::Stopped("loading the series"));
            return task;
        }

        let input_path = resolver.input_path(&task.selection);
        match cache.get_or_load(&input_path) {
            Ok(series) => task.series = Some(series),
            Err(e) => {
                task.fail(TaskError::Store(e));
                return task;
            }
        }

        task.prior_snapshot = task.capture_prior();
        task.note(format!("Setting output file path: {}", task.output_path.display()));
        task
    }

    /// Runs the scan for every day not already present in the output file.
    pub fn execute(&mut self, engines: &ScanEngines) {
        if self.status != TaskStatus::Pending {
            return;
        }
        if self.context.is_stopped() {
            self.cancel(TaskError::Stopped("the scan"));
            return;
        }
        let Some(series) = self.series.clone() else {
            return;
        };

        if series.len() <= self.params.window() {
            self.note(format!(
                "Series has {} days, not more than the window of {}. Nothing to compute.",
                series.len(),
                self.params.window()
            ));
            self.results = Some(Vec::new());
            self.status = TaskStatus::Skipped;
            self.prior_snapshot = None;
            return;
        }

        self.resume = self.resume_point(&series);
        let outcome = self.scan(engines, &series);
        self.prior_snapshot = None;

        if self.context.is_stopped() {
            self.results = None;
            self.cancel(TaskError::Stopped("storing the results"));
            return;
        }

        match outcome {
            Ok(values) => {
                self.note(format!(
                    "Completed processing for category: {}, selection: {}, window: {}",
                    self.selection.category,
                    self.selection.name,
                    self.params.window()
                ));
                self.results = Some(values);
                self.status = TaskStatus::Computed;
            }
            Err(e) => self.fail(e),
        }
    }

    /// Appends new results to the output file, or writes it from scratch.
    pub fn write_output(&mut self) {
        if self.status != TaskStatus::Computed {
            return;
        }
        if self.context.is_stopped() {
            self.results = None;
            self.cancel(TaskError::Stopped("writing the output"));
            return;
        }
        let (Some(series), Some(results)) = (self.series.as_ref(), self.results.as_ref()) else {
            return;
        };

        if results.is_empty() && self.resume.append {
            self.note(format!("Output file is up to date: {}", self.output_path.display()));
            self.status = TaskStatus::UpToDate;
            return;
        }

        match write_results(&self.output_path, results, series, self.params.window(), self.resume.append) {
            Ok(()) => {
                info!(
                    task = %self.label(),
                    rows = results.len(),
                    append = self.resume.append,
                    "Output written."
                );
                let line = format!("Writing output file: {}", self.output_path.display());
                self.note(line);
                self.status = TaskStatus::Written;
            }
            Err(e) => {
                error!(task = %self.label(), error = %e, "Failed to write output.");
                self.messages.push(format!("Failed to write output: {}", e));
                self.status = TaskStatus::PersistFailed;
            }
        }
    }

    /// All three phases in order, stopping at the first terminal status.
    pub fn run(
        params: ModelParameters,
        selection: Selection,
        cache: &SeriesCache,
        resolver: &dyn PathResolver,
        context: RunContext,
        engines: &ScanEngines,
    ) -> Self {
        let mut task = Self::prepare(params, selection, cache, resolver, context);
        task.execute(engines);
        task.write_output();
        task
    }

    /// A failed task standing in for one whose worker panicked.
    pub fn panicked(
        params: ModelParameters,
        selection: Selection,
        resolver: &dyn PathResolver,
        context: RunContext,
        detail: &str,
    ) -> Self {
        let mut task = Self::blank(params, selection, resolver, context);
        error!(task = %task.label(), detail, "Worker panicked.");
        task.messages.push(format!("Error: worker panicked: {}", detail));
        task.status = TaskStatus::Failed;
        task
    }

    fn blank(params: ModelParameters, selection: Selection, resolver: &dyn PathResolver, context: RunContext) -> Self {
        let output_path = resolver.output_path(&selection, params.window());
        Self {
            selection,
            params,
            context,
            output_path,
            series: None,
            prior_snapshot: None,
            resume: Resume::FRESH,
            results: None,
            path_used: None,
            status: TaskStatus::Pending,
            messages: Vec::new(),
        }
    }

    fn scan(&mut self, engines: &ScanEngines, series: &PriceSeries) -> Result<Vec<f64>, TaskError> {
        let skip = self.resume.skip;
        if skip == series.admissible_days(self.params.window()) {
            return Ok(Vec::new());
        }

        let preferred = self.context.preferred_path();
        let first = self.scan_on(engines, preferred, series, skip);
        match first {
            Err(e) if e.is_execution_failure() && preferred == ScanPath::Accelerator && self.context.retry_on_host => {
                warn!(task = %self.label(), error = %e, "Accelerator run failed, retrying on the host.");
                self.messages.push(format!("{} run failed ({}). Retrying on {}.", preferred, e, ScanPath::Host));
                Ok(self.scan_on(engines, ScanPath::Host, series, skip)?)
            }
            other => Ok(other?),
        }
    }

    fn scan_on(
        &mut self,
        engines: &ScanEngines,
        path: ScanPath,
        series: &PriceSeries,
        skip: usize,
    ) -> Result<Vec<f64>, scanner::ScanError> {
        info!(
            task = %self.label(),
            %path,
            days = series.admissible_days(self.params.window()) - skip,
            "Executing {} run.",
            path
        );
        let backend = engines.backend(path)?;
        let values = backend.scan_from(series.prices(), &self.params, skip)?;
        self.path_used = Some(path);
        Ok(values)
    }

    fn capture_prior(&self) -> Option<Vec<u8>> {
        let raw = match std::fs::read(&self.output_path) {
            Ok(raw) if !raw.is_empty() => raw,
            _ => return None,
        };
        match snapshot(&format!("zip{}", self.selection.name), &raw) {
            Ok(blob) => Some(blob),
            Err(e) => {
                warn!(task = %self.label(), error = %e, "Could not snapshot prior output; it will be rewritten.");
                None
            }
        }
    }

    fn resume_point(&mut self, series: &PriceSeries) -> Resume {
        let Some(blob) = self.prior_snapshot.as_deref() else {
            return Resume::FRESH;
        };
        let verified = restore(blob)
            .and_then(|raw| parse_output(&raw))
            .map_err(TaskError::from)
            .and_then(|rows| Ok(verify_prior(&rows, series, self.params.window())?));

        match verified {
            Ok(skip) => Resume { skip, append: true },
            Err(e) => {
                warn!(task = %self.label(), error = %e, "Discarding prior output.");
                self.messages.push(format!("Prior output discarded and will be rewritten: {}", e));
                Resume::FRESH
            }
        }
    }

    fn note(&mut self, line: String) {
        self.messages.push(line);
    }

    fn fail(&mut self, e: TaskError) {
        error!(task = %self.label(), error = %e, "Task failed.");
        self.messages.push(format!("Error: {}", e));
        self.results = None;
        self.status = TaskStatus::Failed;
    }

    fn cancel(&mut self, e: TaskError) {
        info!(task = %self.label(), "{}", e);
        self.messages.push(e.to_string());
        self.status = TaskStatus::Cancelled;
    }

    /// `category/name window N`, used in logs and summaries.
    pub fn label(&self) -> String {
        format!("{} window {}", self.selection, self.params.window())
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn params(&self) -> &ModelParameters {
        &self.params
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// The values computed by this run, `None` when the task failed or was cancelled.
    pub fn results(&self) -> Option<&[f64]> {
        self.results.as_deref()
    }

    pub fn path_used(&self) -> Option<ScanPath> {
        self.path_used
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn series(&self) -> Option<&Arc<PriceSeries>> {
        self.series.as_ref()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// True when an existing output file was verified and is being extended.
    pub fn is_appending(&self) -> bool {
        self.resume.append
    }
}
