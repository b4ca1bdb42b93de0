use chrono::{Days, NaiveDate};
use core_types::{ModelParameters, RunContext, ScanPath, Selection, TaskStatus};
use datastore::{DataLayout, PathResolver, parse_output};
use run_task::{RunTask, SeriesCache};
use scanner::{ComputeDevice, DeviceError, KernelBatch, ScanEngines};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const WINDOW: usize = 20;

struct Fixture {
    _dir: TempDir,
    layout: DataLayout,
    selection: Selection,
}

impl Fixture {
    fn new(days: usize) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        let selection = Selection::new("Stocks", "SPY");
        fs::create_dir_all(layout.selection_dir(&selection)).unwrap();
        let fixture = Self { _dir: dir, layout, selection };
        fixture.write_prices(days, 0.0);
        fixture
    }

    /// Daily prices from 2020-01-01, `bump` shifts the whole history.
    fn write_prices(&self, days: usize, bump: f64) {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let body: String = (0..days)
            .map(|i| {
                let date = start.checked_add_days(Days::new(i as u64)).unwrap();
                let t = i as f64;
                let price = 50.0 + bump + 0.1 * t + 3.0 * (0.21 * t).sin();
                format!("{},{}\n", date.format("%Y-%m-%d"), price)
            })
            .collect();
        fs::write(self.layout.input_path(&self.selection), body).unwrap();
    }

    fn output(&self) -> std::path::PathBuf {
        self.layout.output_path(&self.selection, WINDOW)
    }

    fn run(&self, context: RunContext, engines: &ScanEngines) -> RunTask {
        RunTask::run(params(), self.selection.clone(), &SeriesCache::default(), &self.layout, context, engines)
    }
}

fn params() -> ModelParameters {
    ModelParameters::new(6.28, 0.38, 21.0, WINDOW).unwrap()
}

fn host_context() -> RunContext {
    RunContext::new(2).with_force_host(true)
}

fn read(path: &Path) -> Vec<u8> {
    fs::read(path).unwrap()
}

struct FailingDevice;

impl ComputeDevice for FailingDevice {
    fn name(&self) -> String {
        "failing".to_string()
    }

    fn dispatch(&self, _batch: &KernelBatch<'_>) -> Result<Vec<[f64; 3]>, DeviceError> {
        Err(DeviceError::Launch("device lost".to_string()))
    }
}

/// Raises the stop flag while the scan is in flight.
struct StoppingDevice(core_types::StopSignal);

impl ComputeDevice for StoppingDevice {
    fn name(&self) -> String {
        "stopping".to_string()
    }

    fn dispatch(&self, batch: &KernelBatch<'_>) -> Result<Vec<[f64; 3]>, DeviceError> {
        self.0.request();
        Ok(vec![[0.0, -1.0, 0.0]; batch.count])
    }
}

#[test]
fn fresh_run_writes_one_row_per_admissible_day() {
    let fixture = Fixture::new(100);
    let engines = ScanEngines::initialize(&host_context());
    let task = fixture.run(host_context(), &engines);

    assert_eq!(task.status(), TaskStatus::Written);
    assert_eq!(task.path_used(), Some(ScanPath::Host));
    assert_eq!(task.results().unwrap().len(), 80);
    assert!(task.messages()[0].starts_with("Initializing the bubble index. Category = Stocks, selection = SPY"));
    assert!(task.messages()[0].ends_with("window = 20"));

    let rows = parse_output(&read(&fixture.output())).unwrap();
    assert_eq!(rows.len(), 80);
    assert_eq!(rows[0].period, 1);
    assert_eq!(rows[0].date.to_string(), "2020-01-21");
    assert_eq!(rows[79].date.to_string(), "2020-04-09");
    assert!(String::from_utf8(read(&fixture.output())).unwrap().starts_with("Period Number,Value,Date\n"));
}

#[test]
fn rerun_on_longer_history_appends_only_new_days() {
    let fixture = Fixture::new(100);
    let engines = ScanEngines::initialize(&host_context());
    fixture.run(host_context(), &engines);
    let before = read(&fixture.output());

    fixture.write_prices(110, 0.0);
    let task = fixture.run(host_context(), &engines);
    assert_eq!(task.status(), TaskStatus::Written);
    assert!(task.is_appending());
    assert_eq!(task.results().unwrap().len(), 10);

    let after = read(&fixture.output());
    assert_eq!(&after[..before.len()], &before[..]);

    // Appending gives the same file as computing everything at once.
    fs::remove_file(fixture.output()).unwrap();
    fixture.run(host_context(), &engines);
    assert_eq!(read(&fixture.output()), after);
}

#[test]
fn unchanged_history_leaves_the_file_alone() {
    let fixture = Fixture::new(60);
    let engines = ScanEngines::initialize(&host_context());
    fixture.run(host_context(), &engines);
    let before = read(&fixture.output());

    let task = fixture.run(host_context(), &engines);
    assert_eq!(task.status(), TaskStatus::UpToDate);
    assert_eq!(task.results(), Some(&[][..]));
    assert_eq!(read(&fixture.output()), before);
}

#[test]
fn changed_history_rewrites_the_file() {
    let fixture = Fixture::new(60);
    let engines = ScanEngines::initialize(&host_context());
    fixture.run(host_context(), &engines);
    let before = read(&fixture.output());

    // Dropping the first 30 days shifts every row onto a different date.
    let shifted: String = String::from_utf8(read(&fixture.layout.input_path(&fixture.selection)))
        .unwrap()
        .lines()
        .skip(30)
        .map(|l| format!("{}\n", l))
        .collect();
    fs::write(fixture.layout.input_path(&fixture.selection), shifted).unwrap();

    let task = fixture.run(host_context(), &engines);
    assert_eq!(task.status(), TaskStatus::Written);
    assert!(!task.is_appending());
    assert!(task.messages().iter().any(|m| m.contains("discarded")));

    let after = read(&fixture.output());
    assert_ne!(after, before);
    assert_eq!(parse_output(&after).unwrap().len(), 10);
}

#[test]
fn corrupt_prior_output_is_rewritten() {
    let fixture = Fixture::new(40);
    fs::write(fixture.output(), "Period Number,Value,Date\nnot,a,row\n").unwrap();
    let engines = ScanEngines::initialize(&host_context());

    let task = fixture.run(host_context(), &engines);
    assert_eq!(task.status(), TaskStatus::Written);
    assert_eq!(parse_output(&read(&fixture.output())).unwrap().len(), 20);
}

#[test]
fn short_series_is_skipped_without_output() {
    let fixture = Fixture::new(WINDOW);
    let engines = ScanEngines::initialize(&host_context());
    let task = fixture.run(host_context(), &engines);

    assert_eq!(task.status(), TaskStatus::Skipped);
    assert_eq!(task.results(), Some(&[][..]));
    assert!(!fixture.output().exists());
}

#[test]
fn missing_input_fails_the_task_only() {
    let fixture = Fixture::new(40);
    fs::remove_file(fixture.layout.input_path(&fixture.selection)).unwrap();
    let engines = ScanEngines::initialize(&host_context());
    let task = fixture.run(host_context(), &engines);

    assert_eq!(task.status(), TaskStatus::Failed);
    assert!(task.results().is_none());
    assert!(task.messages().iter().any(|m| m.starts_with("Error:")));
}

#[test]
fn stop_before_prepare_cancels_without_loading() {
    let fixture = Fixture::new(40);
    let context = host_context();
    context.stop.request();
    let cache = SeriesCache::default();

    let task = RunTask::prepare(params(), fixture.selection.clone(), &cache, &fixture.layout, context);
    assert_eq!(task.status(), TaskStatus::Cancelled);
    assert!(task.series().is_none());
    assert!(cache.is_empty());
}

#[test]
fn stop_during_scan_discards_results() {
    let fixture = Fixture::new(40);
    let context = RunContext::new(1);
    let engines = ScanEngines::with_device(&context, Box::new(StoppingDevice(context.stop.clone())));

    let task = fixture.run(context, &engines);
    assert_eq!(task.status(), TaskStatus::Cancelled);
    assert!(task.results().is_none());
    assert!(task.messages().iter().any(|m| m == "Run was stopped before storing the results."));
    assert!(!fixture.output().exists());
}

#[test]
fn stop_before_write_keeps_the_file_untouched() {
    let fixture = Fixture::new(40);
    let context = host_context();
    let engines = ScanEngines::initialize(&context);
    let mut task = RunTask::prepare(params(), fixture.selection.clone(), &SeriesCache::default(), &fixture.layout, context.clone());
    task.execute(&engines);
    assert_eq!(task.status(), TaskStatus::Computed);

    context.stop.request();
    task.write_output();
    assert_eq!(task.status(), TaskStatus::Cancelled);
    assert!(!fixture.output().exists());
}

#[test]
fn accelerator_failure_retries_on_host_when_allowed() {
    let fixture = Fixture::new(40);
    let context = RunContext::new(2).with_retry_on_host(true);
    let engines = ScanEngines::with_device(&context, Box::new(FailingDevice));

    let task = fixture.run(context, &engines);
    assert_eq!(task.status(), TaskStatus::Written);
    assert_eq!(task.path_used(), Some(ScanPath::Host));
    assert!(task.messages().iter().any(|m| m.contains("Retrying on CPU")));
}

#[test]
fn accelerator_failure_fails_the_task_without_retry() {
    let fixture = Fixture::new(40);
    let context = RunContext::new(2);
    let engines = ScanEngines::with_device(&context, Box::new(FailingDevice));

    let task = fixture.run(context, &engines);
    assert_eq!(task.status(), TaskStatus::Failed);
    assert!(task.results().is_none());
    assert!(!fixture.output().exists());
}

#[test]
fn unwritable_output_keeps_results_and_later_tasks_still_write() {
    let fixture = Fixture::new(40);
    fs::create_dir_all(fixture.output()).unwrap();
    let engines = ScanEngines::initialize(&host_context());
    let cache = SeriesCache::default();

    let blocked = fixture.run(host_context(), &engines);
    assert_eq!(blocked.status(), TaskStatus::PersistFailed);
    assert!(blocked.status().is_failure());
    assert_eq!(blocked.results().map(<[f64]>::len), Some(20));
    assert!(blocked.messages().iter().any(|m| m.starts_with("Failed to write output")));
    assert!(fixture.output().is_dir());

    let other = ModelParameters::new(6.28, 0.38, 21.0, 10).unwrap();
    let next = RunTask::run(other, fixture.selection.clone(), &cache, &fixture.layout, host_context(), &engines);
    assert_eq!(next.status(), TaskStatus::Written);
    assert_eq!(parse_output(&read(&fixture.layout.output_path(&fixture.selection, 10))).unwrap().len(), 30);
}
