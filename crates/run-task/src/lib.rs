//! # Bubble Index Run Task
//!
//! One task computes the bubble index of one instrument for one window and
//! brings its result file up to date.
//!
//! ## Architectural Principles
//!
//! - **Orchestration only:** a task strings together the data store and the
//!   scanner. It owns no math and no file formats.
//! - **Failures stay inside the task:** every phase records its outcome as a
//!   `TaskStatus` plus readable messages instead of returning errors, so one
//!   bad instrument never stops a batch.
//! - **Cooperative cancellation:** the run context's stop flag is checked
//!   before loading, before the scan, after the scan and before writing.
//!
//! ## Public API
//!
//! - `RunTask`: the task itself (`prepare`, `execute`, `write_output`, `run`).
//! - `SeriesCache`: a read-through cache of price histories shared by tasks.
//! - `ProgressSink`, `ConsoleSink`, `LogSink`: where progress lines go.

pub mod cache;
pub mod error;
pub mod sink;
pub mod task;

pub use cache::SeriesCache;
pub use error::TaskError;
pub use sink::{ConsoleSink, LogSink, ProgressSink};
pub use task::RunTask;
