use core_types::{ModelParameters, RunContext};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::sweep_config::SweepConfig;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunSettings,
    pub model: ModelSettings,
    pub data: DataSettings,
    pub sweep: SweepConfig,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Config {
    /// Checks cross-field ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.run.task_workers == 0 {
            return Err(ConfigError::ValidationError(
                "run.task_workers must be at least 1".to_string(),
            ));
        }
        if self.sweep.selections.is_empty() {
            return Err(ConfigError::ValidationError(
                "sweep.selections must name at least one instrument".to_string(),
            ));
        }
        // Every window must yield valid model parameters.
        for window in self.sweep.windows.expand()? {
            self.model.parameters(window)?;
        }
        Ok(())
    }
}

/// Execution flags for a batch.
#[derive(Debug, Clone, Deserialize)]
pub struct RunSettings {
    /// Skip the accelerator and scan every window on the host.
    #[serde(default)]
    pub force_host: bool,
    /// When the accelerator fails, re-run the task on the host instead of failing it.
    #[serde(default = "default_true")]
    pub retry_on_host: bool,
    /// Host scan threads per task. 0 means one per logical CPU.
    #[serde(default)]
    pub threads: usize,
    /// Tasks executed concurrently by the pooled grid.
    #[serde(default = "default_task_workers")]
    pub task_workers: usize,
    /// Print progress text instead of drawing a progress bar.
    #[serde(default = "default_true")]
    pub headless: bool,
}

impl RunSettings {
    pub fn thread_count(&self) -> usize {
        if self.threads == 0 { num_cpus::get() } else { self.threads }
    }

    /// Builds the shared run context for one batch, with a fresh stop signal.
    pub fn to_context(&self) -> RunContext {
        RunContext::new(self.thread_count())
            .with_force_host(self.force_host)
            .with_retry_on_host(self.retry_on_host)
            .with_headless(self.headless)
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            force_host: false,
            retry_on_host: true,
            threads: 0,
            task_workers: default_task_workers(),
            headless: true,
        }
    }
}

/// Hyperparameters of the log-periodic model, shared by every window of a sweep.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    /// Log-periodic angular frequency.
    pub omega: f64,
    /// Power-law exponent, strictly between 0 and 1.
    pub m_coeff: f64,
    /// Days between the most recent day of a window and the critical time.
    pub t_crit: f64,
}

impl ModelSettings {
    pub fn parameters(&self, window: usize) -> Result<ModelParameters, ConfigError> {
        Ok(ModelParameters::new(self.omega, self.m_coeff, self.t_crit, window)?)
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self { omega: 6.28, m_coeff: 0.38, t_crit: 21.0 }
    }
}

/// Where daily price files and output files live.
#[derive(Debug, Clone, Deserialize)]
pub struct DataSettings {
    /// Folder holding one sub-folder per category.
    pub root: PathBuf,
}

/// Console and file logging.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is not set.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Directory for the daily-rolling log file.
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_prefix")]
    pub file_prefix: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            directory: default_log_directory(),
            file_prefix: default_log_prefix(),
        }
    }
}

/// Console log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Pretty,
}

fn default_true() -> bool {
    true
}

fn default_task_workers() -> usize {
    2
}

fn default_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_prefix() -> String {
    "bubble-index.log".to_string()
}
