use indicatif::style::TemplateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Configuration error: {0}")]
    Config(#[from] configuration::error::ConfigError),

    #[error("A task with handle {0} has already been submitted.")]
    DuplicateHandle(u64),

    #[error("Task {handle} writes the same output as queued task {existing} ({target}).")]
    DuplicateTarget { handle: u64, existing: u64, target: String },

    #[error("Worker pool could not be created: {0}")]
    ThreadPool(String),

    #[error("Progress bar template error: {0}")]
    ProgressBarTemplate(String),
}

impl From<TemplateError> for GridError {
    fn from(error: TemplateError) -> Self {
        GridError::ProgressBarTemplate(error.to_string())
    }
}
