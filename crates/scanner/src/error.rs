use numerics::NumericsError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    #[error("Scan received invalid input: {0}")]
    InvalidInput(String),

    #[error("Fit failed for the window ending at day {day}: {source}")]
    Numerical {
        day: usize,
        #[source]
        source: NumericsError,
    },

    #[error("Accelerator unavailable: {0}")]
    AcceleratorUnavailable(String),

    #[error("Accelerator kernel failed: {0}")]
    Kernel(String),

    #[error("Host thread pool could not be initialized: {0}")]
    ThreadPool(String),
}

impl ScanError {
    /// True when the failure came from the execution substrate rather than the
    /// data, i.e. the same task may succeed on the other path.
    pub fn is_execution_failure(&self) -> bool {
        matches!(
            self,
            ScanError::AcceleratorUnavailable(_) | ScanError::Kernel(_) | ScanError::ThreadPool(_)
        )
    }
}
