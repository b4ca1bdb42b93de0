use crate::error::ConfigError;
use serde::Deserialize;

/// Defines which (instrument, window) combinations a batch covers.
#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    /// Category folder the selections live in (e.g. "Stocks").
    pub category: String,
    /// Instrument names within the category.
    pub selections: Vec<String>,
    /// Window lengths in trading days.
    pub windows: WindowRange,
}

/// Represents the window lengths to be scanned.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WindowRange {
    List(Vec<usize>),
    Linear { start: usize, end: usize, step: usize },
}

impl WindowRange {
    /// Expands the range into concrete window lengths, in ascending order without repeats.
    pub fn expand(&self) -> Result<Vec<usize>, ConfigError> {
        let mut windows: Vec<usize> = match self {
            WindowRange::List(values) => values.clone(),
            WindowRange::Linear { start, end, step } => {
                if *step == 0 {
                    return Err(ConfigError::ValidationError(
                        "Step for 'windows' must be positive.".to_string(),
                    ));
                }
                (*start..=*end).step_by(*step).collect()
            }
        };
        windows.sort_unstable();
        windows.dedup();

        if windows.is_empty() {
            return Err(ConfigError::ValidationError(
                "The window range does not contain any window.".to_string(),
            ));
        }
        Ok(windows)
    }
}

impl Default for WindowRange {
    fn default() -> Self {
        WindowRange::List(vec![52, 104, 153, 256, 512])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_is_sorted_and_deduplicated() {
        let range = WindowRange::List(vec![104, 52, 104]);
        assert_eq!(range.expand().unwrap(), vec![52, 104]);
    }

    #[test]
    fn linear_range_is_inclusive() {
        let range = WindowRange::Linear { start: 50, end: 70, step: 10 };
        assert_eq!(range.expand().unwrap(), vec![50, 60, 70]);
    }

    #[test]
    fn zero_step_is_rejected() {
        let range = WindowRange::Linear { start: 50, end: 70, step: 0 };
        assert!(matches!(range.expand(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn empty_range_is_rejected() {
        assert!(WindowRange::List(vec![]).expand().is_err());
        assert!(WindowRange::Linear { start: 80, end: 70, step: 5 }.expand().is_err());
    }
}
