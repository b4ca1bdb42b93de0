use crate::TaskSpec;
use crate::error::GridError;
use configuration::{ModelSettings, SweepConfig};
use core_types::Selection;
use itertools::Itertools;
use tracing::warn;

/// Generates one task per (selection, window) combination of the sweep.
///
/// Tasks are ordered by selection, then by ascending window, so handles
/// assigned from the returned order group an instrument's windows together.
/// A selection listed more than once yields its tasks only once, since both
/// copies would write the same output files.
pub fn generate_tasks(sweep: &SweepConfig, model: &ModelSettings) -> Result<Vec<TaskSpec>, GridError> {
    let windows = sweep.windows.expand()?;
    let selections: Vec<&String> = sweep.selections.iter().unique().collect();
    if selections.len() < sweep.selections.len() {
        warn!(
            category = %sweep.category,
            dropped = sweep.selections.len() - selections.len(),
            "Ignoring repeated selections."
        );
    }

    selections
        .into_iter()
        .cartesian_product(windows)
        .map(|(name, window)| {
            Ok(TaskSpec {
                selection: Selection::new(sweep.category.clone(), name.clone()),
                params: model.parameters(window)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use configuration::WindowRange;

    fn sweep(windows: WindowRange) -> SweepConfig {
        SweepConfig {
            category: "Stocks".to_string(),
            selections: vec!["SPY".to_string(), "QQQ".to_string()],
            windows,
        }
    }

    #[test]
    fn every_selection_gets_every_window() {
        let tasks = generate_tasks(&sweep(WindowRange::List(vec![104, 52])), &ModelSettings::default()).unwrap();
        let pairs: Vec<(String, usize)> = tasks
            .iter()
            .map(|t| (t.selection.name.clone(), t.params.window()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("SPY".to_string(), 52),
                ("SPY".to_string(), 104),
                ("QQQ".to_string(), 52),
                ("QQQ".to_string(), 104),
            ]
        );
        assert!(tasks.iter().all(|t| t.selection.category == "Stocks"));
    }

    #[test]
    fn repeated_selections_are_generated_once() {
        let mut repeated = sweep(WindowRange::List(vec![20]));
        repeated.selections = vec!["SPY".to_string(), "QQQ".to_string(), "SPY".to_string()];
        let tasks = generate_tasks(&repeated, &ModelSettings::default()).unwrap();
        let names: Vec<&str> = tasks.iter().map(|t| t.selection.name.as_str()).collect();
        assert_eq!(names, vec!["SPY", "QQQ"]);
    }

    #[test]
    fn windows_below_the_minimum_are_rejected() {
        let result = generate_tasks(&sweep(WindowRange::List(vec![2, 52])), &ModelSettings::default());
        assert!(matches!(result, Err(GridError::Config(_))));
    }
}
