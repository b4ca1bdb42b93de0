use core_types::Selection;
use std::path::{Path, PathBuf};

/// Maps an instrument and window onto the files a run task reads and writes.
pub trait PathResolver: Send + Sync {
    fn input_path(&self, selection: &Selection) -> PathBuf;

    fn output_path(&self, selection: &Selection, window: usize) -> PathBuf;
}

/// The on-disk convention of the data folder:
///
/// ```text
/// <root>/<category>/<name>/<name>dailydata.csv     price history
/// <root>/<category>/<name>/<name><window>days.csv  bubble index per window
/// ```
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn selection_dir(&self, selection: &Selection) -> PathBuf {
        self.root.join(&selection.category).join(&selection.name)
    }
}

impl PathResolver for DataLayout {
    fn input_path(&self, selection: &Selection) -> PathBuf {
        self.selection_dir(selection)
            .join(format!("{}dailydata.csv", selection.name))
    }

    fn output_path(&self, selection: &Selection, window: usize) -> PathBuf {
        self.selection_dir(selection)
            .join(format!("{}{}days.csv", selection.name, window))
    }
}
