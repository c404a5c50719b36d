use std::path::PathBuf;

/// The directories a run reads statements from and writes charts to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// The directory holding the `portfolio_YYYYMMDD.csv` exports
    pub data_dir: PathBuf,
    /// The directory rendered charts are written to
    pub graph_dir: PathBuf,
}

impl Config {
    pub fn new(data_dir: impl Into<PathBuf>, graph_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            graph_dir: graph_dir.into(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("data", "graphs")
    }
}
