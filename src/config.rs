use crate::history::MAX_HISTORY_SIZE;
use crate::store::FileStore;
use std::path::PathBuf;

const HISTORY_FILE_NAME: &str = ".mysh_history";
const ALIAS_FILE_NAME: &str = ".mysh_aliases";

/// Where a session keeps its state and how much history it retains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub history_file: PathBuf,
    pub alias_file: PathBuf,
    pub history_size: usize,
}

impl Config {
    /// Store files live directly under `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            history_file: dir.join(HISTORY_FILE_NAME),
            alias_file: dir.join(ALIAS_FILE_NAME),
            history_size: MAX_HISTORY_SIZE,
        }
    }

    pub fn file_store(&self) -> FileStore {
        FileStore::new(&self.history_file, &self.alias_file)
    }
}

impl Default for Config {
    /// Store files in the user's home directory, or the current directory
    /// when no home can be determined.
    fn default() -> Self {
        Self::in_dir(dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }
}
