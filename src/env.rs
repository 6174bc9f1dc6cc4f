use crate::alias::AliasTable;
use crate::command::ExitCode;
use crate::history::History;
use crate::store::{MemoryStore, SessionStore};
use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Mutable state of one interpreter session.
///
/// The environment contains:
/// - `vars`: the process environment as captured at startup (used to find `HOME`).
/// - `current_dir`: cached copy of the OS working directory, refreshed by `cd`.
/// - `history`: raw command lines entered so far.
/// - `aliases`: the alias table.
/// - `should_exit`: set by `exit`; the session loop stops once it sees it.
/// - `last_status`: exit status of the most recent command.
///
/// It also owns the store that history and aliases are persisted to.
pub struct Environment {
    pub vars: HashMap<String, String>,
    pub current_dir: PathBuf,
    pub history: History,
    pub aliases: AliasTable,
    pub should_exit: bool,
    pub last_status: ExitCode,
    store: Box<dyn SessionStore>,
}

impl Environment {
    /// Capture the current process state and load history and aliases from `store`.
    pub fn new(store: Box<dyn SessionStore>, history_size: usize) -> Self {
        let vars = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("/"));

        let mut history = History::new(history_size);
        for line in store.load_history() {
            history.push(&line);
        }
        let aliases = store.load_aliases().into_iter().collect();

        Self {
            vars,
            current_dir,
            history,
            aliases,
            should_exit: false,
            last_status: 0,
            store,
        }
    }

    /// An environment with no process variables and an in-memory store.
    pub fn detached(current_dir: PathBuf) -> Self {
        Self {
            vars: HashMap::new(),
            current_dir,
            history: History::default(),
            aliases: AliasTable::new(),
            should_exit: false,
            last_status: 0,
            store: Box::new(MemoryStore::new()),
        }
    }

    /// Get the value of a captured environment variable.
    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Set or override a variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// The user's home directory, taken from `HOME`.
    pub fn home_dir(&self) -> Option<PathBuf> {
        self.get_var("HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from)
    }

    /// Prompt shown when waiting for a new command.
    pub fn prompt(&self) -> String {
        format!("{}$ ", self.current_dir.display())
    }

    /// Write the alias table to the store. Failures are logged and ignored.
    pub fn save_aliases(&self) {
        if let Err(e) = self.store.save_aliases(&self.aliases) {
            tracing::debug!("could not save aliases: {}", e);
        }
    }

    /// Write the history to the store. Failures are logged and ignored.
    pub fn save_history(&self) {
        if let Err(e) = self.store.save_history(&self.history) {
            tracing::debug!("could not save history: {}", e);
        }
    }
}
