//! Persistence of history and aliases between sessions.
//!
//! Both stores are plain text, one record per line, with no escaping:
//! history holds one raw command line per line, oldest first; aliases are
//! written as `name=expansion` and split on the first `=` when read back.

use crate::alias::AliasTable;
use crate::history::History;
use std::cell::{Cell, RefCell};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Durable storage used by a session at startup, on alias changes and at shutdown.
///
/// Loading never fails: an unreadable store is treated as empty.
pub trait SessionStore {
    fn load_history(&self) -> Vec<String>;
    fn save_history(&self, history: &History) -> io::Result<()>;
    fn load_aliases(&self) -> Vec<(String, String)>;
    fn save_aliases(&self, aliases: &AliasTable) -> io::Result<()>;
}

/// Stores backed by two text files.
#[derive(Debug, Clone)]
pub struct FileStore {
    history_file: PathBuf,
    alias_file: PathBuf,
}

impl FileStore {
    pub fn new(history_file: impl Into<PathBuf>, alias_file: impl Into<PathBuf>) -> Self {
        Self {
            history_file: history_file.into(),
            alias_file: alias_file.into(),
        }
    }

    pub fn history_file(&self) -> &Path {
        &self.history_file
    }

    pub fn alias_file(&self) -> &Path {
        &self.alias_file
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => content.lines().map(str::to_string).collect(),
        Err(e) => {
            tracing::debug!("not loading {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

fn write_lines(path: &Path, lines: impl Iterator<Item = String>) -> io::Result<()> {
    let mut file = BufWriter::new(fs::File::create(path)?);
    for line in lines {
        writeln!(file, "{line}")?;
    }
    file.flush()
}

/// Split an alias record on its first `=`.
fn parse_alias_record(line: &str) -> Option<(String, String)> {
    let (name, expansion) = line.split_once('=')?;
    Some((name.to_string(), expansion.to_string()))
}

impl SessionStore for FileStore {
    fn load_history(&self) -> Vec<String> {
        read_lines(&self.history_file)
    }

    fn save_history(&self, history: &History) -> io::Result<()> {
        write_lines(&self.history_file, history.iter().map(str::to_string))
    }

    fn load_aliases(&self) -> Vec<(String, String)> {
        read_lines(&self.alias_file)
            .iter()
            .filter_map(|line| parse_alias_record(line))
            .collect()
    }

    fn save_aliases(&self, aliases: &AliasTable) -> io::Result<()> {
        write_lines(
            &self.alias_file,
            aliases.iter().map(|(name, expansion)| format!("{name}={expansion}")),
        )
    }
}

/// In-memory store, for embedding the interpreter without touching the filesystem.
#[derive(Debug, Default)]
pub struct MemoryStore {
    history: RefCell<Vec<String>>,
    aliases: RefCell<Vec<(String, String)>>,
    alias_saves: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(history: Vec<String>, aliases: Vec<(String, String)>) -> Self {
        Self {
            history: RefCell::new(history),
            aliases: RefCell::new(aliases),
            alias_saves: Cell::new(0),
        }
    }

    pub fn history(&self) -> Vec<String> {
        self.history.borrow().clone()
    }

    pub fn aliases(&self) -> Vec<(String, String)> {
        self.aliases.borrow().clone()
    }

    /// How many times the alias table has been written.
    pub fn alias_saves(&self) -> usize {
        self.alias_saves.get()
    }
}

impl SessionStore for MemoryStore {
    fn load_history(&self) -> Vec<String> {
        self.history()
    }

    fn save_history(&self, history: &History) -> io::Result<()> {
        *self.history.borrow_mut() = history.iter().map(str::to_string).collect();
        Ok(())
    }

    fn load_aliases(&self) -> Vec<(String, String)> {
        self.aliases()
    }

    fn save_aliases(&self, aliases: &AliasTable) -> io::Result<()> {
        *self.aliases.borrow_mut() = aliases
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.alias_saves.set(self.alias_saves.get() + 1);
        Ok(())
    }
}

impl<T: SessionStore + ?Sized> SessionStore for std::rc::Rc<T> {
    fn load_history(&self) -> Vec<String> {
        (**self).load_history()
    }

    fn save_history(&self, history: &History) -> io::Result<()> {
        (**self).save_history(history)
    }

    fn load_aliases(&self) -> Vec<(String, String)> {
        (**self).load_aliases()
    }

    fn save_aliases(&self, aliases: &AliasTable) -> io::Result<()> {
        (**self).save_aliases(aliases)
    }
}
