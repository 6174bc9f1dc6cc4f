//! Line input for the session loop.
//!
//! The interpreter only needs "give me one physical line for this prompt";
//! [`LineReader`] is that seam. [`RustylineReader`] is the interactive
//! implementation with editing, recall and filename completion on Tab.

use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Context, Editor, Helper};
use std::collections::VecDeque;

/// What a single read produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// The user cancelled the line (Ctrl-C).
    Interrupted,
    /// No more input (Ctrl-D or closed stdin).
    Eof,
}

/// Source of physical input lines.
pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> ReadOutcome;

    /// Make `line` available for recall. Readers without recall ignore it.
    fn add_history_entry(&mut self, _line: &str) {}
}

/// Completes file names anywhere on the line.
pub struct ShellHelper {
    filenames: FilenameCompleter,
}

impl ShellHelper {
    pub fn new() -> Self {
        Self {
            filenames: FilenameCompleter::new(),
        }
    }
}

impl Default for ShellHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        self.filenames.complete(line, pos, ctx)
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}

/// Interactive terminal reader.
pub struct RustylineReader {
    editor: Editor<ShellHelper, DefaultHistory>,
}

impl RustylineReader {
    /// `history_size` bounds the editor's own recall list.
    pub fn new(history_size: usize) -> rustyline::Result<Self> {
        let config = Config::builder()
            .completion_type(CompletionType::List)
            .max_history_size(history_size)?
            .auto_add_history(false)
            .build();
        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(ShellHelper::new()));
        Ok(Self { editor })
    }
}

impl LineReader for RustylineReader {
    fn read_line(&mut self, prompt: &str) -> ReadOutcome {
        match self.editor.readline(prompt) {
            Ok(line) => ReadOutcome::Line(line),
            Err(ReadlineError::Interrupted) => ReadOutcome::Interrupted,
            Err(ReadlineError::Eof) => ReadOutcome::Eof,
            Err(err) => {
                tracing::warn!("line editor failed: {}", err);
                ReadOutcome::Eof
            }
        }
    }

    fn add_history_entry(&mut self, line: &str) {
        if let Err(e) = self.editor.add_history_entry(line) {
            tracing::debug!("could not add editor history entry: {}", e);
        }
    }
}

/// Reader that replays a fixed script, then reports end of input.
///
/// Records every prompt it was asked with.
#[derive(Debug, Default)]
pub struct ScriptedReader {
    script: VecDeque<ReadOutcome>,
    prompts: Vec<String>,
    recalled: Vec<String>,
}

impl ScriptedReader {
    pub fn new(script: impl IntoIterator<Item = ReadOutcome>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Script made only of plain lines.
    pub fn from_lines<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self::new(lines.into_iter().map(|l| ReadOutcome::Line(l.into())))
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Entries handed to [`LineReader::add_history_entry`].
    pub fn recalled(&self) -> &[String] {
        &self.recalled
    }
}

impl LineReader for ScriptedReader {
    fn read_line(&mut self, prompt: &str) -> ReadOutcome {
        self.prompts.push(prompt.to_string());
        self.script.pop_front().unwrap_or(ReadOutcome::Eof)
    }

    fn add_history_entry(&mut self, line: &str) {
        self.recalled.push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_reader_replays_then_ends() {
        let mut reader = ScriptedReader::new([
            ReadOutcome::Line("ls".into()),
            ReadOutcome::Interrupted,
        ]);
        assert_eq!(reader.read_line("a$ "), ReadOutcome::Line("ls".into()));
        assert_eq!(reader.read_line("b$ "), ReadOutcome::Interrupted);
        assert_eq!(reader.read_line("c$ "), ReadOutcome::Eof);
        assert_eq!(reader.prompts(), ["a$ ", "b$ ", "c$ "]);
    }

    #[test]
    fn test_scripted_reader_records_recall_entries() {
        let mut reader = ScriptedReader::from_lines(["x"]);
        reader.add_history_entry("x");
        assert_eq!(reader.recalled(), ["x"]);
    }

    #[test]
    fn test_helper_completes_file_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("unique_name.txt"), "").unwrap();
        let line = format!("cat {}/uniq", dir.path().display());

        let history = DefaultHistory::new();
        let ctx = Context::new(&history);
        let (_, candidates) = ShellHelper::new()
            .complete(&line, line.len(), &ctx)
            .unwrap();
        assert!(
            candidates
                .iter()
                .any(|c| c.replacement.ends_with("unique_name.txt"))
        );
    }
}
