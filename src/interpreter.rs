use crate::builtin::Builtins;
use crate::command::{ExecutableCommand, Streams};
use crate::config::Config;
use crate::env::Environment;
use crate::external::ExternalCommand;
use crate::lexer;
use crate::reader::{LineReader, ReadOutcome};
use crate::signals;
use anyhow::Result;
use std::io::{self, Write};

/// Prompt shown while a line ending in `\` is being continued.
pub const CONTINUATION_PROMPT: &str = "> ";

/// An interactive interpreter: reads lines, expands aliases, runs builtins
/// in-process and everything else as child processes.
///
/// The interpreter owns the session [`Environment`]. History and aliases are
/// loaded when the environment is created and written back by
/// [`Interpreter::shutdown`], which [`Interpreter::repl`] calls on its way out.
///
/// Example
/// ```
/// use mysh::{Environment, Interpreter, MemoryStore};
/// let mut sh = Interpreter::new(Environment::new(Box::new(MemoryStore::new()), 1000));
/// let mut out = Vec::new();
/// let mut err = Vec::new();
/// sh.process_line("alias hi='echo hello'", &mut out, &mut err).unwrap();
/// sh.process_line("hi world", &mut out, &mut err).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "hello world\n");
/// ```
pub struct Interpreter {
    env: Environment,
    builtins: Builtins,
}

impl Interpreter {
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            builtins: Builtins::default(),
        }
    }

    /// Interpreter persisting to the files named in `config`.
    pub fn with_config(config: &Config) -> Self {
        Self::new(Environment::new(
            Box::new(config.file_store()),
            config.history_size,
        ))
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn is_running(&self) -> bool {
        !self.env.should_exit
    }

    /// Read and run commands until `exit` or end of input, then persist.
    pub fn repl(&mut self, reader: &mut dyn LineReader) {
        self.run(reader, &mut io::stdout(), &mut io::stderr());
    }

    /// [`Interpreter::repl`] with explicit output streams.
    ///
    /// Failed writes to `out` or `err` are logged and never end the session;
    /// history and aliases are saved on every way out.
    pub fn run(&mut self, reader: &mut dyn LineReader, out: &mut dyn Write, err: &mut dyn Write) {
        for line in self.env.history.iter() {
            reader.add_history_entry(line);
        }

        while self.is_running() {
            let line = self.read_command(reader, out);
            if line.is_empty() || !self.is_running() {
                continue;
            }
            if self.record(&line) {
                reader.add_history_entry(&line);
            }
            if let Err(e) = self.execute(&line, out, err) {
                tracing::debug!("output failed for {:?}: {}", line, e);
                self.env.last_status = 1;
            }
        }

        signals::set_running(false);
        self.shutdown();
    }

    /// Read one logical line, joining physical lines that end in `\`.
    ///
    /// An interrupted read abandons the line and yields an empty one. End of
    /// input prints `exit`, stops the session and also yields an empty line.
    pub fn read_command(&mut self, reader: &mut dyn LineReader, out: &mut dyn Write) -> String {
        let primary = self.env.prompt();
        signals::publish(self.is_running(), &primary);

        let mut prompt = primary;
        let mut command = String::new();
        loop {
            match reader.read_line(&prompt) {
                ReadOutcome::Line(line) => match line.strip_suffix('\\') {
                    Some(head) => {
                        command.push_str(head);
                        prompt = CONTINUATION_PROMPT.to_string();
                    }
                    None => {
                        command.push_str(&line);
                        return command;
                    }
                },
                ReadOutcome::Interrupted => return String::new(),
                ReadOutcome::Eof => {
                    self.env.should_exit = true;
                    signals::set_running(false);
                    if let Err(e) = writeln!(out, "exit").and_then(|()| out.flush()) {
                        tracing::debug!("could not echo exit: {}", e);
                    }
                    return String::new();
                }
            }
        }
    }

    /// Append the raw `line` to history. Returns whether it was stored.
    pub fn record(&mut self, line: &str) -> bool {
        self.env.history.push(line)
    }

    /// Record `line` in history and run it.
    pub fn process_line(
        &mut self,
        line: &str,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<()> {
        if line.is_empty() {
            return Ok(());
        }
        self.record(line);
        self.execute(line, out, err)
    }

    /// Alias-expand, split and run `line` without touching history.
    pub fn execute(&mut self, line: &str, out: &mut dyn Write, err: &mut dyn Write) -> Result<()> {
        let expanded = self.env.aliases.resolve(line);
        let lexed = lexer::split_into_words(&expanded);
        if let Some(warning) = lexed.warning {
            if let Err(e) = writeln!(err, "{warning}") {
                tracing::debug!("could not report {}: {}", warning, e);
            }
        }
        if lexed.words.is_empty() {
            return Ok(());
        }

        let mut io = Streams::new(out, err);
        if self.builtins.dispatch(&lexed.words, &mut io, &mut self.env)? {
            return Ok(());
        }

        let outcome = ExternalCommand::new(&lexed.words)
            .map_err(anyhow::Error::from)
            .and_then(|cmd| Box::new(cmd).execute(&mut io, &mut self.env));
        match outcome {
            Ok(code) => self.env.last_status = code,
            Err(e) => {
                writeln!(io.err, "{e}")?;
                self.env.last_status = 1;
            }
        }
        Ok(())
    }

    /// Write history and aliases to the store.
    pub fn shutdown(&self) {
        self.env.save_history();
        self.env.save_aliases();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ScriptedReader;
    use crate::store::MemoryStore;
    use crate::test_support::lock_process_state;
    use std::fs;
    use std::path::PathBuf;
    use std::rc::Rc;

    fn interpreter_with(store: MemoryStore) -> (Interpreter, Rc<MemoryStore>) {
        let store = Rc::new(store);
        let env = Environment::new(Box::new(store.clone()), 1000);
        (Interpreter::new(env), store)
    }

    /// Output stream whose every write fails, like a full disk.
    struct FullDevice;

    impl Write for FullDevice {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "no space left"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "no space left"))
        }
    }

    fn interpreter() -> (Interpreter, Rc<MemoryStore>) {
        interpreter_with(MemoryStore::new())
    }

    /// Run `line` through `process_line`, returning (stdout, stderr).
    fn process(sh: &mut Interpreter, line: &str) -> (String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        sh.process_line(line, &mut out, &mut err).unwrap();
        (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
    }

    #[test]
    fn test_alias_expansion_end_to_end() {
        let (mut sh, _) = interpreter_with(MemoryStore::with_contents(
            Vec::new(),
            vec![("g".into(), "echo hello".into())],
        ));
        let (out, err) = process(&mut sh, "g world");
        assert_eq!(out, "hello world\n");
        assert!(err.is_empty());
        assert_eq!(sh.env().history.iter().collect::<Vec<_>>(), vec!["g world"]);
    }

    #[test]
    fn test_quoted_arguments_reach_builtins_unquoted() {
        let (mut sh, _) = interpreter();
        let (out, _) = process(&mut sh, "echo 'a   b' \"c'd\"");
        assert_eq!(out, "a   b c'd\n");
    }

    #[test]
    fn test_unclosed_quote_warns_and_still_runs() {
        let (mut sh, _) = interpreter();
        let (out, err) = process(&mut sh, "echo 'oops");
        assert_eq!(out, "oops\n");
        assert_eq!(err, "Error: Unclosed quotes in command\n");
    }

    #[test]
    fn test_blank_line_runs_nothing_but_is_recorded() {
        let (mut sh, _) = interpreter();
        let (out, err) = process(&mut sh, "   ");
        assert!(out.is_empty() && err.is_empty());
        assert_eq!(sh.env().history.len(), 1);

        process(&mut sh, "");
        assert_eq!(sh.env().history.len(), 1);
    }

    #[test]
    fn test_external_commands_run_and_report_status() {
        let (mut sh, _) = interpreter();
        process(&mut sh, "false");
        assert_eq!(sh.env().last_status, 1);
        process(&mut sh, "true");
        assert_eq!(sh.env().last_status, 0);
        assert!(sh.is_running());
    }

    #[test]
    fn test_missing_program_does_not_stop_the_session() {
        let (mut sh, _) = interpreter();
        process(&mut sh, "no-such-program-for-mysh --flag");
        assert_eq!(sh.env().last_status, 1);
        assert!(sh.is_running());
    }

    #[test]
    fn test_builtin_errors_are_reported_and_claimed() {
        let (mut sh, _) = interpreter();
        let (out, err) = process(&mut sh, "history nope");
        assert!(out.is_empty());
        assert_eq!(err, "history: numeric argument required\n");
        assert_eq!(sh.env().last_status, 1);
    }

    #[test]
    fn test_history_shows_raw_lines() {
        let (mut sh, _) = interpreter();
        process(&mut sh, "alias e=echo");
        process(&mut sh, "e 'x  y'");
        process(&mut sh, "e 'x  y'");
        let (out, _) = process(&mut sh, "history");
        assert_eq!(out, "1 alias e=echo\n2 e 'x  y'\n3 history\n");
    }

    #[test]
    fn test_alias_mutations_persist_immediately() {
        let (mut sh, store) = interpreter();
        process(&mut sh, "alias ll='ls -la'");
        assert_eq!(store.aliases(), vec![("ll".to_string(), "ls -la".to_string())]);
        process(&mut sh, "unalias ll");
        assert!(store.aliases().is_empty());
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_repl_runs_until_exit_and_persists() {
        let _lock = lock_process_state();
        let (mut sh, store) = interpreter();
        let mut reader = ScriptedReader::from_lines(["alias g=true", "g", "exit", "echo never"]);
        sh.repl(&mut reader);

        assert!(!sh.is_running());
        assert_eq!(store.history(), vec!["alias g=true", "g", "exit"]);
        assert_eq!(store.aliases(), vec![("g".to_string(), "true".to_string())]);
        assert_eq!(reader.prompts().len(), 3);
        assert_eq!(reader.recalled(), ["alias g=true", "g", "exit"]);
        assert!(!signals::is_running());
    }

    #[test]
    fn test_repl_stops_at_end_of_input() {
        let _lock = lock_process_state();
        let (mut sh, store) = interpreter();
        let mut reader = ScriptedReader::from_lines(["true"]);
        sh.repl(&mut reader);
        assert!(!sh.is_running());
        assert_eq!(store.history(), vec!["true"]);
    }

    #[test]
    fn test_repl_seeds_reader_with_loaded_history() {
        let _lock = lock_process_state();
        let (mut sh, _) =
            interpreter_with(MemoryStore::with_contents(vec!["old".into()], Vec::new()));
        let mut reader = ScriptedReader::from_lines(["exit"]);
        sh.repl(&mut reader);
        assert_eq!(reader.recalled(), ["old", "exit"]);
    }

    #[test]
    fn test_continuation_lines_are_joined() {
        let _lock = lock_process_state();
        let (mut sh, _) = interpreter();
        let mut reader = ScriptedReader::from_lines(["echo a\\", " b\\", " c"]);
        let mut out = Vec::new();
        let line = sh.read_command(&mut reader, &mut out);

        assert_eq!(line, "echo a b c");
        let primary = sh.env().prompt();
        assert_eq!(reader.prompts(), [primary.as_str(), "> ", "> "]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_interrupt_abandons_partial_line() {
        let _lock = lock_process_state();
        let (mut sh, _) = interpreter();
        let mut reader = ScriptedReader::new([
            ReadOutcome::Line("echo a\\".into()),
            ReadOutcome::Interrupted,
            ReadOutcome::Line("pwd".into()),
        ]);
        let mut out = Vec::new();
        assert_eq!(sh.read_command(&mut reader, &mut out), "");
        assert!(sh.is_running());
        assert_eq!(sh.read_command(&mut reader, &mut out), "pwd");
    }

    #[test]
    fn test_end_of_input_echoes_exit() {
        let _lock = lock_process_state();
        let (mut sh, _) = interpreter();
        let mut reader = ScriptedReader::default();
        let mut out = Vec::new();
        assert_eq!(sh.read_command(&mut reader, &mut out), "");
        assert_eq!(String::from_utf8(out).unwrap(), "exit\n");
        assert!(!sh.is_running());
    }

    #[test]
    fn test_end_of_input_mid_continuation_discards_partial() {
        let _lock = lock_process_state();
        let (mut sh, store) = interpreter();
        let mut reader = ScriptedReader::from_lines(["echo a\\"]);
        sh.repl(&mut reader);
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_cd_updates_prompt() {
        let _lock = lock_process_state();
        let orig = std::env::current_dir().unwrap();
        let temp = tempfile::tempdir().unwrap();
        let canonical = fs::canonicalize(temp.path()).unwrap();

        let (mut sh, _) = interpreter();
        process(&mut sh, &format!("cd '{}'", canonical.display()));
        let prompt = sh.env().prompt();
        std::env::set_current_dir(&orig).unwrap();

        assert_eq!(
            PathBuf::from(prompt.trim_end_matches("$ ")),
            sh.env().current_dir
        );
        assert_eq!(fs::canonicalize(&sh.env().current_dir).unwrap(), canonical);
    }

    #[test]
    fn test_file_store_round_trip_across_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::in_dir(dir.path());
        {
            let mut sh = Interpreter::with_config(&config);
            let mut out = Vec::new();
            let mut err = Vec::new();
            sh.process_line("alias ll='ls -la'", &mut out, &mut err).unwrap();
            sh.process_line("echo one", &mut out, &mut err).unwrap();
            sh.shutdown();
        }
        assert_eq!(
            fs::read_to_string(&config.history_file).unwrap(),
            "alias ll='ls -la'\necho one\n"
        );
        assert_eq!(fs::read_to_string(&config.alias_file).unwrap(), "ll=ls -la\n");

        let sh = Interpreter::with_config(&config);
        assert_eq!(sh.env().history.len(), 2);
        assert_eq!(sh.env().aliases.get("ll"), Some("ls -la"));
    }

    #[test]
    fn test_failed_output_still_persists_session() {
        let _lock = lock_process_state();
        let (mut sh, store) = interpreter();
        let mut reader = ScriptedReader::from_lines(["alias e='echo hi'", "e", "echo 'open"]);
        sh.run(&mut reader, &mut FullDevice, &mut FullDevice);

        assert!(!sh.is_running());
        assert_eq!(store.history(), vec!["alias e='echo hi'", "e", "echo 'open"]);
        assert_eq!(store.aliases(), vec![("e".to_string(), "echo hi".to_string())]);
        assert!(!signals::is_running());
    }

    #[test]
    fn test_end_of_input_stops_even_if_exit_echo_fails() {
        let _lock = lock_process_state();
        let (mut sh, _) = interpreter();
        let mut reader = ScriptedReader::default();
        assert_eq!(sh.read_command(&mut reader, &mut FullDevice), "");
        assert!(!sh.is_running());
    }
}
