use crate::alias::AliasTable;
use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Streams};
use crate::env::Environment;
use crate::error::BuiltinError;
use anyhow::Result;
use std::env;
use std::marker::PhantomData;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins build themselves from their argument words and are executed
/// directly in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    /// Parse the words following the command name.
    fn from_args(args: &[String]) -> Result<Self, BuiltinError>;

    /// Executes the command using provided streams and environment.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(self, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        match T::execute(*self, io, env) {
            Ok(x) => Ok(x),
            Err(e) => {
                writeln!(io.err, "{e}")?;
                Ok(1)
            }
        }
    }
}

/// Arguments a builtin refused; reports the usage problem and fails.
struct InvalidArgs {
    error: BuiltinError,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, io: &mut Streams<'_>, _env: &mut Environment) -> Result<ExitCode> {
        writeln!(io.err, "{}", self.error)?;
        Ok(1)
    }
}

/// Factory allows creating instances of a builtin by name.
pub(crate) struct Factory<T> {
    _phantom: PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(&self, name: &str, args: &[String]) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::from_args(args) {
                Ok(cmd) => Box::new(cmd),
                Err(error) => Box::new(InvalidArgs { error }),
            })
        } else {
            None
        }
    }
}

/// The set of commands implemented in-process.
pub struct Builtins {
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Builtins {
    /// Run `words` as a builtin if its first word names one.
    ///
    /// Returns `true` when the command was claimed, whether or not it
    /// succeeded; `false` means the caller must run it some other way.
    /// The exit code of a claimed command is kept in `env.last_status`.
    pub fn dispatch(
        &self,
        words: &[String],
        io: &mut Streams<'_>,
        env: &mut Environment,
    ) -> Result<bool> {
        let Some((name, args)) = words.split_first() else {
            return Ok(true);
        };
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(name, args) {
                tracing::debug!("running builtin {}", name);
                env.last_status = cmd.execute(io, env)?;
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Default for Builtins {
    /// `exit`, `echo`, `cd`, `pwd`, `history`, `alias` and `unalias`.
    fn default() -> Self {
        Self {
            commands: vec![
                Box::new(Factory::<Exit>::default()),
                Box::new(Factory::<Echo>::default()),
                Box::new(Factory::<Cd>::default()),
                Box::new(Factory::<Pwd>::default()),
                Box::new(Factory::<HistoryCmd>::default()),
                Box::new(Factory::<Alias>::default()),
                Box::new(Factory::<Unalias>::default()),
            ],
        }
    }
}

/// Stop the session. Arguments are ignored; the interpreter still exits 0.
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn from_args(_args: &[String]) -> Result<Self, BuiltinError> {
        Ok(Exit)
    }

    fn execute(self, _io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        env.should_exit = true;
        Ok(0)
    }
}

/// Write the arguments to standard output, separated by spaces.
pub struct Echo {
    pub args: Vec<String>,
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn from_args(args: &[String]) -> Result<Self, BuiltinError> {
        Ok(Echo {
            args: args.to_vec(),
        })
    }

    fn execute(self, io: &mut Streams<'_>, _env: &mut Environment) -> Result<ExitCode> {
        writeln!(io.out, "{}", self.args.join(" "))?;
        Ok(0)
    }
}

/// Change the current working directory.
/// Without a target, changes to the directory named by `HOME`.
pub struct Cd {
    /// Absolute or relative to the OS working directory. Extra words are ignored.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn from_args(args: &[String]) -> Result<Self, BuiltinError> {
        Ok(Cd {
            target: args.first().cloned(),
        })
    }

    fn execute(self, _io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        match &self.target {
            Some(target) => env::set_current_dir(target)
                .map_err(|_| BuiltinError::NoSuchDirectory(target.clone()))?,
            None => {
                let home = env.home_dir().ok_or(BuiltinError::NoHomeDirectory)?;
                env::set_current_dir(&home).map_err(|_| BuiltinError::NoHomeDirectory)?;
            }
        }
        if let Ok(dir) = env::current_dir() {
            env.current_dir = dir;
        }
        Ok(0)
    }
}

/// Print the OS-reported working directory.
pub struct Pwd;

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn from_args(_args: &[String]) -> Result<Self, BuiltinError> {
        Ok(Pwd)
    }

    fn execute(self, io: &mut Streams<'_>, _env: &mut Environment) -> Result<ExitCode> {
        let dir: PathBuf = env::current_dir().map_err(|_| BuiltinError::CurrentDirUnavailable)?;
        writeln!(io.out, "{}", dir.display())?;
        Ok(0)
    }
}

/// Print recorded command lines, numbered from 1.
pub struct HistoryCmd {
    /// Only the last `count` entries; all of them when absent.
    pub count: Option<usize>,
}

impl BuiltinCommand for HistoryCmd {
    fn name() -> &'static str {
        "history"
    }

    fn from_args(args: &[String]) -> Result<Self, BuiltinError> {
        let count = match args.first() {
            Some(n) => Some(
                n.parse::<usize>()
                    .map_err(|_| BuiltinError::NumericArgumentRequired)?,
            ),
            None => None,
        };
        Ok(HistoryCmd { count })
    }

    fn execute(self, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        for (index, line) in env.history.numbered_tail(self.count) {
            writeln!(io.out, "{index} {line}")?;
        }
        Ok(0)
    }
}

/// What an `alias` invocation asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasAction {
    List,
    Show(String),
    Define { name: String, expansion: String },
}

/// List, show or define aliases.
pub struct Alias {
    pub action: AliasAction,
}

/// Remove one pair of matching `'` or `"` around `value`.
fn strip_matching_quotes(value: &str) -> &str {
    for quote in ['\'', '"'] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

impl BuiltinCommand for Alias {
    fn name() -> &'static str {
        "alias"
    }

    fn from_args(args: &[String]) -> Result<Self, BuiltinError> {
        let action = match args {
            [] => AliasAction::List,
            [name] if !name.contains('=') => AliasAction::Show(name.clone()),
            [first, rest @ ..] => {
                let (name, expansion) = match first.split_once('=') {
                    Some((name, value)) => {
                        (name.to_string(), strip_matching_quotes(value).to_string())
                    }
                    None => (first.clone(), rest.join(" ")),
                };
                if !AliasTable::is_valid_name(&name) {
                    return Err(BuiltinError::InvalidAliasName(name));
                }
                AliasAction::Define { name, expansion }
            }
        };
        Ok(Alias { action })
    }

    fn execute(self, io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        match self.action {
            AliasAction::List => {
                for (name, expansion) in env.aliases.iter() {
                    writeln!(io.out, "{}", AliasTable::format_entry(name, expansion))?;
                }
            }
            AliasAction::Show(name) => {
                let expansion = env
                    .aliases
                    .get(&name)
                    .ok_or_else(|| BuiltinError::AliasNotFound(name.clone()))?;
                writeln!(io.out, "{}", AliasTable::format_entry(&name, expansion))?;
            }
            AliasAction::Define { name, expansion } => {
                env.aliases.define(name, expansion);
                env.save_aliases();
            }
        }
        Ok(0)
    }
}

/// Remove one alias.
pub struct Unalias {
    pub name: String,
}

impl BuiltinCommand for Unalias {
    fn name() -> &'static str {
        "unalias"
    }

    fn from_args(args: &[String]) -> Result<Self, BuiltinError> {
        match args {
            [name] => Ok(Unalias { name: name.clone() }),
            _ => Err(BuiltinError::UnaliasUsage),
        }
    }

    fn execute(self, _io: &mut Streams<'_>, env: &mut Environment) -> Result<ExitCode> {
        if env.aliases.remove(&self.name).is_none() {
            return Err(BuiltinError::UnaliasNotFound(self.name).into());
        }
        env.save_aliases();
        Ok(0)
    }
}
