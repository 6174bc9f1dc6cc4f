//! A small interactive shell with aliases and persistent history.
//!
//! Each input line is recorded in history, has its first word replaced if it
//! names an alias, and is split into words honoring single and double quotes.
//! A handful of commands (`exit`, `echo`, `cd`, `pwd`, `history`, `alias`,
//! `unalias`) run in-process; anything else is started as a child process
//! found through `PATH`, and the shell waits for it to finish.
//!
//! There are no pipelines, redirections, globbing, variable expansion or job
//! control. Ctrl-C and Ctrl-Z never terminate the shell itself.
//!
//! The main entry point is [`Interpreter`]. Line input goes through the
//! [`LineReader`] trait and persistence through [`SessionStore`], so both can
//! be replaced when embedding.

mod alias;
mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
mod external;
mod history;
mod interpreter;
pub mod lexer;
pub mod reader;
pub mod signals;
pub mod store;

pub use alias::AliasTable;
pub use builtin::Builtins;
pub use config::Config;
pub use env::Environment;
pub use external::ExternalCommand;
pub use history::{History, MAX_HISTORY_SIZE};
pub use interpreter::{CONTINUATION_PROMPT, Interpreter};
pub use reader::{LineReader, ReadOutcome, RustylineReader, ScriptedReader};
pub use store::{FileStore, MemoryStore, SessionStore};
