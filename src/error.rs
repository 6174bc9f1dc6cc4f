//! Error types reported by commands.
//!
//! None of these are fatal: the interpreter prints them to its error stream
//! and carries on with the next line.

use thiserror::Error;

/// Failures of builtin commands. The `Display` text is what the user sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuiltinError {
    #[error("cd: {0}: No such directory")]
    NoSuchDirectory(String),

    #[error("cd: could not change to home directory")]
    NoHomeDirectory,

    #[error("pwd: error getting current directory")]
    CurrentDirUnavailable,

    #[error("history: numeric argument required")]
    NumericArgumentRequired,

    #[error("alias: {0}: not found")]
    AliasNotFound(String),

    #[error("alias: {0}: invalid alias name")]
    InvalidAliasName(String),

    #[error("unalias: {0}: not found")]
    UnaliasNotFound(String),

    #[error("unalias: usage: unalias name")]
    UnaliasUsage,
}

/// Failures of launching an external program.
#[derive(Error, Debug)]
pub enum ExecError {
    /// Reported by the child when the program image cannot be replaced.
    #[error("{0}: command not found")]
    CommandNotFound(String),

    /// Arguments are handed to the OS as C strings and may not contain NUL.
    #[error("{0}: argument contains a NUL byte")]
    NulInArgument(String),

    #[error("Fork failed")]
    ForkFailed(#[source] nix::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_messages() {
        assert_eq!(
            BuiltinError::NoSuchDirectory("/nope".into()).to_string(),
            "cd: /nope: No such directory"
        );
        assert_eq!(
            BuiltinError::NoHomeDirectory.to_string(),
            "cd: could not change to home directory"
        );
        assert_eq!(
            BuiltinError::AliasNotFound("ll".into()).to_string(),
            "alias: ll: not found"
        );
        assert_eq!(
            BuiltinError::UnaliasUsage.to_string(),
            "unalias: usage: unalias name"
        );
    }

    #[test]
    fn test_exec_messages() {
        assert_eq!(
            ExecError::CommandNotFound("frobnicate".into()).to_string(),
            "frobnicate: command not found"
        );
        assert_eq!(
            ExecError::ForkFailed(nix::Error::EAGAIN).to_string(),
            "Fork failed"
        );
    }
}
