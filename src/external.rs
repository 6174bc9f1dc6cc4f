use crate::command::{ExecutableCommand, ExitCode, Streams};
use crate::env::Environment;
use crate::error::ExecError;
use crate::signals;
use anyhow::Result;
use nix::errno::Errno;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{self, ForkResult, Pid};
use std::ffi::CString;

/// Command that is not a builtin.
///
/// Runs in a forked child which replaces itself with the program named by
/// the first word, found through `PATH`. The interpreter blocks until the
/// child terminates.
pub struct ExternalCommand {
    name: String,
    argv: Vec<CString>,
}

impl ExternalCommand {
    /// Build the argument vector for `words`. `words` must not be empty.
    pub fn new(words: &[String]) -> Result<Self, ExecError> {
        let name = words.first().cloned().unwrap_or_default();
        let argv = words
            .iter()
            .map(|w| CString::new(w.as_bytes()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ExecError::NulInArgument(name.clone()))?;
        if argv.is_empty() {
            return Err(ExecError::CommandNotFound(name));
        }
        Ok(Self { name, argv })
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(self: Box<Self>, io: &mut Streams<'_>, _env: &mut Environment) -> Result<ExitCode> {
        // Anything still buffered would otherwise be duplicated into the child.
        if let Err(e) = io.out.flush().and_then(|()| io.err.flush()) {
            tracing::debug!("could not flush before running {}: {}", self.name, e);
        }

        // Formatted up front: the child must not allocate.
        let not_found = format!("{}\n", ExecError::CommandNotFound(self.name.clone()));

        // SAFETY: between fork and exec the child only changes signal
        // dispositions, calls execvp, writes to stderr and exits.
        match unsafe { unistd::fork() } {
            Ok(ForkResult::Child) => {
                signals::restore_defaults();
                let _ = unistd::execvp(&self.argv[0], &self.argv);
                let _ = unistd::write(std::io::stderr(), not_found.as_bytes());
                // SAFETY: _exit(2) skips atexit handlers and stdio flushing,
                // which belong to the parent.
                unsafe { nix::libc::_exit(1) }
            }
            Ok(ForkResult::Parent { child }) => {
                tracing::debug!("spawned {} as pid {}", self.name, child);
                let code = wait_for(child);
                tracing::debug!("{} exited with {}", self.name, code);
                Ok(code)
            }
            Err(e) => {
                tracing::warn!("fork failed for {}: {}", self.name, e);
                Err(ExecError::ForkFailed(e).into())
            }
        }
    }
}

/// Block until `child` terminates and return its exit code.
fn wait_for(child: Pid) -> ExitCode {
    loop {
        match waitpid(child, None) {
            Ok(WaitStatus::Exited(_, code)) => return code,
            Ok(WaitStatus::Signaled(_, signal, _)) => return 128 + signal as i32,
            Ok(_) => continue,
            Err(Errno::EINTR) => continue,
            Err(e) => {
                tracing::warn!("waitpid failed: {}", e);
                return 1;
            }
        }
    }
}
