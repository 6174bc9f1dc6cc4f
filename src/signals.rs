//! Interrupt (Ctrl-C) and terminal-stop (Ctrl-Z) handling.
//!
//! The interpreter must survive both signals: its handlers only move the
//! cursor to a fresh line and redraw the prompt. A forked child puts the
//! default dispositions back before exec, so the signals act on the child.
//!
//! Handlers cannot reach the interpreter, so the session loop publishes a
//! small snapshot here: whether it is still running and the current prompt.
//! The snapshot lives in atomics, which the handler can read without locks
//! or allocation.
//!
//! Installing a handler requires unsafe per POSIX; every unsafe block below
//! only touches signal dispositions or writes raw bytes to a standard fd.

use nix::libc;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::os::fd::BorrowedFd;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};

/// Longest prompt the handler will redraw; longer prompts are cut.
const PROMPT_CAPACITY: usize = 4096;

static RUNNING: AtomicBool = AtomicBool::new(false);
static PROMPT_LEN: AtomicUsize = AtomicUsize::new(0);
static PROMPT: [AtomicU8; PROMPT_CAPACITY] = [const { AtomicU8::new(0) }; PROMPT_CAPACITY];

const HANDLED: [Signal; 2] = [Signal::SIGINT, Signal::SIGTSTP];

/// Install the interpreter's handlers for SIGINT and SIGTSTP.
pub fn install() -> nix::Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(handle_signal),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    for sig in HANDLED {
        // SAFETY: the handler only performs atomic loads and write(2).
        unsafe {
            signal::sigaction(sig, &action)?;
        }
    }
    Ok(())
}

/// Put SIGINT and SIGTSTP back to their default disposition.
///
/// Called in a freshly forked child; only makes async-signal-safe calls.
pub fn restore_defaults() {
    for sig in HANDLED {
        // SAFETY: SIG_DFL runs no user code.
        let _ = unsafe { signal::signal(sig, SigHandler::SigDfl) };
    }
}

/// Publish the session state the handlers may read.
pub fn publish(running: bool, prompt: &str) {
    PROMPT_LEN.store(0, Ordering::Release);
    let bytes = prompt.as_bytes();
    let len = bytes.len().min(PROMPT_CAPACITY);
    for (slot, byte) in PROMPT.iter().zip(&bytes[..len]) {
        slot.store(*byte, Ordering::Relaxed);
    }
    PROMPT_LEN.store(len, Ordering::Release);
    RUNNING.store(running, Ordering::Release);
}

pub fn set_running(running: bool) {
    RUNNING.store(running, Ordering::Release);
}

pub fn is_running() -> bool {
    RUNNING.load(Ordering::Acquire)
}

/// Copy the published prompt into `buf`, returning its length.
fn copy_prompt(buf: &mut [u8]) -> usize {
    let len = PROMPT_LEN.load(Ordering::Acquire).min(buf.len());
    for (dst, src) in buf.iter_mut().zip(PROMPT.iter()).take(len) {
        *dst = src.load(Ordering::Relaxed);
    }
    len
}

extern "C" fn handle_signal(_signum: libc::c_int) {
    // SAFETY: stdout stays open for the lifetime of the process.
    let stdout = unsafe { BorrowedFd::borrow_raw(libc::STDOUT_FILENO) };
    let _ = nix::unistd::write(stdout, b"\n");
    if is_running() {
        let mut buf = [0u8; PROMPT_CAPACITY];
        let len = copy_prompt(&mut buf);
        let _ = nix::unistd::write(stdout, &buf[..len]);
    }
}
