//! External command execution.
//!
//! Discovery talks to diagnostic tools only through [`CommandRunner`], so tests
//! can swap in a scripted runner without spawning anything.

use std::process::Command;

use log::debug;

/// Captured result of one command invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process could not be spawned or was killed
    /// by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Capability to probe for and execute external programs.
pub trait CommandRunner {
    /// Whether `program` can be found without running it.
    fn exists(&self, program: &str) -> bool;

    /// Runs `program` to completion. Never fails: spawn errors come back as an
    /// output with no exit code.
    fn run(&self, program: &str, args: &[String]) -> CommandOutput;
}

/// Runs real processes found on `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn exists(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }

    fn run(&self, program: &str, args: &[String]) -> CommandOutput {
        debug!("running {program} {}", args.join(" "));
        match Command::new(program).args(args).output() {
            Ok(output) => CommandOutput {
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            },
            Err(e) => {
                debug!("failed to spawn {program}: {e}");
                CommandOutput {
                    code: None,
                    stdout: String::new(),
                    stderr: e.to_string(),
                }
            }
        }
    }
}

/// Whether the current process already has root privileges.
#[cfg(unix)]
pub fn running_as_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
pub fn running_as_root() -> bool {
    false
}
