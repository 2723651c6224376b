//! Program execution with inherited stdio
//!
//! The primitive both scripts and task-file commands go through: spawn,
//! let the child write straight to our stdout/stderr, wait, map the status.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use tracing::{debug, instrument};

use crate::error::RunnerError;

/// A program, its arguments, and the directory to start it in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: OsString,
    pub args: Vec<OsString>,
    /// `None` inherits the caller's working directory
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, cwd: Option<PathBuf>) -> Self {
        self.cwd = cwd;
        self
    }

    /// Spawn, wait, and return the exit code (always 0 on `Ok`).
    #[instrument(skip(self), fields(command = %self))]
    pub fn execute(&self) -> Result<i32, RunnerError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        debug!(cwd = ?self.cwd, "spawning child");

        let mut child = cmd.spawn().map_err(|source| RunnerError::Launch {
            program: self.program.to_string_lossy().into_owned(),
            source,
        })?;

        let status = child.wait()?;
        let code = exit_code(status);
        debug!(code, "child exited");

        if code == 0 {
            Ok(code)
        } else {
            Err(RunnerError::ScriptExecution { code })
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Numeric exit code; a child killed by signal `n` reports `128 + n`.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}
