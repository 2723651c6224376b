//! Script runner
//!
//! Runs a script through an interpreter from the script's own directory and
//! reports success or the child's exit code. Task files are run step by step
//! on top of the same primitive.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;

use colored::Colorize;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::command::CommandSpec;
use crate::error::RunnerError;
use crate::invocation::Invocation;
use crate::task::{StepAction, TaskFile};

const DEFAULT_INTERPRETER: &str = "bash";

/// Runs scripts synchronously with passthrough output
///
/// Holds configuration only; every call is independent.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    interpreter: OsString,
    interpreter_args: Vec<OsString>,
}

impl ScriptRunner {
    /// Create a runner using `bash`
    pub fn new() -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.into(),
            interpreter_args: Vec::new(),
        }
    }

    /// Set the interpreter program
    pub fn with_interpreter(mut self, interpreter: impl Into<OsString>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// Arguments placed between the interpreter and the script
    pub fn with_interpreter_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.interpreter_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn interpreter(&self) -> &std::ffi::OsStr {
        &self.interpreter
    }

    /// Command line that `run` would spawn for `invocation`
    pub fn command_for(&self, invocation: &Invocation) -> CommandSpec {
        CommandSpec::new(self.interpreter.clone())
            .args(self.interpreter_args.iter().cloned())
            .arg(invocation.script_argument())
            .current_dir(invocation.working_directory.clone())
    }

    /// Run one script, blocking until it exits.
    ///
    /// The script's existence is not checked here: a missing file surfaces as
    /// the interpreter's own exit code.
    #[instrument(skip(self, script_path), fields(script = %script_path.as_ref().display()))]
    pub fn run(&self, script_path: impl AsRef<Path>) -> Result<Invocation, RunnerError> {
        let script_path = script_path.as_ref();
        if script_path.as_os_str().is_empty() {
            return Err(RunnerError::EmptyPath);
        }

        let mut invocation = Invocation::new(script_path);
        let code = self.command_for(&invocation).execute()?;
        invocation.exit_code = Some(code);

        info!("script completed");
        Ok(invocation)
    }

    /// Run every step of `task` in order, stopping at the first failure.
    ///
    /// Relative paths in the task resolve against `base_dir`. Each step's
    /// command line is printed before it starts. A disabled task spawns nothing
    /// and reports itself as skipped.
    #[instrument(skip(self, task), fields(task = task.display_name()))]
    pub fn run_task(&self, task: &TaskFile, base_dir: &Path) -> Result<TaskReport, RunnerError> {
        let mut report = TaskReport::new(task.display_name());

        if !task.enabled {
            warn!("task disabled, skipping all steps");
            report.skipped = true;
            return Ok(report);
        }

        let actions = task.actions(base_dir)?;
        let runner = self.clone().with_interpreter(&task.interpreter);
        let start = Instant::now();

        for action in actions {
            let spec = match action {
                StepAction::Script(ref path) => runner.command_for(&Invocation::new(path)),
                StepAction::Command(ref spec) => spec.clone(),
            };
            println!("{} Running command: {}", "→".cyan(), spec);

            let exit_code = match action {
                StepAction::Script(path) => runner.run(&path)?.exit_code.unwrap_or_default(),
                StepAction::Command(_) => spec.execute()?,
            };
            report.steps.push(StepOutcome {
                command: spec.to_string(),
                working_directory: spec.cwd,
                exit_code,
            });
        }

        report.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(steps = report.steps.len(), duration_ms = report.duration_ms, "task completed");
        Ok(report)
    }
}

impl Default for ScriptRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a task run
#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    pub name: String,
    pub skipped: bool,
    /// Completed steps in execution order
    pub steps: Vec<StepOutcome>,
    pub duration_ms: u64,
}

impl TaskReport {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            skipped: false,
            steps: Vec::new(),
            duration_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub command: String,
    pub working_directory: Option<PathBuf>,
    pub exit_code: i32,
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/usr/bin/env bash\n{}\n", body)).unwrap();
        path
    }

    #[test]
    fn exit_zero_returns_invocation() {
        let temp = TempDir::new().unwrap();
        let script = write_script(temp.path(), "ok.sh", "exit 0");

        let invocation = ScriptRunner::new().run(&script).unwrap();
        assert_eq!(invocation.exit_code, Some(0));
        assert_eq!(invocation.script_path, script);
    }

    #[test]
    fn exit_three_fails_with_three() {
        let temp = TempDir::new().unwrap();
        let script = write_script(temp.path(), "fail.sh", "exit 3");

        let err = ScriptRunner::new().run(&script).unwrap_err();
        assert!(matches!(err, RunnerError::ScriptExecution { code: 3 }));
    }

    #[test]
    fn runs_inside_script_directory() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("scripts");
        fs::create_dir(&nested).unwrap();
        let script = write_script(&nested, "where.sh", "pwd -P > where.txt");

        let invocation = ScriptRunner::new().run(&script).unwrap();
        assert_eq!(invocation.working_directory.as_deref(), Some(nested.as_path()));

        let recorded = fs::read_to_string(nested.join("where.txt")).unwrap();
        let expected = nested.canonicalize().unwrap();
        assert_eq!(Path::new(recorded.trim()), expected);
    }

    #[test]
    fn missing_script_is_exit_127() {
        let temp = TempDir::new().unwrap();
        let err = ScriptRunner::new()
            .run(temp.path().join("missing.sh"))
            .unwrap_err();
        assert!(matches!(err, RunnerError::ScriptExecution { code: 127 }));
    }

    #[test]
    fn missing_interpreter_is_launch_failure() {
        let temp = TempDir::new().unwrap();
        let script = write_script(temp.path(), "ok.sh", "exit 0");

        let err = ScriptRunner::new()
            .with_interpreter("scriptrun-no-such-shell")
            .run(&script)
            .unwrap_err();
        assert!(matches!(err, RunnerError::Launch { .. }));
    }

    #[test]
    fn empty_path_is_rejected() {
        assert!(matches!(
            ScriptRunner::new().run(""),
            Err(RunnerError::EmptyPath)
        ));
    }

    #[test]
    fn interpreter_args_precede_script() {
        let runner = ScriptRunner::new()
            .with_interpreter("sh")
            .with_interpreter_args(["-e"]);
        let spec = runner.command_for(&Invocation::new("scripts/test.sh"));
        assert_eq!(spec.to_string(), "sh -e ./test.sh");
        assert_eq!(spec.cwd, Some(PathBuf::from("scripts")));
    }

    #[test]
    fn interpreter_args_take_effect() {
        let temp = TempDir::new().unwrap();
        let script = write_script(temp.path(), "strict.sh", "false\nexit 0");

        assert!(ScriptRunner::new().run(&script).is_ok());
        let err = ScriptRunner::new()
            .with_interpreter_args(["-e"])
            .run(&script)
            .unwrap_err();
        assert!(matches!(err, RunnerError::ScriptExecution { code: 1 }));
    }

    #[test]
    fn task_runs_steps_in_order() {
        let temp = TempDir::new().unwrap();
        write_script(temp.path(), "first.sh", "echo first >> log.txt");
        let yaml = r#"
schema: scriptrun/task@0.1
steps:
  - script: first.sh
  - command: [sh, -c, "echo second >> log.txt"]
"#;
        let task = TaskFile::from_yaml(yaml).unwrap();
        let report = ScriptRunner::new().run_task(&task, temp.path()).unwrap();

        assert!(!report.skipped);
        assert_eq!(report.steps.len(), 2);
        let log = fs::read_to_string(temp.path().join("log.txt")).unwrap();
        assert_eq!(log, "first\nsecond\n");
    }

    #[test]
    fn task_stops_at_first_failure() {
        let temp = TempDir::new().unwrap();
        write_script(temp.path(), "fail.sh", "exit 4");
        let yaml = r#"
schema: scriptrun/task@0.1
steps:
  - script: fail.sh
  - command: [touch, never.txt]
"#;
        let task = TaskFile::from_yaml(yaml).unwrap();
        let err = ScriptRunner::new().run_task(&task, temp.path()).unwrap_err();

        assert!(matches!(err, RunnerError::ScriptExecution { code: 4 }));
        assert!(!temp.path().join("never.txt").exists());
    }

    #[test]
    fn disabled_task_spawns_nothing() {
        let temp = TempDir::new().unwrap();
        let yaml = r#"
schema: scriptrun/task@0.1
enabled: false
steps:
  - command: [touch, never.txt]
"#;
        let task = TaskFile::from_yaml(yaml).unwrap();
        let report = ScriptRunner::new().run_task(&task, temp.path()).unwrap();

        assert!(report.skipped);
        assert!(report.steps.is_empty());
        assert!(!temp.path().join("never.txt").exists());
    }
}
