//! Task file parsing and validation
//!
//! A task file is an ordered list of steps, each either a script run through
//! the interpreter or a program run directly.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::command::CommandSpec;
use crate::error::RunnerError;

pub const TASK_SCHEMA: &str = "scriptrun/task@0.1";

fn default_enabled() -> bool {
    true
}

fn default_interpreter() -> String {
    "bash".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TaskFile {
    pub schema: String,
    #[serde(default)]
    pub name: Option<String>,
    /// `false` skips every step
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
    pub steps: Vec<Step>,
}

/// One step; exactly one of `script` or `command` must be set
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
    /// Working directory for `command` steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
}

/// A validated step with paths resolved against the task file's directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    Script(PathBuf),
    Command(CommandSpec),
}

impl TaskFile {
    pub fn from_yaml(yaml: &str) -> Result<Self, RunnerError> {
        let task: TaskFile = serde_yaml::from_str(yaml)?;
        task.validate()?;
        Ok(task)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RunnerError> {
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("task")
    }

    pub fn validate(&self) -> Result<(), RunnerError> {
        if self.schema != TASK_SCHEMA {
            return Err(RunnerError::TaskFile(format!(
                "Invalid schema: expected '{}', got '{}'",
                TASK_SCHEMA, self.schema
            )));
        }
        if self.interpreter.trim().is_empty() {
            return Err(RunnerError::TaskFile("interpreter is empty".to_string()));
        }
        if self.steps.is_empty() {
            return Err(RunnerError::TaskFile("no steps declared".to_string()));
        }
        for (index, step) in self.steps.iter().enumerate() {
            step.validate()
                .map_err(|msg| RunnerError::TaskFile(format!("step {}: {}", index + 1, msg)))?;
        }
        Ok(())
    }

    /// Resolve every step against `base_dir` (normally the task file's directory).
    pub fn actions(&self, base_dir: &Path) -> Result<Vec<StepAction>, RunnerError> {
        self.steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                step.resolve(base_dir)
                    .map_err(|msg| RunnerError::TaskFile(format!("step {}: {}", index + 1, msg)))
            })
            .collect()
    }
}

impl Step {
    fn validate(&self) -> Result<(), String> {
        match (&self.script, &self.command) {
            (Some(_), Some(_)) => Err("declares both `script` and `command`".to_string()),
            (None, None) => Err("needs `script` or `command`".to_string()),
            (Some(script), None) => {
                if script.as_os_str().is_empty() {
                    return Err("`script` is empty".to_string());
                }
                if self.cwd.is_some() {
                    return Err("`cwd` is only valid on `command` steps".to_string());
                }
                Ok(())
            }
            (None, Some(argv)) => match argv.first() {
                Some(program) if !program.is_empty() => Ok(()),
                _ => Err("`command` is empty".to_string()),
            },
        }
    }

    fn resolve(&self, base_dir: &Path) -> Result<StepAction, String> {
        self.validate()?;
        if let Some(ref script) = self.script {
            return Ok(StepAction::Script(base_dir.join(script)));
        }
        // validate() guarantees a non-empty command here
        let argv = self.command.as_deref().unwrap_or_default();
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| "`command` is empty".to_string())?;
        let cwd = match self.cwd {
            Some(ref cwd) => base_dir.join(cwd),
            None => base_dir.to_path_buf(),
        };
        Ok(StepAction::Command(
            CommandSpec::new(program)
                .args(args)
                .current_dir(Some(cwd)),
        ))
    }
}
