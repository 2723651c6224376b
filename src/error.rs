//! Error types with fix suggestions

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum RunnerError {
    /// The child ran to completion but reported failure.
    #[error("Script execution failed with exit code {code}")]
    ScriptExecution { code: i32 },

    /// The interpreter (or command) could not be started at all.
    #[error("Failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Script path is empty")]
    EmptyPath,

    #[error("Invalid task file: {0}")]
    TaskFile(String),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunnerError {
    /// Exit code the calling program should terminate with.
    ///
    /// A failed child propagates its own code; everything else is 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunnerError::ScriptExecution { code } if *code != 0 => *code,
            _ => 1,
        }
    }
}

impl FixSuggestion for RunnerError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            RunnerError::ScriptExecution { code: 126 } => {
                Some("The script is not executable by the interpreter (check permissions)")
            }
            RunnerError::ScriptExecution { code: 127 } => {
                Some("Check the script path exists relative to the current directory")
            }
            RunnerError::ScriptExecution { .. } => {
                Some("Inspect the script output above for the failing command")
            }
            RunnerError::Launch { .. } => {
                Some("Check the interpreter is installed and the script directory exists")
            }
            RunnerError::EmptyPath => Some("Pass the path of the script to run"),
            RunnerError::TaskFile(_) => {
                Some("Each step needs exactly one of `script:` or `command:`")
            }
            RunnerError::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            RunnerError::Io(_) => Some("Check file path and permissions"),
        }
    }
}
