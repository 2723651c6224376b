//! A single script invocation
//!
//! Created per call, filled in once the child exits, then handed back to the
//! caller as the success value.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Path as given by the caller
    pub script_path: PathBuf,
    /// Parent directory of `script_path`; `None` means inherit the caller's cwd
    pub working_directory: Option<PathBuf>,
    /// Populated after the child terminates
    pub exit_code: Option<i32>,
}

impl Invocation {
    pub fn new(script_path: impl Into<PathBuf>) -> Self {
        let script_path = script_path.into();
        let working_directory = working_directory_of(&script_path);
        Self {
            script_path,
            working_directory,
            exit_code: None,
        }
    }

    /// Argument handed to the interpreter.
    ///
    /// The child already runs inside `working_directory`, so only the file name
    /// is passed; otherwise `scripts/test.sh` would resolve to
    /// `scripts/scripts/test.sh`. The name is always prefixed with `./` so the
    /// interpreter never falls back to a `PATH` lookup.
    pub fn script_argument(&self) -> PathBuf {
        match self.script_path.file_name() {
            Some(name) => Path::new(".").join(name),
            None => self.script_path.clone(),
        }
    }
}

/// Directory component of `path`, or `None` for a bare file name.
pub fn working_directory_of(path: &Path) -> Option<PathBuf> {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
}
