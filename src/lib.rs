//! scriptrun - run scripts from their own directory with passthrough output

pub mod command;
pub mod error;
pub mod invocation;
pub mod runner;
pub mod task;

pub use command::CommandSpec;
pub use error::{FixSuggestion, RunnerError};
pub use invocation::Invocation;
pub use runner::{ScriptRunner, StepOutcome, TaskReport};
pub use task::{Step, StepAction, TaskFile, TASK_SCHEMA};
