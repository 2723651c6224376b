//! scriptrun CLI

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use scriptrun::invocation::working_directory_of;
use scriptrun::{FixSuggestion, RunnerError, ScriptRunner, TaskFile};

#[derive(Parser)]
#[command(name = "scriptrun")]
#[command(about = "Run scripts from their own directory with passthrough output")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single script
    Run {
        /// Path to the script
        script: PathBuf,

        /// Interpreter used to run the script
        #[arg(short, long, default_value = "bash")]
        interpreter: String,

        /// Print the status messages without running the script
        #[arg(long)]
        skip: bool,
    },

    /// Run every step of a task file
    Task {
        /// Path to the task YAML file
        file: PathBuf,

        /// Skip all steps regardless of `enabled`
        #[arg(long)]
        skip: bool,
    },

    /// Validate a task file (parse only)
    Validate {
        /// Path to the task YAML file
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() {
    // Logs go to stderr and stay quiet by default so they never interleave
    // with the child's output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            script,
            interpreter,
            skip,
        } => run_script(&script, &interpreter, skip),
        Commands::Task { file, skip } => run_task(&file, skip),
        Commands::Validate { file, format } => validate_task(&file, format),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        let runner_error = e.downcast_ref::<RunnerError>();
        if let Some(suggestion) = runner_error.and_then(|err| err.fix_suggestion()) {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(runner_error.map_or(1, RunnerError::exit_code));
    }
}

fn run_script(script: &Path, interpreter: &str, skip: bool) -> Result<()> {
    println!("{} Running script: {}", "→".cyan(), script.display());

    if skip {
        tracing::warn!(script = %script.display(), "invocation skipped");
    } else {
        ScriptRunner::new()
            .with_interpreter(interpreter)
            .run(script)?;
    }

    println!("{} Script completed.", "✓".green());
    Ok(())
}

fn run_task(file: &Path, skip: bool) -> Result<()> {
    let mut task = load_task(file)?;
    if skip {
        task.enabled = false;
    }

    println!("{} Running task: {}", "→".cyan(), task.display_name().bold());

    let base_dir = working_directory_of(file).unwrap_or_else(|| PathBuf::from("."));
    let report = ScriptRunner::new().run_task(&task, &base_dir)?;

    if report.skipped {
        println!("{} Task skipped.", "○".yellow());
    } else {
        println!(
            "{} Task completed: {} steps in {}ms",
            "✓".green(),
            report.steps.len(),
            report.duration_ms
        );
    }
    Ok(())
}

fn validate_task(file: &Path, format: Format) -> Result<()> {
    let task = load_task(file)?;

    match format {
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        Format::Text => {
            println!("{} Task '{}' is valid", "✓".green(), file.display());
            println!("  Name: {}", task.display_name());
            println!("  Interpreter: {}", task.interpreter);
            println!("  Enabled: {}", task.enabled);
            println!("  Steps: {}", task.steps.len());
        }
    }
    Ok(())
}

fn load_task(file: &Path) -> Result<TaskFile> {
    TaskFile::load(file).with_context(|| format!("Failed to load task file '{}'", file.display()))
}
