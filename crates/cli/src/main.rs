//! Brood CLI - Composition root for the spawner stack
//!
//! `brood run` plays the orchestrator for a single task: it creates the
//! job's result tree, spawns the task through the process backend and
//! records the results pointer. `brood output` then streams the
//! captured files back.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use brood_core::domain::{safe_path, Runnable, Task, TaskId};
use brood_core::port::time_provider::SystemTimeProvider;
use brood_core::port::{SettingsProvider, Spawner, SpawnerCommon};
use brood_infra_local::{FileSettings, FsResultsDirs, ProcessSpawner};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_BASE_DIR: &str = "~/.brood/jobs";

#[derive(Parser)]
#[command(name = "brood")]
#[command(about = "Brood spawner front-end", long_about = None)]
#[command(version = VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base directory holding per-job result trees
    #[arg(long, env = "BROOD_BASE_DIR", default_value = DEFAULT_BASE_DIR)]
    base_dir: String,

    /// Optional settings file (TOML)
    #[arg(long, env = "BROOD_SETTINGS")]
    settings: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Spawn a single task and record where its output landed
    Run {
        /// Task name used in identifiers and the output directory
        #[arg(short, long, default_value = "task")]
        name: String,

        /// Command and arguments to execute
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        command: Vec<String>,
    },

    /// Stream a finished task's captured output files to stdout
    Output {
        /// Job identifier (full or shortened)
        #[arg(long)]
        job_id: String,

        /// Task identifier, e.g. "1-task"
        #[arg(long)]
        task_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let base_dir = PathBuf::from(shellexpand::tilde(&cli.base_dir).into_owned());

    let settings = FileSettings::new(cli.settings.clone())
        .snapshot()
        .context("loading settings")?;
    let resolver = Arc::new(FsResultsDirs::new(base_dir.clone()));

    match cli.command {
        Commands::Run { name, command } => {
            let job_id = uuid::Uuid::new_v4().to_string();
            let job_dir = base_dir.join(&job_id);

            // Orchestrator role: the job output root exists before the
            // spawner is handed to it.
            let output_root = job_dir.join("output");
            std::fs::create_dir_all(&output_root).context("creating job output root")?;

            let common = SpawnerCommon::new(settings, resolver);
            let mut spawner = ProcessSpawner::new(common, Arc::new(SystemTimeProvider));
            spawner.set_job_output_dir(&output_root);

            let (program, args) = command
                .split_first()
                .context("empty command")?;
            let task = Task::new(
                TaskId::new(1, name),
                Runnable::new(program.clone(), args.to_vec()),
            );

            let out_dir = spawner.task_output_dir(&task)?;
            let outcome = spawner.spawn_task(&task).await?;

            write_results_pointer(&job_dir, &task.id.to_string(), &out_dir)
                .context("recording results pointer")?;

            info!(job_id = %job_id, task_id = %task.id, "task recorded");
            println!(
                "job {} task {} {:?} (exit code {:?}, {} ms)",
                job_id, task.id, outcome.status, outcome.exit_code, outcome.duration_ms
            );
            println!("retrieve with: brood output --job-id {} --task-id {}", job_id, task.id);
        }

        Commands::Output { job_id, task_id } => {
            let common = SpawnerCommon::new(settings, resolver);
            let spawner = ProcessSpawner::new(common, Arc::new(SystemTimeProvider));

            let stdout = std::io::stdout();
            let mut sink = stdout.lock();
            let mut seen = 0usize;
            for entry in spawner.stream_output(&job_id, &task_id)? {
                let (file_name, bytes) = entry?;
                println!("==> {file_name} <==");
                sink.write_all(&bytes)?;
                sink.flush()?;
                seen += 1;
            }
            if seen == 0 {
                bail!("task {task_id} produced no non-empty output files");
            }
        }
    }

    Ok(())
}

/// Write `<job_dir>/test-results/<safe task id>/data` pointing at the
/// directory the task's output was captured into.
fn write_results_pointer(job_dir: &Path, task_id: &str, out_dir: &Path) -> Result<()> {
    let pointer_dir = job_dir
        .join("test-results")
        .join(safe_path::to_safe_path(task_id));
    std::fs::create_dir_all(&pointer_dir)?;
    std::fs::write(pointer_dir.join("data"), format!("{}\n", out_dir.display()))?;
    Ok(())
}

fn init_logging() {
    let log_format = std::env::var("BROOD_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("brood=info"))
        .expect("Failed to create env filter");

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            // Development: pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
}
