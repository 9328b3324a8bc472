// Process spawner implementation
// Launches a task's runnable as a child process on this host, capturing
// stdout and stderr into files under the task's output directory.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

use brood_core::domain::Task;
use brood_core::error::{Result, SpawnError};
use brood_core::port::{
    SpawnMethod, SpawnOutcome, SpawnStatus, Spawner, SpawnerCommon, TimeProvider,
};

/// Settings keys the process spawner understands.
const TIMEOUT_MS_KEY: &str = "spawner.process.timeout_ms";
const ENV_ALLOWLIST_KEY: &str = "spawner.process.env_allowlist";

const STDOUT_FILE: &str = "stdout";
const STDERR_FILE: &str = "stderr";

const METHODS: &[SpawnMethod] = &[SpawnMethod::StandaloneExecutable];

/// Spawner backend for standalone executables.
///
/// The child runs with a cleared environment re-populated from an
/// allowlist, so task output cannot depend on incidental host state.
/// Both the allowlist and an optional overall deadline come from the
/// settings snapshot; output retrieval is inherited from the core
/// defaults since everything is captured locally.
pub struct ProcessSpawner {
    common: SpawnerCommon,
    time_provider: Arc<dyn TimeProvider>,
    env_allowlist: Vec<String>,
    timeout_ms: Option<i64>,
}

impl ProcessSpawner {
    pub fn new(common: SpawnerCommon, time_provider: Arc<dyn TimeProvider>) -> Self {
        let env_allowlist = common
            .settings()
            .get(ENV_ALLOWLIST_KEY)
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_else(default_env_allowlist);
        let timeout_ms = common.settings().get_i64(TIMEOUT_MS_KEY);

        Self {
            common,
            time_provider,
            env_allowlist,
            timeout_ms,
        }
    }

    /// One-shot hand-over of the job output root from the orchestrator.
    pub fn set_job_output_dir(&mut self, dir: impl Into<PathBuf>) {
        self.common.set_job_output_dir(dir);
    }

    /// Allowlisted view of this process's environment.
    fn filtered_env(&self) -> Vec<(String, String)> {
        std::env::vars()
            .filter(|(k, _)| self.env_allowlist.contains(k))
            .collect()
    }
}

fn default_env_allowlist() -> Vec<String> {
    ["PATH", "HOME", "USER"].map(String::from).to_vec()
}

#[async_trait]
impl Spawner for ProcessSpawner {
    fn methods(&self) -> &[SpawnMethod] {
        METHODS
    }

    fn common(&self) -> &SpawnerCommon {
        &self.common
    }

    async fn spawn_task(&self, task: &Task) -> Result<SpawnOutcome> {
        let out_dir = self.common.task_output_dir(task)?;
        tokio::fs::create_dir_all(&out_dir).await?;

        let stdout = std::fs::File::create(out_dir.join(STDOUT_FILE))?;
        let stderr = std::fs::File::create(out_dir.join(STDERR_FILE))?;

        let started = self.time_provider.now_millis();
        info!(
            task = %task.id,
            command = %task.runnable.command,
            out_dir = %out_dir.display(),
            "spawning task"
        );

        let mut child = Command::new(&task.runnable.command)
            .args(&task.runnable.args)
            .env_clear()
            .envs(self.filtered_env())
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .spawn()
            .map_err(|e| SpawnError::SpawnFailed(e.to_string()))?;

        let exit = if let Some(ms) = self.timeout_ms {
            match timeout(Duration::from_millis(ms.max(0) as u64), child.wait()).await {
                Ok(waited) => waited?,
                Err(_) => {
                    warn!(task = %task.id, timeout_ms = ms, "task exceeded its deadline, killing");
                    child.kill().await?;
                    return Ok(SpawnOutcome {
                        status: SpawnStatus::TimedOut,
                        exit_code: None,
                        duration_ms: self.time_provider.now_millis() - started,
                    });
                }
            }
        } else {
            child.wait().await?
        };

        let duration_ms = self.time_provider.now_millis() - started;
        let outcome = SpawnOutcome {
            status: if exit.success() {
                SpawnStatus::Finished
            } else {
                SpawnStatus::Failed
            },
            exit_code: exit.code(),
            duration_ms,
        };

        info!(
            task = %task.id,
            exit_code = ?outcome.exit_code,
            duration_ms = %duration_ms,
            status = ?outcome.status,
            "task finished"
        );

        Ok(outcome)
    }

    fn is_task_alive(&self, pid: i32) -> bool {
        #[cfg(unix)]
        {
            use nix::sys::signal::kill;
            use nix::unistd::Pid;

            // Signal 0 probes for existence without delivering anything.
            kill(Pid::from_raw(pid), None).is_ok()
        }

        #[cfg(not(unix))]
        {
            let _ = pid;
            false
        }
    }
}
