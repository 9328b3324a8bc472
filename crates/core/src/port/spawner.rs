// Spawner Port - capability contract and shared state
// Backends declare how they launch work and inherit local-filesystem
// output retrieval they may override.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::Task;
use crate::error::{Result, SpawnError};
use crate::output::{self, ByteChunks, OutputEntries, OutputStream};

use super::results::ResultsDirResolver;
use super::settings::SettingsSnapshot;

/// The method employed to spawn a runnable or task.
///
/// A closed set of capability tags: membership in a spawner's declared
/// set is all they carry. Compare variants directly; no tag is ever
/// interchangeable with another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpawnMethod {
    /// Spawns by invoking a runnable inside the current process.
    InProcess,
    /// Spawns by executing an external command.
    StandaloneExecutable,
    /// Spawns with any method available; declares no preference.
    Any,
}

impl SpawnMethod {
    /// Every capability tag, for selection layers that enumerate.
    pub const ALL: [SpawnMethod; 3] = [
        SpawnMethod::InProcess,
        SpawnMethod::StandaloneExecutable,
        SpawnMethod::Any,
    ];
}

/// Result of a supervised launch.
#[derive(Debug, Clone)]
pub struct SpawnOutcome {
    pub status: SpawnStatus,
    pub exit_code: Option<i32>,
    pub duration_ms: i64,
}

/// Terminal status of a launched task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnStatus {
    Finished,
    Failed,
    TimedOut,
}

/// State and default behaviors shared by spawner implementations.
///
/// Holds the configuration snapshot verbatim (validation is each
/// backend's responsibility) and the per-job output root, which the
/// orchestrator assigns after construction. A spawner is configured
/// once and queried many times; per-task data only flows through call
/// parameters and return values.
pub struct SpawnerCommon {
    settings: SettingsSnapshot,
    job_output_dir: Option<PathBuf>,
    results: Arc<dyn ResultsDirResolver>,
}

impl SpawnerCommon {
    /// `settings: None` means "no explicit configuration"; loading a
    /// process-wide default snapshot is the composition root's job, not
    /// this layer's. No I/O happens here.
    pub fn new(
        settings: impl Into<Option<SettingsSnapshot>>,
        results: Arc<dyn ResultsDirResolver>,
    ) -> Self {
        Self {
            settings: settings.into().unwrap_or_default(),
            job_output_dir: None,
            results,
        }
    }

    pub fn settings(&self) -> &SettingsSnapshot {
        &self.settings
    }

    /// Assign the per-job output root. Owned by the orchestrator; the
    /// spawner only reads it.
    pub fn set_job_output_dir(&mut self, dir: impl Into<PathBuf>) {
        self.job_output_dir = Some(dir.into());
    }

    pub fn job_output_dir(&self) -> Option<&Path> {
        self.job_output_dir.as_deref()
    }

    /// Directory a backend should capture this task's stdout, stderr
    /// and artifacts into: `<job_output_dir>/<task fs name>`. Pure path
    /// computation; the directory is not created here.
    ///
    /// # Errors
    /// - [`SpawnError::OutputDirUnset`] when called before the job
    ///   output root was assigned.
    pub fn task_output_dir(&self, task: &Task) -> Result<PathBuf> {
        let root = self
            .job_output_dir
            .as_ref()
            .ok_or(SpawnError::OutputDirUnset)?;
        Ok(root.join(task.id.fs_name()))
    }

    /// Default output discovery: resolve the job's results directory
    /// through the injected resolver, then stream the files named by
    /// the task's results pointer. See [`OutputStream`] for ordering
    /// and skip rules.
    pub fn stream_output(&self, job_id: &str, task_id: &str) -> Result<OutputStream> {
        let results_dir = self.results.job_results_dir(job_id)?;
        output::open_output_stream(&results_dir, task_id)
    }
}

/// Capability contract every spawner backend satisfies.
///
/// The provided methods implement local-filesystem retrieval; a backend
/// that captures output elsewhere (a container, a remote host)
/// overrides `stream_output` and `read_file_bytes` with its own
/// transport while keeping the same shapes.
#[async_trait]
pub trait Spawner: Send + Sync {
    /// Capability tags this spawner declares. Selection layers match
    /// tasks against this set.
    fn methods(&self) -> &[SpawnMethod];

    /// Shared state backing the provided methods.
    fn common(&self) -> &SpawnerCommon;

    /// Launch a task and supervise it to completion, capturing output
    /// under [`Spawner::task_output_dir`].
    ///
    /// # Errors
    /// - `SpawnError::SpawnFailed` if the task cannot be started
    async fn spawn_task(&self, task: &Task) -> Result<SpawnOutcome>;

    /// Whether a launched task's process is still running.
    fn is_task_alive(&self, pid: i32) -> bool;

    /// See [`SpawnerCommon::task_output_dir`].
    fn task_output_dir(&self, task: &Task) -> Result<PathBuf> {
        self.common().task_output_dir(task)
    }

    /// Efficient whole-file read for *local* output files. Overridable:
    /// backends whose output is not a local file replace it. See
    /// [`output::read_file_bytes`].
    fn read_file_bytes(&self, path: &Path) -> std::io::Result<ByteChunks> {
        Ok(Box::new(output::read_file_bytes(path)?))
    }

    /// Discover and stream a task's result files as `(name, bytes)`
    /// pairs. Overridable: remote backends fetch by their own means but
    /// preserve the pair contract.
    fn stream_output(&self, job_id: &str, task_id: &str) -> Result<OutputEntries> {
        Ok(Box::new(self.common().stream_output(job_id, task_id)?))
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;

    /// In-memory spawner for exercising the contract in tests.
    pub struct MockSpawner {
        common: SpawnerCommon,
        methods: Vec<SpawnMethod>,
    }

    impl MockSpawner {
        pub fn new(common: SpawnerCommon, methods: Vec<SpawnMethod>) -> Self {
            Self { common, methods }
        }

        pub fn common_mut(&mut self) -> &mut SpawnerCommon {
            &mut self.common
        }
    }

    #[async_trait]
    impl Spawner for MockSpawner {
        fn methods(&self) -> &[SpawnMethod] {
            &self.methods
        }

        fn common(&self) -> &SpawnerCommon {
            &self.common
        }

        async fn spawn_task(&self, _task: &Task) -> Result<SpawnOutcome> {
            Ok(SpawnOutcome {
                status: SpawnStatus::Finished,
                exit_code: Some(0),
                duration_ms: 0,
            })
        }

        fn is_task_alive(&self, _pid: i32) -> bool {
            false
        }
    }
}
