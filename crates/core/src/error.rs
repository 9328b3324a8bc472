// Central error type for the spawner core

use thiserror::Error;

/// Errors surfaced by spawners and their collaborators.
#[derive(Error, Debug)]
pub enum SpawnError {
    /// The task's output directory, as named by its results pointer,
    /// could not be located on disk at retrieval time. This is the only
    /// error the core translates; every other I/O failure passes
    /// through as [`SpawnError::Io`].
    #[error("no discoverable output for task {task_id}: {source}")]
    OutputNotFound {
        task_id: String,
        #[source]
        source: std::io::Error,
    },

    /// `task_output_dir` was invoked before the orchestrator assigned
    /// the job output root. A programming error, surfaced immediately
    /// instead of producing a malformed path.
    #[error("job output directory has not been assigned")]
    OutputDirUnset,

    #[error("results directory not found for job {0}")]
    JobResultsNotFound(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("spawn failed: {0}")]
    SpawnFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using SpawnError
pub type Result<T> = std::result::Result<T, SpawnError>;
