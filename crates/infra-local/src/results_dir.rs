// Filesystem lookup of a job's results directory

use std::fs;
use std::path::PathBuf;

use brood_core::error::{Result, SpawnError};
use brood_core::port::ResultsDirResolver;

/// Shortened-id suffix length accepted in directory names.
const SHORT_ID_LEN: usize = 7;

/// Resolves job ids against a base directory of per-job result trees.
///
/// Accepts either the directory's exact name or a directory whose name
/// ends with `-<first 7 chars of the id>`, the shortened form job
/// directories are stamped with. A shortened match must be unique;
/// anything else is a lookup failure.
pub struct FsResultsDirs {
    base_dir: PathBuf,
}

impl FsResultsDirs {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl ResultsDirResolver for FsResultsDirs {
    fn job_results_dir(&self, job_id: &str) -> Result<PathBuf> {
        let exact = self.base_dir.join(job_id);
        if exact.is_dir() {
            return Ok(exact);
        }

        if job_id.is_empty() {
            return Err(SpawnError::JobResultsNotFound(job_id.to_string()));
        }

        let short: String = job_id.chars().take(SHORT_ID_LEN).collect();
        let suffix = format!("-{short}");
        let mut matched = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if entry.file_name().to_string_lossy().ends_with(&suffix) {
                matched.push(entry.path());
            }
        }

        match matched.len() {
            1 => Ok(matched.remove(0)),
            _ => Err(SpawnError::JobResultsNotFound(job_id.to_string())),
        }
    }
}
