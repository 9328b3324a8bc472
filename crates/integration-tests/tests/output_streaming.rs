//! End-to-end output discovery: filesystem resolver + spawner contract
//! against a realistic per-job result tree.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use brood_core::domain::safe_path;
use brood_core::error::{Result, SpawnError};
use brood_core::output::{FileChunk, OutputEntries};
use brood_core::port::spawner::mocks::MockSpawner;
use brood_core::port::{SpawnMethod, Spawner, SpawnerCommon};
use brood_infra_local::FsResultsDirs;

const JOB_ID: &str = "8b5a1f2c94de11f0";
const JOB_DIR: &str = "job-2026-08-05T10.00-8b5a1f2";
const TASK_ID: &str = "1-suite/case";

/// Lay out `<base>/<job dir>/test-results/<safe task id>/data` pointing
/// at a captured-output directory, returning the base and that directory.
fn job_tree(pointer_line: Option<String>) -> (TempDir, PathBuf) {
    let base = TempDir::new().unwrap();
    let job_dir = base.path().join(JOB_DIR);
    let captured = job_dir.join("output").join("1-suite_case");
    fs::create_dir_all(&captured).unwrap();

    let pointer_dir = job_dir
        .join("test-results")
        .join(safe_path::to_safe_path(TASK_ID));
    fs::create_dir_all(&pointer_dir).unwrap();
    let line = pointer_line.unwrap_or_else(|| format!("{}\n", captured.display()));
    fs::write(pointer_dir.join("data"), line).unwrap();

    (base, captured)
}

fn spawner_over(base: &Path) -> MockSpawner {
    let common = SpawnerCommon::new(None, Arc::new(FsResultsDirs::new(base)));
    MockSpawner::new(common, vec![SpawnMethod::Any])
}

fn collect(entries: OutputEntries) -> Result<Vec<(String, FileChunk)>> {
    entries.collect()
}

#[test]
fn test_streams_through_shortened_job_id() {
    let (base, captured) = job_tree(None);
    fs::write(captured.join("a.txt"), b"0123456789").unwrap();
    fs::write(captured.join("b.txt"), b"").unwrap();
    fs::create_dir(captured.join("sub")).unwrap();

    let spawner = spawner_over(base.path());
    let entries = collect(spawner.stream_output(JOB_ID, TASK_ID).unwrap()).unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, "a.txt");
    assert_eq!(&*entries[0].1, b"0123456789");
}

#[test]
fn test_unknown_job_fails_resolution() {
    let (base, _captured) = job_tree(None);

    let spawner = spawner_over(base.path());
    // `.err().unwrap()` rather than `.unwrap_err()`: the Ok type is a
    // boxed iterator that cannot implement Debug, which unwrap_err needs.
    let err = spawner.stream_output("ffffffffffff", TASK_ID).err().unwrap();
    assert!(matches!(err, SpawnError::JobResultsNotFound(_)));
}

#[test]
fn test_vanished_output_dir_identifies_task() {
    let (base, captured) = job_tree(None);
    fs::remove_dir_all(&captured).unwrap();

    let spawner = spawner_over(base.path());
    // `.err().unwrap()` rather than `.unwrap_err()`: the Ok type is a
    // boxed iterator that cannot implement Debug, which unwrap_err needs.
    let err = spawner.stream_output(JOB_ID, TASK_ID).err().unwrap();
    match err {
        SpawnError::OutputNotFound { ref task_id, .. } => assert_eq!(task_id, TASK_ID),
        other => panic!("expected OutputNotFound, got {other:?}"),
    }
}

#[test]
fn test_successive_streams_are_independent_and_consistent() {
    let (base, captured) = job_tree(None);
    fs::write(captured.join("stdout"), b"stable").unwrap();

    let spawner = spawner_over(base.path());
    let first = collect(spawner.stream_output(JOB_ID, TASK_ID).unwrap()).unwrap();
    let second = collect(spawner.stream_output(JOB_ID, TASK_ID).unwrap()).unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(first[0].0, second[0].0);
    assert_eq!(&*first[0].1, &*second[0].1);
}

#[test]
fn test_read_file_bytes_matches_std_read() {
    let (base, captured) = job_tree(None);
    let payload: Vec<u8> = (0..=255u8).cycle().take(64 * 1024).collect();
    fs::write(captured.join("blob"), &payload).unwrap();

    let spawner = spawner_over(base.path());
    let chunks: Vec<FileChunk> = spawner
        .read_file_bytes(&captured.join("blob"))
        .unwrap()
        .collect();

    assert_eq!(chunks.len(), 1);
    assert_eq!(&*chunks[0], &payload[..]);
}

#[test]
fn test_tilde_pointer_expands_to_home() {
    let home = TempDir::new().unwrap();
    let captured_rel = "brood-captured";
    let captured = home.path().join(captured_rel);
    fs::create_dir_all(&captured).unwrap();
    fs::write(captured.join("log"), b"home sweet home").unwrap();

    std::env::set_var("HOME", home.path());

    let (base, _ignored) = job_tree(Some(format!("~/{captured_rel}\n")));
    let spawner = spawner_over(base.path());
    let entries = collect(spawner.stream_output(JOB_ID, TASK_ID).unwrap()).unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, "log");
    assert_eq!(&*entries[0].1, b"home sweet home");
}

/// A backend that captures output somewhere the filesystem defaults
/// cannot see must be able to replace streaming wholesale while keeping
/// the pair contract.
struct InMemorySpawner {
    common: SpawnerCommon,
    files: Vec<(String, Vec<u8>)>,
}

#[async_trait::async_trait]
impl Spawner for InMemorySpawner {
    fn methods(&self) -> &[SpawnMethod] {
        &[SpawnMethod::Any]
    }

    fn common(&self) -> &SpawnerCommon {
        &self.common
    }

    async fn spawn_task(
        &self,
        _task: &brood_core::domain::Task,
    ) -> Result<brood_core::port::SpawnOutcome> {
        unimplemented!("not under test")
    }

    fn is_task_alive(&self, _pid: i32) -> bool {
        false
    }

    fn stream_output(&self, _job_id: &str, _task_id: &str) -> Result<OutputEntries> {
        let files = self.files.clone();
        Ok(Box::new(
            files
                .into_iter()
                .map(|(name, bytes)| Ok((name, FileChunk::from(bytes)))),
        ))
    }
}

#[test]
fn test_overriding_backend_keeps_pair_contract() {
    let base = TempDir::new().unwrap();
    let spawner = InMemorySpawner {
        common: SpawnerCommon::new(None, Arc::new(FsResultsDirs::new(base.path()))),
        files: vec![("remote.log".to_string(), b"fetched elsewhere".to_vec())],
    };

    let entries = collect(spawner.stream_output("job", "task").unwrap()).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, "remote.log");
    assert_eq!(&*entries[0].1, b"fetched elsewhere");
}
