// Discovery and streaming of a task's captured output files

use std::fs::{self, ReadDir};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::safe_path;
use crate::error::{Result, SpawnError};

use super::file_bytes::{read_file_bytes, FileChunk};

const TEST_RESULTS_DIR: &str = "test-results";
const DATA_POINTER: &str = "data";

/// Locate a task's output directory and open a lazy stream over its
/// files.
///
/// The pointer file at `<results_dir>/test-results/<safe_task_id>/data`
/// holds a single meaningful line: the path (optionally `~`-prefixed)
/// of the directory the task wrote into. Discovery is repeated from
/// scratch on every call; nothing is cached between invocations.
///
/// # Errors
/// - [`SpawnError::OutputNotFound`] if the pointed-at directory is
///   missing (or vanishes between steps).
/// - Pointer-file I/O failures propagate untranslated.
pub fn open_output_stream(results_dir: &Path, task_id: &str) -> Result<OutputStream> {
    let safe_id = safe_path::to_safe_path(task_id);
    let pointer = results_dir
        .join(TEST_RESULTS_DIR)
        .join(&safe_id)
        .join(DATA_POINTER);

    let file = fs::File::open(&pointer)?;
    let mut line = String::new();
    BufReader::new(file).read_line(&mut line)?;
    let target = PathBuf::from(shellexpand::tilde(line.trim_end()).into_owned());

    debug!(task_id = %task_id, target = %target.display(), "streaming task output");

    let entries = fs::read_dir(&target).map_err(|e| translate_not_found(e, task_id))?;
    Ok(OutputStream {
        task_id: task_id.to_string(),
        entries,
    })
}

// A vanished directory is the one condition the core recovers into a
// typed error; everything else stays a raw I/O failure.
fn translate_not_found(err: io::Error, task_id: &str) -> SpawnError {
    if err.kind() == io::ErrorKind::NotFound {
        SpawnError::OutputNotFound {
            task_id: task_id.to_string(),
            source: err,
        }
    } else {
        SpawnError::Io(err)
    }
}

/// Lazy, finite producer of `(file name, content)` pairs for one task.
///
/// Entries come back in filesystem enumeration order, which is not
/// guaranteed stable or sorted; callers needing determinism sort by
/// name themselves. Zero-byte files and non-regular entries are
/// silently skipped. A consumer that stops iterating early simply drops
/// the handle; nothing stays open past the last yielded chunk.
#[derive(Debug)]
pub struct OutputStream {
    task_id: String,
    entries: ReadDir,
}

impl Iterator for OutputStream {
    type Item = Result<(String, FileChunk)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(translate_not_found(e, &self.task_id))),
            };
            let path = entry.path();
            // Follows symlinks so a link to a regular file still counts.
            let meta = match fs::metadata(&path) {
                Ok(meta) => meta,
                Err(e) => return Some(Err(translate_not_found(e, &self.task_id))),
            };
            if !meta.is_file() || meta.len() == 0 {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match read_file_bytes(&path) {
                Ok(mut chunks) => {
                    let chunk = chunks.next().unwrap_or_default();
                    return Some(Ok((name, chunk)));
                }
                Err(e) => return Some(Err(translate_not_found(e, &self.task_id))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    const TASK_ID: &str = "1-demo";

    /// Builds `<results>/test-results/<safe id>/data` pointing at a
    /// separate output directory, and returns both roots.
    fn fixture() -> (TempDir, PathBuf) {
        let root = TempDir::new().unwrap();
        let output_dir = root.path().join("captured");
        fs::create_dir_all(&output_dir).unwrap();

        let pointer_dir = root
            .path()
            .join(TEST_RESULTS_DIR)
            .join(safe_path::to_safe_path(TASK_ID));
        fs::create_dir_all(&pointer_dir).unwrap();
        fs::write(
            pointer_dir.join(DATA_POINTER),
            format!("{}\n", output_dir.display()),
        )
        .unwrap();

        (root, output_dir)
    }

    #[test]
    fn test_yields_only_regular_nonempty_files() {
        let (root, output_dir) = fixture();
        fs::write(output_dir.join("a.txt"), b"0123456789").unwrap();
        fs::write(output_dir.join("b.txt"), b"").unwrap();
        fs::create_dir(output_dir.join("sub")).unwrap();

        let entries: Vec<_> = open_output_stream(root.path(), TASK_ID)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "a.txt");
        assert_eq!(&*entries[0].1, b"0123456789");
    }

    #[test]
    fn test_missing_target_is_output_not_found() {
        let (root, output_dir) = fixture();
        fs::remove_dir(&output_dir).unwrap();

        let err = open_output_stream(root.path(), TASK_ID).unwrap_err();
        match err {
            SpawnError::OutputNotFound { ref task_id, .. } => assert_eq!(task_id, TASK_ID),
            other => panic!("expected OutputNotFound, got {other:?}"),
        }
        assert!(err.to_string().contains(TASK_ID));
    }

    #[test]
    fn test_missing_pointer_propagates_untranslated() {
        let root = TempDir::new().unwrap();

        let err = open_output_stream(root.path(), TASK_ID).unwrap_err();
        assert!(matches!(err, SpawnError::Io(_)));
    }

    #[test]
    fn test_rescans_on_every_call() {
        let (root, output_dir) = fixture();
        fs::write(output_dir.join("log"), b"first").unwrap();

        let first: Vec<_> = open_output_stream(root.path(), TASK_ID)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        let second: Vec<_> = open_output_stream(root.path(), TASK_ID)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();

        assert_eq!(first.len(), second.len());
        assert_eq!(first[0].0, second[0].0);
        assert_eq!(&*first[0].1, &*second[0].1);

        // A file added between calls shows up on the next scan.
        fs::write(output_dir.join("later"), b"second").unwrap();
        let third = open_output_stream(root.path(), TASK_ID)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(third.len(), 2);
    }

    #[test]
    fn test_pointer_first_line_only() {
        let (root, output_dir) = fixture();
        fs::write(output_dir.join("log"), b"payload").unwrap();

        // Rewrite the pointer with trailing whitespace and junk lines.
        let pointer_dir = root
            .path()
            .join(TEST_RESULTS_DIR)
            .join(safe_path::to_safe_path(TASK_ID));
        fs::write(
            pointer_dir.join(DATA_POINTER),
            format!("{}   \nignored second line\n", output_dir.display()),
        )
        .unwrap();

        let entries: Vec<_> = open_output_stream(root.path(), TASK_ID)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(entries.len(), 1);
    }
}
