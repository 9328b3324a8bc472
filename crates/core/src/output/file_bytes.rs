// Memory-mapped whole-file reads for local output retrieval

use std::fs::File;
use std::io;
use std::ops::Deref;
use std::path::Path;

use memmap2::Mmap;

/// One chunk of file content, dereferencing to `[u8]`.
///
/// Local reads carry a read-only mapping that is released when the chunk
/// is dropped; backends that fetch bytes themselves wrap them as
/// [`FileChunk::Owned`].
#[derive(Debug)]
pub enum FileChunk {
    /// Read-only mapping of a local file.
    Mapped(Mmap),
    /// Bytes materialized by a backend that retrieved them itself.
    Owned(Vec<u8>),
}

impl Deref for FileChunk {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FileChunk::Mapped(map) => map,
            FileChunk::Owned(bytes) => bytes,
        }
    }
}

impl AsRef<[u8]> for FileChunk {
    fn as_ref(&self) -> &[u8] {
        self
    }
}

impl Default for FileChunk {
    fn default() -> Self {
        FileChunk::Owned(Vec::new())
    }
}

impl From<Vec<u8>> for FileChunk {
    fn from(bytes: Vec<u8>) -> Self {
        FileChunk::Owned(bytes)
    }
}

/// Finite producer for [`read_file_bytes`]: yields the file's full
/// content as a single chunk, then ends.
#[derive(Debug, Default)]
pub struct FileBytes {
    chunk: Option<FileChunk>,
}

impl Iterator for FileBytes {
    type Item = FileChunk;

    fn next(&mut self) -> Option<FileChunk> {
        self.chunk.take()
    }
}

/// Read a *local* regular file's bytes through a read-only memory
/// mapping.
///
/// Suitable for backends that capture output on the machine they run
/// on; backends whose output lives elsewhere override the retrieval
/// path instead of calling this. The file handle is closed before this
/// function returns; the mapping lives until the yielded chunk is
/// dropped, so a consumer abandoning the iterator early leaks nothing.
///
/// Open and metadata failures propagate untranslated.
pub fn read_file_bytes(path: impl AsRef<Path>) -> io::Result<FileBytes> {
    let file = File::open(path)?;
    let len = file.metadata()?.len();
    let chunk = if len == 0 {
        // Zero-length files cannot be mapped; hand back an empty chunk.
        FileChunk::default()
    } else {
        // SAFETY: mapped read-only; the contract assumes the producing
        // task no longer mutates its output while it is being read.
        FileChunk::Mapped(unsafe { Mmap::map(&file)? })
    };
    Ok(FileBytes { chunk: Some(chunk) })
}
