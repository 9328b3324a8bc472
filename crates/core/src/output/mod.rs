// Default output retrieval behaviors shared by spawner backends

pub mod file_bytes;
pub mod stream;

// Re-exports
pub use file_bytes::{read_file_bytes, FileBytes, FileChunk};
pub use stream::{open_output_stream, OutputStream};

use crate::error::Result;

/// Boxed pair stream a spawner hands back from `stream_output`.
/// Overriding backends produce the same item shape by their own means.
pub type OutputEntries = Box<dyn Iterator<Item = Result<(String, FileChunk)>> + Send>;

/// Boxed chunk stream a spawner hands back from `read_file_bytes`.
pub type ByteChunks = Box<dyn Iterator<Item = FileChunk> + Send>;
