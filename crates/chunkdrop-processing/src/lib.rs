//! chunkdrop processing
//!
//! Validates candidate files against the upload policy, splits accepted files
//! into fixed-size chunks and hands each chunk, in order, to a [`ChunkTransport`].
//! Transports are supplied by the caller: the HTTP client crate provides one,
//! [`LocalChunkStore`] writes chunks to disk.

pub mod batch;
pub mod chunking;
pub mod local;
pub mod traits;
pub mod uploader;
pub mod validator;

#[cfg(test)]
mod test_helpers;

pub use batch::{BatchUploader, FileOutcome};
pub use chunking::{ChunkPlan, ChunkRange};
pub use local::LocalChunkStore;
pub use traits::{Chunk, ChunkTransport, NoopProgress, ProgressReporter, TracingProgress};
pub use uploader::{ChunkedUploader, UploadOutcome};
pub use validator::MediaValidator;
