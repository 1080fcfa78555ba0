//! Seams between the uploader and its collaborators
//!
//! The uploader never talks HTTP or renders progress itself: it hands chunks to a
//! [`ChunkTransport`] and progress values to a [`ProgressReporter`].

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chunkdrop_core::error::TransportError;

/// One chunk on its way to the transport.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub data: Bytes,
    /// 1-based position of this chunk in the file.
    pub index: u32,
    pub total_chunks: u32,
    pub file_name: String,
}

/// Delivers a single chunk somewhere.
///
/// The uploader awaits each call before issuing the next one for the same file,
/// so an implementation never sees two chunks of one file at once. Chunks of
/// different files may arrive concurrently.
#[async_trait]
pub trait ChunkTransport: Send + Sync {
    async fn send_chunk(&self, chunk: Chunk) -> Result<(), TransportError>;
}

#[async_trait]
impl<T: ChunkTransport + ?Sized> ChunkTransport for Arc<T> {
    async fn send_chunk(&self, chunk: Chunk) -> Result<(), TransportError> {
        (**self).send_chunk(chunk).await
    }
}

/// Receives coarse per-file progress: the last accepted chunk index, `100`
/// when the file is complete, `0` when it failed.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, file_name: &str, progress: u32);
}

impl<F> ProgressReporter for F
where
    F: Fn(&str, u32) + Send + Sync,
{
    fn report(&self, file_name: &str, progress: u32) {
        self(file_name, progress)
    }
}

/// Discards progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _file_name: &str, _progress: u32) {}
}

/// Emits progress as tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn report(&self, file_name: &str, progress: u32) {
        tracing::info!(file_name = %file_name, progress = progress, "Upload progress");
    }
}
