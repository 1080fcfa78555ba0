//! Uploading several files.
//!
//! Each file runs its own validate-then-upload sequence; a rejection or failure
//! only affects that file. How many files are in flight together is set by
//! [`FileConcurrency`]. Everything runs on the caller's task, chunks of one file
//! are still strictly sequential.

use chunkdrop_core::config::FileConcurrency;
use chunkdrop_core::models::FileDescriptor;
use futures::stream::{self, StreamExt};

use crate::traits::{ChunkTransport, ProgressReporter};
use crate::uploader::{ChunkedUploader, UploadOutcome};

/// Outcome for one input file.
#[derive(Debug)]
pub struct FileOutcome {
    pub file_name: String,
    pub outcome: UploadOutcome,
}

/// Runs a [`ChunkedUploader`] over many files.
#[derive(Debug, Clone)]
pub struct BatchUploader {
    uploader: ChunkedUploader,
    concurrency: FileConcurrency,
}

impl BatchUploader {
    pub fn new(uploader: ChunkedUploader, concurrency: FileConcurrency) -> Self {
        Self {
            uploader,
            concurrency,
        }
    }

    pub fn concurrency(&self) -> FileConcurrency {
        self.concurrency
    }

    /// Upload every file and return one outcome per input, in input order.
    pub async fn upload_all(
        &self,
        files: &[FileDescriptor],
        transport: &dyn ChunkTransport,
        progress: &dyn ProgressReporter,
    ) -> Vec<FileOutcome> {
        tracing::info!(
            files = files.len(),
            concurrency = %self.concurrency,
            "Starting batch upload"
        );

        let uploads = files.iter().map(|file| async move {
            FileOutcome {
                file_name: file.name.clone(),
                outcome: self.uploader.upload(file, transport, progress).await,
            }
        });

        let outcomes: Vec<FileOutcome> = match self.concurrency.limit() {
            Some(limit) => stream::iter(uploads).buffered(limit.max(1)).collect().await,
            None => futures::future::join_all(uploads).await,
        };

        let uploaded = outcomes.iter().filter(|o| o.outcome.is_uploaded()).count();
        tracing::info!(
            files = outcomes.len(),
            uploaded = uploaded,
            "Batch upload finished"
        );

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{RecordingProgress, RecordingTransport};

    fn files() -> Vec<FileDescriptor> {
        vec![
            FileDescriptor::from_bytes("a.txt", "text/plain", vec![b'a'; 10]),
            FileDescriptor::from_bytes("image.png", "image/png", vec![0u8; 10]),
            FileDescriptor::from_bytes("b.pdf", "application/pdf", vec![b'b'; 7]),
            FileDescriptor::from_bytes("c.m4a", "audio/mp4", vec![b'c'; 12]),
        ]
    }

    fn uploader() -> ChunkedUploader {
        ChunkedUploader::new(4).unwrap()
    }

    #[tokio::test]
    async fn test_outcomes_follow_input_order() {
        let batch = BatchUploader::new(uploader(), FileConcurrency::Unbounded);
        let transport = RecordingTransport::new();
        let progress = RecordingProgress::new();

        let outcomes = batch.upload_all(&files(), &transport, &progress).await;

        let names: Vec<&str> = outcomes.iter().map(|o| o.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "image.png", "b.pdf", "c.m4a"]);
        assert!(outcomes[0].outcome.is_uploaded());
        assert!(matches!(outcomes[1].outcome, UploadOutcome::Rejected(_)));
        assert!(outcomes[2].outcome.is_uploaded());
        assert!(outcomes[3].outcome.is_uploaded());
        assert!(transport.chunks_for("image.png").is_empty());
        assert_eq!(progress.events_for("c.m4a"), vec![1, 2, 3, 100]);
    }

    #[tokio::test]
    async fn test_failure_does_not_affect_siblings() {
        let batch = BatchUploader::new(uploader(), FileConcurrency::Unbounded);
        let transport = RecordingTransport::new().fail_on("a.txt", 2);
        let progress = RecordingProgress::new();

        let outcomes = batch.upload_all(&files(), &transport, &progress).await;

        assert!(matches!(outcomes[0].outcome, UploadOutcome::Failed { .. }));
        assert_eq!(progress.events_for("a.txt"), vec![1, 0]);
        assert!(outcomes[2].outcome.is_uploaded());
        assert!(outcomes[3].outcome.is_uploaded());
        let indices: Vec<u32> = transport
            .chunks_for("c.m4a")
            .iter()
            .map(|c| c.index)
            .collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_sequential_runs_one_file_at_a_time() {
        let batch = BatchUploader::new(uploader(), FileConcurrency::Sequential);
        let transport = RecordingTransport::new();

        batch
            .upload_all(&files(), &transport, &RecordingProgress::new())
            .await;

        assert_eq!(transport.max_files_in_flight(), 1);
        let order: Vec<String> = transport
            .chunks()
            .iter()
            .map(|c| c.file_name.clone())
            .collect();
        let mut deduped = order.clone();
        deduped.dedup();
        assert_eq!(deduped, vec!["a.txt", "b.pdf", "c.m4a"]);
    }

    #[tokio::test]
    async fn test_concurrent_files_keep_chunks_sequential() {
        let batch = BatchUploader::new(uploader(), FileConcurrency::Bounded(2));
        let transport = RecordingTransport::new();

        let outcomes = batch
            .upload_all(&files(), &transport, &RecordingProgress::new())
            .await;

        assert_eq!(outcomes.len(), 4);
        assert_eq!(transport.overlaps(), 0);
        assert!(transport.max_files_in_flight() <= 2);
        for name in ["a.txt", "b.pdf", "c.m4a"] {
            let indices: Vec<u32> = transport.chunks_for(name).iter().map(|c| c.index).collect();
            let mut sorted = indices.clone();
            sorted.sort_unstable();
            assert_eq!(indices, sorted);
        }
    }

    #[tokio::test]
    async fn test_unbounded_interleaves_files() {
        let batch = BatchUploader::new(uploader(), FileConcurrency::Unbounded);
        let transport = RecordingTransport::new();

        batch
            .upload_all(&files(), &transport, &RecordingProgress::new())
            .await;

        assert!(transport.max_files_in_flight() > 1);
        assert_eq!(transport.overlaps(), 0);
    }
}
