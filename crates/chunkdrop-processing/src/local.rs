//! Local chunk store
//!
//! Writes chunks to a directory instead of sending them anywhere. Saving chunks
//! locally is a transport choice made by the caller, never a side effect of an
//! upload.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chunkdrop_core::error::TransportError;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::traits::{Chunk, ChunkTransport};

/// Stores each chunk as `<base_path>/<file_name>.part-NNNN`.
#[derive(Debug, Clone)]
pub struct LocalChunkStore {
    base_path: PathBuf,
}

impl LocalChunkStore {
    /// Create the store, creating `base_path` if needed.
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, TransportError> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            TransportError::InvalidTarget(format!(
                "Failed to create chunk directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of chunk `index` of `file_name`.
    ///
    /// File names must be a single path component; anything that could escape
    /// the base directory is refused.
    pub fn part_path(&self, file_name: &str, index: u32) -> Result<PathBuf, TransportError> {
        let mut components = Path::new(file_name).components();
        let single_component = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single_component || file_name.contains(['/', '\\']) {
            return Err(TransportError::InvalidTarget(format!(
                "File name cannot be stored locally: {}",
                file_name
            )));
        }

        Ok(self
            .base_path
            .join(format!("{}.part-{:04}", file_name, index)))
    }

    /// Concatenate parts `1..=total_chunks` of `file_name` back into one buffer.
    pub async fn assemble(
        &self,
        file_name: &str,
        total_chunks: u32,
    ) -> Result<Vec<u8>, TransportError> {
        let mut assembled = Vec::new();
        for index in 1..=total_chunks {
            let path = self.part_path(file_name, index)?;
            let mut part = fs::read(&path).await?;
            assembled.append(&mut part);
        }
        Ok(assembled)
    }
}

#[async_trait]
impl ChunkTransport for LocalChunkStore {
    async fn send_chunk(&self, chunk: Chunk) -> Result<(), TransportError> {
        let path = self.part_path(&chunk.file_name, chunk.index)?;

        let mut file = fs::File::create(&path).await?;
        file.write_all(&chunk.data).await?;
        file.sync_all().await?;

        tracing::debug!(
            path = %path.display(),
            chunk_index = chunk.index,
            total_chunks = chunk.total_chunks,
            size = chunk.data.len(),
            "Chunk written to local store"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::NoopProgress;
    use crate::uploader::ChunkedUploader;
    use bytes::Bytes;
    use chunkdrop_core::models::FileDescriptor;

    #[tokio::test]
    async fn test_upload_into_local_store_and_assemble() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalChunkStore::new(dir.path().join("chunks")).await.unwrap();
        let data: Vec<u8> = (0..1000u32).map(|i| (i % 256) as u8).collect();
        let file = FileDescriptor::from_bytes("clip.webm", "video/webm", data.clone());

        let outcome = ChunkedUploader::new(256)
            .unwrap()
            .upload(&file, &store, &NoopProgress)
            .await;
        assert!(outcome.is_uploaded());

        assert!(dir.path().join("chunks/clip.webm.part-0001").exists());
        assert!(dir.path().join("chunks/clip.webm.part-0004").exists());
        assert!(!dir.path().join("chunks/clip.webm.part-0005").exists());
        let last = std::fs::read(dir.path().join("chunks/clip.webm.part-0004")).unwrap();
        assert_eq!(last.len(), 1000 - 3 * 256);

        let assembled = store.assemble("clip.webm", 4).await.unwrap();
        assert_eq!(assembled, data);
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalChunkStore::new(dir.path()).await.unwrap();

        for name in ["../escape.txt", "a/b.txt", "", "..\\x.txt"] {
            let chunk = Chunk {
                data: Bytes::from_static(b"x"),
                index: 1,
                total_chunks: 1,
                file_name: name.to_string(),
            };
            assert!(matches!(
                store.send_chunk(chunk).await,
                Err(TransportError::InvalidTarget(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_accepts_names_with_double_dots() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalChunkStore::new(dir.path()).await.unwrap();

        let path = store.part_path("my..notes.txt", 3).unwrap();
        assert_eq!(path, dir.path().join("my..notes.txt.part-0003"));

        for name in ["..", ".", "/abs.txt", "dir/"] {
            assert!(store.part_path(name, 1).is_err(), "{} should be refused", name);
        }
    }

    #[tokio::test]
    async fn test_assemble_missing_part() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalChunkStore::new(dir.path()).await.unwrap();
        assert!(matches!(
            store.assemble("missing.txt", 1).await,
            Err(TransportError::Io(_))
        ));
    }
}
