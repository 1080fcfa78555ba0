//! Fixed-size chunk planning.

use chunkdrop_core::error::ChunkPlanError;

/// One contiguous byte range of a file. `index` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    pub index: u32,
    pub start: u64,
    pub len: u64,
}

impl ChunkRange {
    pub fn end(&self) -> u64 {
        self.start + self.len
    }
}

/// Split of `size_bytes` into `ceil(size / chunk_size)` ranges; the last may be shorter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    size_bytes: u64,
    chunk_size_bytes: u64,
    total_chunks: u32,
}

impl ChunkPlan {
    pub fn new(size_bytes: u64, chunk_size_bytes: u64) -> Result<Self, ChunkPlanError> {
        if chunk_size_bytes == 0 {
            return Err(ChunkPlanError::ZeroChunkSize);
        }

        let total_chunks = u32::try_from(size_bytes.div_ceil(chunk_size_bytes)).map_err(|_| {
            ChunkPlanError::TooManyChunks {
                size: size_bytes,
                chunk_size: chunk_size_bytes,
            }
        })?;

        Ok(Self {
            size_bytes,
            chunk_size_bytes,
            total_chunks,
        })
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn chunk_size_bytes(&self) -> u64 {
        self.chunk_size_bytes
    }

    pub fn total_chunks(&self) -> u32 {
        self.total_chunks
    }

    /// Range of the chunk with 1-based `index`, if the file has one.
    pub fn range(&self, index: u32) -> Option<ChunkRange> {
        if index == 0 || index > self.total_chunks {
            return None;
        }
        let start = u64::from(index - 1) * self.chunk_size_bytes;
        let len = self.chunk_size_bytes.min(self.size_bytes - start);
        Some(ChunkRange { index, start, len })
    }

    /// All ranges in upload order.
    pub fn ranges(&self) -> impl Iterator<Item = ChunkRange> + '_ {
        (1..=self.total_chunks).filter_map(move |index| self.range(index))
    }
}
