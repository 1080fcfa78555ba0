//! Where each chunk is sent.
//!
//! A single upload URL for every chunk, or one target per chunk as issued by the
//! server (for example a set of presigned part URLs).

use std::collections::HashMap;

use chunkdrop_core::error::TransportError;

/// Picks the URL for one chunk.
pub trait EndpointResolver: Send + Sync {
    fn resolve(
        &self,
        chunk_index: u32,
        total_chunks: u32,
        file_name: &str,
    ) -> Result<String, TransportError>;
}

/// Every chunk goes to the same URL.
#[derive(Debug, Clone)]
pub struct FixedEndpoint {
    url: String,
}

impl FixedEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl EndpointResolver for FixedEndpoint {
    fn resolve(
        &self,
        _chunk_index: u32,
        _total_chunks: u32,
        _file_name: &str,
    ) -> Result<String, TransportError> {
        Ok(self.url.clone())
    }
}

/// Per-file lists of chunk targets, one URL per chunk in chunk order.
///
/// Targets are issued for one file and never shared with another. A chunk of a
/// file without targets, or past the end of its list, fails.
#[derive(Debug, Clone, Default)]
pub struct PerChunkEndpoints {
    targets: HashMap<String, Vec<String>>,
}

impl PerChunkEndpoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Endpoints holding the targets of a single file.
    pub fn for_file(file_name: impl Into<String>, targets: Vec<String>) -> Self {
        Self::new().with_file(file_name, targets)
    }

    /// Add (or replace) the targets of `file_name`.
    pub fn with_file(mut self, file_name: impl Into<String>, targets: Vec<String>) -> Self {
        self.targets.insert(file_name.into(), targets);
        self
    }

    /// Number of targets issued for `file_name`.
    pub fn len_for(&self, file_name: &str) -> usize {
        self.targets.get(file_name).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.targets.values().all(Vec::is_empty)
    }
}

impl EndpointResolver for PerChunkEndpoints {
    fn resolve(
        &self,
        chunk_index: u32,
        total_chunks: u32,
        file_name: &str,
    ) -> Result<String, TransportError> {
        let targets = self.targets.get(file_name);
        chunk_index
            .checked_sub(1)
            .and_then(|i| targets.and_then(|t| t.get(i as usize)))
            .cloned()
            .ok_or(TransportError::MissingEndpoint {
                chunk_index,
                total_chunks,
            })
    }
}
