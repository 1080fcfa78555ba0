//! Shared constants.

/// One mebibyte.
pub const MIB: u64 = 1024 * 1024;

/// Default size of a single uploaded chunk.
pub const DEFAULT_CHUNK_SIZE_BYTES: u64 = 5 * MIB;

/// Progress value reported once every chunk of a file has been accepted.
pub const PROGRESS_COMPLETE: u32 = 100;

/// Progress value reported when an upload is abandoned.
pub const PROGRESS_FAILED: u32 = 0;

/// Upload endpoint used when none is configured.
pub const DEFAULT_UPLOAD_ENDPOINT: &str = "http://localhost:8000/api/v1/upload";

/// Declared type given to local files whose extension is not in the lookup table.
pub const FALLBACK_DECLARED_TYPE: &str = "application/octet-stream";

/// Multipart field names expected by the upload endpoint.
pub mod form_fields {
    pub const FILE: &str = "file";
    pub const CHUNK_INDEX: &str = "chunk_index";
    pub const TOTAL_CHUNKS: &str = "total_chunks";
    pub const FILE_NAME: &str = "file_name";
}
