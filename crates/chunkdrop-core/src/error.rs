//! Error types module
//!
//! Validation errors are reported before any network activity. Transport errors
//! come from the chunk transport and abort the remaining chunks of that file only.
//! `UploadError` is the per-file outcome of a failed or rejected upload.

use std::io;

use serde::Serialize;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Describes how an error should be presented to whoever renders outcomes.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "SIZE_EXCEEDS_LIMIT")
    fn error_code(&self) -> &'static str;

    /// Message suitable for display next to the file
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Why the validator refused a file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationError {
    #[error("extension not allowed: '{extension}' is not permitted for {declared_type}")]
    ExtensionNotAllowed {
        extension: String,
        declared_type: String,
    },

    #[error("size exceeds limit: {size} bytes (max: {max} bytes)")]
    SizeExceedsLimit { size: u64, max: u64 },
}

impl ValidationError {
    /// Short reason phrase, without the file-specific details.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::ExtensionNotAllowed { .. } => "extension not allowed",
            ValidationError::SizeExceedsLimit { .. } => "size exceeds limit",
        }
    }
}

impl ErrorMetadata for ValidationError {
    fn error_code(&self) -> &'static str {
        match self {
            ValidationError::ExtensionNotAllowed { .. } => "EXTENSION_NOT_ALLOWED",
            ValidationError::SizeExceedsLimit { .. } => "SIZE_EXCEEDS_LIMIT",
        }
    }

    fn client_message(&self) -> String {
        match self {
            ValidationError::ExtensionNotAllowed { .. } => {
                "File extension is not allowed.".to_string()
            }
            ValidationError::SizeExceedsLimit { .. } => {
                "File size exceeds the maximum limit.".to_string()
            }
        }
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Debug
    }
}

/// Failure of a single chunk transport call.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Upload endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("No upload target for chunk {chunk_index} of {total_chunks}")]
    MissingEndpoint { chunk_index: u32, total_chunks: u32 },

    #[error("Invalid chunk target: {0}")]
    InvalidTarget(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ErrorMetadata for TransportError {
    fn error_code(&self) -> &'static str {
        match self {
            TransportError::Request(_) => "TRANSPORT_REQUEST_FAILED",
            TransportError::Status { .. } => "TRANSPORT_STATUS",
            TransportError::MissingEndpoint { .. } => "TRANSPORT_NO_ENDPOINT",
            TransportError::InvalidTarget(_) => "TRANSPORT_INVALID_TARGET",
            TransportError::Io(_) => "TRANSPORT_IO",
        }
    }

    fn client_message(&self) -> String {
        "Upload failed".to_string()
    }

    fn log_level(&self) -> LogLevel {
        match self {
            TransportError::Request(_) | TransportError::Status { .. } => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

/// A file that cannot be split with the configured chunk size.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChunkPlanError {
    #[error("Chunk size must be greater than 0")]
    ZeroChunkSize,

    #[error("{size} bytes in chunks of {chunk_size} bytes exceeds the maximum chunk count")]
    TooManyChunks { size: u64, chunk_size: u64 },
}

/// Why a single file did not finish uploading.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Upload rejected: {0}")]
    Rejected(#[from] ValidationError),

    #[error("Cannot split file: {0}")]
    Chunking(#[from] ChunkPlanError),

    #[error("Failed to read chunk {chunk_index} of {file_name}: {source}")]
    Read {
        file_name: String,
        chunk_index: u32,
        #[source]
        source: io::Error,
    },

    #[error("Upload failed at chunk {chunk_index} of {total_chunks}: {source}")]
    Transport {
        chunk_index: u32,
        total_chunks: u32,
        #[source]
        source: TransportError,
    },
}

impl UploadError {
    /// Chunk the upload stopped at, if it got that far.
    pub fn failed_chunk(&self) -> Option<u32> {
        match self {
            UploadError::Rejected(_) | UploadError::Chunking(_) => None,
            UploadError::Read { chunk_index, .. } | UploadError::Transport { chunk_index, .. } => {
                Some(*chunk_index)
            }
        }
    }
}

impl ErrorMetadata for UploadError {
    fn error_code(&self) -> &'static str {
        match self {
            UploadError::Rejected(err) => err.error_code(),
            UploadError::Chunking(_) => "CHUNKING_FAILED",
            UploadError::Read { .. } => "READ_FAILED",
            UploadError::Transport { .. } => "UPLOAD_FAILED",
        }
    }

    fn client_message(&self) -> String {
        match self {
            UploadError::Rejected(err) => err.client_message(),
            UploadError::Chunking(_) | UploadError::Read { .. } | UploadError::Transport { .. } => {
                "Upload failed".to_string()
            }
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            UploadError::Rejected(err) => err.log_level(),
            UploadError::Chunking(_) | UploadError::Read { .. } => LogLevel::Error,
            UploadError::Transport { source, .. } => source.log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_reasons() {
        let ext = ValidationError::ExtensionNotAllowed {
            extension: "png".to_string(),
            declared_type: "image/png".to_string(),
        };
        assert_eq!(ext.reason(), "extension not allowed");
        assert!(ext.to_string().starts_with("extension not allowed"));
        assert_eq!(ext.error_code(), "EXTENSION_NOT_ALLOWED");
        assert_eq!(ext.client_message(), "File extension is not allowed.");

        let size = ValidationError::SizeExceedsLimit { size: 10, max: 5 };
        assert_eq!(size.reason(), "size exceeds limit");
        assert!(size.to_string().contains("10 bytes"));
        assert_eq!(size.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_validation_error_serializes_with_code() {
        let err = ValidationError::SizeExceedsLimit { size: 10, max: 5 };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "SIZE_EXCEEDS_LIMIT");
        assert_eq!(json["max"], 5);
    }

    #[test]
    fn test_upload_error_transport_is_generic_for_clients() {
        let err = UploadError::Transport {
            chunk_index: 2,
            total_chunks: 3,
            source: TransportError::Status {
                status: 500,
                body: "boom".to_string(),
            },
        };
        assert_eq!(err.error_code(), "UPLOAD_FAILED");
        assert_eq!(err.client_message(), "Upload failed");
        assert_eq!(err.failed_chunk(), Some(2));
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_upload_error_rejected_delegates() {
        let err = UploadError::from(ValidationError::SizeExceedsLimit { size: 2, max: 1 });
        assert_eq!(err.error_code(), "SIZE_EXCEEDS_LIMIT");
        assert_eq!(err.failed_chunk(), None);
    }
}
