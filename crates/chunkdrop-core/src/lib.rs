//! chunkdrop core library
//!
//! Upload policy table, domain models, error types and configuration shared by
//! the validator, the chunked uploader, the HTTP transport and the CLI.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod policy;

// Re-export commonly used types
pub use config::{FileConcurrency, UploaderConfig};
pub use error::{
    ChunkPlanError, ErrorMetadata, LogLevel, TransportError, UploadError, ValidationError,
};
pub use models::{
    file_extension, FileDescriptor, FileSource, SessionStatus, UploadSession, ValidationResult,
};
pub use policy::{declared_type_for_extension, lookup, policy_table, MediaPolicy};
