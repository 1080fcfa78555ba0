//! Domain models

pub mod file;
pub mod session;
pub mod validation;

pub use file::{file_extension, FileDescriptor, FileSource};
pub use session::{SessionStatus, UploadSession};
pub use validation::ValidationResult;
