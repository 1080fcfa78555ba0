use chunkdrop_core::error::ValidationError;
use chunkdrop_core::models::{file_extension, FileDescriptor, ValidationResult};
use chunkdrop_core::policy::{self, MediaPolicy};

/// Media file validator
///
/// Checks a file's extension and size against the policy of its declared type.
/// The extension check runs first, so a file of an unknown declared type is
/// always reported as "extension not allowed" whatever its size.
#[derive(Clone, Copy)]
pub struct MediaValidator {
    lookup: fn(&str) -> MediaPolicy,
}

impl Default for MediaValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MediaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaValidator").finish_non_exhaustive()
    }
}

impl MediaValidator {
    /// Validator backed by the built-in policy table.
    pub fn new() -> Self {
        Self {
            lookup: policy::lookup,
        }
    }

    /// Validator backed by a different policy lookup.
    pub fn with_lookup(lookup: fn(&str) -> MediaPolicy) -> Self {
        Self { lookup }
    }

    pub fn policy_for(&self, declared_type: &str) -> MediaPolicy {
        (self.lookup)(declared_type)
    }

    /// Validate file extension
    pub fn validate_extension(
        &self,
        filename: &str,
        policy: &MediaPolicy,
    ) -> Result<(), ValidationError> {
        let extension = file_extension(filename);

        if !policy.allows_extension(&extension) {
            return Err(ValidationError::ExtensionNotAllowed {
                extension,
                declared_type: policy.declared_type.clone(),
            });
        }

        Ok(())
    }

    /// Validate file size
    pub fn validate_file_size(
        &self,
        size: u64,
        policy: &MediaPolicy,
    ) -> Result<(), ValidationError> {
        if size > policy.max_bytes {
            return Err(ValidationError::SizeExceedsLimit {
                size,
                max: policy.max_bytes,
            });
        }

        Ok(())
    }

    /// Validate name and size for a declared type
    pub fn validate_all(
        &self,
        filename: &str,
        declared_type: &str,
        file_size: u64,
    ) -> Result<(), ValidationError> {
        let policy = self.policy_for(declared_type);
        self.validate_extension(filename, &policy)?;
        self.validate_file_size(file_size, &policy)?;
        Ok(())
    }

    /// Validate a candidate file.
    pub fn validate(&self, file: &FileDescriptor) -> ValidationResult {
        let result = self.validate_all(&file.name, &file.declared_type, file.size_bytes);

        if let Err(e) = &result {
            tracing::debug!(
                file_name = %file.name,
                declared_type = %file.declared_type,
                size = file.size_bytes,
                reason = e.reason(),
                "File rejected by upload policy"
            );
        }

        result.into()
    }
}
