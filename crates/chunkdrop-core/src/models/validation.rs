use serde::Serialize;

use crate::error::ValidationError;

/// Accept/reject decision for one file, with the reason when rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub accepted: bool,
    pub reason: Option<ValidationError>,
}

impl ValidationResult {
    pub fn accept() -> Self {
        Self {
            accepted: true,
            reason: None,
        }
    }

    pub fn reject(reason: ValidationError) -> Self {
        Self {
            accepted: false,
            reason: Some(reason),
        }
    }

    /// Convert into a `Result`, for callers that want to use `?`.
    pub fn into_result(self) -> Result<(), ValidationError> {
        match self.reason {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }
}

impl From<Result<(), ValidationError>> for ValidationResult {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => Self::accept(),
            Err(reason) => Self::reject(reason),
        }
    }
}
