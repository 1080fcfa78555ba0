//! Shared pieces of the `chunkdrop` binary: tracing setup and the JSON reports
//! printed for each file.

use chunkdrop_api_client::PerChunkEndpoints;
use chunkdrop_core::error::ErrorMetadata;
use chunkdrop_core::models::{FileDescriptor, SessionStatus, ValidationResult};
use chunkdrop_core::policy::MediaPolicy;
use chunkdrop_processing::batch::FileOutcome;
use chunkdrop_processing::uploader::UploadOutcome;
use serde::Serialize;

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays JSON.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Human-readable byte size using binary units, e.g. `50 MiB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if value.fract() == 0.0 {
        format!("{} {}", value as u64, UNITS[unit])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// One row of `chunkdrop policy`.
#[derive(Debug, Serialize)]
pub struct PolicyRow {
    pub declared_type: String,
    pub allowed_extensions: Vec<String>,
    pub max_bytes: u64,
    pub max_size: String,
}

impl From<&MediaPolicy> for PolicyRow {
    fn from(policy: &MediaPolicy) -> Self {
        Self {
            declared_type: policy.declared_type.clone(),
            allowed_extensions: policy
                .allowed_extensions
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            max_bytes: policy.max_bytes,
            max_size: format_size(policy.max_bytes),
        }
    }
}

/// Result of `chunkdrop validate` for one file.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub file_name: String,
    pub declared_type: String,
    pub size_bytes: u64,
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ValidationReport {
    pub fn new(file: &FileDescriptor, result: &ValidationResult) -> Self {
        Self {
            file_name: file.name.clone(),
            declared_type: file.declared_type.clone(),
            size_bytes: file.size_bytes,
            accepted: result.accepted,
            error_code: result.reason.as_ref().map(|r| r.error_code()),
            reason: result.reason.as_ref().map(|r| r.to_string()),
        }
    }
}

/// Result of `chunkdrop upload` or `chunkdrop split` for one file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file_name: String,
    pub status: &'static str,
    pub progress: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks_sent: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_chunks: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FileReport {
    pub fn new(file_name: &str, outcome: &UploadOutcome) -> Self {
        let session = outcome.session();
        let (status, error_code, message) = match outcome {
            UploadOutcome::Rejected(reason) => {
                ("rejected", Some(reason.error_code()), Some(reason.to_string()))
            }
            UploadOutcome::Uploaded(_) => ("uploaded", None, None),
            UploadOutcome::Failed { error, .. } => {
                ("failed", Some(error.error_code()), Some(error.to_string()))
            }
        };

        Self {
            file_name: file_name.to_string(),
            status,
            progress: outcome.progress(),
            session_id: session.map(|s| s.id().to_string()),
            chunks_sent: session.map(|s| s.current_chunk_index()),
            total_chunks: session.map(|s| s.total_chunks()),
            error_code,
            message,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "uploaded"
    }
}

impl From<&FileOutcome> for FileReport {
    fn from(outcome: &FileOutcome) -> Self {
        Self::new(&outcome.file_name, &outcome.outcome)
    }
}

/// Scope `--chunk-url` targets to the one file they were issued for.
///
/// Targets cannot be split between several files, so more than one file is refused.
pub fn per_chunk_targets(
    files: &[FileDescriptor],
    chunk_urls: Vec<String>,
) -> anyhow::Result<PerChunkEndpoints> {
    match files {
        [file] => Ok(PerChunkEndpoints::for_file(file.name.clone(), chunk_urls)),
        _ => anyhow::bail!(
            "--chunk-url targets belong to a single file, got {} files",
            files.len()
        ),
    }
}

/// Whether every outcome finished with a complete session.
pub fn all_complete(outcomes: &[FileOutcome]) -> bool {
    outcomes.iter().all(|o| {
        o.outcome
            .session()
            .is_some_and(|s| s.status() == SessionStatus::Complete)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkdrop_api_client::EndpointResolver;
    use chunkdrop_core::error::{TransportError, UploadError, ValidationError};
    use chunkdrop_core::models::UploadSession;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KiB");
        assert_eq!(format_size(50 * 1024 * 1024), "50 MiB");
        assert_eq!(format_size(2 * 1024 * 1024 * 1024), "2 GiB");
    }

    #[test]
    fn test_policy_row() {
        let policy = chunkdrop_core::policy::lookup("application/pdf");
        let row = PolicyRow::from(&policy);
        assert_eq!(row.allowed_extensions, vec!["pdf"]);
        assert_eq!(row.max_size, "270 MiB");
    }

    #[test]
    fn test_validation_report_rejected() {
        let file = FileDescriptor::from_bytes("image.png", "image/png", vec![0u8; 4]);
        let result = ValidationResult::reject(ValidationError::ExtensionNotAllowed {
            extension: "png".to_string(),
            declared_type: "image/png".to_string(),
        });

        let report = ValidationReport::new(&file, &result);
        assert!(!report.accepted);
        assert_eq!(report.error_code, Some("EXTENSION_NOT_ALLOWED"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["file_name"], "image.png");
        assert!(json["reason"].as_str().unwrap().starts_with("extension not allowed"));
    }

    #[test]
    fn test_validation_report_accepted_omits_reason() {
        let file = FileDescriptor::from_bytes("a.txt", "text/plain", vec![b'a'; 4]);
        let report = ValidationReport::new(&file, &ValidationResult::accept());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["accepted"], true);
        assert!(json.get("reason").is_none());
        assert!(json.get("error_code").is_none());
    }

    #[test]
    fn test_file_report_uploaded() {
        let mut session = UploadSession::new("a.txt", 2);
        session.begin();
        session.record_chunk();
        session.record_chunk();
        session.complete();

        let report = FileReport::new("a.txt", &UploadOutcome::Uploaded(session));
        assert!(report.is_success());
        assert_eq!(report.progress, 100);
        assert_eq!(report.chunks_sent, Some(2));
        assert_eq!(report.total_chunks, Some(2));
        assert!(report.message.is_none());
    }

    #[test]
    fn test_file_report_failed() {
        let mut session = UploadSession::new("a.txt", 3);
        session.begin();
        session.record_chunk();
        session.fail();
        let error = UploadError::Transport {
            chunk_index: 2,
            total_chunks: 3,
            source: TransportError::Status {
                status: 502,
                body: "bad gateway".to_string(),
            },
        };

        let report = FileReport::new("a.txt", &UploadOutcome::Failed { session, error });
        assert!(!report.is_success());
        assert_eq!(report.status, "failed");
        assert_eq!(report.progress, 0);
        assert_eq!(report.chunks_sent, Some(1));
        assert_eq!(report.error_code, Some("UPLOAD_FAILED"));
    }

    #[test]
    fn test_file_report_rejected_has_no_session() {
        let outcome = UploadOutcome::Rejected(ValidationError::SizeExceedsLimit {
            size: 10,
            max: 5,
        });

        let report = FileReport::new("big.txt", &outcome);
        assert_eq!(report.status, "rejected");
        assert!(report.session_id.is_none());
        assert_eq!(report.error_code, Some("SIZE_EXCEEDS_LIMIT"));
    }

    #[test]
    fn test_per_chunk_targets_single_file() {
        let files = vec![FileDescriptor::from_bytes("a.mp4", "video/mp4", vec![1u8; 4])];
        let targets = per_chunk_targets(&files, vec!["http://host/a/1".to_string()]).unwrap();

        assert_eq!(targets.resolve(1, 1, "a.mp4").unwrap(), "http://host/a/1");
        assert!(targets.resolve(1, 1, "b.mp4").is_err());
    }

    #[test]
    fn test_per_chunk_targets_refuse_several_files() {
        let files = vec![
            FileDescriptor::from_bytes("a.mp4", "video/mp4", vec![1u8; 4]),
            FileDescriptor::from_bytes("b.mp4", "video/mp4", vec![2u8; 4]),
        ];

        let err = per_chunk_targets(&files, vec!["http://host/a/1".to_string()]).unwrap_err();
        assert!(err.to_string().contains("single file"));
    }

    #[test]
    fn test_all_complete() {
        let mut done = UploadSession::new("a.txt", 0);
        done.begin();
        done.complete();
        let outcomes = vec![FileOutcome {
            file_name: "a.txt".to_string(),
            outcome: UploadOutcome::Uploaded(done),
        }];
        assert!(all_complete(&outcomes));

        let mut with_rejection = outcomes;
        with_rejection.push(FileOutcome {
            file_name: "b.png".to_string(),
            outcome: UploadOutcome::Rejected(ValidationError::SizeExceedsLimit { size: 1, max: 0 }),
        });
        assert!(!all_complete(&with_rejection));
    }
}
