//! Sequential chunked upload of a single file.
//!
//! The file is validated, split into fixed-size ranges and each range is handed
//! to the transport in order, one call at a time. The first failed call ends the
//! upload: nothing is retried and chunks already delivered are left as they are.

use chunkdrop_core::config::UploaderConfig;
use chunkdrop_core::constants::{DEFAULT_CHUNK_SIZE_BYTES, PROGRESS_FAILED};
use chunkdrop_core::error::{ChunkPlanError, UploadError, ValidationError};
use chunkdrop_core::models::{FileDescriptor, UploadSession};

use crate::chunking::ChunkPlan;
use crate::traits::{Chunk, ChunkTransport, ProgressReporter};
use crate::validator::MediaValidator;

/// Result of one file's upload attempt.
#[derive(Debug)]
pub enum UploadOutcome {
    /// Refused by the validator; nothing was sent.
    Rejected(ValidationError),
    /// Every chunk was accepted.
    Uploaded(UploadSession),
    /// Stopped part-way; `session` shows how far it got.
    Failed {
        session: UploadSession,
        error: UploadError,
    },
}

impl UploadOutcome {
    pub fn is_uploaded(&self) -> bool {
        matches!(self, UploadOutcome::Uploaded(_))
    }

    pub fn session(&self) -> Option<&UploadSession> {
        match self {
            UploadOutcome::Rejected(_) => None,
            UploadOutcome::Uploaded(session) | UploadOutcome::Failed { session, .. } => {
                Some(session)
            }
        }
    }

    /// Final progress value for the file.
    pub fn progress(&self) -> u32 {
        self.session()
            .map(UploadSession::progress)
            .unwrap_or(PROGRESS_FAILED)
    }

    pub fn into_result(self) -> Result<UploadSession, UploadError> {
        match self {
            UploadOutcome::Rejected(reason) => Err(UploadError::Rejected(reason)),
            UploadOutcome::Uploaded(session) => Ok(session),
            UploadOutcome::Failed { error, .. } => Err(error),
        }
    }
}

/// Uploads one file as a sequence of fixed-size chunks.
#[derive(Debug, Clone)]
pub struct ChunkedUploader {
    validator: MediaValidator,
    chunk_size_bytes: u64,
}

impl Default for ChunkedUploader {
    fn default() -> Self {
        Self {
            validator: MediaValidator::new(),
            chunk_size_bytes: DEFAULT_CHUNK_SIZE_BYTES,
        }
    }
}

impl ChunkedUploader {
    pub fn new(chunk_size_bytes: u64) -> Result<Self, ChunkPlanError> {
        if chunk_size_bytes == 0 {
            return Err(ChunkPlanError::ZeroChunkSize);
        }
        Ok(Self {
            validator: MediaValidator::new(),
            chunk_size_bytes,
        })
    }

    pub fn from_config(config: &UploaderConfig) -> Result<Self, ChunkPlanError> {
        Self::new(config.chunk_size_bytes)
    }

    pub fn with_validator(mut self, validator: MediaValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn validator(&self) -> &MediaValidator {
        &self.validator
    }

    pub fn chunk_size_bytes(&self) -> u64 {
        self.chunk_size_bytes
    }

    pub fn plan(&self, file: &FileDescriptor) -> Result<ChunkPlan, ChunkPlanError> {
        ChunkPlan::new(file.size_bytes, self.chunk_size_bytes)
    }

    /// Validate `file` and, if accepted, send its chunks through `transport`.
    ///
    /// After each accepted chunk its 1-based index is reported; once the last chunk
    /// is accepted `100` is reported, and `0` is reported when the upload fails.
    /// Rejected files report nothing.
    #[tracing::instrument(
        skip_all,
        fields(
            file_name = %file.name,
            declared_type = %file.declared_type,
            size = file.size_bytes,
            session_id = tracing::field::Empty,
        )
    )]
    pub async fn upload(
        &self,
        file: &FileDescriptor,
        transport: &dyn ChunkTransport,
        progress: &dyn ProgressReporter,
    ) -> UploadOutcome {
        if let Some(reason) = self.validator.validate(file).reason {
            return UploadOutcome::Rejected(reason);
        }

        let plan = match self.plan(file) {
            Ok(plan) => plan,
            Err(e) => {
                let mut session = UploadSession::new(&file.name, 0);
                session.fail();
                progress.report(&file.name, session.progress());
                tracing::error!(error = %e, "Cannot split file into chunks");
                return UploadOutcome::Failed {
                    session,
                    error: e.into(),
                };
            }
        };

        let total_chunks = plan.total_chunks();
        let mut session = UploadSession::new(&file.name, total_chunks);
        tracing::Span::current().record("session_id", tracing::field::display(session.id()));
        session.begin();

        tracing::debug!(
            total_chunks = total_chunks,
            chunk_size = plan.chunk_size_bytes(),
            "Starting chunked upload"
        );

        for range in plan.ranges() {
            let data = match file.source.read_range(range.start, range.len).await {
                Ok(data) => data,
                Err(source) => {
                    tracing::error!(
                        chunk_index = range.index,
                        error = %source,
                        "Failed to read chunk"
                    );
                    session.fail();
                    progress.report(&file.name, session.progress());
                    return UploadOutcome::Failed {
                        session,
                        error: UploadError::Read {
                            file_name: file.name.clone(),
                            chunk_index: range.index,
                            source,
                        },
                    };
                }
            };

            let chunk = Chunk {
                data,
                index: range.index,
                total_chunks,
                file_name: file.name.clone(),
            };

            if let Err(source) = transport.send_chunk(chunk).await {
                tracing::warn!(
                    chunk_index = range.index,
                    total_chunks = total_chunks,
                    error = %source,
                    "Chunk upload failed, abandoning file"
                );
                session.fail();
                progress.report(&file.name, session.progress());
                return UploadOutcome::Failed {
                    session,
                    error: UploadError::Transport {
                        chunk_index: range.index,
                        total_chunks,
                        source,
                    },
                };
            }

            let sent = session.record_chunk();
            tracing::debug!(chunk_index = sent, total_chunks = total_chunks, "Chunk uploaded");
            progress.report(&file.name, sent);
        }

        session.complete();
        progress.report(&file.name, session.progress());
        tracing::info!(total_chunks = total_chunks, "Upload complete");

        UploadOutcome::Uploaded(session)
    }
}
