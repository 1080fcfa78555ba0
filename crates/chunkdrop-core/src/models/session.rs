use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{PROGRESS_COMPLETE, PROGRESS_FAILED};

/// Upload session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    InProgress,
    Complete,
    Failed,
}

impl SessionStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, SessionStatus::Complete | SessionStatus::Failed)
    }
}

/// Transient progress state of one file's chunk sequence.
///
/// `current_chunk_index` counts chunks the transport has accepted. It only moves
/// forward and never passes `total_chunks`; a finished session no longer changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadSession {
    id: Uuid,
    file_name: String,
    total_chunks: u32,
    current_chunk_index: u32,
    status: SessionStatus,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl UploadSession {
    pub fn new(file_name: impl Into<String>, total_chunks: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            total_chunks,
            current_chunk_index: 0,
            status: SessionStatus::Pending,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn total_chunks(&self) -> u32 {
        self.total_chunks
    }

    pub fn current_chunk_index(&self) -> u32 {
        self.current_chunk_index
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Move a pending session to in-progress.
    pub fn begin(&mut self) {
        if self.status == SessionStatus::Pending {
            self.status = SessionStatus::InProgress;
        }
    }

    /// Record that the next chunk was accepted and return its 1-based index.
    ///
    /// Has no effect on a finished session or once every chunk is recorded.
    pub fn record_chunk(&mut self) -> u32 {
        if self.status == SessionStatus::InProgress && self.current_chunk_index < self.total_chunks
        {
            self.current_chunk_index += 1;
        }
        self.current_chunk_index
    }

    /// Index of the chunk that would be sent next.
    pub fn next_chunk_index(&self) -> Option<u32> {
        if self.status.is_finished() || self.current_chunk_index >= self.total_chunks {
            None
        } else {
            Some(self.current_chunk_index + 1)
        }
    }

    pub fn complete(&mut self) {
        if !self.status.is_finished() {
            self.status = SessionStatus::Complete;
            self.finished_at = Some(Utc::now());
        }
    }

    pub fn fail(&mut self) {
        if !self.status.is_finished() {
            self.status = SessionStatus::Failed;
            self.finished_at = Some(Utc::now());
        }
    }

    /// Coarse progress value shown to the user.
    ///
    /// The index of the last accepted chunk while in flight, `100` once complete
    /// and `0` after a failure.
    pub fn progress(&self) -> u32 {
        match self.status {
            SessionStatus::Complete => PROGRESS_COMPLETE,
            SessionStatus::Failed => PROGRESS_FAILED,
            SessionStatus::Pending | SessionStatus::InProgress => self.current_chunk_index,
        }
    }
}
