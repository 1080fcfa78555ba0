//! Test helpers: in-memory transport and progress recorders.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chunkdrop_core::error::TransportError;

use crate::traits::{Chunk, ChunkTransport, ProgressReporter};

/// Transport that keeps every chunk it receives and can be told to fail.
#[derive(Default)]
pub struct RecordingTransport {
    chunks: Mutex<Vec<Chunk>>,
    fail_on: Mutex<HashMap<String, u32>>,
    in_flight: Mutex<HashMap<String, usize>>,
    overlaps: AtomicUsize,
    max_files_in_flight: AtomicUsize,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the call for chunk `index` of `file_name`.
    pub fn fail_on(self, file_name: &str, index: u32) -> Self {
        self.fail_on
            .lock()
            .unwrap()
            .insert(file_name.to_string(), index);
        self
    }

    pub fn chunks(&self) -> Vec<Chunk> {
        self.chunks.lock().unwrap().clone()
    }

    pub fn chunks_for(&self, file_name: &str) -> Vec<Chunk> {
        self.chunks()
            .into_iter()
            .filter(|c| c.file_name == file_name)
            .collect()
    }

    /// Number of times a chunk arrived while another chunk of the same file was in flight.
    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }

    /// Highest number of distinct files seen in flight at once.
    pub fn max_files_in_flight(&self) -> usize {
        self.max_files_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChunkTransport for RecordingTransport {
    async fn send_chunk(&self, chunk: Chunk) -> Result<(), TransportError> {
        {
            let mut in_flight = self.in_flight.lock().unwrap();
            let count = in_flight.entry(chunk.file_name.clone()).or_insert(0);
            if *count > 0 {
                self.overlaps.fetch_add(1, Ordering::SeqCst);
            }
            *count += 1;
            let files = in_flight.values().filter(|c| **c > 0).count();
            self.max_files_in_flight.fetch_max(files, Ordering::SeqCst);
        }

        // give sibling uploads a chance to run
        tokio::task::yield_now().await;

        let should_fail = self.fail_on.lock().unwrap().get(&chunk.file_name) == Some(&chunk.index);

        if let Some(count) = self.in_flight.lock().unwrap().get_mut(&chunk.file_name) {
            *count -= 1;
        }

        if should_fail {
            return Err(TransportError::Status {
                status: 500,
                body: "injected failure".to_string(),
            });
        }

        self.chunks.lock().unwrap().push(chunk);
        Ok(())
    }
}

/// Progress reporter that records every event.
#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<(String, u32)>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events_for(&self, file_name: &str) -> Vec<u32> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == file_name)
            .map(|(_, p)| *p)
            .collect()
    }
}

impl ProgressReporter for RecordingProgress {
    fn report(&self, file_name: &str, progress: u32) {
        self.events
            .lock()
            .unwrap()
            .push((file_name.to_string(), progress));
    }
}
