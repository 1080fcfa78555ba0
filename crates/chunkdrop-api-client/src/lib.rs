//! HTTP chunk transport.
//!
//! Posts each chunk as a multipart form (`file`, `chunk_index`, `total_chunks`,
//! `file_name`) to the URL an [`EndpointResolver`] picks for it. Any non-success
//! response fails the chunk; there are no retries.

pub mod endpoint;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chunkdrop_core::config::UploaderConfig;
use chunkdrop_core::constants::form_fields;
use chunkdrop_core::error::TransportError;
use chunkdrop_processing::traits::{Chunk, ChunkTransport};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};

pub use endpoint::{EndpointResolver, FixedEndpoint, PerChunkEndpoints};

/// Sends chunks to an upload endpoint over HTTP.
#[derive(Clone)]
pub struct HttpChunkTransport {
    client: Client,
    resolver: Arc<dyn EndpointResolver>,
}

impl std::fmt::Debug for HttpChunkTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpChunkTransport").finish_non_exhaustive()
    }
}

impl HttpChunkTransport {
    pub fn new(resolver: Arc<dyn EndpointResolver>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, resolver })
    }

    /// Transport posting every chunk to `endpoint`.
    pub fn fixed(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::new(Arc::new(FixedEndpoint::new(endpoint)), timeout)
    }

    /// Transport posting to the configured endpoint with the configured timeout.
    pub fn from_config(config: &UploaderConfig) -> Result<Self> {
        Self::fixed(
            config.endpoint.clone(),
            Duration::from_secs(config.http_timeout_secs),
        )
    }

    fn build_form(chunk: Chunk) -> Result<Form, TransportError> {
        let len = chunk.data.len() as u64;
        let file_part = Part::stream_with_length(Body::from(chunk.data), len)
            .file_name(chunk.file_name.clone())
            .mime_str("application/octet-stream")
            .map_err(|e| TransportError::Request(format!("Invalid chunk part: {}", e)))?;

        Ok(Form::new()
            .part(form_fields::FILE, file_part)
            .text(form_fields::CHUNK_INDEX, chunk.index.to_string())
            .text(form_fields::TOTAL_CHUNKS, chunk.total_chunks.to_string())
            .text(form_fields::FILE_NAME, chunk.file_name))
    }
}

#[async_trait]
impl ChunkTransport for HttpChunkTransport {
    async fn send_chunk(&self, chunk: Chunk) -> Result<(), TransportError> {
        let url = self
            .resolver
            .resolve(chunk.index, chunk.total_chunks, &chunk.file_name)?;
        let chunk_index = chunk.index;
        let size = chunk.data.len();
        let form = Self::build_form(chunk)?;

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        tracing::debug!(
            url = %url,
            chunk_index = chunk_index,
            size = size,
            status = status.as_u16(),
            "Chunk accepted by upload endpoint"
        );

        Ok(())
    }
}
