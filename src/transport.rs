//! HTTP transport seam.
//!
//! The client only ever needs "GET this URL, give me the status and a byte
//! stream". [`Transport`] captures exactly that so the RPC and download paths
//! can be driven by a counting or failing stand-in under test, while
//! [`ReqwestTransport`] does the real work.

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use reqwest::Client;
use tracing::debug;

use crate::error::TransportError;
use crate::user_agent;

/// Response body as a stream of chunks.
pub type BodyStream = BoxStream<'static, Result<Vec<u8>, TransportError>>;

/// Status line and body of one GET.
pub struct TransportResponse {
    pub status: u16,
    pub body: BodyStream,
}

impl std::fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl TransportResponse {
    /// Reads the remaining body into memory.
    ///
    /// # Errors
    ///
    /// Returns the first stream error.
    pub async fn collect_body(self) -> Result<Vec<u8>, TransportError> {
        let mut body = self.body;
        let mut buffer = Vec::new();
        while let Some(chunk) = body.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok(buffer)
    }
}

/// Issues a single GET and returns once response headers arrive.
#[async_trait]
pub trait Transport: std::fmt::Debug + Send + Sync {
    /// # Errors
    ///
    /// Returns [`TransportError`] when the request cannot be sent or the
    /// response headers cannot be read.
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError>;
}

/// Production transport backed by a pooled `reqwest::Client`.
///
/// No request timeout is applied; a call lasts as long as the server keeps
/// the connection open.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds the transport with gzip and the crate User-Agent.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Http`] if the client builder fails.
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()?;
        Ok(Self { client })
    }

    /// Wraps an existing client, e.g. one configured with a proxy.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        debug!(url, "GET");
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(TransportError::from))
            .boxed();
        Ok(TransportResponse { status, body })
    }
}
