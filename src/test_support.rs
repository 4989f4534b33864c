//! In-process transport stand-ins for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream;

use crate::error::TransportError;
use crate::transport::{BodyStream, Transport, TransportResponse};

type BodyFactory = Box<dyn Fn() -> BodyStream + Send + Sync>;

/// Records every requested URL and answers with a fixed status and body.
pub(crate) struct RecordingTransport {
    status: u16,
    body: BodyFactory,
    requests: Mutex<Vec<String>>,
}

impl std::fmt::Debug for RecordingTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingTransport")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl RecordingTransport {
    pub(crate) fn new(status: u16, body: &[u8]) -> Self {
        let body = body.to_vec();
        Self::with_body(status, move || {
            stream::iter(vec![Ok::<_, TransportError>(body.clone())]).boxed()
        })
    }

    pub(crate) fn with_body(
        status: u16,
        body: impl Fn() -> BodyStream + Send + Sync + 'static,
    ) -> Self {
        Self {
            status,
            body: Box::new(body),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Sends `prefix`, then breaks the stream with a connection reset.
    pub(crate) fn interrupted(prefix: &[u8]) -> Self {
        let prefix = prefix.to_vec();
        Self::with_body(200, move || {
            stream::iter(vec![
                Ok(prefix.clone()),
                Err(TransportError::from(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "connection reset mid-body",
                ))),
            ])
            .boxed()
        })
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(url.to_string());
        // Let concurrent callers interleave the way real I/O would.
        tokio::task::yield_now().await;
        Ok(TransportResponse {
            status: self.status,
            body: (self.body)(),
        })
    }
}
