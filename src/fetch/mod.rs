//! # Document Fetch Pipeline
//!
//! Requests the next page, reports progress chunk by chunk, and materializes
//! the response into a [`Document`].
//!
//! ```text
//! Transport::fetch ──► FetchResponse ──► ProgressStream ──► read_document
//!   (one request)       (status, len,     (Progress per      (decode, parse)
//!                        byte chunks)      chunk, in order)
//! ```
//!
//! There are no retries and no timeouts: a stalled body stalls the
//! navigation that is reading it.

mod progress;

use std::fmt;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use log::{debug, info, warn};

use crate::dom::{Document, DocumentError};

pub use progress::{FetchProgress, Progress, ProgressStream, percent};

/// Header sent with every router-initiated request, so servers can tell
/// navigation fetches apart from full page loads.
pub const NAVIGATION_HEADER: &str = "X-Blaze";

/// Errors from the transport or while reading the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request never produced a response (DNS, refused, reset).
    Network(String),
    /// The response body failed part way through.
    Body(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network(msg) => write!(f, "network error: {msg}"),
            FetchError::Body(msg) => write!(f, "body error: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// A response whose body has not been read yet.
pub struct FetchResponse {
    pub status: u16,
    /// Raw `Content-Length` header value, if the server sent one.
    pub content_length: Option<String>,
    pub body: BoxStream<'static, Result<Vec<u8>, FetchError>>,
}

impl fmt::Debug for FetchResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchResponse")
            .field("status", &self.status)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

impl FetchResponse {
    /// Turns the body into a progress-reporting stream.
    pub fn into_progress(self) -> ProgressStream {
        ProgressStream::new(self.body, self.content_length.as_deref())
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a navigation request for `url`. Resolves once headers arrive.
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// `reqwest`-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .header(NAVIGATION_HEADER, "1")
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let content_length = response
            .headers()
            .get(reqwest::header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        debug!("GET {url} -> {status} (content-length {content_length:?})");

        let body = futures::stream::unfold(Some(response), |state| async move {
            let Some(mut response) = state else {
                return None;
            };
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    debug!("Raw chunk received: {} bytes", chunk.len());
                    Some((Ok(chunk.to_vec()), Some(response)))
                }
                Ok(None) => None,
                // A failed read ends the stream after reporting the error.
                Err(e) => Some((Err(FetchError::Body(e.to_string())), None)),
            }
        })
        .boxed();

        Ok(FetchResponse {
            status,
            content_length,
            body,
        })
    }
}

/// Reads a whole response into a document, calling `on_progress` after every
/// chunk in arrival order.
pub async fn read_document(
    response: FetchResponse,
    mut on_progress: impl FnMut(&Progress),
) -> Result<Document, ReadError> {
    if !(200..300).contains(&response.status) {
        warn!("Navigation response status {}, rendering it anyway", response.status);
    }

    let mut stream = response.into_progress();
    let mut html = Vec::new();
    while let Some(progress) = stream.next().await {
        let progress = progress.map_err(ReadError::Fetch)?;
        on_progress(&progress);
        html.extend_from_slice(&progress.chunk);
    }
    info!("Received {} bytes", html.len());

    let text = String::from_utf8_lossy(&html);
    Document::parse(&text).map_err(ReadError::Document)
}

/// Fetches `url` and reads it into a document, ignoring progress.
pub async fn fetch_document(transport: &dyn Transport, url: &str) -> Result<Document, ReadError> {
    let response = transport.fetch(url).await.map_err(ReadError::Fetch)?;
    read_document(response, |_| {}).await
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    Fetch(FetchError),
    Document(DocumentError),
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::Fetch(e) => write!(f, "{e}"),
            ReadError::Document(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ReadError {}
