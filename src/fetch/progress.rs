use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use super::FetchError;

/// Download progress as broadcast to listeners.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct FetchProgress {
    /// Percentage 0-100, or 0 when the total length is unknown.
    pub progress: f64,
    pub received: u64,
    /// Total length from `Content-Length`, 0 when unknown.
    pub length: u64,
}

/// One body chunk plus the running totals after it arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub chunk: Vec<u8>,
    pub received: u64,
    pub length: u64,
    pub progress: f64,
}

impl Progress {
    pub fn summary(&self) -> FetchProgress {
        FetchProgress {
            progress: self.progress,
            received: self.received,
            length: self.length,
        }
    }
}

/// `received / length` as a percentage; 0 for an unknown or zero length.
pub fn percent(received: u64, length: Option<u64>) -> f64 {
    match length {
        Some(total) if total > 0 => received as f64 / total as f64 * 100.0,
        _ => 0.0,
    }
}

/// Wraps a body stream and annotates each chunk with cumulative progress.
///
/// Single pass: once the inner stream ends or fails, this yields `None`
/// forever.
pub struct ProgressStream {
    inner: BoxStream<'static, Result<Vec<u8>, FetchError>>,
    length: Option<u64>,
    received: u64,
    done: bool,
}

impl ProgressStream {
    pub fn new(
        inner: BoxStream<'static, Result<Vec<u8>, FetchError>>,
        content_length: Option<&str>,
    ) -> Self {
        Self {
            inner,
            length: content_length.and_then(|raw| raw.trim().parse().ok()),
            received: 0,
            done: false,
        }
    }

    pub fn length(&self) -> Option<u64> {
        self.length
    }
}

impl Stream for ProgressStream {
    type Item = Result<Progress, FetchError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }
        let polled = self.inner.as_mut().poll_next(cx);
        match polled {
            Poll::Pending => Poll::Pending,
            Poll::Ready(None) => {
                self.done = true;
                Poll::Ready(None)
            }
            Poll::Ready(Some(Err(e))) => {
                self.done = true;
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(Some(Ok(chunk))) => {
                self.received += chunk.len() as u64;
                let progress = Progress {
                    received: self.received,
                    length: self.length.unwrap_or(0),
                    progress: percent(self.received, self.length),
                    chunk,
                };
                Poll::Ready(Some(Ok(progress)))
            }
        }
    }
}
