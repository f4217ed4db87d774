//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::StreamExt;
use url::Url;

use crate::dom::body::{Script, ScriptHost};
use crate::dom::{Document, Window};
use crate::fetch::{FetchError, FetchResponse, Transport};

/// A minimal page with a title and the given body markup.
pub fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title></head><body>{body}</body></html>"
    )
}

/// A capable window at `url` showing `html`.
pub fn window_at(url: &str, html: &str) -> Window {
    Window::new(Url::parse(url).unwrap(), Document::parse(html).unwrap())
}

/// Records every script it is asked to run.
#[derive(Default)]
pub struct RecordingScriptHost {
    scripts: Mutex<Vec<Script>>,
}

impl RecordingScriptHost {
    pub fn scripts(&self) -> Vec<Script> {
        self.scripts.lock().unwrap().clone()
    }
}

impl ScriptHost for RecordingScriptHost {
    fn execute(&self, script: &Script) {
        self.scripts.lock().unwrap().push(script.clone());
    }
}

/// Serves one fixed body for any URL, split into `chunks` pieces.
pub struct ChunkedTransport {
    body: Vec<u8>,
    chunks: usize,
    send_length: bool,
}

impl ChunkedTransport {
    pub fn new(body: &str, chunks: usize, send_length: bool) -> Self {
        Self {
            body: body.as_bytes().to_vec(),
            chunks: chunks.max(1),
            send_length,
        }
    }
}

#[async_trait]
impl Transport for ChunkedTransport {
    async fn fetch(&self, _url: &str) -> Result<FetchResponse, FetchError> {
        let size = self.body.len().div_ceil(self.chunks).max(1);
        let parts: Vec<Result<Vec<u8>, FetchError>> =
            self.body.chunks(size).map(|c| Ok(c.to_vec())).collect();
        Ok(FetchResponse {
            status: 200,
            content_length: self.send_length.then(|| self.body.len().to_string()),
            body: futures::stream::iter(parts).boxed(),
        })
    }
}

/// Serves a different page per URL; unknown URLs fail like a dead network.
#[derive(Default)]
pub struct SiteTransport {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl SiteTransport {
    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for SiteTransport {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        let html = self
            .pages
            .get(url)
            .ok_or_else(|| FetchError::Network(format!("no route to {url}")))?;
        ChunkedTransport::new(html, 2, true).fetch(url).await
    }
}

/// Always fails before a response arrives.
pub struct FailingTransport;

#[async_trait]
impl Transport for FailingTransport {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        Err(FetchError::Network(format!("connection refused: {url}")))
    }
}

/// Like [`SiteTransport`], but requests for one URL wait until released.
pub struct GatedTransport {
    site: SiteTransport,
    gated: String,
    gate: tokio::sync::Notify,
}

impl GatedTransport {
    pub fn new(site: SiteTransport, gated: &str) -> Self {
        Self {
            site,
            gated: gated.to_string(),
            gate: tokio::sync::Notify::new(),
        }
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl Transport for GatedTransport {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        if url == self.gated {
            self.gate.notified().await;
        }
        self.site.fetch(url).await
    }
}
