//! # Session History
//!
//! An in-memory model of the platform history stack: a list of entries and a
//! cursor. Pushing truncates any forward entries, like the real thing.
//!
//! Entries pushed by the router carry a [`HistoryState`] payload holding the
//! canonical URL, which is what [`push_if_changed`] compares against.

use log::debug;
use serde::{Deserialize, Serialize};
use url::{ParseError, Url};

/// State payload stored with router-pushed entries.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HistoryState {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub url: Url,
    pub state: Option<HistoryState>,
}

#[derive(Debug, Clone)]
pub struct SessionHistory {
    entries: Vec<HistoryEntry>,
    index: usize,
}

impl SessionHistory {
    /// A history holding the initial page load, which has no state payload.
    pub fn new(initial: Url) -> Self {
        Self {
            entries: vec![HistoryEntry {
                url: initial,
                state: None,
            }],
            index: 0,
        }
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    pub fn state(&self) -> Option<&HistoryState> {
        self.current().state.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn push_state(&mut self, state: Option<HistoryState>, url: Url) {
        self.entries.truncate(self.index + 1);
        self.entries.push(HistoryEntry { url, state });
        self.index = self.entries.len() - 1;
    }

    /// Moves one entry back. Returns the new current URL, or `None` at the
    /// start of the session.
    pub fn back(&mut self) -> Option<&Url> {
        self.go(-1)
    }

    pub fn forward(&mut self) -> Option<&Url> {
        self.go(1)
    }

    pub fn go(&mut self, delta: isize) -> Option<&Url> {
        let target = self.index.checked_add_signed(delta)?;
        if target >= self.entries.len() {
            return None;
        }
        self.index = target;
        Some(&self.entries[target].url)
    }
}

/// Pushes `{url}` as a new entry unless the current entry already carries it.
///
/// Returns whether an entry was pushed.
pub fn push_if_changed(history: &mut SessionHistory, url: &str) -> Result<bool, ParseError> {
    if history.state().is_some_and(|state| state.url == url) {
        debug!("History already at {url}, skipping push");
        return Ok(false);
    }

    let parsed = Url::parse(url)?;
    history.push_state(
        Some(HistoryState {
            url: url.to_string(),
        }),
        parsed,
    );
    debug!("Pushed history entry {url} (depth {})", history.len());
    Ok(true)
}
