//! # Prefetching
//!
//! Warms likely next pages before they are clicked. Two strategies share one
//! candidate list and one de-duplication set:
//!
//! - **hover**: a one-shot listener per candidate link; the first pointer
//!   enter prefetches its target.
//! - **visible**: one lazily created [`VisibilityWatcher`] observes every
//!   candidate and prefetches a link once it is fully in view.
//!
//! Candidates are resolved to absolute URLs, so the de-duplication set
//! compares like with like no matter how the href was written.

use std::collections::HashSet;

use log::debug;
use url::Url;

use crate::core::canonical::canonicalize;
use crate::core::config::PrefetchStrategy;
use crate::dom::{Element, Node, NodePath, Window};

/// Fraction of a link that must be in view before it is prefetched.
pub const VISIBILITY_THRESHOLD: f64 = 1.0;

/// Tracks which link targets are being watched for visibility.
#[derive(Debug, Default)]
pub struct VisibilityWatcher {
    observed: HashSet<String>,
}

impl VisibilityWatcher {
    pub fn observe(&mut self, url: &str) {
        self.observed.insert(url.to_string());
    }

    /// Returns whether `url` was being observed.
    pub fn unobserve(&mut self, url: &str) -> bool {
        self.observed.remove(url)
    }

    pub fn is_observing(&self, url: &str) -> bool {
        self.observed.contains(url)
    }

    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    pub fn disconnect(&mut self) {
        self.observed.clear();
    }
}

/// What to do in response to a visibility change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityAction {
    Prefetch(String),
    /// Already prefetched elsewhere; stop watching.
    Unobserved,
    Nothing,
}

#[derive(Debug, Default)]
pub struct PrefetchState {
    /// Every URL ever prefetched this session. Only grows.
    prefetched: HashSet<String>,
    /// Targets with an armed one-shot hover listener.
    hover: HashSet<String>,
    watcher: Option<VisibilityWatcher>,
}

impl PrefetchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_prefetched(&self, url: &str) -> bool {
        self.prefetched.contains(url)
    }

    pub fn prefetched(&self) -> impl Iterator<Item = &str> {
        self.prefetched.iter().map(String::as_str)
    }

    pub fn watcher(&self) -> Option<&VisibilityWatcher> {
        self.watcher.as_ref()
    }

    pub fn hover_armed(&self, url: &str) -> bool {
        self.hover.contains(url)
    }

    /// Records `url` as prefetched. Returns false if it already was.
    pub fn record(&mut self, url: &str) -> bool {
        self.prefetched.insert(url.to_string())
    }

    /// Attaches listeners for the current candidates. Returns how many were
    /// armed.
    pub fn arm(&mut self, strategy: PrefetchStrategy, window: &Window) -> usize {
        let candidates = candidates(window, &self.prefetched);
        match strategy {
            PrefetchStrategy::Hover => {
                self.hover.extend(candidates.iter().cloned());
            }
            PrefetchStrategy::Visible => {
                if !window.intersection_supported {
                    debug!("Visibility watching unavailable, not prefetching");
                    return 0;
                }
                let watcher = self.watcher.get_or_insert_with(VisibilityWatcher::default);
                for url in &candidates {
                    watcher.observe(url);
                }
            }
        }
        debug!("Armed {} prefetch candidates ({strategy:?})", candidates.len());
        candidates.len()
    }

    /// Fires the one-shot hover listener for `url`, if one is armed.
    pub fn take_hover(&mut self, url: &str) -> Option<String> {
        self.hover.take(url)
    }

    pub fn on_visibility(&mut self, url: &str, ratio: f64) -> VisibilityAction {
        let Some(watcher) = self.watcher.as_mut() else {
            return VisibilityAction::Nothing;
        };
        if !watcher.is_observing(url) {
            return VisibilityAction::Nothing;
        }
        if self.prefetched.contains(url) {
            watcher.unobserve(url);
            return VisibilityAction::Unobserved;
        }
        if ratio >= VISIBILITY_THRESHOLD {
            watcher.unobserve(url);
            return VisibilityAction::Prefetch(url.to_string());
        }
        VisibilityAction::Nothing
    }

    /// The elements listeners were attached to are gone after a body swap.
    pub fn forget_targets(&mut self) {
        self.hover.clear();
        if let Some(watcher) = self.watcher.as_mut() {
            watcher.disconnect();
        }
    }

    /// Drops every listener and the watcher itself.
    pub fn teardown(&mut self) {
        self.hover.clear();
        if let Some(mut watcher) = self.watcher.take() {
            watcher.disconnect();
        }
    }
}

/// Absolute URL of the link at or above `path` in the body.
pub fn link_target(window: &Window, path: &NodePath) -> Option<String> {
    window
        .document
        .body
        .ancestry(path)
        .into_iter()
        .find(|(_, el)| is_link(el))
        .and_then(|(_, el)| resolve(window.location(), el))
}

fn is_link(el: &Element) -> bool {
    (el.is("a") || el.is("area")) && el.has_attr("href")
}

fn resolve(location: &Url, el: &Element) -> Option<String> {
    let href = el.attr("href")?;
    location.join(href).ok().map(String::from)
}

/// Same-origin links that are not fragments, not the current page and not
/// yet prefetched, in document order without repeats.
pub fn candidates(window: &Window, prefetched: &HashSet<String>) -> Vec<String> {
    let location = window.location();
    let here = canonicalize(None, location).ok();
    let mut seen = HashSet::new();

    window
        .document
        .body
        .find_all(&is_link)
        .into_iter()
        .filter_map(|el| {
            let url = Url::parse(&resolve(location, el)?).ok()?;
            let same_origin = url.origin() == location.origin();
            let has_fragment = url.as_str().contains('#');
            let current = canonicalize(None, &url).ok() == here;
            (same_origin && !has_fragment && !current).then(|| String::from(url))
        })
        .filter(|url| !prefetched.contains(url) && seen.insert(url.clone()))
        .collect()
}

/// The head element that asks the environment to fetch `url` ahead of time.
pub fn hint_element(url: &str) -> Element {
    Element::new("link")
        .with_attr("rel", "prefetch")
        .with_attr("href", url)
        .with_attr("as", "document")
}

pub fn insert_hint(head: &mut Element, url: &str) {
    head.children.push(Node::Element(hint_element(url)));
}
