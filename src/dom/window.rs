//! # Window
//!
//! The environment a router runs against: the displayed document, the
//! session history (which also determines the location), the scroll
//! position, and which platform features are available.
//!
//! ```text
//! Window
//! ├── document: Document            // what is on screen
//! ├── history: SessionHistory       // back/forward stack, owns location
//! ├── scroll: ScrollPosition        // last scroll request
//! ├── transitions: usize            // animated transitions started
//! └── *_supported: bool             // platform capabilities
//! ```

use log::debug;
use url::Url;

use crate::core::history::{self, SessionHistory};
use crate::core::route::RouteKind;
use crate::dom::Document;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollPosition {
    /// Nothing has asked to scroll since the page loaded.
    Unchanged,
    Top,
    /// Scrolled so the element with this id (`#` included) is at the top.
    Element { id: String, smooth: bool },
}

#[derive(Debug, Clone)]
pub struct Window {
    pub document: Document,
    pub history: SessionHistory,
    pub scroll: ScrollPosition,
    pub transitions: usize,
    pub history_supported: bool,
    pub transitions_supported: bool,
    pub intersection_supported: bool,
}

impl Window {
    /// A fully capable window showing `document` at `location`.
    pub fn new(location: Url, document: Document) -> Self {
        Self {
            document,
            history: SessionHistory::new(location),
            scroll: ScrollPosition::Unchanged,
            transitions: 0,
            history_supported: true,
            transitions_supported: true,
            intersection_supported: true,
        }
    }

    pub fn location(&self) -> &Url {
        &self.history.current().url
    }

    pub fn push_if_changed(&mut self, url: &str) -> Result<bool, url::ParseError> {
        history::push_if_changed(&mut self.history, url)
    }

    /// Runs `update` inside an animated transition when the platform has one,
    /// otherwise runs it directly.
    pub fn start_transition<T>(&mut self, update: impl FnOnce(&mut Window) -> T) -> T {
        if self.transitions_supported {
            self.transitions += 1;
            debug!("Starting page transition #{}", self.transitions);
        }
        update(self)
    }

    /// Smooth-scrolls to the element matching `#id`; no-op if there is none.
    pub fn scroll_to_anchor(&mut self, selector: &str) {
        if self.document.element_by_id(selector).is_some() {
            self.scroll = ScrollPosition::Element {
                id: selector.to_string(),
                smooth: true,
            };
        } else {
            debug!("No element for anchor {selector}, not scrolling");
        }
    }

    /// Scroll restoration once a new page is on screen. Link and programmatic
    /// navigations scroll to their fragment target (or the top); back/forward
    /// leaves scrolling to the platform.
    pub fn scroll_after_navigation(&mut self, kind: RouteKind, scroll_id: Option<&str>) {
        if !matches!(kind, RouteKind::Link | RouteKind::Go) {
            return;
        }
        self.scroll = match scroll_id {
            Some(id) if self.document.element_by_id(id).is_some() => ScrollPosition::Element {
                id: id.to_string(),
                smooth: true,
            },
            _ => ScrollPosition::Top,
        };
    }
}
