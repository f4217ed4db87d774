//! # Route Changes
//!
//! Every click, back/forward, or programmatic navigation is classified into
//! a [`RouteChange`] before anything else happens. Only `Link`, `Go` and
//! `PopState` carry URLs; everything else tells the router to stand aside.
//!
//! ```text
//! click ─► modifiers held? ──yes──► Disqualified
//!            │no
//!            ▼
//!          enclosing <a>? ──no───► Noop
//!            │yes
//!            ▼
//!          other host? ────yes──► External (target=_blank)
//!            │no
//!            ▼
//!          data-cold? ─────yes──► Disqualified
//!            │no                         (default prevented from here on)
//!            ▼
//!          href="#…"? ─────yes──► Scrolled
//!            │no
//!            ▼
//!          Link { next, prev, scroll_id }   + history push
//! ```

use std::fmt;

use log::{debug, warn};
use serde::Serialize;
use url::{ParseError, Url};

use crate::core::canonical::{canonicalize, same_host, scroll_target};
use crate::dom::{Element, NodePath, Window};

/// Anchors carrying this attribute are left to the platform.
pub const OPT_OUT_ATTR: &str = "data-cold";

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    Link,
    Go,
    PopState,
    External,
    Disqualified,
    Scrolled,
    Noop,
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RouteKind::Link => "link",
            RouteKind::Go => "go",
            RouteKind::PopState => "popstate",
            RouteKind::External => "external",
            RouteKind::Disqualified => "disqualified",
            RouteKind::Scrolled => "scrolled",
            RouteKind::Noop => "noop",
        };
        f.write_str(name)
    }
}

/// One navigation attempt. URLs are canonical (see [`canonicalize`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteChange {
    Link {
        next: String,
        prev: String,
        /// `#id` to scroll to once the next page is shown.
        scroll_id: Option<String>,
    },
    Go {
        next: String,
        prev: String,
    },
    /// Back/forward. The platform already moved the history cursor, so there
    /// is nothing to compare against and nothing to push.
    PopState {
        next: String,
    },
    External,
    Disqualified,
    Scrolled,
    Noop,
}

impl RouteChange {
    pub fn kind(&self) -> RouteKind {
        match self {
            RouteChange::Link { .. } => RouteKind::Link,
            RouteChange::Go { .. } => RouteKind::Go,
            RouteChange::PopState { .. } => RouteKind::PopState,
            RouteChange::External => RouteKind::External,
            RouteChange::Disqualified => RouteKind::Disqualified,
            RouteChange::Scrolled => RouteKind::Scrolled,
            RouteChange::Noop => RouteKind::Noop,
        }
    }

    pub fn next(&self) -> Option<&str> {
        match self {
            RouteChange::Link { next, .. }
            | RouteChange::Go { next, .. }
            | RouteChange::PopState { next } => Some(next),
            _ => None,
        }
    }

    pub fn prev(&self) -> Option<&str> {
        match self {
            RouteChange::Link { prev, .. } | RouteChange::Go { prev, .. } => Some(prev),
            _ => None,
        }
    }

    pub fn scroll_id(&self) -> Option<&str> {
        match self {
            RouteChange::Link { scroll_id, .. } => scroll_id.as_deref(),
            _ => None,
        }
    }

    /// True when this change should fetch and render a new page.
    pub fn is_navigation(&self) -> bool {
        match self.next() {
            Some(next) => self.prev() != Some(next),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.alt || self.ctrl || self.meta || self.shift
    }
}

/// A primary-button click on some element of the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub target: NodePath,
    pub modifiers: Modifiers,
    default_prevented: bool,
}

impl ClickEvent {
    pub fn new(target: NodePath) -> Self {
        Self {
            target,
            modifiers: Modifiers::default(),
            default_prevented: false,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Stops the platform from following the link itself.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

fn is_anchor(el: &Element) -> bool {
    el.is("a") || el.is("area")
}

/// Path of the nearest anchor at or above `target`.
fn enclosing_anchor(body: &Element, target: &NodePath) -> Option<NodePath> {
    body.ancestry(target)
        .into_iter()
        .find(|(_, el)| is_anchor(el))
        .map(|(path, _)| path)
}

/// Classifies a click and applies its immediate effects: marking external
/// links, suppressing the default action, in-page scrolling and the history
/// push for followed links.
pub fn classify_click(window: &mut Window, event: &mut ClickEvent) -> RouteChange {
    if event.modifiers.any() {
        return RouteChange::Disqualified;
    }

    let Some(anchor_path) = enclosing_anchor(&window.document.body, &event.target) else {
        return RouteChange::Noop;
    };
    let Some(anchor) = window.document.body.at_path(&anchor_path) else {
        return RouteChange::Noop;
    };
    let Some(href) = anchor.attr("href").map(str::to_string) else {
        return RouteChange::Noop;
    };
    let opted_out = anchor.has_attr(OPT_OUT_ATTR);

    let location = window.location().clone();
    let target = match location.join(&href) {
        Ok(url) => url,
        Err(e) => {
            warn!("Ignoring click on unparseable href {href:?}: {e}");
            return RouteChange::Noop;
        }
    };

    if !same_host(&target, &location) {
        if let Some(anchor) = window.document.body.at_path_mut(&anchor_path) {
            anchor.set_attr("target", "_blank");
        }
        return RouteChange::External;
    }

    if opted_out {
        return RouteChange::Disqualified;
    }

    event.prevent_default();

    if href.starts_with('#') {
        window.scroll_to_anchor(&href);
        return RouteChange::Scrolled;
    }

    let (next, prev) = match (
        canonicalize(Some(target.as_str()), &location),
        canonicalize(None, &location),
    ) {
        (Ok(next), Ok(prev)) => (next, prev),
        (Err(e), _) | (_, Err(e)) => {
            warn!("Could not canonicalize {target}: {e}");
            return RouteChange::Noop;
        }
    };

    if let Err(e) = window.push_if_changed(&next) {
        warn!("Could not push history for {next}: {e}");
    }

    debug!("Link click {prev} -> {next}");
    RouteChange::Link {
        next,
        prev,
        scroll_id: scroll_target(&href),
    }
}

/// Back/forward: the history cursor has already moved, so the new location
/// is the destination.
pub fn classify_pop(window: &Window) -> RouteChange {
    let location = window.location();
    RouteChange::PopState {
        next: canonicalize(None, location).unwrap_or_else(|_| location.to_string()),
    }
}

/// Programmatic navigation to `path`, resolved against the current origin.
pub fn classify_go(window: &Window, path: &str) -> Result<RouteChange, ParseError> {
    let location = window.location();
    let origin = Url::parse(&location.origin().ascii_serialization())?;
    Ok(RouteChange::Go {
        next: canonicalize(Some(path), &origin)?,
        prev: canonicalize(None, location)?,
    })
}
