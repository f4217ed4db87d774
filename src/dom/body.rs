//! # Body Replacement
//!
//! The body is swapped wholesale. Elements marked with [`PRESERVE_ATTR`] and
//! an `id` survive the swap: the live element is cloned into the place of its
//! counterpart in the next body before the replacement happens.
//!
//! Script elements that arrive through a swap are inert, so after every swap
//! each script is rebuilt from its attributes and source and handed to a
//! [`ScriptHost`] to run.

use std::collections::BTreeMap;

use log::{debug, info};

use crate::dom::{Document, Element};

/// Marks an element (together with its `id`) to be carried across navigations.
pub const PRESERVE_ATTR: &str = "blaze-preserve";
/// Marks a head script to be re-run after every navigation.
pub const RELOAD_ATTR: &str = "data-reload";

/// An executable script: what a freshly constructed `<script>` is made of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub attrs: BTreeMap<String, String>,
    pub source: String,
}

impl Script {
    pub fn src(&self) -> Option<&str> {
        self.attrs.get("src").map(String::as_str)
    }
}

/// Runs scripts on behalf of the router. Execution semantics (sync, async,
/// module) are up to the host.
pub trait ScriptHost: Send + Sync {
    fn execute(&self, script: &Script);
}

/// A host that only records what would have run.
pub struct LoggingScriptHost;

impl ScriptHost for LoggingScriptHost {
    fn execute(&self, script: &Script) {
        match script.src() {
            Some(src) => info!("Running script {src}"),
            None => info!("Running inline script ({} bytes)", script.source.len()),
        }
    }
}

/// Swaps `current.body` for `next.body`, carrying preserved elements over.
///
/// Returns the number of elements preserved.
pub fn replace_body(current: &mut Document, mut next: Document) -> usize {
    let mut preserved = 0;
    for keep in current.body.find_all(&is_preserved) {
        let Some(id) = keep.attr("id") else {
            continue;
        };
        let slot = next
            .body
            .find_mut(&|el| is_preserved(el) && el.attr("id") == Some(id));
        if let Some(slot) = slot {
            *slot = keep.clone();
            preserved += 1;
        }
    }

    debug!("Replacing body ({preserved} preserved elements)");
    current.body = next.body;
    preserved
}

fn is_preserved(el: &Element) -> bool {
    el.has_attr(PRESERVE_ATTR) && el.has_attr("id")
}

/// Builds a fresh script element with the same attributes and inline source.
pub fn activate_script(script: &Element) -> Element {
    let fresh = Element {
        name: "script".to_string(),
        attrs: script.attrs.clone(),
        children: Vec::new(),
    };
    let source = script.text_content();
    if source.is_empty() {
        fresh
    } else {
        fresh.with_text(source)
    }
}

/// Re-activates scripts after a swap: head scripts carrying
/// [`RELOAD_ATTR`] first, then every body script, each in document order.
///
/// Returns the number of scripts handed to `host`.
pub fn run_scripts(document: &mut Document, host: &dyn ScriptHost) -> usize {
    let mut count = 0;
    let mut activate = |el: &mut Element, head: bool| {
        if el.is("script") && (!head || el.has_attr(RELOAD_ATTR)) {
            *el = activate_script(el);
            host.execute(&Script {
                attrs: el.attrs.clone(),
                source: el.text_content(),
            });
            count += 1;
        }
    };

    document.head.walk_mut(&mut |el| activate(el, true));
    document.body.walk_mut(&mut |el| activate(el, false));
    count
}
