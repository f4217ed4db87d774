//! # Router State
//!
//! The router's phase and the result of a navigation attempt.
//!
//! ```text
//!            link | go | popstate (next != prev)
//!   Idle ───────────────────────────────────────► Navigating
//!    ▲                                               │
//!    │            ended / superseded                 │
//!    ├───────────────────────────────────────────────┤
//!    │                                               │ fetch/merge/replace failed
//!    └────────────────────── Error ◄─────────────────┘
//! ```
//!
//! `Error` is transient: the router logs and broadcasts the failure, then
//! settles back to `Idle`.

use serde::Serialize;

#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RouterPhase {
    #[default]
    Idle,
    Navigating,
    Error,
}

/// How a call into the router ended.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NavigationOutcome {
    /// A new page was fetched and is now displayed.
    Completed,
    /// The change was not a navigation (external, anchor, same page, ...).
    Ignored,
    /// A newer navigation started while this one was fetching; its result
    /// was discarded.
    Superseded,
    /// The router is disabled or torn down.
    Disabled,
    /// Fetching or applying the page failed.
    Failed,
}

impl NavigationOutcome {
    pub fn is_success(self) -> bool {
        self == NavigationOutcome::Completed
    }
}
