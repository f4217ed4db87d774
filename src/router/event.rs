use serde::Serialize;

use crate::core::route::ClickEvent;
use crate::dom::NodePath;
use crate::fetch::FetchProgress;

/// Input from the environment.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserEvent {
    Click(ClickEvent),
    /// The history cursor moved (back/forward).
    PopState,
    /// The pointer entered the element at this path.
    PointerEnter(NodePath),
    /// The visible fraction (0.0 - 1.0) of an element changed.
    Intersection { target: NodePath, ratio: f64 },
}

/// Lifecycle signals broadcast by the router. Fire-and-forget: nobody has to
/// listen, and a lagging listener only loses its own copies.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum RouterEvent {
    FetchStarted,
    FetchProgress(FetchProgress),
    NavigationEnded,
    NavigationError { error: String },
}

impl RouterEvent {
    /// Channel-style name, as listeners subscribe to it.
    pub fn name(&self) -> &'static str {
        match self {
            RouterEvent::FetchStarted => "blaze:router:fetch",
            RouterEvent::FetchProgress(_) => "blaze:router:fetch-progress",
            RouterEvent::NavigationEnded => "blaze:router:end",
            RouterEvent::NavigationError { .. } => "blaze:router:error",
        }
    }
}
