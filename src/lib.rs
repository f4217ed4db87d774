//! Blaze library exports

pub mod core;
pub mod dom;
pub mod fetch;
pub mod router;

#[cfg(test)]
pub mod test_support;

pub use crate::core::config::{PrefetchStrategy, RouterOptions};
pub use crate::core::state::{NavigationOutcome, RouterPhase};
pub use dom::{Document, Window};
pub use fetch::{HttpTransport, Transport};
pub use router::{BrowserEvent, Router, RouterEvent};
