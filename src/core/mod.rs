//! # Core Navigation Logic
//!
//! Everything here is synchronous and free of network I/O: turning raw
//! events into route changes, URL canonicalization, the history stack, and
//! configuration.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • route (classify)     │
//!                    │  • canonical (URLs)     │
//!                    │  • history (push/pop)   │
//!                    │  • state (phase)        │
//!                    │  • config (options)     │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │   Router   │      │    DOM     │      │   Fetch    │
//!     │ (orchestr.)│      │ (document) │      │ (network)  │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`route`]: the `RouteChange` enum and the click/pop/go classifiers
//! - [`canonical`]: URL canonicalization
//! - [`history`]: session history and de-duplicated pushes
//! - [`state`]: router phase and navigation outcomes
//! - [`config`]: option loading and resolution

pub mod canonical;
pub mod config;
pub mod history;
pub mod route;
pub mod state;
