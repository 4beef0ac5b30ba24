//! # Routefog Discovery
//!
//! Lazy route discovery for a client-side router: watch the host's render
//! events for discoverable links and forms, batch-fetch route-table
//! patches for the paths they point at, and graft the results onto the
//! live route tree before the user navigates.
//!
//! ```text
//! Render events (links/forms)
//!     │
//!     ├──> DiscoveryObserver (debounced)
//!     │      └─> PathKnowledge.pending
//!     │
//!     ├──> PatchPipeline
//!     │      ├─ GET <base>/__manifest?version=..&p=..&p=..
//!     │      ├─ merge payload into RouteManifest
//!     │      └─ graft new subtrees via RouteTree
//!     │
//!     └──> resolve_miss (router on-miss callback)
//!            └─ single-path fetch with settled fast path
//! ```
//!
//! Everything is best effort: a failed background fetch is logged and the
//! affected paths resolve at click time through the on-miss path instead.

mod error;
mod events;
mod fetch;
mod observer;
mod pipeline;

pub use error::{DiscoveryError, Result};
pub use events::{candidate_path, DiscoveryEvent, ElementKind};
pub use fetch::{FetchOutcome, HttpPatchSource, PatchSource};
pub use observer::{DiscoveryObserver, ObserverConfig};
pub use pipeline::PatchPipeline;
