//! Upstream avatar generator subsystem.
//!
//! # Data Flow
//! ```text
//! inbound raw query
//!     → query.rs (decode pairs, re-serialize onto base URL)
//!     → client.rs (GET with Accept: image/svg+xml)
//!     → SVG text, or UpstreamError
//! ```
//!
//! # Design Decisions
//! - Pass-through is total: no whitelist, no validation of names or values
//! - One pooled client per process
//! - No retries; a failed call fails the request

pub mod client;
pub mod query;

pub use client::{UpstreamClient, UpstreamError, SVG_MIME};
pub use query::{build_upstream_url, first_value, parse_query, QueryPairs};
