//! Rasterization subsystem.
//!
//! # Data Flow
//! ```text
//! inbound query pairs
//!     → size.rs (width/height/size → RenderSize)
//! SVG text + RenderSize
//!     → render.rs (usvg parse → contain fit → resvg render → PNG)
//!     → PNG bytes, or RasterError (caller falls back to SVG)
//! ```
//!
//! # Design Decisions
//! - Malformed sizes are defaulted, never rejected
//! - PNG output is lossless
//! - Rendering is synchronous; the HTTP layer moves it off the async workers

pub mod render;
pub mod size;

pub use render::{contain_transform, parse_hex_color, RasterError, Rasterizer};
pub use size::{parse_dimension, RenderSize};
