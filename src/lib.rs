//! Avatar proxy library.
//!
//! Forwards query strings to an avatar generator, rasterizes the returned SVG
//! to PNG at the requested size, and serves the result with caching and CORS
//! headers.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod raster;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
