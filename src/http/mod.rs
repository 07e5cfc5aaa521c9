//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: CORS, request ID, trace, panic capture)
//!     → avatar.rs (query pass-through, fetch, rasterize, respond)
//!     → error.rs (502 / 500 plain-text mapping)
//!     → Send to client
//! ```

pub mod avatar;
pub mod error;
pub mod server;

pub use avatar::{avatar_handler, Avatar};
pub use error::AvatarError;
pub use server::{AppState, HttpServer, ServerError};
