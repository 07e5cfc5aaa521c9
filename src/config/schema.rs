//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the avatar proxy.
//! All types derive Serde traits for deserialization from config files, and every
//! field has a default so an empty file yields a working service.

use serde::{Deserialize, Serialize};

/// Root configuration for the avatar proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Avatar generator the query string is forwarded to.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// SVG to PNG conversion settings.
    pub raster: RasterConfig,

    /// Response headers and routing.
    pub response: ResponseConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Upstream avatar generator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL; the inbound query string replaces its query.
    pub base_url: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// User-Agent sent with every upstream request.
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://avataaars.io/".to_string(),
            connect_timeout_secs: 10,
            user_agent: concat!("avatar-proxy/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Rasterization configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Edge length used when the request carries no usable size.
    pub default_size: u32,

    /// Largest width or height that will be rendered. Larger requests fall back to SVG.
    ///
    /// This is a resource guard only: without it any positive size would be
    /// rendered, and one request could allocate gigabytes of pixmap.
    pub max_dimension: u32,

    /// Letterbox colour as `#rrggbb` or `#rrggbbaa`. Defaults to opaque black.
    pub background: String,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            default_size: 512,
            max_dimension: 4096,
            background: "#000000ff".to_string(),
        }
    }
}

/// Response configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Path the avatar endpoint is mounted at (also served at `/`).
    pub route: String,

    /// `max-age` for successful responses, in seconds.
    pub cache_max_age_secs: u64,

    /// `stale-while-revalidate` for successful responses, in seconds.
    pub stale_while_revalidate_secs: u64,
}

impl ResponseConfig {
    /// Value of the `Cache-Control` header sent with avatars.
    pub fn cache_control(&self) -> String {
        format!(
            "public, max-age={}, stale-while-revalidate={}",
            self.cache_max_age_secs, self.stale_while_revalidate_secs
        )
    }
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            route: "/api/avatar".to_string(),
            cache_max_age_secs: 86_400,
            stale_while_revalidate_secs: 86_400,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
