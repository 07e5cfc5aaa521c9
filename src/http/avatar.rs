//! Avatar endpoint.
//!
//! # Flow
//! 1. Decode the inbound query and forward it verbatim to the generator
//! 2. Non-2xx from the generator → 502, stop
//! 3. Resolve the target size and rasterize the SVG on the blocking pool
//! 4. PNG on success, the original SVG when conversion fails
//!
//! CORS and the 500 catch-all for panics live in the server middleware.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{RawQuery, State},
    http::{
        header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};

use crate::http::error::AvatarError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::raster::{Rasterizer, RenderSize};
use crate::upstream::{parse_query, SVG_MIME};

pub const PNG_MIME: &str = "image/png";

/// A successfully produced avatar body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Avatar {
    Png(Vec<u8>),
    /// Fallback when rasterization fails.
    Svg(String),
}

impl Avatar {
    /// Short label used in logs and metrics.
    pub fn format(&self) -> &'static str {
        match self {
            Avatar::Png(_) => "png",
            Avatar::Svg(_) => "svg",
        }
    }

    fn content_type(&self) -> &'static str {
        match self {
            Avatar::Png(_) => PNG_MIME,
            Avatar::Svg(_) => SVG_MIME,
        }
    }

    fn disposition(&self) -> &'static str {
        match self {
            Avatar::Png(_) => "attachment; filename=\"avatar.png\"",
            Avatar::Svg(_) => "attachment; filename=\"avatar.svg\"",
        }
    }

    /// Build the 200 response with the configured `Cache-Control` value.
    pub fn into_response_with(self, cache_control: HeaderValue) -> Response {
        let headers = [
            (CONTENT_TYPE, HeaderValue::from_static(self.content_type())),
            (CONTENT_DISPOSITION, HeaderValue::from_static(self.disposition())),
            (CACHE_CONTROL, cache_control),
        ];

        match self {
            Avatar::Png(bytes) => (StatusCode::OK, headers, bytes).into_response(),
            Avatar::Svg(text) => (StatusCode::OK, headers, text).into_response(),
        }
    }
}

/// Handler for the avatar route. Accepts any method.
pub async fn avatar_handler(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Response {
    let start_time = Instant::now();
    let raw_query = raw_query.as_deref().unwrap_or_default();

    let result = tokio::time::timeout(state.request_timeout, fetch_avatar(&state, raw_query))
        .await
        .unwrap_or(Err(AvatarError::Timeout(state.request_timeout)));

    match result {
        Ok(avatar) => {
            let format = avatar.format();
            metrics::record_request(StatusCode::OK.as_u16(), format, start_time);
            avatar.into_response_with(state.cache_control.clone())
        }
        Err(err) => {
            metrics::record_request(err.status().as_u16(), "none", start_time);
            err.into_response()
        }
    }
}

/// Fetch the SVG for `raw_query` and try to rasterize it.
pub async fn fetch_avatar(state: &AppState, raw_query: &str) -> Result<Avatar, AvatarError> {
    let pairs = parse_query(raw_query);
    let url = state.upstream.url_for(&pairs);

    tracing::debug!(upstream_url = %url, "Fetching avatar");
    let svg = state.upstream.fetch_svg(url).await?;

    let size = RenderSize::from_query(&pairs, state.rasterizer.default_size());
    Ok(match rasterize(state.rasterizer.clone(), svg.clone(), size).await {
        Some(png) => Avatar::Png(png),
        None => Avatar::Svg(svg),
    })
}

/// Run the conversion on the blocking pool. `None` means serve the SVG.
async fn rasterize(rasterizer: Arc<Rasterizer>, svg: String, size: RenderSize) -> Option<Vec<u8>> {
    let result = tokio::task::spawn_blocking(move || rasterizer.svg_to_png(&svg, size)).await;

    match result {
        Ok(Ok(png)) => Some(png),
        Ok(Err(err)) => {
            tracing::warn!(
                error = %err,
                width = size.width,
                height = size.height,
                "SVG->PNG conversion failed, falling back to SVG"
            );
            None
        }
        Err(join_err) => {
            tracing::warn!(error = %join_err, "SVG->PNG conversion task aborted, falling back to SVG");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_png_response_headers() {
        let response = Avatar::Png(vec![0x89, b'P', b'N', b'G'])
            .into_response_with(HeaderValue::from_static("public, max-age=60"));

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[CONTENT_TYPE], "image/png");
        assert_eq!(headers[CONTENT_DISPOSITION], "attachment; filename=\"avatar.png\"");
        assert_eq!(headers[CACHE_CONTROL], "public, max-age=60");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], &[0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_svg_response_headers() {
        let response = Avatar::Svg("<svg/>".into())
            .into_response_with(HeaderValue::from_static("no-store"));

        let headers = response.headers();
        assert_eq!(headers[CONTENT_TYPE], "image/svg+xml");
        assert_eq!(headers[CONTENT_DISPOSITION], "attachment; filename=\"avatar.svg\"");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"<svg/>");
    }
}
