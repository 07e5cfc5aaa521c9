//! SVG to PNG conversion with "contain" fit.

use std::sync::Arc;

use resvg::tiny_skia::{Color, Pixmap, Transform};
use resvg::usvg::{self, fontdb};
use thiserror::Error;

use crate::config::RasterConfig;
use crate::raster::size::RenderSize;

/// Errors that can occur while rasterizing an SVG document.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("failed to parse SVG: {0}")]
    Parse(#[from] usvg::Error),

    #[error("SVG has an empty canvas")]
    EmptyDocument,

    #[error("{width}x{height} exceeds the {max}px limit")]
    TooLarge { width: u32, height: u32, max: u32 },

    #[error("could not allocate a {width}x{height} pixmap")]
    Allocation { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("invalid background colour '{0}'")]
    Background(String),
}

/// Parse `#rrggbb` or `#rrggbbaa` into RGBA bytes.
pub fn parse_hex_color(value: &str) -> Option<[u8; 4]> {
    let hex = value.strip_prefix('#')?;
    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let alpha = if hex.len() == 8 { channel(6)? } else { u8::MAX };
    Some([channel(0)?, channel(2)?, channel(4)?, alpha])
}

/// Transform that scales a `src_w`×`src_h` canvas uniformly to fit inside
/// `size` and centres it.
pub fn contain_transform(src_w: f32, src_h: f32, size: RenderSize) -> Transform {
    let (dst_w, dst_h) = (size.width as f32, size.height as f32);
    let scale = (dst_w / src_w).min(dst_h / src_h);
    let tx = (dst_w - src_w * scale) / 2.0;
    let ty = (dst_h - src_h * scale) / 2.0;
    Transform::from_row(scale, 0.0, 0.0, scale, tx, ty)
}

/// Renders SVG text to PNG bytes.
///
/// Holds the shared font database so `<text>` elements render without
/// reloading system fonts per request.
pub struct Rasterizer {
    fontdb: Arc<fontdb::Database>,
    background: Color,
    default_size: u32,
    max_dimension: u32,
}

impl Rasterizer {
    /// Build a rasterizer, loading system fonts once.
    pub fn new(config: &RasterConfig) -> Result<Self, RasterError> {
        let mut fontdb = fontdb::Database::new();
        fontdb.load_system_fonts();
        Self::with_fontdb(config, fontdb)
    }

    pub fn with_fontdb(config: &RasterConfig, fontdb: fontdb::Database) -> Result<Self, RasterError> {
        let [r, g, b, a] = parse_hex_color(&config.background)
            .ok_or_else(|| RasterError::Background(config.background.clone()))?;

        tracing::debug!(faces = fontdb.len(), "Font database loaded");

        Ok(Self {
            fontdb: Arc::new(fontdb),
            background: Color::from_rgba8(r, g, b, a),
            default_size: config.default_size,
            max_dimension: config.max_dimension,
        })
    }

    pub fn default_size(&self) -> u32 {
        self.default_size
    }

    /// Rasterize `svg` into a `size` PNG, letterboxed with the background colour.
    ///
    /// CPU-bound; call from a blocking context.
    pub fn svg_to_png(&self, svg: &str, size: RenderSize) -> Result<Vec<u8>, RasterError> {
        if size.width > self.max_dimension || size.height > self.max_dimension {
            return Err(RasterError::TooLarge {
                width: size.width,
                height: size.height,
                max: self.max_dimension,
            });
        }

        let options = usvg::Options {
            fontdb: self.fontdb.clone(),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(svg, &options)?;

        let canvas = tree.size();
        if canvas.width() <= 0.0 || canvas.height() <= 0.0 {
            return Err(RasterError::EmptyDocument);
        }

        let mut pixmap = Pixmap::new(size.width, size.height).ok_or(RasterError::Allocation {
            width: size.width,
            height: size.height,
        })?;
        pixmap.fill(self.background);

        let transform = contain_transform(canvas.width(), canvas.height(), size);
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        pixmap
            .encode_png()
            .map_err(|e| RasterError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDE_RED: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="50" viewBox="0 0 100 50">
  <rect width="100" height="50" fill="#ff0000"/>
</svg>"##;

    const AVATAR_SHAPED: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="264" height="280" viewBox="0 0 264 280">
  <rect width="264" height="280" fill="#ffffff"/>
</svg>"##;

    fn rasterizer(config: RasterConfig) -> Rasterizer {
        Rasterizer::with_fontdb(&config, fontdb::Database::new()).unwrap()
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff8000"), Some([255, 128, 0, 255]));
        assert_eq!(parse_hex_color("#00000000"), Some([0, 0, 0, 0]));
        assert_eq!(parse_hex_color("ff8000"), None);
        assert_eq!(parse_hex_color("#ff80"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
        assert_eq!(parse_hex_color("#ééé"), None);
    }

    #[test]
    fn test_contain_transform_letterboxes_wide_source() {
        let t = contain_transform(100.0, 50.0, RenderSize::new(64, 64));
        assert!((t.sx - 0.64).abs() < 1e-6);
        assert_eq!(t.sx, t.sy);
        assert!(t.tx.abs() < 1e-4);
        assert!((t.ty - 16.0).abs() < 1e-4);
    }

    #[test]
    fn test_contain_transform_pillarboxes_tall_source() {
        // 264x280 is the generator's native canvas
        let t = contain_transform(264.0, 280.0, RenderSize::new(560, 280));
        assert_eq!(t.sx, 1.0);
        assert_eq!(t.tx, 148.0);
        assert_eq!(t.ty, 0.0);
    }

    #[test]
    fn test_renders_png_at_requested_size() {
        let png = rasterizer(RasterConfig::default())
            .svg_to_png(WIDE_RED, RenderSize::new(64, 64))
            .unwrap();

        let decoded = Pixmap::decode_png(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 64));

        let centre = decoded.pixel(32, 32).unwrap();
        assert_eq!((centre.red(), centre.alpha()), (255, 255));

        // letterbox band above the image is opaque black by default
        let band = decoded.pixel(32, 4).unwrap();
        assert_eq!((band.red(), band.green(), band.blue(), band.alpha()), (0, 0, 0, 255));
    }

    #[test]
    fn test_default_size_pillarboxes_avatar_in_black() {
        let png = rasterizer(RasterConfig::default())
            .svg_to_png(AVATAR_SHAPED, RenderSize::new(512, 512))
            .unwrap();

        let decoded = Pixmap::decode_png(&png).unwrap();
        // 264x280 scaled to 482.7x512 leaves ~14.6px bars left and right
        let bar = decoded.pixel(2, 256).unwrap();
        assert_eq!((bar.red(), bar.green(), bar.blue(), bar.alpha()), (0, 0, 0, 255));

        let centre = decoded.pixel(256, 256).unwrap();
        assert_eq!((centre.red(), centre.alpha()), (255, 255));
    }

    #[test]
    fn test_transparent_background_is_configurable() {
        let config = RasterConfig {
            background: "#00000000".into(),
            ..RasterConfig::default()
        };
        let png = rasterizer(config)
            .svg_to_png(WIDE_RED, RenderSize::new(64, 64))
            .unwrap();

        let band = Pixmap::decode_png(&png).unwrap().pixel(32, 4).unwrap();
        assert_eq!(band.alpha(), 0);
    }

    #[test]
    fn test_background_fills_letterbox() {
        let config = RasterConfig {
            background: "#0000ff".into(),
            ..RasterConfig::default()
        };
        let png = rasterizer(config)
            .svg_to_png(WIDE_RED, RenderSize::new(64, 64))
            .unwrap();

        let band = Pixmap::decode_png(&png).unwrap().pixel(32, 4).unwrap();
        assert_eq!((band.blue(), band.alpha()), (255, 255));
    }

    #[test]
    fn test_invalid_svg_is_parse_error() {
        let err = rasterizer(RasterConfig::default())
            .svg_to_png("this is not svg", RenderSize::new(64, 64))
            .unwrap_err();
        assert!(matches!(err, RasterError::Parse(_)));
    }

    #[test]
    fn test_oversized_request_rejected_before_parsing() {
        let err = rasterizer(RasterConfig::default())
            .svg_to_png(WIDE_RED, RenderSize::new(4097, 10))
            .unwrap_err();
        assert!(matches!(err, RasterError::TooLarge { max: 4096, .. }));
    }

    #[test]
    fn test_bad_background_rejected() {
        let config = RasterConfig {
            background: "transparent".into(),
            ..RasterConfig::default()
        };
        let err = Rasterizer::with_fontdb(&config, fontdb::Database::new())
            .err()
            .unwrap();
        assert!(matches!(err, RasterError::Background(_)));
    }
}
