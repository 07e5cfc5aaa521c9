//! Output size resolution from query parameters.

use crate::upstream::first_value;

/// Target raster dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSize {
    pub width: u32,
    pub height: u32,
}

impl RenderSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Resolve `width`/`height`/`size` from the query.
    ///
    /// Width comes from `width`, else `size`, else `default`. Height comes from
    /// `height`, else `size`, else the resolved width. A value that does not
    /// parse to a positive integer falls back to `default` (width) or the
    /// resolved width (height); it does not fall through to `size`.
    pub fn from_query(pairs: &[(String, String)], default: u32) -> Self {
        let lookup = |name: &str| first_value(pairs, name).filter(|v| !v.is_empty());
        let size = lookup("size");

        let width = lookup("width")
            .or(size)
            .and_then(parse_dimension)
            .unwrap_or(default);
        let height = lookup("height")
            .or(size)
            .and_then(parse_dimension)
            .unwrap_or(width);

        Self { width, height }
    }
}

/// Lenient integer parse: leading whitespace, optional sign, then leading digits.
///
/// Trailing text is ignored (`"300px"` is 300). Zero, negative or digit-less
/// input yields `None`. Values past `u32::MAX` saturate.
pub fn parse_dimension(raw: &str) -> Option<u32> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: &str = &digits[..digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len())];
    if digits.is_empty() {
        return None;
    }

    let value = digits.bytes().fold(0u32, |acc, b| {
        acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
    });

    if negative || value == 0 {
        None
    } else {
        Some(value)
    }
}
