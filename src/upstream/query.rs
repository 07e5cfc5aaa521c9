//! Query string pass-through.
//!
//! The inbound query is never filtered: every pair is forwarded in its original
//! order, repeated keys and empty values included.

use url::{form_urlencoded, Url};

/// Ordered `(name, value)` pairs of a decoded query string.
pub type QueryPairs = Vec<(String, String)>;

/// Decode a raw query string (without the leading `?`).
pub fn parse_query(raw: &str) -> QueryPairs {
    form_urlencoded::parse(raw.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Build the upstream URL by replacing the query of `base` with `pairs`.
pub fn build_upstream_url(base: &Url, pairs: &[(String, String)]) -> Url {
    let mut url = base.clone();
    url.set_query(None);
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    url
}

/// First value for `name`, if present.
pub fn first_value<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}
