//! Path and query parameters carried by a [`RouteLocation`](crate::RouteLocation).
//!
//! The host router extracts these; middleware only reads them.
//!
//! - [`RouteParams`] — values of dynamic path segments (`:id` in `/users/:id`).
//! - [`QueryParams`] — the `?key=value&...` part of the URL, multi-valued.
//!
//! ```
//! use navigator_middleware::{QueryParams, RouteParams};
//!
//! let params = RouteParams::new().with("id", "42");
//! assert_eq!(params.get_as::<u32>("id"), Some(42));
//!
//! let query = QueryParams::parse("tab=billing&tag=a&tag=b");
//! assert_eq!(query.get("tab"), Some("billing"));
//! assert_eq!(query.get_all("tag"), ["a", "b"]);
//! ```

use std::collections::BTreeMap;
use std::str::FromStr;

/// Path parameters of a resolved route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    params: BTreeMap<String, String>,
}

impl RouteParams {
    /// Create empty route parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or overwrite a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Get a parameter parsed as `T`; `None` if missing or unparsable.
    pub fn get_as<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key)?.parse().ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }
}

impl<K, V> FromIterator<(K, V)> for RouteParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Query string parameters. A key may carry several values (`?tag=a&tag=b`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: BTreeMap<String, Vec<String>>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string, with or without the leading `?`.
    ///
    /// Pairs without `=` are kept as keys with an empty value. Percent escapes
    /// and `+` are decoded.
    pub fn parse(query: &str) -> Self {
        let mut parsed = Self::new();
        let query = query.strip_prefix('?').unwrap_or(query);

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            parsed.insert(decode_component(key), decode_component(value));
        }

        parsed
    }

    /// Append a value for `key`; existing values are kept.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.entry(key.into()).or_default().push(value.into());
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key)?.first().map(String::as_str)
    }

    /// Every value for `key`, in the order they appeared.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.params.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get_as<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key)?.parse().ok()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.params.len()
    }
}

/// Percent-decode one query component. Invalid escapes are kept verbatim.
fn decode_component(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' => {
                let decoded = raw
                    .get(i + 1..i + 3)
                    .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());
                if let Some(byte) = decoded {
                    out.push(byte);
                    i += 2;
                } else {
                    out.push(b'%');
                }
            }
            other => out.push(other),
        }
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_params_typed_access() {
        let params = RouteParams::new().with("id", "123").with("active", "true");

        assert_eq!(params.get("id"), Some("123"));
        assert_eq!(params.get_as::<u32>("id"), Some(123));
        assert_eq!(params.get_as::<bool>("active"), Some(true));
        assert_eq!(params.get_as::<u32>("missing"), None);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_route_params_from_iter() {
        let params: RouteParams = [("a", "1"), ("b", "2")].into_iter().collect();
        let keys: Vec<_> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn test_query_params_multiple_values() {
        let query = QueryParams::parse("?tag=rust&tag=web&page=2");

        assert_eq!(query.get("tag"), Some("rust"));
        assert_eq!(query.get_all("tag"), ["rust", "web"]);
        assert_eq!(query.get_as::<u32>("page"), Some(2));
        assert!(query.get_all("missing").is_empty());
        assert_eq!(query.len(), 2);
    }

    #[test]
    fn test_query_params_flag_without_value() {
        let query = QueryParams::parse("debug&x=1");
        assert!(query.contains("debug"));
        assert_eq!(query.get("debug"), Some(""));
    }

    #[test]
    fn test_empty_query_string() {
        assert!(QueryParams::parse("").is_empty());
        assert!(QueryParams::parse("?").is_empty());
    }

    #[test]
    fn test_decode_component() {
        assert_eq!(decode_component("hello%20world"), "hello world");
        assert_eq!(decode_component("hello+world"), "hello world");
        assert_eq!(decode_component("caf%C3%A9"), "café");
        assert_eq!(decode_component("100%"), "100%");
        assert_eq!(decode_component("%zz"), "%zz");
        assert_eq!(decode_component("%+1"), "% 1");
    }
}
