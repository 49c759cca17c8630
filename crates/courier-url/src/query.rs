//! Query strings as ordered, duplicate-preserving key/value lists.

use crate::charset::Charset;
use crate::codec::{self, profiles, PercentCodec};
use crate::table_map::TableMap;
use std::fmt;
use tracing::trace;

/// Decoded query parameters in their original order.
///
/// A value of `None` is a bare key (`flag` rather than `flag=`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlQuery {
    query: TableMap<String, Option<String>>,
    form_urlencoded: bool,
}

impl UrlQuery {
    /// Create an empty query using the generic query profiles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty query in `application/x-www-form-urlencoded` mode.
    pub fn new_form() -> Self {
        Self {
            query: TableMap::new(),
            form_urlencoded: true,
        }
    }

    /// Parse a query string, removing anything up to the first `?`.
    pub fn of(query: &str, charset: Option<Charset>) -> Self {
        let mut url_query = Self::new();
        url_query.parse(query, charset, true);
        url_query
    }

    /// Parse a form-encoded body or query string.
    pub fn of_form(query: &str, charset: Option<Charset>) -> Self {
        let mut url_query = Self::new_form();
        url_query.parse(query, charset, false);
        url_query
    }

    /// Parse `query`, appending its parameters.
    ///
    /// When `auto_remove_path` is set, everything up to and including the first
    /// `?` is dropped. `&amp;` is accepted as a single separator for strings
    /// copied out of HTML. A trailing bare token that looks like a URL
    /// (starts with `http` or contains `/`) is discarded rather than stored.
    pub fn parse(&mut self, query: &str, charset: Option<Charset>, auto_remove_path: bool) -> &mut Self {
        let mut query = query.trim();
        if query.is_empty() {
            return self;
        }

        if auto_remove_path {
            if let Some(index) = query.find('?') {
                query = &query[index + 1..];
            }
            if query.is_empty() {
                return self;
            }
        }

        let bytes = query.as_bytes();
        let mut name: Option<&str> = None;
        let mut pos = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'=' if name.is_none() => {
                    name = Some(&query[pos..i]);
                    pos = i + 1;
                }
                b'&' => {
                    self.add_param(name.take(), &query[pos..i], charset);
                    if query[i + 1..].starts_with("amp;") {
                        i += 4;
                    }
                    pos = i + 1;
                }
                _ => {}
            }
            i += 1;
        }

        let rest = &query[pos.min(query.len())..];
        if name.is_none() && looks_like_url(rest) {
            trace!(rest, "discarding URL-like trailing query token");
        } else {
            self.add_param(name, rest, charset);
        }
        self
    }

    fn add_param(&mut self, name: Option<&str>, value: &str, charset: Option<Charset>) {
        let plus_as_space = self.form_urlencoded;
        match name {
            Some(name) => {
                let key = codec::decode_with(name, charset, plus_as_space);
                let value = codec::decode_with(value, charset, plus_as_space);
                self.query.put(key, Some(value));
            }
            None if !value.is_empty() => {
                let key = codec::decode_with(value, charset, plus_as_space);
                self.query.put(key, None);
            }
            None => {}
        }
    }

    /// Append a `key=value` parameter.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.query.put(key.into(), Some(value.into()));
        self
    }

    /// Append a bare key with no value.
    pub fn add_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.query.put(key.into(), None);
        self
    }

    /// Append a parameter whose value may be absent.
    pub fn add_opt(&mut self, key: impl Into<String>, value: Option<String>) -> &mut Self {
        self.query.put(key.into(), value);
        self
    }

    /// Append every pair.
    pub fn add_all<K, V, I>(&mut self, pairs: I) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in pairs {
            self.add(key, value);
        }
        self
    }

    /// First value stored under `key`. Bare keys yield `None`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.query.get(key).and_then(|v| v.as_deref())
    }

    /// Every value stored under `key`, in order.
    pub fn get_all(&self, key: &str) -> Vec<Option<&str>> {
        self.query.get_values(key).into_iter().map(|v| v.as_deref()).collect()
    }

    /// Whether `key` occurs at least once.
    pub fn contains_key(&self, key: &str) -> bool {
        self.query.contains_key(key)
    }

    /// Remove the first occurrence of `key`.
    pub fn remove(&mut self, key: &str) -> Option<Option<String>> {
        self.query.remove(key)
    }

    /// Number of parameters, counting duplicates.
    pub fn len(&self) -> usize {
        self.query.len()
    }

    /// Whether there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    /// The underlying ordered map.
    pub fn entries(&self) -> &TableMap<String, Option<String>> {
        &self.query
    }

    /// Whether form encoding is used when building.
    pub fn is_form_urlencoded(&self) -> bool {
        self.form_urlencoded
    }

    /// Switch between form encoding and the generic query profiles.
    pub fn set_form_urlencoded(&mut self, form_urlencoded: bool) -> &mut Self {
        self.form_urlencoded = form_urlencoded;
        self
    }

    /// Encode the parameters with the profile matching the current mode.
    pub fn build(&self, charset: Option<Charset>) -> String {
        if self.form_urlencoded {
            self.build_with(&profiles::FORM_URLENCODED, &profiles::FORM_URLENCODED, charset)
        } else {
            self.build_with(&profiles::QUERY_PARAM_NAME, &profiles::QUERY_PARAM_VALUE, charset)
        }
    }

    /// Encode the parameters with explicit key and value codecs.
    ///
    /// Pairs are joined with `&`; a bare key is written without `=`, an empty
    /// value as `key=`.
    pub fn build_with(&self, key_codec: &PercentCodec, value_codec: &PercentCodec, charset: Option<Charset>) -> String {
        let mut out = String::new();
        for (index, (key, value)) in self.query.iter().enumerate() {
            if index > 0 {
                out.push('&');
            }
            out.push_str(&key_codec.encode(key, charset));
            if let Some(value) = value {
                out.push('=');
                out.push_str(&value_codec.encode(value, charset));
            }
        }
        out
    }

    /// Encode a list of pairs as a query string with the generic profiles.
    pub fn build_query<K, V, I>(pairs: I, charset: Charset) -> String
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut query = Self::new();
        query.add_all(pairs);
        query.build(Some(charset))
    }
}

impl fmt::Display for UrlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build(Some(Charset::Utf8)))
    }
}

// TODO: confirm against real traffic whether values containing `/` should
// survive here; for now only bare trailing tokens are affected.
fn looks_like_url(token: &str) -> bool {
    token.starts_with("http") || token.contains('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    const UTF8: Option<Charset> = Some(Charset::Utf8);

    #[test]
    fn test_parse_simple_pairs() {
        let query = UrlQuery::of("a=1&b=2", UTF8);
        assert_eq!(query.len(), 2);
        assert_eq!(query.get("a"), Some("1"));
        assert_eq!(query.get("b"), Some("2"));
        assert_eq!(query.build(UTF8), "a=1&b=2");
    }

    #[test]
    fn test_duplicate_keys_preserved() {
        let query = UrlQuery::of("a=1&a=2", UTF8);
        assert_eq!(query.get_all("a"), vec![Some("1"), Some("2")]);
        assert_eq!(query.build(UTF8), "a=1&a=2");
    }

    #[test]
    fn test_html_entity_ampersand() {
        let query = UrlQuery::of("a=1&amp;b=2", UTF8);
        assert_eq!(query.len(), 2);
        assert_eq!(query.get("a"), Some("1"));
        assert_eq!(query.get("b"), Some("2"));
    }

    #[test]
    fn test_bare_key() {
        let query = UrlQuery::of("flag", UTF8);
        assert_eq!(query.len(), 1);
        assert!(query.contains_key("flag"));
        assert_eq!(query.get_all("flag"), vec![None]);
        assert_eq!(query.build(UTF8), "flag");
    }

    #[test]
    fn test_empty_value_keeps_equals() {
        let query = UrlQuery::of("a=&b", UTF8);
        assert_eq!(query.get_all("a"), vec![Some("")]);
        assert_eq!(query.build(UTF8), "a=&b");
    }

    #[test]
    fn test_equals_inside_value() {
        let query = UrlQuery::of("token=a=b", UTF8);
        assert_eq!(query.get("token"), Some("a=b"));
    }

    #[test]
    fn test_auto_remove_path() {
        let query = UrlQuery::of("http://example.com/search?q=rust&page=2", UTF8);
        assert_eq!(query.get("q"), Some("rust"));
        assert_eq!(query.get("page"), Some("2"));
    }

    #[test]
    fn test_url_without_query_is_discarded() {
        let query = UrlQuery::of("http://example.com/search", UTF8);
        assert!(query.is_empty());
    }

    #[test]
    fn test_trailing_url_token_dropped_without_path_removal() {
        let mut query = UrlQuery::new();
        query.parse("a=1&/static/app.js", UTF8, false);
        assert_eq!(query.len(), 1);
        assert_eq!(query.get("a"), Some("1"));

        let form = UrlQuery::of_form("a=1&https://cdn.example.com", UTF8);
        assert_eq!(form.len(), 1);
    }

    #[test]
    fn test_url_valued_parameter_is_kept() {
        let query = UrlQuery::of("next=http://example.com/a", UTF8);
        assert_eq!(query.get("next"), Some("http://example.com/a"));
    }

    #[test]
    fn test_empty_tokens_skipped() {
        let query = UrlQuery::of("a=1&&b=2&", UTF8);
        assert_eq!(query.len(), 2);
    }

    #[test]
    fn test_plus_decoding_depends_on_mode() {
        let query = UrlQuery::of("q=a+b%20c", UTF8);
        assert_eq!(query.get("q"), Some("a+b c"));

        let form = UrlQuery::of_form("q=a+b%20c", UTF8);
        assert_eq!(form.get("q"), Some("a b c"));
    }

    #[test]
    fn test_build_encodes_reserved_characters() {
        let mut query = UrlQuery::new();
        query.add("a&b", "c d+e").add("k=", "é");
        assert_eq!(query.build(UTF8), "a%26b=c%20d%2Be&k%3D=%C3%A9");
    }

    #[test]
    fn test_form_build_uses_plus() {
        let mut query = UrlQuery::new_form();
        query.add("name", "Alice Smith").add("note", "a/b");
        assert_eq!(query.build(UTF8), "name=Alice+Smith&note=a%2Fb");
    }

    #[test]
    fn test_build_without_charset_is_raw() {
        let mut query = UrlQuery::new();
        query.add("a b", "c&d");
        assert_eq!(query.build(None), "a b=c&d");
    }

    #[test]
    fn test_parse_without_charset_keeps_escapes() {
        let query = UrlQuery::of("a=%20", None);
        assert_eq!(query.get("a"), Some("%20"));
    }

    #[test]
    fn test_remove_first_occurrence() {
        let mut query = UrlQuery::of("a=1&a=2", UTF8);
        assert_eq!(query.remove("a"), Some(Some("1".to_string())));
        assert_eq!(query.get("a"), Some("2"));
    }

    #[test]
    fn test_build_query_helper() {
        let built = UrlQuery::build_query(vec![("x", "1"), ("y", "two words")], Charset::Utf8);
        assert_eq!(built, "x=1&y=two%20words");
    }
}
