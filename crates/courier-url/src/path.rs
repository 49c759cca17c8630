//! URL path as a list of decoded segments.

use crate::charset::Charset;
use crate::codec::{self, profiles};
use std::fmt;

/// Ordered path segments plus a trailing-slash flag.
///
/// Segments are stored decoded. Building always writes `/` before each
/// segment, so a path never stores `/` itself as a segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlPath {
    segments: Vec<String>,
    with_end_slash: bool,
}

impl UrlPath {
    /// Create an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and decode a raw path.
    pub fn of(path: &str, charset: Option<Charset>) -> Self {
        let mut url_path = Self::new();
        url_path.parse(path, charset);
        url_path
    }

    /// Parse a raw path, appending its decoded segments to this one.
    ///
    /// `+` is kept literally; it only means space in form data.
    ///
    /// With no charset, segments are stored as written.
    pub fn parse(&mut self, path: &str, charset: Option<Charset>) -> &mut Self {
        let path = path.trim();
        if path.is_empty() {
            return self;
        }

        if path.ends_with('/') {
            self.with_end_slash = true;
        }

        for segment in path.split('/').filter(|s| !s.is_empty()) {
            self.add(&codec::decode_with(segment, charset, false));
        }
        self
    }

    /// Append a segment.
    pub fn add(&mut self, segment: &str) -> &mut Self {
        self.segments.push(fix_segment(segment));
        self
    }

    /// Insert a segment at the front.
    pub fn add_before(&mut self, segment: &str) -> &mut Self {
        self.segments.insert(0, fix_segment(segment));
        self
    }

    /// Decoded segments in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Segment at `index`, if any.
    pub fn segment(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(String::as_str)
    }

    /// Whether the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Set whether the built path ends with `/`.
    pub fn set_with_end_slash(&mut self, with_end_slash: bool) -> &mut Self {
        self.with_end_slash = with_end_slash;
        self
    }

    /// Whether the built path ends with `/`.
    pub fn has_end_slash(&self) -> bool {
        self.with_end_slash
    }

    /// Encode the path. An empty path builds to `/`.
    pub fn build(&self, charset: Option<Charset>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            out.push_str(&profiles::SEGMENT.encode(segment, charset));
        }
        if self.with_end_slash || out.is_empty() {
            out.push('/');
        }
        out
    }
}

impl fmt::Display for UrlPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build(Some(Charset::Utf8)))
    }
}

/// Trim whitespace and at most one leading and one trailing `/`.
fn fix_segment(segment: &str) -> String {
    let segment = segment.trim();
    let segment = segment.strip_prefix('/').unwrap_or(segment);
    let segment = segment.strip_suffix('/').unwrap_or(segment);
    segment.trim().to_string()
}
