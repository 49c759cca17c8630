//! Standard codec profiles from RFC 3986 and the HTML form encoding.

use super::PercentCodec;
use once_cell::sync::Lazy;

/// `ALPHA / DIGIT / "-" / "." / "_" / "~"`.
pub static UNRESERVED: Lazy<PercentCodec> = Lazy::new(|| {
    let mut codec = PercentCodec::from_chars("-._~");
    codec
        .add_safe_range('a', 'z')
        .add_safe_range('A', 'Z')
        .add_safe_range('0', '9');
    codec
});

/// `"!" / "$" / "&" / "'" / "(" / ")" / "*" / "+" / "," / ";" / "="`.
pub static SUB_DELIMS: Lazy<PercentCodec> = Lazy::new(|| PercentCodec::from_chars("!$&'()*+,;="));

/// `unreserved / sub-delims / ":" / "@"`.
pub static PCHAR: Lazy<PercentCodec> = Lazy::new(|| {
    let mut codec = UNRESERVED.or(&SUB_DELIMS);
    codec.add_safe(':').add_safe('@');
    codec
});

/// A single path segment. `/` is escaped.
pub static SEGMENT: Lazy<PercentCodec> = Lazy::new(|| PCHAR.clone());

/// A full path: segments joined with `/`.
pub static PATH: Lazy<PercentCodec> = Lazy::new(|| {
    let mut codec = SEGMENT.clone();
    codec.add_safe('/');
    codec
});

/// The query component as a whole.
pub static QUERY: Lazy<PercentCodec> = Lazy::new(|| {
    let mut codec = PCHAR.clone();
    codec.add_safe('/').add_safe('?');
    codec
});

/// A query parameter value: `&` and `+` are escaped.
pub static QUERY_PARAM_VALUE: Lazy<PercentCodec> = Lazy::new(|| {
    let mut codec = QUERY.clone();
    codec.remove_safe('&').remove_safe('+');
    codec
});

/// A query parameter name: additionally escapes `=`.
pub static QUERY_PARAM_NAME: Lazy<PercentCodec> = Lazy::new(|| {
    let mut codec = QUERY_PARAM_VALUE.clone();
    codec.remove_safe('=');
    codec
});

/// The fragment component.
pub static FRAGMENT: Lazy<PercentCodec> = Lazy::new(|| QUERY.clone());

/// `application/x-www-form-urlencoded`: alphanumerics and `*-._`, space as `+`.
pub static FORM_URLENCODED: Lazy<PercentCodec> = Lazy::new(|| {
    let mut codec = PercentCodec::from_chars("*-._");
    codec
        .add_safe_range('a', 'z')
        .add_safe_range('A', 'Z')
        .add_safe_range('0', '9')
        .set_encode_space_as_plus(true);
    codec
});
