//! `application/x-www-form-urlencoded` bodies.

use courier_url::{Charset, UrlQuery};
use std::io::{self, Write};

/// Content type of form-encoded bodies.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Ordered text fields encoded like a query string, with `+` for spaces.
#[derive(Debug, Clone)]
pub struct FormBody {
    fields: UrlQuery,
    charset: Charset,
}

impl FormBody {
    /// Create an empty form in `charset`.
    pub fn new(charset: Charset) -> Self {
        Self {
            fields: UrlQuery::new_form(),
            charset,
        }
    }

    /// Create a form from `(name, value)` pairs.
    pub fn from_pairs<K, V, I>(pairs: I, charset: Charset) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut form = Self::new(charset);
        form.fields.add_all(pairs);
        form
    }

    /// Append a field.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.fields.add(name, value);
        self
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the form has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Encoded body text.
    pub fn encode(&self) -> String {
        self.fields.build(Some(self.charset))
    }

    /// Write the encoded body into `out`.
    pub fn write<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(self.encode().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_encoding() {
        let form = FormBody::from_pairs([("q", "rust lang"), ("a&b", "1+1=2")], Charset::Utf8);
        assert_eq!(form.encode(), "q=rust+lang&a%26b=1%2B1%3D2");
    }

    #[test]
    fn test_form_charset() {
        let mut form = FormBody::new(Charset::Latin1);
        form.add("city", "Zürich");
        assert_eq!(form.encode(), "city=Z%FCrich");
        assert_eq!(form.len(), 1);
    }
}
