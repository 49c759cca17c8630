//! Percent-encoding (RFC 3986) with configurable safe character sets.
//!
//! A [`PercentCodec`] holds a 256-slot bit set of characters that are copied
//! verbatim; everything else is written as `%XX` using the upper-case hex
//! digits of its bytes in the requested [`Charset`]. Standard profiles live in
//! [`profiles`].

pub mod profiles;

use crate::charset::Charset;
use crate::error::{UrlError, UrlResult};
use percent_encoding::{percent_decode_str, percent_encode_byte};
use std::borrow::Cow;
use tracing::trace;

/// Percent encoder over a set of safe characters.
///
/// Encoding never mutates the codec, so a shared instance may be used from
/// many threads at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PercentCodec {
    safe: [u64; 4],
    encode_space_as_plus: bool,
}

impl PercentCodec {
    /// Create a codec with an empty safe set: every character is escaped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the safe set and flags of another codec.
    pub fn from_codec(codec: &PercentCodec) -> Self {
        codec.clone()
    }

    /// Build a codec whose safe set is exactly the given characters.
    ///
    /// Characters beyond U+00FF cannot be marked safe and are ignored.
    pub fn from_chars(chars: &str) -> Self {
        let mut codec = Self::new();
        for ch in chars.chars() {
            codec.add_safe(ch);
        }
        codec
    }

    /// Mark a character as safe.
    pub fn add_safe(&mut self, ch: char) -> &mut Self {
        if let Some(index) = slot(ch) {
            self.safe[index / 64] |= 1 << (index % 64);
        }
        self
    }

    /// Mark an inclusive character range as safe.
    pub fn add_safe_range(&mut self, from: char, to: char) -> &mut Self {
        for ch in from..=to {
            self.add_safe(ch);
        }
        self
    }

    /// Remove a character from the safe set.
    pub fn remove_safe(&mut self, ch: char) -> &mut Self {
        if let Some(index) = slot(ch) {
            self.safe[index / 64] &= !(1 << (index % 64));
        }
        self
    }

    /// Union of this codec's safe set with another's.
    ///
    /// The space-as-plus flag is kept from `self`.
    pub fn or(&self, other: &PercentCodec) -> PercentCodec {
        let mut safe = self.safe;
        for (word, other_word) in safe.iter_mut().zip(other.safe.iter()) {
            *word |= other_word;
        }
        PercentCodec {
            safe,
            encode_space_as_plus: self.encode_space_as_plus,
        }
    }

    /// Encode spaces as `+` instead of `%20`.
    pub fn set_encode_space_as_plus(&mut self, enabled: bool) -> &mut Self {
        self.encode_space_as_plus = enabled;
        self
    }

    /// Whether spaces are encoded as `+`.
    pub fn encodes_space_as_plus(&self) -> bool {
        self.encode_space_as_plus
    }

    /// Whether the character is copied verbatim.
    pub fn is_safe(&self, ch: char) -> bool {
        slot(ch).is_some_and(|index| self.safe[index / 64] & (1 << (index % 64)) != 0)
    }

    /// Percent-encode `text`.
    ///
    /// With no charset the input is returned unchanged. Characters the charset
    /// cannot represent are dropped from the output; use
    /// [`encode_strict`](Self::encode_strict) to surface them as errors.
    pub fn encode<'a>(&self, text: &'a str, charset: Option<Charset>) -> Cow<'a, str> {
        let Some(charset) = charset else {
            return Cow::Borrowed(text);
        };

        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            if let Err(skipped) = self.encode_char(&mut out, ch, charset) {
                trace!(ch = ?skipped, %charset, "skipping unencodable character");
            }
        }
        Cow::Owned(out)
    }

    /// Percent-encode `text`, failing on the first unrepresentable character.
    pub fn encode_strict(&self, text: &str, charset: Charset) -> UrlResult<String> {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            self.encode_char(&mut out, ch, charset)
                .map_err(|ch| UrlError::Unencodable { ch, charset })?;
        }
        Ok(out)
    }

    fn encode_char(&self, out: &mut String, ch: char, charset: Charset) -> Result<(), char> {
        if self.is_safe(ch) {
            out.push(ch);
        } else if self.encode_space_as_plus && ch == ' ' {
            out.push('+');
        } else {
            let bytes = charset.encode_char(ch).ok_or(ch)?;
            for byte in bytes {
                out.push_str(percent_encode_byte(byte));
            }
        }
        Ok(())
    }
}

/// Percent-decode `text`.
///
/// Escaped bytes are decoded in `charset`; characters that were never
/// escaped are kept as they are. A `%` not followed by two hex digits is kept
/// literally. `+` becomes a space only when `plus_as_space` is set.
pub fn decode(text: &str, charset: Charset, plus_as_space: bool) -> String {
    let text: Cow<'_, str> = if plus_as_space && text.contains('+') {
        Cow::Owned(text.replace('+', " "))
    } else {
        Cow::Borrowed(text)
    };
    if !text.contains('%') {
        return text.into_owned();
    }
    if charset == Charset::Utf8 {
        return percent_decode_str(&text).decode_utf8_lossy().into_owned();
    }

    // Escapes are ASCII, so only ASCII runs are decoded through the charset.
    let mut out = String::with_capacity(text.len());
    let mut rest: &str = &text;
    while !rest.is_empty() {
        let ascii = rest.starts_with(|ch: char| ch.is_ascii());
        let split = rest.find(|ch: char| ch.is_ascii() != ascii).unwrap_or(rest.len());
        let (run, tail) = rest.split_at(split);
        if ascii {
            let bytes: Vec<u8> = percent_decode_str(run).collect();
            out.push_str(&charset.decode(&bytes));
        } else {
            out.push_str(run);
        }
        rest = tail;
    }
    out
}

/// Percent-decode when a charset is given; otherwise return `text` unchanged.
pub fn decode_with(text: &str, charset: Option<Charset>, plus_as_space: bool) -> String {
    match charset {
        Some(charset) => decode(text, charset, plus_as_space),
        None => text.to_string(),
    }
}

fn slot(ch: char) -> Option<usize> {
    let code = u32::from(ch);
    (code < 256).then_some(code as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_safe_set_membership() {
        let mut codec = PercentCodec::from_chars("abc");
        assert!(codec.is_safe('a'));
        assert!(!codec.is_safe('d'));

        codec.add_safe('d').remove_safe('a');
        assert!(codec.is_safe('d'));
        assert!(!codec.is_safe('a'));
        assert!(!codec.is_safe('€'));
    }

    #[test]
    fn test_or_unions_safe_sets() {
        let left = PercentCodec::from_chars("ab");
        let right = PercentCodec::from_chars("yz");
        let both = left.or(&right);
        for ch in ['a', 'b', 'y', 'z'] {
            assert!(both.is_safe(ch));
        }
        assert!(!both.is_safe('c'));
    }

    #[test]
    fn test_space_encoding_depends_on_plus_flag() {
        let mut plus = PercentCodec::from_chars("ab");
        plus.set_encode_space_as_plus(true);
        let percent = PercentCodec::from_chars("ab");

        assert_eq!(plus.encode("a b", Some(Charset::Utf8)), "a+b");
        assert_eq!(percent.encode("a b", Some(Charset::Utf8)), "a%20b");
    }

    #[test]
    fn test_no_charset_passes_through() {
        let codec = PercentCodec::new();
        let encoded = codec.encode("a b/c", None);
        assert!(matches!(encoded, Cow::Borrowed(_)));
        assert_eq!(encoded, "a b/c");
    }

    #[test_case(Charset::Utf8, "é", "%C3%A9" ; "utf8 two bytes")]
    #[test_case(Charset::Latin1, "é", "%E9" ; "latin1 single byte")]
    #[test_case(Charset::Latin1, "a€b", "ab" ; "latin1 drops euro")]
    #[test_case(Charset::Ascii, "x\u{7f}", "x%7F" ; "ascii control")]
    fn test_encode_with_charset(charset: Charset, input: &str, expected: &str) {
        let codec = PercentCodec::from_chars("abx");
        assert_eq!(codec.encode(input, Some(charset)), expected);
    }

    #[test]
    fn test_encode_strict_reports_character() {
        let codec = PercentCodec::new();
        let err = codec.encode_strict("a€", Charset::Latin1).unwrap_err();
        assert!(matches!(err, UrlError::Unencodable { ch: '€', charset: Charset::Latin1 }));
        assert_eq!(codec.encode_strict("é", Charset::Latin1).unwrap(), "%E9");
    }

    #[test_case("a%20b", false, "a b" ; "percent space")]
    #[test_case("a+b", false, "a+b" ; "plus kept")]
    #[test_case("a+b", true, "a b" ; "plus as space")]
    #[test_case("%C3%A9t%C3%A9", false, "été" ; "multibyte")]
    #[test_case("100%", false, "100%" ; "dangling percent")]
    #[test_case("%zz", false, "%zz" ; "invalid escape")]
    fn test_decode(input: &str, plus: bool, expected: &str) {
        assert_eq!(decode(input, Charset::Utf8, plus), expected);
    }

    #[test]
    fn test_decode_latin1() {
        assert_eq!(decode("caf%E9", Charset::Latin1, false), "café");
        assert_eq!(decode("été%20%E9", Charset::Latin1, false), "été é");
        assert_eq!(decode("a+%2B", Charset::Latin1, true), "a +");
    }

    #[test]
    fn test_encode_uses_upper_case_escapes() {
        let codec = PercentCodec::new();
        assert_eq!(codec.encode("\u{ff}/", Some(Charset::Latin1)), "%FF%2F");
    }
}
