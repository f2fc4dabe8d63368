use std::borrow::Cow;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters that cannot appear raw inside one path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode a value for use as a single path segment.
pub fn encode_segment(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

/// Decode a percent-encoded path segment. Invalid UTF-8 is replaced rather
/// than rejected.
pub fn decode_segment(segment: &str) -> Cow<'_, str> {
    percent_decode_str(segment).decode_utf8_lossy()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_reserved_characters() {
        assert_eq!(encode_segment("alice@example.com"), "alice%40example.com");
        assert_eq!(encode_segment("a/b c"), "a%2Fb%20c");
        assert_eq!(encode_segment("cse116-s25"), "cse116-s25");
    }

    #[test]
    fn decodes_what_it_encodes() {
        assert_eq!(decode_segment("alice%40example.com"), "alice@example.com");
        assert_eq!(decode_segment(&encode_segment("x/y?z")), "x/y?z");
        assert_eq!(decode_segment("plain"), "plain");
    }
}
