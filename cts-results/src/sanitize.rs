// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::borrow::Cow;

/// Returns true if `c` is allowed in an XML 1.0 document.
///
/// See <https://www.w3.org/TR/REC-xml/#charsets>. Characters outside the Basic Multilingual Plane
/// are excluded as well, so that the output can be read by consumers that only handle UCS-2.
pub fn is_valid_xml_char(c: char) -> bool {
    matches!(
        c,
        '\u{9}' | '\u{A}' | '\u{D}' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}'
    )
}

/// Strips out characters that would make an XML report unreadable.
///
/// Borrows the input if nothing needs to be stripped.
pub fn sanitize_xml_text(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_valid_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&c| is_valid_xml_char(c)).collect())
    }
}

/// Strips out characters that would make an XML report unreadable from a stack trace.
///
/// `None` is passed through unchanged.
pub fn sanitize_stack_trace(trace: Option<&str>) -> Option<String> {
    trace.map(|trace| sanitize_xml_text(trace).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;
    use test_strategy::proptest;

    #[test_case("plain text", "plain text" ; "plain")]
    #[test_case("tab\there\r\nnext", "tab\there\r\nnext" ; "allowed whitespace")]
    #[test_case("bell\u{7}ed", "belled" ; "control character")]
    #[test_case("nul\u{0}\u{1b}[31mred", "nul[31mred" ; "nul and escape")]
    #[test_case("\u{FFFE}\u{FFFF}ok", "ok" ; "non-characters")]
    #[test_case("emoji \u{1F600}!", "emoji !" ; "outside the BMP")]
    #[test_case("\u{D7FF}\u{E000}\u{FFFD}", "\u{D7FF}\u{E000}\u{FFFD}" ; "range boundaries")]
    fn sanitize_cases(input: &str, expected: &str) {
        assert_eq!(sanitize_xml_text(input), expected);
    }

    #[test]
    fn sanitize_borrows_when_clean() {
        assert!(matches!(sanitize_xml_text("clean"), Cow::Borrowed(_)));
    }

    #[test]
    fn sanitize_none_is_none() {
        assert_eq!(sanitize_stack_trace(None), None);
        assert_eq!(
            sanitize_stack_trace(Some("a\u{0}b")).as_deref(),
            Some("ab"),
        );
    }

    #[proptest]
    fn sanitized_output_is_valid(input: String) {
        let output = sanitize_xml_text(&input);
        prop_assert!(output.chars().all(is_valid_xml_char));
        // Sanitizing is idempotent.
        prop_assert_eq!(sanitize_xml_text(&output), output.clone());
    }

    #[proptest]
    fn sanitize_keeps_valid_chars(input: String) {
        let expected: String = input.chars().filter(|&c| is_valid_xml_char(c)).collect();
        prop_assert_eq!(sanitize_xml_text(&input).into_owned(), expected);
    }
}
