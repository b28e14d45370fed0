//! Host text cleanup
//!
//! Staff and annotation text may carry rich-text markup and HTML entities.

use once_cell::sync::Lazy;
use regex::Regex;

static FORMATTING_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("formatting tag pattern is valid"));

/// Strip markup tags and decode the basic HTML entities
pub fn remove_formatting_code(s: &str) -> String {
    let stripped = FORMATTING_TAG.replace_all(s, "");
    decode_html_escapes(&stripped)
}

fn decode_html_escapes(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_formatting_code() {
        assert_eq!(remove_formatting_code("<b>A4: 440</b>"), "A4: 440");
        assert_eq!(remove_formatting_code("a &lt;b&gt; &amp; c"), "a <b> & c");
        assert_eq!(remove_formatting_code("<font size=\"10\"/>+5"), "+5");
    }

    #[test]
    fn test_entities_decoded_once() {
        assert_eq!(remove_formatting_code("&amp;lt;"), "&lt;");
        assert_eq!(remove_formatting_code("&apos;+&#39;"), "'+'");
    }
}
