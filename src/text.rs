// src/text.rs
//! Text cleanup shared by the fetchers.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Upper bound on a single item's text, in chars.
pub const MAX_TEXT_CHARS: usize = 1500;

/// Normalize feed text: decode entities, strip tags, ASCII quotes, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s);
    let mut out = strip_tags(&decoded);

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    out = collapse_ws(&out);

    if out.chars().count() > MAX_TEXT_CHARS {
        out = out.chars().take(MAX_TEXT_CHARS).collect();
    }
    out
}

pub fn strip_tags(s: &str) -> String {
    RE_TAGS.replace_all(s, "").into_owned()
}

pub fn collapse_ws(s: &str) -> String {
    RE_WS.replace_all(s, " ").trim().to_string()
}

/// Decode only the handful of entities search-result markup actually uses.
/// Anything else is left verbatim.
pub fn decode_basic_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        // last, so "&amp;lt;" stays "&lt;"
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_tags_and_collapses_ws() {
        let s = "  <p>Hello,&nbsp;&nbsp; <b>world</b></p>\n\n “quoted”  ";
        assert_eq!(normalize_text(s), "Hello, world \"quoted\"");
    }

    #[test]
    fn normalize_caps_length() {
        let long = "a".repeat(MAX_TEXT_CHARS + 50);
        assert_eq!(normalize_text(&long).chars().count(), MAX_TEXT_CHARS);
    }

    #[test]
    fn basic_entities_decode_amp_last() {
        assert_eq!(decode_basic_entities("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(decode_basic_entities("&amp;lt;"), "&lt;");
        assert_eq!(decode_basic_entities("it&#x27;s &quot;ok&quot;"), "it's \"ok\"");
        assert_eq!(decode_basic_entities("&copy;"), "&copy;");
    }
}
