//! Text shaping helpers shared by the section extractors
//!
//! - `normalize_content` collapses URLs and file paths to their last segment
//! - `truncate` bounds free text with an ellipsis marker
//! - `short_hash` gives links a stable 8-character identifier

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

// Hierarchical URLs only: scheme, "//", authority, then the path up to any
// query or fragment. Single-letter schemes are drive letters, not URLs.
static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]+://[^/?#\\]*(?P<path>[^?#]*)").unwrap()
});

const ELLIPSIS: &str = "...";

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

fn last_segment(text: &str) -> Option<&str> {
    text.split(['/', '\\']).filter(|part| !part.is_empty()).last()
}

/// Reduce a URL or file path to its final segment, anything else unchanged
pub fn normalize_content(text: &str) -> String {
    if let Some(captures) = URL_REGEX.captures(text) {
        let path = captures.name("path").map_or("", |m| m.as_str());
        if let Some(segment) = last_segment(path) {
            return segment.to_string();
        }
    }

    if text.contains(['/', '\\']) {
        if let Some(segment) = last_segment(text) {
            return segment.to_string();
        }
    }

    text.to_string()
}

/// [`normalize_content`] for JSON values; non-strings pass through
pub fn normalize_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(normalize_content(s)),
        other => other.clone(),
    }
}

/// Bound `text` to `max_chars` characters, ending in `...` when cut
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// [`truncate`] for JSON values; non-strings pass through
pub fn truncate_value(value: &Value, max_chars: usize) -> Value {
    match value {
        Value::String(s) => Value::String(truncate(s, max_chars)),
        other => other.clone(),
    }
}

/// 32-bit FNV-1a over UTF-16 code units, as 8 lowercase base-36 digits
///
/// The output is persisted into generated SQL as a key, so it must stay
/// bit-for-bit stable.
pub fn short_hash(text: &str) -> String {
    let hash = text.encode_utf16().fold(FNV_OFFSET_BASIS, |hash, unit| {
        (hash ^ u32::from(unit)).wrapping_mul(FNV_PRIME)
    });
    format!("{:0>8}", to_base36(hash))
}

fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut buf = Vec::with_capacity(7);
    loop {
        buf.push(DIGITS[(value % 36) as usize]);
        value /= 36;
        if value == 0 {
            break;
        }
    }
    buf.iter().rev().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_content("https://example.com/a/b/video.mp4"), "video.mp4");
        assert_eq!(
            normalize_content("https://www.tiktok.com/@user/video/7212?lang=en#top"),
            "7212"
        );
        assert_eq!(normalize_content("https://example.com"), "example.com");
    }

    #[test]
    fn test_normalize_paths() {
        assert_eq!(normalize_content(r"C:\Users\me\f.txt"), "f.txt");
        assert_eq!(normalize_content("/var/tmp/clip.mov/"), "clip.mov");
        assert_eq!(normalize_content("hello"), "hello");
        assert_eq!(normalize_content("Re: lunch?"), "Re: lunch?");
    }

    #[test]
    fn test_normalize_value_passthrough() {
        assert_eq!(normalize_value(&json!(12)), json!(12));
        assert_eq!(normalize_value(&Value::Null), Value::Null);
        assert_eq!(normalize_value(&json!("a/b")), json!("b"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 10), "abcdefghij");
        assert_eq!(truncate("abcdefghijk", 10), "abcdefg...");

        let emoji = "😀".repeat(12);
        let cut = truncate(&emoji, 10);
        assert_eq!(cut.chars().count(), 10);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_short_hash_known_values() {
        assert_eq!(short_hash(""), "00ztntfp");
        assert_eq!(short_hash("a"), "01r9wi7g");
        assert_eq!(
            short_hash("https://www.tiktokv.com/share/video/7212345678901234567/"),
            "017v0q84"
        );
        assert_eq!(short_hash("héllo😀"), "01w0v1v6");
    }

    #[test]
    fn test_short_hash_shape() {
        for input in ["x", "another link", "https://v.tiktok.com/ZM123/"] {
            let hash = short_hash(input);
            assert_eq!(hash, short_hash(input));
            assert_eq!(hash.len(), 8);
            assert!(hash.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        }
    }
}
