//! Content link rewriting

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

// Unwrap as the pattern is a fixed literal covered by the tests below
static ANCHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<a\s+href=").unwrap());

/// Make every `<a href=...>` in rich text open in a new tab
pub fn open_links_in_new_tab(html: &str) -> Cow<'_, str> {
    ANCHOR.replace_all(html, r#"<a target="_blank" href="#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_anchor_tags() {
        let html = r#"<p>See <a href="https://x">x</a> and <A  HREF='y'>y</A></p>"#;
        assert_eq!(
            open_links_in_new_tab(html),
            r#"<p>See <a target="_blank" href="https://x">x</a> and <a target="_blank" href='y'>y</A></p>"#
        );
    }

    #[test]
    fn plain_text_borrowed() {
        assert!(matches!(open_links_in_new_tab("no links"), Cow::Borrowed(_)));
    }

    #[test]
    fn anchor_pattern_ignores_other_tags() {
        assert!(ANCHOR.is_match("<a href='x'>"));
        assert!(!ANCHOR.is_match("<abbr href='x'>"));
        assert!(!ANCHOR.is_match("<link href='x'>"));
    }
}
