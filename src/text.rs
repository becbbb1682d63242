//! Plain-text helpers for post bodies: markup stripping, word counts and
//! excerpts. All lengths are measured in characters.

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum excerpt length before the `"..."` suffix.
pub const EXCERPT_LENGTH: usize = 150;

static BLOCK_COMMENTS: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").ok());
static SCRIPT_STYLE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)>").ok());
static TAGS: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").ok());
static SHORTCODES: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\[/?[A-Za-z][\w-]*(?:\s[^\]]*)?/?\]").ok());

fn remove(re: &Lazy<Option<Regex>>, text: &str, with: &str) -> String {
    match re.as_ref() {
        Some(re) => re.replace_all(text, with).into_owned(),
        None => text.to_string(),
    }
}

/// Strip block comments, shortcodes, script/style bodies and HTML tags.
///
/// Enclosed shortcode content is kept; only the bracket tags are removed.
/// Tags are replaced with a space so adjacent words stay separate.
pub fn strip_markup(content: &str) -> String {
    let text = remove(&BLOCK_COMMENTS, content, "");
    let text = remove(&SHORTCODES, &text, "");
    let text = remove(&SCRIPT_STYLE, &text, "");
    let text = remove(&TAGS, &text, " ");
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
}

pub fn word_count(content: &str) -> u64 {
    strip_markup(content).split_whitespace().count() as u64
}

/// Build a short preview of `content`.
///
/// Text at most `max` characters long is returned as-is. Longer text is cut
/// to `max` characters, then pulled back to the last whitespace when that
/// boundary sits at or past 80% of `max`, and suffixed with `"..."`.
pub fn excerpt(content: &str, max: usize) -> String {
    let stripped = strip_markup(content);
    let text = stripped.trim();
    if text.chars().count() <= max {
        return text.to_string();
    }

    let truncated: String = text.chars().take(max).collect();
    let floor = max * 8 / 10;
    let cut = truncated
        .char_indices()
        .filter(|(_, c)| c.is_whitespace())
        .map(|(byte, _)| byte)
        .last()
        .filter(|&byte| truncated[..byte].chars().count() >= floor)
        .map(|byte| &truncated[..byte])
        .unwrap_or(&truncated);

    format!("{}...", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_markup() {
        let html = "<!-- wp:paragraph --><p>Hello <strong>world</strong></p><!-- /wp:paragraph -->\
                    [gallery ids=\"1,2\"][caption]Nice[/caption]";
        let text = strip_markup(html);
        assert_eq!(text.split_whitespace().collect::<Vec<_>>(), vec!["Hello", "world", "Nice"]);
    }

    #[test]
    fn test_strip_script_body() {
        let text = strip_markup("<p>a</p><script>var x = 1;</script><p>b</p>");
        assert_eq!(text.split_whitespace().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("<p>one two</p>\n<p>three</p>"), 3);
        assert_eq!(word_count("[embed]https://x.test[/embed] four"), 2);
    }

    #[test]
    fn test_excerpt_short_text_unchanged() {
        assert_eq!(excerpt("  <p>Short draft.</p>  ", EXCERPT_LENGTH), "Short draft.");
    }

    #[test]
    fn test_excerpt_cuts_at_late_space() {
        let text = format!("{} {}", "a".repeat(130), "b".repeat(69));
        assert_eq!(text.chars().count(), 200);
        let out = excerpt(&text, EXCERPT_LENGTH);
        assert_eq!(out, format!("{}...", "a".repeat(130)));
    }

    #[test]
    fn test_excerpt_hard_cut_without_late_space() {
        let text = format!("{} {}", "a".repeat(100), "b".repeat(99));
        let out = excerpt(&text, EXCERPT_LENGTH);
        assert_eq!(out.chars().count(), 153);
        assert!(out.ends_with("..."));
        assert!(out.starts_with(&"a".repeat(100)));
    }

    #[test]
    fn test_excerpt_counts_characters_not_bytes() {
        let text = "é".repeat(200);
        let out = excerpt(&text, EXCERPT_LENGTH);
        assert_eq!(out.chars().count(), 153);
    }
}
