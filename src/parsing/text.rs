use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static SCRIPT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script>").unwrap());
static STYLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style>").unwrap());
static META_LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<(?:meta|link)\b[^>]*>").unwrap());

// iXBRL machinery elements. The header block holds the hidden context
// and unit tables; leaf elements wrap tagged values.
static IX_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<ix:header\b[^>]*>.*?</ix:header>").unwrap());
static XBRL_LEAF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)<(?:ix|xbrli|dei|us-gaap):[\w.-]+\b[^>]*>[^<]*</(?:ix|xbrli|dei|us-gaap):[\w.-]+>",
    )
    .unwrap()
});
static XBRL_SELF_CLOSED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(?:ix|xbrli|dei|us-gaap):[\w.-]+\b[^>]*/>").unwrap());
static XBRL_STRAY_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?(?:ix|xbrli|dei|us-gaap):[\w.-]+\b[^>]*>").unwrap());

static LINE_BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>|</p>|</div>").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

static MULTI_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static MULTI_NEWLINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n\s*\n").unwrap());

// Nesting depth seen in real filings is shallow; leaf removal converges
// in a few passes.
const MAX_STRIP_PASSES: usize = 8;

/// Strips markup and iXBRL machinery down to readable plain text while
/// preserving reading order and paragraph breaks.
pub fn normalize_content(content: &str) -> String {
    let mut text = decode_html_entities(content).into_owned();

    text = SCRIPT_RE.replace_all(&text, "").into_owned();
    text = STYLE_RE.replace_all(&text, "").into_owned();
    text = META_LINK_RE.replace_all(&text, "").into_owned();

    text = IX_HEADER_RE.replace_all(&text, "").into_owned();
    for _ in 0..MAX_STRIP_PASSES {
        let pass = XBRL_LEAF_RE.replace_all(&text, "").into_owned();
        let pass = XBRL_SELF_CLOSED_RE.replace_all(&pass, "").into_owned();
        let done = pass == text;
        text = pass;
        if done {
            break;
        }
    }
    // Whatever survives the leaf passes loses its tags but keeps its text.
    text = XBRL_STRAY_TAG_RE.replace_all(&text, "").into_owned();

    text = LINE_BREAK_RE.replace_all(&text, "\n").into_owned();
    text = TAG_RE.replace_all(&text, "").into_owned();

    collapse_whitespace(&text).nfkc().collect()
}

/// Collapses runs of spaces to one and 3+ newlines to a paragraph
/// break, trimming the ends. Leaves markup alone.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    let text = MULTI_SPACE_RE.replace_all(text, " ");
    let text = MULTI_NEWLINE_RE.replace_all(&text, "\n\n");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_scripts_and_styles() {
        let html = "before<script>var x = 1;</script>middle<style>p { color: red }</style>after";
        assert_eq!(normalize_content(html), "beforemiddleafter");
    }

    #[test]
    fn test_removes_xbrl_elements_with_content() {
        let html = r#"Revenue was <ix:nonFraction contextRef="c1" name="us-gaap:Revenues">1,234</ix:nonFraction> this year."#;
        assert_eq!(normalize_content(html), "Revenue was this year.");
    }

    #[test]
    fn test_removes_nested_ix_header() {
        let html = r#"<ix:header><ix:hidden><xbrli:context id="c1"><xbrli:instant>2024-12-31</xbrli:instant></xbrli:context></ix:hidden></ix:header><p>Body text.</p>"#;
        assert_eq!(normalize_content(html), "Body text.");
    }

    #[test]
    fn test_preserves_paragraph_breaks() {
        let html = "<p>First paragraph.</p>\n\n\n\n<p>Second paragraph.</p>";
        assert_eq!(
            normalize_content(html),
            "First paragraph.\n\nSecond paragraph."
        );
    }

    #[test]
    fn test_decodes_entities_and_collapses_spaces() {
        let html = "<div>Johnson &amp; Johnson    reported</div>";
        assert_eq!(normalize_content(html), "Johnson & Johnson reported");
    }

    #[test]
    fn test_collapse_whitespace_keeps_markup() {
        let text = "<b>kept</b>   and\n\n\n\nspaced";
        assert_eq!(collapse_whitespace(text), "<b>kept</b> and\n\nspaced");
    }
}
