//! HTML allow-list sanitizer for author-supplied content.
//!
//! Runs on every write path that accepts HTML; never on read. Tags and
//! attributes outside the allow-lists are stripped, not escaped.

use regex::{Captures, Regex};
use std::sync::OnceLock;

static COMMENT_RE: OnceLock<Regex> = OnceLock::new();
static DROP_CONTENT_RE: OnceLock<Regex> = OnceLock::new();
static TAG_RE: OnceLock<Regex> = OnceLock::new();
static ATTR_RE: OnceLock<Regex> = OnceLock::new();

fn comment_re() -> &'static Regex {
    COMMENT_RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").unwrap())
}

/// Containers whose text content must not survive at all
fn drop_content_re() -> &'static Regex {
    DROP_CONTENT_RE.get_or_init(|| {
        Regex::new(
            r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<iframe\b[^>]*>.*?</iframe\s*>|<object\b[^>]*>.*?</object\s*>|<embed\b[^>]*>.*?</embed\s*>|<noscript\b[^>]*>.*?</noscript\s*>",
        )
        .unwrap()
    })
}

fn tag_re() -> &'static Regex {
    TAG_RE.get_or_init(|| {
        Regex::new(r#"(?s)<\s*(/?)\s*([a-zA-Z][a-zA-Z0-9]*)((?:[^<>"']|"[^"]*"|'[^']*')*)>"#).unwrap()
    })
}

fn attr_re() -> &'static Regex {
    ATTR_RE.get_or_init(|| {
        Regex::new(r#"([a-zA-Z][a-zA-Z0-9_:-]*)\s*(?:=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
            .unwrap()
    })
}

/// Per-tag attribute allow-list; `None` means the tag itself is disallowed
fn allowed_attrs(tag: &str) -> Option<&'static [&'static str]> {
    const NONE: &[&str] = &[];
    Some(match tag {
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "em" | "strong" | "i" | "b" | "u"
        | "s" | "small" | "sub" | "sup" | "ul" | "ol" | "li" | "blockquote" | "pre" | "code"
        | "br" | "hr" | "table" | "thead" | "tbody" | "tfoot" | "tr" | "caption" | "figure"
        | "figcaption" | "div" | "span" => NONE,
        "a" => &["href", "name", "target", "rel"],
        "img" => &["src", "alt", "title", "width", "height"],
        "td" | "th" => &["colspan", "rowspan"],
        _ => return None,
    })
}

fn is_url_attr(name: &str) -> bool {
    name == "href" || name == "src"
}

/// Accept http, https, mailto, protocol-relative, and scheme-less URLs
fn is_allowed_url(value: &str) -> bool {
    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect();
    let lower = cleaned.to_lowercase();

    if lower.starts_with("//") {
        return true;
    }
    if let Some(colon) = lower.find(':') {
        let before = &lower[..colon];
        // a ':' after a path separator is not a scheme delimiter
        if before.contains('/') || before.contains('?') || before.contains('#') {
            return true;
        }
        return matches!(before, "http" | "https" | "mailto");
    }
    true
}

fn rebuild_tag(caps: &Captures) -> String {
    let closing = !caps[1].is_empty();
    let tag = caps[2].to_lowercase();

    let Some(allowed) = allowed_attrs(&tag) else {
        return String::new();
    };

    if closing {
        return format!("</{tag}>");
    }

    let mut out = String::with_capacity(tag.len() + 2);
    out.push('<');
    out.push_str(&tag);

    for attr in attr_re().captures_iter(&caps[3]) {
        let name = attr[1].to_lowercase();
        if !allowed.contains(&name.as_str()) {
            continue;
        }
        let value = attr
            .get(2)
            .or_else(|| attr.get(3))
            .or_else(|| attr.get(4))
            .map(|m| m.as_str());
        match value {
            Some(v) => {
                if is_url_attr(&name) && !is_allowed_url(v) {
                    continue;
                }
                out.push(' ');
                out.push_str(&name);
                out.push_str("=\"");
                out.push_str(&v.replace('"', "&quot;"));
                out.push('"');
            }
            None => {
                out.push(' ');
                out.push_str(&name);
            }
        }
    }

    out.push('>');
    out
}

/// Reduce raw author HTML to the allow-listed subset.
///
/// Disallowed tags are removed while their inner text is kept, except for
/// script-like containers whose entire content is dropped. HTML comments
/// are removed.
pub fn sanitize_html(input: &str) -> String {
    let without_comments = comment_re().replace_all(input, "");

    // Run the container pass twice so nesting tricks like
    // <scr<script></script>ipt> do not reassemble a dropped tag.
    let pass_one = drop_content_re().replace_all(&without_comments, "");
    let without_dropped = drop_content_re().replace_all(&pass_one, "");

    tag_re()
        .replace_all(&without_dropped, |caps: &Captures| rebuild_tag(caps))
        .into_owned()
}
