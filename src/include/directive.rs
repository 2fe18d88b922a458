//! Scanner for `<include src="...">` directives

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// Opening tag with a quoted `src` attribute, optionally self-closed.
///
/// The path is matched lazily and may span lines.
static OPEN_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<include\s+src=["'](.+?)["']\s*(/?)>"#).expect("OPEN_TAG must compile")
});

/// Whitespace trailing an opening tag, then an optional closing tag.
static TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\A\s*(?:</include>)?").expect("TAIL must compile")
});

static CLOSE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</include>").expect("CLOSE_TAG must compile"));

static NESTED_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<include\s").expect("NESTED_OPEN must compile"));

/// A single inclusion directive found in template text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Raw `src` attribute value, unresolved
    pub src: String,
    /// Byte range of the whole directive, closing tag and discarded body included
    pub span: Range<usize>,
}

/// Check whether `content` holds at least one directive.
pub fn has_directive(content: &str) -> bool {
    OPEN_TAG.is_match(content)
}

/// Find all directives in `content`, in source order.
///
/// Matches never overlap. Whitespace after an opening tag is part of the
/// directive, as is a `</include>` closing tag. For a tag that is not
/// self-closed, any body up to the first `</include>` is swallowed too,
/// unless another `<include` opens before that closing tag.
pub fn find_directives(content: &str) -> Vec<Directive> {
    let mut directives = Vec::new();
    let mut pos = 0;

    while let Some(caps) = OPEN_TAG.captures_at(content, pos) {
        let open = caps.get(0).expect("group 0 always participates");
        let self_closed = caps.get(2).is_some_and(|m| !m.as_str().is_empty());
        let end = open.end() + tail_len(&content[open.end()..], self_closed);

        directives.push(Directive {
            src: caps[1].to_string(),
            span: open.start()..end,
        });
        pos = end;
    }

    directives
}

/// Length of the text following an opening tag that belongs to the directive.
fn tail_len(rest: &str, self_closed: bool) -> usize {
    let tail = TAIL.find(rest).map_or(0, |m| m.end());
    if self_closed || CLOSE_TAG.is_match(&rest[..tail]) {
        return tail;
    }

    match CLOSE_TAG.find(rest) {
        Some(close) if !NESTED_OPEN.is_match(&rest[..close.start()]) => close.end(),
        _ => tail,
    }
}
