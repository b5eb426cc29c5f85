//! Structured rich text and its HTML serialization
//!
//! Rich text arrives as a list of blocks (`paragraph`, `heading2`,
//! `list-item`, ...). Each block carries plain text plus a list of spans
//! that mark inline formatting over offsets into that text. Offsets count
//! UTF-16 code units, as the CMS produces them.

use serde::{Deserialize, Serialize};

use super::null_as_default;
use crate::helpers::html_escape;

/// One rich text block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichTextBlock {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub spans: Vec<Span>,
    /// Image source, for `image` blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oembed: Option<Embed>,
}

impl RichTextBlock {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            kind: "paragraph".to_string(),
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Inline formatting over `[start, end)` of a block's text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SpanData>,
}

/// Link or label payload of a span
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// oEmbed payload of an `embed` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default)]
    pub embed_url: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn of(block: &RichTextBlock) -> Option<Self> {
        match block.kind.as_str() {
            "list-item" => Some(ListKind::Unordered),
            "o-list-item" => Some(ListKind::Ordered),
            _ => None,
        }
    }

    fn open(self) -> &'static str {
        match self {
            ListKind::Unordered => "<ul>",
            ListKind::Ordered => "<ol>",
        }
    }

    fn close(self) -> &'static str {
        match self {
            ListKind::Unordered => "</ul>",
            ListKind::Ordered => "</ol>",
        }
    }
}

/// Serialize rich text blocks to HTML
pub fn as_html(blocks: &[RichTextBlock]) -> String {
    let mut out = String::new();
    let mut list: Option<ListKind> = None;

    for block in blocks {
        let kind = ListKind::of(block);
        if kind != list {
            if let Some(open) = list {
                out.push_str(open.close());
            }
            if let Some(next) = kind {
                out.push_str(next.open());
            }
            list = kind;
        }

        match block.kind.as_str() {
            "paragraph" => wrap(&mut out, "p", block),
            "preformatted" => wrap(&mut out, "pre", block),
            "list-item" | "o-list-item" => wrap(&mut out, "li", block),
            "heading1" | "heading2" | "heading3" | "heading4" | "heading5" | "heading6" => {
                let level = &block.kind["heading".len()..];
                wrap(&mut out, &format!("h{}", level), block);
            }
            "image" => {
                let src = block.url.as_deref().unwrap_or_default();
                let alt = block.alt.as_deref().unwrap_or_default();
                out.push_str(&format!(
                    r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
                    html_escape(src),
                    html_escape(alt)
                ));
            }
            "embed" => {
                if let Some(embed) = &block.oembed {
                    out.push_str(&format!(
                        r#"<div data-oembed="{}" data-oembed-type="{}" data-oembed-provider="{}">{}</div>"#,
                        html_escape(&embed.embed_url),
                        html_escape(&embed.kind),
                        html_escape(embed.provider_name.as_deref().unwrap_or_default()),
                        embed.html.as_deref().unwrap_or_default()
                    ));
                }
            }
            other => {
                tracing::debug!("Skipping unsupported rich text block {:?}", other);
            }
        }
    }

    if let Some(open) = list {
        out.push_str(open.close());
    }

    out
}

fn wrap(out: &mut String, tag: &str, block: &RichTextBlock) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(&serialize_spans(&block.text, &block.spans));
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn is_supported(span: &Span) -> bool {
    span.start < span.end && matches!(span.kind.as_str(), "strong" | "em" | "hyperlink" | "label")
}

fn open_tag(span: &Span) -> String {
    match span.kind.as_str() {
        "strong" => "<strong>".to_string(),
        "em" => "<em>".to_string(),
        "hyperlink" => {
            let data = span.data.as_ref();
            let href = data
                .and_then(|d| d.url.clone())
                .or_else(|| data.and_then(|d| d.uid.as_ref()).map(|uid| format!("/post/{}", uid)))
                .unwrap_or_else(|| "#".to_string());
            match data.and_then(|d| d.target.as_deref()) {
                Some(target) => format!(
                    r#"<a href="{}" target="{}" rel="noopener">"#,
                    html_escape(&href),
                    html_escape(target)
                ),
                None => format!(r#"<a href="{}">"#, html_escape(&href)),
            }
        }
        _ => {
            let label = span
                .data
                .as_ref()
                .and_then(|d| d.label.as_deref())
                .unwrap_or_default();
            format!(r#"<span class="{}">"#, html_escape(label))
        }
    }
}

fn close_tag(span: &Span) -> &'static str {
    match span.kind.as_str() {
        "strong" => "</strong>",
        "em" => "</em>",
        "hyperlink" => "</a>",
        _ => "</span>",
    }
}

/// Close every open span ending at or before `pos`, reopening spans that
/// were nested inside them but are still running.
fn close_ending<'a>(out: &mut String, open: &mut Vec<&'a Span>, pos: usize) {
    let Some(k) = open.iter().position(|s| s.end <= pos) else {
        return;
    };
    let popped: Vec<&Span> = open.drain(k..).collect();
    for span in popped.iter().rev() {
        out.push_str(close_tag(span));
    }
    for span in popped.into_iter().filter(|s| s.end > pos) {
        out.push_str(&open_tag(span));
        open.push(span);
    }
}

fn serialize_spans(text: &str, spans: &[Span]) -> String {
    let mut pending: Vec<&Span> = spans.iter().filter(|s| is_supported(s)).collect();
    // Outer spans first when they start together
    pending.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut out = String::with_capacity(text.len());
    let mut open: Vec<&Span> = Vec::new();
    let mut next = 0;
    let mut pos = 0;
    let mut chars = text.chars().peekable();

    loop {
        close_ending(&mut out, &mut open, pos);
        while next < pending.len() && pending[next].start <= pos {
            let span = pending[next];
            if span.end > pos {
                out.push_str(&open_tag(span));
                open.push(span);
            }
            next += 1;
        }

        let Some(c) = chars.next() else {
            break;
        };
        match c {
            '\n' => out.push_str("<br />"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
        pos += c.len_utf16();
    }

    while let Some(span) = open.pop() {
        out.push_str(close_tag(span));
    }

    out
}
