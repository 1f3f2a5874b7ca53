//! Tokenizing HTML embedded in Markdown includes.
//!
//! Includes carry hand-written HTML such as `<aside class="notice">` callouts.
//! The tokens feed the same element stack as Markdown events, so their text
//! is part of the page like any other content.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use slate_search::Element;

/// A tag, comment, or text run.
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<!--.*?-->|<![^>]*>|<\?[^>]*>|</([A-Za-z][A-Za-z0-9-]*)\s*>|<([A-Za-z][A-Za-z0-9-]*)((?:\s+[^\s"'>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)\s*(/?)>"#,
    )
    .expect("Invalid tag regex")
});

static ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("Invalid attribute regex")
});

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9a-fA-F]{1,6})|([A-Za-z]+));")
        .expect("Invalid entity regex")
});

/// Elements whose content is text up to the matching end tag.
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

#[derive(Debug, Clone, PartialEq)]
pub enum HtmlToken {
    Start {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    End {
        name: String,
    },
    Text(String),
}

/// Split an HTML fragment into tokens.
///
/// Comments, doctypes, and processing instructions are dropped. Tag names are
/// lowercased and entities in text and attribute values are decoded.
pub fn tokenize(html: &str) -> Vec<HtmlToken> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(caps) = TAG.captures_at(html, pos) {
        let Some(whole) = caps.get(0) else { break };
        push_text(&mut tokens, &html[pos..whole.start()]);
        pos = whole.end();

        if let Some(name) = caps.get(1) {
            tokens.push(HtmlToken::End {
                name: name.as_str().to_ascii_lowercase(),
            });
        } else if let Some(name) = caps.get(2) {
            let name = name.as_str().to_ascii_lowercase();
            let self_closing = caps.get(4).is_some_and(|m| !m.is_empty());
            let attrs = caps.get(3).map(|m| parse_attrs(m.as_str())).unwrap_or_default();
            let raw_text = !self_closing && RAW_TEXT_TAGS.contains(&name.as_str());

            tokens.push(HtmlToken::Start {
                name: name.clone(),
                attrs,
                self_closing,
            });

            if raw_text {
                let end = find_end_tag(html, pos, &name);
                if pos < end {
                    tokens.push(HtmlToken::Text(html[pos..end].to_string()));
                }
                pos = end;
            }
        }
    }

    push_text(&mut tokens, &html[pos..]);
    tokens
}

/// Build an element from a start tag. `id` and `class` become first-class fields.
pub fn element(name: &str, attrs: Vec<(String, String)>) -> Element {
    let mut el = Element::new(name);
    for (attr, value) in attrs {
        match attr.as_str() {
            "id" if !value.is_empty() => el.id = Some(value),
            "class" => {
                for class in value.split_whitespace() {
                    el.add_class(class);
                }
            }
            _ => el.set_attr(&attr, value),
        }
    }
    el
}

/// Decode character references. Unknown names are left as written.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    ENTITY
        .replace_all(text, |caps: &Captures| {
            let decoded = if let Some(dec) = caps.get(1) {
                dec.as_str().parse().ok().and_then(char::from_u32)
            } else if let Some(hex) = caps.get(2) {
                u32::from_str_radix(hex.as_str(), 16)
                    .ok()
                    .and_then(char::from_u32)
            } else {
                caps.get(3).and_then(|name| named_entity(name.as_str()))
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '\u{a9}',
        "reg" => '\u{ae}',
        "hellip" => '\u{2026}',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        _ => return None,
    })
}

fn parse_attrs(source: &str) -> Vec<(String, String)> {
    ATTR.captures_iter(source)
        .map(|caps| {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| decode_entities(m.as_str()))
                .unwrap_or_default();
            (caps[1].to_ascii_lowercase(), value)
        })
        .collect()
}

/// Byte offset of `</name` at or after `from`, or the end of input.
fn find_end_tag(html: &str, from: usize, name: &str) -> usize {
    let needle = format!("</{}", name);
    html[from..]
        .to_ascii_lowercase()
        .find(&needle)
        .map(|offset| from + offset)
        .unwrap_or(html.len())
}

fn push_text(tokens: &mut Vec<HtmlToken>, text: &str) {
    if !text.is_empty() {
        tokens.push(HtmlToken::Text(decode_entities(text)));
    }
}
