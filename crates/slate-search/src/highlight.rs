//! Highlighting of query text inside the page tree.
//!
//! Matches are case-insensitive occurrences of the literal query string in
//! text nodes. Each match is wrapped in a marker element; unhighlighting
//! unwraps the markers and merges the split text back together.

use regex::{Regex, RegexBuilder};

use crate::dom::{Element, Node};

/// Marker element settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightOptions {
    /// Wrapper tag name
    pub element: String,
    /// Wrapper class
    pub class_name: String,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            element: "span".to_string(),
            class_name: "search-highlight".to_string(),
        }
    }
}

/// Tags whose text is never highlighted.
const SKIPPED_TAGS: &[&str] = &["script", "style"];

/// Wrap every case-insensitive occurrence of `query` under `root`.
///
/// Returns the number of markers added. Existing markers are left alone.
pub fn highlight(root: &mut Element, query: &str, options: &HighlightOptions) -> usize {
    if query.is_empty() {
        return 0;
    }

    let pattern = match RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re,
        Err(e) => {
            tracing::warn!("Cannot highlight \"{}\": {}", query, e);
            return 0;
        }
    };

    highlight_children(root, &pattern, options)
}

fn highlight_children(el: &mut Element, pattern: &Regex, options: &HighlightOptions) -> usize {
    let mut count = 0;
    let children = std::mem::take(&mut el.children);

    for child in children {
        match child {
            Node::Text(text) => count += split_matches(&text, pattern, options, &mut el.children),
            Node::Element(mut inner) => {
                if !is_marker(&inner, options) && !SKIPPED_TAGS.contains(&inner.tag.as_str()) {
                    count += highlight_children(&mut inner, pattern, options);
                }
                el.children.push(Node::Element(inner));
            }
        }
    }

    count
}

/// Push `text` into `out`, wrapping each match in a marker.
fn split_matches(
    text: &str,
    pattern: &Regex,
    options: &HighlightOptions,
    out: &mut Vec<Node>,
) -> usize {
    let mut count = 0;
    let mut last = 0;

    for m in pattern.find_iter(text) {
        if m.is_empty() {
            continue;
        }
        if m.start() > last {
            out.push(Node::text(&text[last..m.start()]));
        }
        out.push(
            Element::new(options.element.as_str())
                .with_class(options.class_name.as_str())
                .with_text(m.as_str())
                .into(),
        );
        last = m.end();
        count += 1;
    }

    if last < text.len() || count == 0 {
        out.push(Node::text(&text[last..]));
    }

    count
}

fn is_marker(el: &Element, options: &HighlightOptions) -> bool {
    el.tag == options.element && el.has_class(&options.class_name)
}

/// Remove every marker under `root`, merging adjacent text nodes.
///
/// Safe to call repeatedly; returns the number of markers removed.
pub fn unhighlight(root: &mut Element, options: &HighlightOptions) -> usize {
    let mut removed = 0;
    let children = std::mem::take(&mut root.children);

    for child in children {
        match child {
            Node::Element(mut inner) if is_marker(&inner, options) => {
                removed += 1 + unhighlight(&mut inner, options);
                for grandchild in inner.children {
                    push_merged(&mut root.children, grandchild);
                }
            }
            Node::Element(mut inner) => {
                removed += unhighlight(&mut inner, options);
                root.children.push(Node::Element(inner));
            }
            other => push_merged(&mut root.children, other),
        }
    }

    removed
}

fn push_merged(out: &mut Vec<Node>, node: Node) {
    if let Node::Text(text) = &node {
        if let Some(Node::Text(prev)) = out.last_mut() {
            prev.push_str(text);
            return;
        }
    }
    out.push(node);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn content() -> Element {
        Element::new("div")
            .with_class("content")
            .with_child(Element::new("h1").with_id("auth").with_text("Authentication"))
            .with_child(Element::new("p").with_text("Use API keys. The api is simple."))
            .with_child(Element::new("script").with_text("var api = 1;"))
    }

    #[test]
    fn wraps_case_insensitive_matches() {
        let mut root = content();
        let opts = HighlightOptions::default();

        let count = highlight(&mut root, "api", &opts);

        assert_eq!(count, 2);
        assert_eq!(root.count_class("search-highlight"), 2);
        assert_eq!(
            root.children[1].as_element().unwrap().to_html(),
            "<p>Use <span class=\"search-highlight\">API</span> keys. The \
             <span class=\"search-highlight\">api</span> is simple.</p>"
        );
    }

    #[test]
    fn skips_script_text() {
        let mut root = content();
        highlight(&mut root, "api", &HighlightOptions::default());
        assert_eq!(
            root.children[2].as_element().unwrap().to_html(),
            "<script>var api = 1;</script>"
        );
    }

    #[test]
    fn query_is_literal_not_a_pattern() {
        let mut root = Element::new("p").with_text("a.b axb (c)");
        let opts = HighlightOptions::default();

        assert_eq!(highlight(&mut root, "a.b", &opts), 1);
        assert_eq!(highlight(&mut root, "(c)", &opts), 1);
    }

    #[test]
    fn does_not_highlight_inside_existing_markers() {
        let mut root = content();
        let opts = HighlightOptions::default();

        highlight(&mut root, "api", &opts);
        let again = highlight(&mut root, "api", &opts);

        assert_eq!(again, 0);
        assert_eq!(root.count_class("search-highlight"), 2);
    }

    #[test]
    fn unhighlight_restores_original_tree() {
        let original = content();
        let mut root = original.clone();
        let opts = HighlightOptions::default();

        highlight(&mut root, "api", &opts);
        let removed = unhighlight(&mut root, &opts);

        assert_eq!(removed, 2);
        assert_eq!(root, original);
    }

    #[test]
    fn unhighlight_twice_is_harmless() {
        let mut root = content();
        let opts = HighlightOptions::default();

        highlight(&mut root, "keys", &opts);
        unhighlight(&mut root, &opts);
        let removed = unhighlight(&mut root, &opts);

        assert_eq!(removed, 0);
        assert_eq!(root.count_class("search-highlight"), 0);
        assert_eq!(root, content());
    }

    #[test]
    fn empty_query_highlights_nothing() {
        let mut root = content();
        assert_eq!(highlight(&mut root, "", &HighlightOptions::default()), 0);
        assert_eq!(root, content());
    }
}
