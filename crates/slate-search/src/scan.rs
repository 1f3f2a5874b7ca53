//! Section scanning: turns rendered headings into indexable documents.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::dom::{Element, Node};

/// An indexed unit of text derived from one heading section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Heading anchor id (index reference key)
    pub id: String,
    /// Heading text
    pub title: String,
    /// Text of the section following the heading
    pub body: String,
}

impl Document {
    pub fn new(id: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Where a section body stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Boundary {
    /// Stop at the next heading whose level is the same or higher (h1 ends at h1 only).
    #[default]
    SameOrHigher,
    /// Stop at the next heading of any indexed level.
    AnySection,
}

/// Options for scanning a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Deepest heading level that starts a section
    pub max_level: u8,
    /// Body boundary rule
    pub boundary: Boundary,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_level: 2,
            boundary: Boundary::default(),
        }
    }
}

/// Why a heading was not turned into a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("heading \"{title}\" has no id and cannot be linked")]
    MissingId { title: String },

    #[error("duplicate heading id \"{id}\" (\"{title}\"), keeping the first")]
    DuplicateId { id: String, title: String },
}

/// Outcome of scanning a page.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Documents in page order
    pub documents: Vec<Document>,
    /// Headings that were skipped
    pub skipped: Vec<SkipReason>,
}

/// Scan a page tree for section documents.
///
/// Every heading at level `1..=max_level` becomes a document whose body is
/// the text of its following siblings up to the boundary heading.
pub fn scan_sections(root: &Element, options: &ScanOptions) -> ScanReport {
    let mut report = ScanReport::default();
    let mut seen = HashSet::new();
    scan_children(root, options, &mut seen, &mut report);

    tracing::debug!(
        "Scanned {} sections ({} skipped)",
        report.documents.len(),
        report.skipped.len()
    );

    report
}

fn scan_children(
    parent: &Element,
    options: &ScanOptions,
    seen: &mut HashSet<String>,
    report: &mut ScanReport,
) {
    for (pos, child) in parent.children.iter().enumerate() {
        let Node::Element(el) = child else {
            continue;
        };

        match el.heading_level() {
            Some(level) if level <= options.max_level => {
                let title = el.text_content();
                let body = section_body(&parent.children[pos + 1..], level, options);
                register(el, title, body, seen, report);
            }
            _ => scan_children(el, options, seen, report),
        }
    }
}

fn register(
    heading: &Element,
    title: String,
    body: String,
    seen: &mut HashSet<String>,
    report: &mut ScanReport,
) {
    let reason = match heading.id.as_deref() {
        None | Some("") => SkipReason::MissingId { title },
        Some(id) if !seen.insert(id.to_string()) => SkipReason::DuplicateId {
            id: id.to_string(),
            title,
        },
        Some(id) => {
            report.documents.push(Document::new(id, title, body));
            return;
        }
    };

    tracing::warn!("Skipping heading: {}", reason);
    report.skipped.push(reason);
}

/// Text of the siblings after a heading, up to the boundary heading.
///
/// Sibling texts are joined with a space so words in adjacent blocks stay apart.
fn section_body(siblings: &[Node], level: u8, options: &ScanOptions) -> String {
    let mut parts = Vec::new();

    for node in siblings {
        if let Node::Element(el) = node {
            if let Some(next) = el.heading_level() {
                let stops = match options.boundary {
                    Boundary::SameOrHigher => next <= level,
                    Boundary::AnySection => next <= options.max_level,
                };
                if stops {
                    break;
                }
            }
        }

        let text = node.text_content();
        let text = text.trim();
        if !text.is_empty() {
            parts.push(text.to_string());
        }
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn heading(tag: &str, id: &str, text: &str) -> Node {
        Element::new(tag).with_id(id).with_text(text).into()
    }

    fn para(text: &str) -> Node {
        Element::new("p").with_text(text).into()
    }

    fn content(children: Vec<Node>) -> Element {
        let mut el = Element::new("div").with_class("content");
        el.children = children;
        el
    }

    #[test]
    fn indexes_every_heading_with_unique_ids() {
        let page = content(vec![
            heading("h1", "intro", "Introduction"),
            para("Getting started guide"),
            heading("h2", "setup", "Setup"),
            para("Install it"),
            heading("h3", "deep", "Not a section"),
            heading("h1", "auth", "Authentication"),
            para("Use API keys to authenticate"),
        ]);

        let report = scan_sections(&page, &ScanOptions::default());
        let ids: Vec<_> = report.documents.iter().map(|d| d.id.as_str()).collect();

        assert_eq!(ids, vec!["intro", "setup", "auth"]);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn body_stops_at_same_or_higher_heading() {
        let page = content(vec![
            heading("h2", "first", "First"),
            para("alpha"),
            heading("h3", "sub", "Sub"),
            para("beta"),
            heading("h2", "second", "Second"),
            para("gamma"),
            heading("h1", "top", "Top"),
            para("delta"),
        ]);

        let report = scan_sections(&page, &ScanOptions::default());

        assert_eq!(report.documents[0].body, "alpha Sub beta");
        assert_eq!(report.documents[1].body, "gamma");
        assert_eq!(report.documents[2].body, "delta");
    }

    #[test]
    fn h1_body_spans_its_h2_sections_by_default() {
        let page = content(vec![
            heading("h1", "top", "Top"),
            para("intro"),
            heading("h2", "child", "Child"),
            para("child text"),
        ]);

        let report = scan_sections(&page, &ScanOptions::default());

        assert_eq!(report.documents[0].body, "intro Child child text");
        assert_eq!(report.documents[1].body, "child text");
    }

    #[test]
    fn any_section_boundary_stops_at_next_h2() {
        let page = content(vec![
            heading("h1", "top", "Top"),
            para("intro"),
            heading("h2", "child", "Child"),
            para("child text"),
        ]);

        let options = ScanOptions {
            boundary: Boundary::AnySection,
            ..Default::default()
        };
        let report = scan_sections(&page, &options);

        assert_eq!(report.documents[0].body, "intro");
    }

    #[test]
    fn body_excludes_heading_text() {
        let page = content(vec![heading("h1", "only", "Only Title"), para("text")]);

        let report = scan_sections(&page, &ScanOptions::default());

        assert_eq!(report.documents[0].title, "Only Title");
        assert_eq!(report.documents[0].body, "text");
    }

    #[test]
    fn skips_missing_and_duplicate_ids() {
        let page = content(vec![
            heading("h1", "errors", "Errors"),
            para("first"),
            Element::new("h2").with_text("Anonymous").into(),
            heading("h2", "errors", "Errors again"),
            para("second"),
        ]);

        let report = scan_sections(&page, &ScanOptions::default());

        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.documents[0].title, "Errors");
        assert_eq!(
            report.skipped,
            vec![
                SkipReason::MissingId {
                    title: "Anonymous".to_string()
                },
                SkipReason::DuplicateId {
                    id: "errors".to_string(),
                    title: "Errors again".to_string()
                },
            ]
        );
    }

    #[test]
    fn finds_nested_headings() {
        let page = Element::new("body").with_child(content(vec![
            heading("h1", "nested", "Nested"),
            para("inside"),
        ]));

        let report = scan_sections(&page, &ScanOptions::default());

        assert_eq!(report.documents, vec![Document::new("nested", "Nested", "inside")]);
    }

    #[test]
    fn empty_page_has_no_documents() {
        let report = scan_sections(&content(vec![]), &ScanOptions::default());
        assert!(report.documents.is_empty());
    }
}
