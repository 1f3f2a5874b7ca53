//! Markdown include rendering into the page tree.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use slate_search::dom::is_void;
use slate_search::{Element, Node};

use crate::codeblock::{code_block_shell, fence_language, finish_code_block};
use crate::html::{self, HtmlToken};

/// Tag of a stack frame whose children are spliced into its parent on close.
const FRAGMENT: &str = "";

/// Render a Markdown include into top-level page nodes.
///
/// Headings get their explicit `{#id}` or a slug of their text. Slugs are not
/// de-duplicated, so repeated headings share an id. Embedded HTML becomes
/// elements and text of the same tree; HTML headings keep only the id they
/// were written with.
pub fn render_markdown(source: &str) -> Vec<Node> {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES;

    let mut tree = TreeBuilder::new();
    for event in Parser::new_ext(source, options) {
        tree.event(event);
    }
    tree.finish()
}

/// Render an HTML snippet into page nodes.
pub fn render_html(source: &str) -> Vec<Node> {
    let mut tree = TreeBuilder::new();
    tree.html(source);
    tree.finish()
}

struct TreeBuilder {
    stack: Vec<Element>,
    /// Stack indices of frames opened by HTML start tags, ascending
    html_frames: Vec<usize>,
    /// HTML block text collected until the block ends
    html_block: Option<String>,
    in_table_head: bool,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Element::new(FRAGMENT)],
            html_frames: Vec::new(),
            html_block: None,
            in_table_head: false,
        }
    }

    fn top(&mut self) -> &mut Element {
        // The root frame is never popped
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::HtmlBlock) => self.html_block = Some(String::new()),
            Event::End(TagEnd::HtmlBlock) => {
                if let Some(block) = self.html_block.take() {
                    self.html(&block);
                }
            }
            Event::Start(tag) => {
                let el = self.open(tag);
                self.stack.push(el);
            }
            Event::End(_) => {
                while self.top_is_html() {
                    self.close_html();
                }
                self.close();
            }
            Event::Text(text) => {
                let top = self.top();
                if top.tag == "img" {
                    let alt = format!("{}{}", top.attr("alt").unwrap_or(""), text);
                    top.set_attr("alt", alt);
                } else {
                    push_text(&mut top.children, &text);
                }
            }
            Event::Code(code) => {
                let el = Element::new("code").with_text(code.to_string());
                self.top().children.push(el.into());
            }
            Event::Html(html) => match self.html_block.as_mut() {
                Some(block) => block.push_str(&html),
                None => self.html(&html),
            },
            Event::InlineHtml(html) => self.html(&html),
            Event::SoftBreak => push_text(&mut self.top().children, "\n"),
            Event::HardBreak => {
                let children = &mut self.top().children;
                children.push(Element::new("br").into());
                push_text(children, "\n");
            }
            Event::Rule => self.push_block(Element::new("hr")),
            Event::TaskListMarker(checked) => {
                let mut input = Element::new("input")
                    .with_attr("type", "checkbox")
                    .with_attr("disabled", "");
                if checked {
                    input = input.with_attr("checked", "");
                }
                self.top().children.push(input.into());
            }
            Event::FootnoteReference(label) => {
                let el = Element::new("sup").with_class("footnote-reference").with_child(
                    Element::new("a")
                        .with_attr("href", format!("#{}", label))
                        .with_text(label.to_string()),
                );
                self.top().children.push(el.into());
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) -> Element {
        match tag {
            Tag::Paragraph => Element::new("p"),
            Tag::Heading {
                level,
                id,
                classes,
                attrs,
            } => {
                let mut el = Element::new(heading_tag(level));
                el.id = id.map(|id| id.to_string());
                for class in classes {
                    el.add_class(class.to_string());
                }
                for (name, value) in attrs {
                    el.set_attr(&name, value.map(|v| v.to_string()).unwrap_or_default());
                }
                el
            }
            Tag::BlockQuote(..) => Element::new("blockquote"),
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => fence_language(&info),
                    CodeBlockKind::Indented => None,
                };
                code_block_shell(language.as_deref())
            }
            Tag::List(Some(start)) if start != 1 => {
                Element::new("ol").with_attr("start", start.to_string())
            }
            Tag::List(Some(_)) => Element::new("ol"),
            Tag::List(None) => Element::new("ul"),
            Tag::Item => Element::new("li"),
            Tag::FootnoteDefinition(label) => Element::new("div")
                .with_class("footnote-definition")
                .with_id(label.to_string()),
            Tag::Table(_) => Element::new("table"),
            Tag::TableHead => {
                self.in_table_head = true;
                Element::new("thead")
            }
            Tag::TableRow => Element::new("tr"),
            Tag::TableCell => Element::new(if self.in_table_head { "th" } else { "td" }),
            Tag::Emphasis => Element::new("em"),
            Tag::Strong => Element::new("strong"),
            Tag::Strikethrough => Element::new("del"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let el = Element::new("a").with_attr("href", dest_url.to_string());
                if title.is_empty() {
                    el
                } else {
                    el.with_attr("title", title.to_string())
                }
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let el = Element::new("img")
                    .with_attr("src", dest_url.to_string())
                    .with_attr("alt", "");
                if title.is_empty() {
                    el
                } else {
                    el.with_attr("title", title.to_string())
                }
            }
            _ => Element::new(FRAGMENT),
        }
    }

    /// Feed an HTML fragment into the stack.
    fn html(&mut self, source: &str) {
        for token in html::tokenize(source) {
            match token {
                HtmlToken::Start {
                    name,
                    attrs,
                    self_closing,
                } => {
                    let el = html::element(&name, attrs);
                    if self_closing || is_void(&name) {
                        self.top().children.push(el.into());
                    } else {
                        self.html_frames.push(self.stack.len());
                        self.stack.push(el);
                    }
                }
                HtmlToken::End { name } => match self.open_html_frame(&name) {
                    Some(index) => {
                        while self.stack.len() > index {
                            self.close_html();
                        }
                    }
                    None => tracing::debug!("Ignoring unmatched </{}>", name),
                },
                HtmlToken::Text(text) => push_text(&mut self.top().children, &text),
            }
        }
    }

    fn top_is_html(&self) -> bool {
        self.html_frames.last() == Some(&(self.stack.len() - 1))
    }

    /// Index of the nearest open `name` frame with only HTML frames above it.
    fn open_html_frame(&self, name: &str) -> Option<usize> {
        let mut above = self.stack.len();
        for &index in self.html_frames.iter().rev() {
            if index + 1 != above {
                return None;
            }
            if self.stack[index].tag == name {
                return Some(index);
            }
            above = index;
        }
        None
    }

    fn close_html(&mut self) {
        self.html_frames.pop();
        if let Some(el) = self.stack.pop() {
            self.top().children.push(el.into());
        }
    }

    fn close(&mut self) {
        if self.stack.len() < 2 {
            tracing::debug!("Ignoring unbalanced end event");
            return;
        }
        let Some(mut el) = self.stack.pop() else {
            return;
        };

        match el.tag.as_str() {
            FRAGMENT => {
                let children = std::mem::take(&mut el.children);
                for child in children {
                    push_node(&mut self.top().children, child);
                }
                return;
            }
            "pre" => finish_code_block(&mut el),
            "thead" => {
                self.in_table_head = false;
                let mut row = Element::new("tr");
                row.children = std::mem::take(&mut el.children);
                el.children = vec![row.into()];
            }
            _ => {}
        }

        if el.heading_level().is_some() && el.id.is_none() {
            let slug = slugify(&el.text_content());
            if !slug.is_empty() {
                el.id = Some(slug);
            }
        }

        self.push_block(el);
    }

    /// Append an element, followed by a newline when it is block-level.
    fn push_block(&mut self, el: Element) {
        let block = is_block(&el.tag);
        let children = &mut self.top().children;
        children.push(el.into());
        if block {
            push_text(children, "\n");
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while self.stack.len() > 1 {
            if self.top_is_html() {
                self.close_html();
            } else {
                self.close();
            }
        }
        std::mem::take(&mut self.top().children)
    }
}

fn heading_tag(level: HeadingLevel) -> String {
    format!("h{}", level as u8)
}

fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "pre"
            | "blockquote"
            | "ul"
            | "ol"
            | "li"
            | "table"
            | "thead"
            | "tr"
            | "th"
            | "td"
            | "div"
            | "hr"
    )
}

/// Append text, merging with a preceding text node.
fn push_text(children: &mut Vec<Node>, text: &str) {
    if let Some(Node::Text(prev)) = children.last_mut() {
        prev.push_str(text);
    } else {
        children.push(Node::text(text));
    }
}

fn push_node(children: &mut Vec<Node>, node: Node) {
    match node {
        Node::Text(text) => push_text(children, &text),
        other => children.push(other),
    }
}

/// Anchor id for a heading without an explicit one.
///
/// Runs of anything other than letters, digits and `_` become a single `-`.
/// Apostrophes are dropped so possessives stay one word.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut gap = false;

    for c in text.chars() {
        if c.is_alphanumeric() || c == '_' {
            if gap && !slug.is_empty() {
                slug.push('-');
            }
            gap = false;
            slug.extend(c.to_lowercase());
        } else if c != '\'' && c != '\u{2019}' {
            gap = true;
        }
    }

    slug
}
