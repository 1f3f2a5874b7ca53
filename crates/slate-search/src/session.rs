//! A search box bound to a live page.

use crate::controller::{KeyEvent, PageCommand, PanelState, SearchController};
use crate::dom::{Element, Node};
use crate::highlight::{highlight, unhighlight, HighlightOptions};

/// Id of the search input element.
pub const INPUT_ID: &str = "input-search";
/// Class of the results panel.
pub const RESULTS_CLASS: &str = "search-results";
/// Class of the searchable content region.
pub const CONTENT_CLASS: &str = "content";
/// Class toggled on the results panel when it is shown.
pub const VISIBLE_CLASS: &str = "visible";

/// Text of the single entry shown when nothing matches.
pub fn no_results_message(query: &str) -> String {
    format!("No results found for \"{}\"", query)
}

/// Owns a page and feeds it key events through a controller.
///
/// Each call to [`SearchSession::key_up`] runs the query and applies every
/// page command before returning.
#[derive(Debug)]
pub struct SearchSession<'i> {
    controller: SearchController<'i>,
    page: Element,
    state: PanelState,
    highlight: HighlightOptions,
}

impl<'i> SearchSession<'i> {
    /// Bind a controller to a page.
    pub fn new(controller: SearchController<'i>, page: Element) -> Self {
        Self {
            controller,
            page,
            state: PanelState::Collapsed,
            highlight: HighlightOptions::default(),
        }
    }

    /// Builder: use custom highlight markers.
    pub fn highlight_options(mut self, options: HighlightOptions) -> Self {
        self.highlight = options;
        self
    }

    pub fn page(&self) -> &Element {
        &self.page
    }

    /// Mutable page access, for changes made outside the search box.
    pub fn page_mut(&mut self) -> &mut Element {
        &mut self.page
    }

    pub fn into_page(self) -> Element {
        self.page
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    /// Current value of the search input.
    pub fn input_value(&self) -> &str {
        self.page
            .find_by_id(INPUT_ID)
            .and_then(|el| el.attr("value"))
            .unwrap_or("")
    }

    /// The results panel, if the page has one.
    pub fn results_panel(&self) -> Option<&Element> {
        self.page.find_by_class(RESULTS_CLASS)
    }

    /// Number of highlight markers in the content region.
    pub fn highlight_count(&self) -> usize {
        self.page
            .find_by_class(CONTENT_CLASS)
            .map(|content| content.count_class(&self.highlight.class_name))
            .unwrap_or(0)
    }

    /// Type `value` into the input and release a key.
    pub fn key_up(&mut self, value: &str, key_code: u32) -> &PanelState {
        self.set_input(value);
        let event = KeyEvent::new(value, key_code);
        let transition = self.controller.handle(&self.state, &event);

        for command in &transition.commands {
            self.apply(command);
        }

        self.state = transition.state;
        &self.state
    }

    /// Type `value` with no special key.
    pub fn type_text(&mut self, value: &str) -> &PanelState {
        self.key_up(value, 0)
    }

    /// Press Escape with the current input value.
    pub fn press_escape(&mut self) -> &PanelState {
        let value = self.input_value().to_string();
        self.key_up(&value, crate::controller::ESCAPE_KEY_CODE)
    }

    fn set_input(&mut self, value: &str) {
        match self.page.find_by_id_mut(INPUT_ID) {
            Some(input) => input.set_attr("value", value),
            None => tracing::debug!("Page has no #{} element", INPUT_ID),
        }
    }

    /// Apply one command to the page.
    pub fn apply(&mut self, command: &PageCommand) {
        match command {
            PageCommand::Unhighlight => {
                if let Some(content) = self.page.find_by_class_mut(CONTENT_CLASS) {
                    unhighlight(content, &self.highlight);
                }
            }
            PageCommand::Highlight { query } => {
                if let Some(content) = self.page.find_by_class_mut(CONTENT_CLASS) {
                    let count = highlight(content, query, &self.highlight);
                    tracing::debug!("Highlighted {} matches for \"{}\"", count, query);
                }
            }
            PageCommand::ShowResults => self.with_panel(|panel| panel.add_class(VISIBLE_CLASS)),
            PageCommand::HideResults => self.with_panel(|panel| panel.remove_class(VISIBLE_CLASS)),
            PageCommand::ClearInput => self.set_input(""),
            PageCommand::ClearResults => self.with_panel(|panel| panel.children.clear()),
            PageCommand::AppendResult { reference } => {
                let Some(title) = self.page.find_by_id(reference).map(Element::text_content)
                else {
                    tracing::warn!("Search result \"{}\" has no element on the page", reference);
                    return;
                };
                let entry = result_entry(reference, &title);
                self.with_panel(|panel| panel.children.push(entry.into()));
            }
            PageCommand::ShowNoResults { query } => {
                let entry = Element::new("li").with_text(no_results_message(query));
                self.with_panel(|panel| panel.children = vec![entry.into()]);
            }
        }
    }

    fn with_panel(&mut self, f: impl FnOnce(&mut Element)) {
        match self.page.find_by_class_mut(RESULTS_CLASS) {
            Some(panel) => f(panel),
            None => tracing::debug!("Page has no .{} element", RESULTS_CLASS),
        }
    }
}

fn result_entry(reference: &str, title: &str) -> Element {
    Element::new("li").with_child(
        Element::new("a")
            .with_attr("href", format!("#{}", reference))
            .with_child(Node::text(title)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::SearchIndex;
    use crate::scan::{scan_sections, ScanOptions};
    use pretty_assertions::assert_eq;

    fn page() -> Element {
        Element::new("div")
            .with_class("page")
            .with_child(Element::new("input").with_id(INPUT_ID))
            .with_child(Element::new("ul").with_class(RESULTS_CLASS))
            .with_child(
                Element::new("div")
                    .with_class(CONTENT_CLASS)
                    .with_child(Element::new("h1").with_id("intro").with_text("Introduction"))
                    .with_child(Element::new("p").with_text("Getting started guide"))
                    .with_child(Element::new("h1").with_id("auth").with_text("Authentication"))
                    .with_child(Element::new("p").with_text("Use API keys to authenticate")),
            )
    }

    fn index_for(page: &Element) -> SearchIndex {
        let report = scan_sections(page, &ScanOptions::default());
        SearchIndex::from_documents(&report.documents)
    }

    #[test]
    fn shows_linked_results_and_highlights() {
        let page = page();
        let index = index_for(&page);
        let mut session = SearchSession::new(SearchController::new(&index), page);

        session.type_text("api");

        let panel = session.results_panel().unwrap();
        assert!(panel.has_class(VISIBLE_CLASS));
        assert_eq!(
            panel.to_html(),
            "<ul class=\"search-results visible\">\
             <li><a href=\"#auth\">Authentication</a></li></ul>"
        );
        assert_eq!(session.highlight_count(), 1);
    }

    #[test]
    fn shows_no_results_message() {
        let page = page();
        let index = index_for(&page);
        let mut session = SearchSession::new(SearchController::new(&index), page);

        session.type_text("zzz");

        let panel = session.results_panel().unwrap();
        assert_eq!(panel.text_content(), "No results found for \"zzz\"");
        assert_eq!(panel.children.len(), 1);
        assert_eq!(session.highlight_count(), 0);
    }

    #[test]
    fn escapes_query_in_no_results_entry() {
        let page = page();
        let index = index_for(&page);
        let mut session = SearchSession::new(SearchController::new(&index), page);

        session.type_text("<img src=x>");

        let html = session.results_panel().unwrap().to_html();
        assert!(html.contains("&lt;img src=x&gt;"), "{}", html);
        assert!(!html.contains("<img"));
    }

    #[test]
    fn escape_key_clears_and_collapses() {
        let page = page();
        let index = index_for(&page);
        let mut session = SearchSession::new(SearchController::new(&index), page);

        session.type_text("api");
        assert_eq!(session.input_value(), "api");

        let state = session.press_escape().clone();

        assert_eq!(state, PanelState::Collapsed);
        assert_eq!(session.input_value(), "");
        assert!(!session.results_panel().unwrap().has_class(VISIBLE_CLASS));
        assert_eq!(session.highlight_count(), 0);
    }

    #[test]
    fn repeated_empty_input_is_idempotent() {
        let page = page();
        let index = index_for(&page);
        let mut session = SearchSession::new(SearchController::new(&index), page.clone());

        session.type_text("api");
        session.type_text("");
        session.type_text("");

        assert_eq!(session.highlight_count(), 0);
        assert!(!session.results_panel().unwrap().has_class(VISIBLE_CLASS));
        assert_eq!(
            session.page().find_by_class(CONTENT_CLASS),
            page.find_by_class(CONTENT_CLASS)
        );
    }

    #[test]
    fn result_title_is_read_from_live_page() {
        let page = page();
        let index = index_for(&page);
        let mut session = SearchSession::new(SearchController::new(&index), page);

        if let Some(heading) = session.page_mut().find_by_id_mut("auth") {
            heading.children = vec![Node::text("Auth (renamed)")];
        }
        session.type_text("api");

        assert_eq!(
            session.results_panel().unwrap().text_content(),
            "Auth (renamed)"
        );
    }

    #[test]
    fn skips_results_whose_anchor_disappeared() {
        let page = page();
        let index = index_for(&page);
        let mut session = SearchSession::new(SearchController::new(&index), page);

        if let Some(heading) = session.page_mut().find_by_id_mut("auth") {
            heading.id = None;
        }
        let state = session.type_text("api").clone();

        assert!(matches!(state, PanelState::Results { .. }));
        assert!(session.results_panel().unwrap().children.is_empty());
    }

    #[test]
    fn new_query_replaces_previous_results() {
        let page = page();
        let index = index_for(&page);
        let mut session = SearchSession::new(SearchController::new(&index), page);

        session.type_text("auth");
        session.type_text("guide");

        assert_eq!(
            session.results_panel().unwrap().text_content(),
            "Introduction"
        );
        assert_eq!(session.highlight_count(), 1);
    }
}
