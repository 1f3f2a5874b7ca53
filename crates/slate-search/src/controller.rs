//! Key-event handling for the search box.
//!
//! [`SearchController::handle`] is pure: it takes the previous panel state and
//! a key event and returns the next state plus the page commands to apply.
//! [`crate::session::SearchSession`] applies those commands to a live page.

use serde::Serialize;

use crate::index::{QueryResult, SearchIndex, MIN_SCORE};

/// Key code of the Escape key.
pub const ESCAPE_KEY_CODE: u32 = 27;

/// A key-up event from the search input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Input value after the key was released
    pub value: String,
    /// Key code of the released key
    pub key_code: u32,
}

impl KeyEvent {
    pub fn new(value: impl Into<String>, key_code: u32) -> Self {
        Self {
            value: value.into(),
            key_code,
        }
    }

    /// A plain typing event (no special key).
    pub fn typed(value: impl Into<String>) -> Self {
        Self::new(value, 0)
    }

    /// Escape pressed while the input holds `value`.
    pub fn escape(value: impl Into<String>) -> Self {
        Self::new(value, ESCAPE_KEY_CODE)
    }

    pub fn is_escape(&self) -> bool {
        self.key_code == ESCAPE_KEY_CODE
    }
}

/// Visible state of the results panel.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PanelState {
    /// Panel hidden, no highlights
    #[default]
    Collapsed,
    /// Panel visible with matching results, query text highlighted
    Results {
        query: String,
        results: Vec<QueryResult>,
    },
    /// Panel visible with the no-results entry
    NoResults { query: String },
}

impl PanelState {
    pub fn is_expanded(&self) -> bool {
        !matches!(self, PanelState::Collapsed)
    }
}

/// A mutation to apply to the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PageCommand {
    /// Remove all highlight markers from the content region
    Unhighlight,
    /// Add the visible class to the results panel
    ShowResults,
    /// Remove the visible class from the results panel
    HideResults,
    /// Clear the search input
    ClearInput,
    /// Remove every entry from the results panel
    ClearResults,
    /// Append a link entry for a document, titled from the live heading text
    AppendResult { reference: String },
    /// Replace the panel contents with the no-results entry
    ShowNoResults { query: String },
    /// Highlight the query text in the content region
    Highlight { query: String },
}

/// Outcome of handling one key event.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: PanelState,
    pub commands: Vec<PageCommand>,
}

/// Turns key events into panel transitions against a shared index.
#[derive(Debug, Clone, Copy)]
pub struct SearchController<'i> {
    index: &'i SearchIndex,
    min_score: f64,
}

impl<'i> SearchController<'i> {
    /// Create a controller with the default score threshold.
    pub fn new(index: &'i SearchIndex) -> Self {
        Self {
            index,
            min_score: MIN_SCORE,
        }
    }

    /// Builder: results scoring at or below `min_score` are dropped.
    pub fn min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn index(&self) -> &'i SearchIndex {
        self.index
    }

    /// Query the index and drop results at or below the threshold.
    pub fn query(&self, query: &str) -> Vec<QueryResult> {
        let mut results = self.index.search(query);
        results.retain(|r| r.score > self.min_score);
        results
    }

    /// Handle a key-up event.
    pub fn handle(&self, previous: &PanelState, event: &KeyEvent) -> Transition {
        let mut commands = vec![PageCommand::Unhighlight, PageCommand::ShowResults];

        let value = if event.is_escape() {
            commands.push(PageCommand::ClearInput);
            ""
        } else {
            event.value.as_str()
        };

        let state = if value.trim().is_empty() {
            commands.push(PageCommand::Unhighlight);
            commands.push(PageCommand::HideResults);
            PanelState::Collapsed
        } else {
            let results = self.query(value);
            if results.is_empty() {
                commands.push(PageCommand::ShowNoResults {
                    query: value.to_string(),
                });
                PanelState::NoResults {
                    query: value.to_string(),
                }
            } else {
                commands.push(PageCommand::ClearResults);
                commands.extend(results.iter().map(|r| PageCommand::AppendResult {
                    reference: r.reference.clone(),
                }));
                commands.push(PageCommand::Highlight {
                    query: value.to_string(),
                });
                PanelState::Results {
                    query: value.to_string(),
                    results,
                }
            }
        };

        tracing::debug!(
            "Search transition: {} -> {}",
            state_name(previous),
            state_name(&state)
        );

        Transition { state, commands }
    }
}

fn state_name(state: &PanelState) -> &'static str {
    match state {
        PanelState::Collapsed => "collapsed",
        PanelState::Results { .. } => "results",
        PanelState::NoResults { .. } => "no-results",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::Document;
    use pretty_assertions::assert_eq;

    fn index() -> SearchIndex {
        SearchIndex::from_documents(&[
            Document::new("intro", "Introduction", "Getting started guide"),
            Document::new("auth", "Authentication", "Use API keys to authenticate"),
        ])
    }

    #[test]
    fn matching_query_lists_results_then_highlights() {
        let index = index();
        let controller = SearchController::new(&index);

        let t = controller.handle(&PanelState::Collapsed, &KeyEvent::typed("api"));

        assert_eq!(
            t.commands,
            vec![
                PageCommand::Unhighlight,
                PageCommand::ShowResults,
                PageCommand::ClearResults,
                PageCommand::AppendResult {
                    reference: "auth".to_string()
                },
                PageCommand::Highlight {
                    query: "api".to_string()
                },
            ]
        );
        assert!(matches!(t.state, PanelState::Results { ref results, .. } if results.len() == 1));
    }

    #[test]
    fn unmatched_query_shows_no_results() {
        let index = index();
        let controller = SearchController::new(&index);

        let t = controller.handle(&PanelState::Collapsed, &KeyEvent::typed("zzz"));

        assert_eq!(
            t.commands,
            vec![
                PageCommand::Unhighlight,
                PageCommand::ShowResults,
                PageCommand::ShowNoResults {
                    query: "zzz".to_string()
                },
            ]
        );
        assert_eq!(
            t.state,
            PanelState::NoResults {
                query: "zzz".to_string()
            }
        );
    }

    #[test]
    fn empty_value_collapses() {
        let index = index();
        let controller = SearchController::new(&index);
        let previous = PanelState::NoResults {
            query: "z".to_string(),
        };

        let t = controller.handle(&previous, &KeyEvent::typed(""));

        assert_eq!(t.state, PanelState::Collapsed);
        assert_eq!(
            t.commands,
            vec![
                PageCommand::Unhighlight,
                PageCommand::ShowResults,
                PageCommand::Unhighlight,
                PageCommand::HideResults,
            ]
        );
    }

    #[test]
    fn whitespace_value_collapses_without_ranking() {
        let index = index();
        let controller = SearchController::new(&index);

        let t = controller.handle(&PanelState::Collapsed, &KeyEvent::typed("   "));

        assert_eq!(t.state, PanelState::Collapsed);
        assert!(!t.commands.contains(&PageCommand::ClearResults));
    }

    #[test]
    fn escape_clears_input_and_collapses() {
        let index = index();
        let controller = SearchController::new(&index);
        let previous = controller
            .handle(&PanelState::Collapsed, &KeyEvent::typed("api"))
            .state;

        let t = controller.handle(&previous, &KeyEvent::escape("api"));

        assert_eq!(t.state, PanelState::Collapsed);
        assert_eq!(t.commands[2], PageCommand::ClearInput);
        assert_eq!(t.commands.last(), Some(&PageCommand::HideResults));
    }

    #[test]
    fn threshold_filters_to_no_results() {
        let body = format!("needle {}", vec!["filler"; 9999].join(" "));
        let index = SearchIndex::from_documents(&[Document::new("big", "Overview", body)]);
        let controller = SearchController::new(&index);

        assert_eq!(index.search("needle").len(), 1);

        let t = controller.handle(&PanelState::Collapsed, &KeyEvent::typed("needle"));

        assert_eq!(
            t.state,
            PanelState::NoResults {
                query: "needle".to_string()
            }
        );
    }

    #[test]
    fn empty_index_never_fails() {
        let index = crate::index::IndexBuilder::new().build();
        let controller = SearchController::new(&index);

        let t = controller.handle(&PanelState::Collapsed, &KeyEvent::typed("api"));

        assert!(matches!(t.state, PanelState::NoResults { .. }));
    }

    #[test]
    fn stop_word_query_shows_no_results() {
        let index = index();
        let controller = SearchController::new(&index);

        let t = controller.handle(&PanelState::Collapsed, &KeyEvent::typed("the"));

        assert!(matches!(t.state, PanelState::NoResults { .. }));
    }
}
