//! Run a query through the page's search box.

use std::path::Path;

use anyhow::{bail, Result};
use serde::Serialize;
use slate_search::session::VISIBLE_CLASS;
use slate_search::{IndexBuilder, PanelState, SearchController, SearchSession};

use super::{load_sections, SearchSettings};

/// Options for the search command.
#[derive(Debug, Clone, Default)]
pub struct SearchArgs {
    /// Query text typed into the search box
    pub query: String,
    /// Type the query one character at a time
    pub incremental: bool,
    /// Press Escape after typing
    pub escape: bool,
    /// Print the final panel state as JSON
    pub json: bool,
}

/// Page state after the last key event.
#[derive(Debug, Serialize)]
pub struct SearchReport {
    #[serde(flatten)]
    pub state: PanelState,
    /// Highlight markers in the content region
    pub highlights: usize,
    /// Value left in the search input
    pub input: String,
    /// Results panel markup, when visible
    pub panel: Option<String>,
    #[serde(skip)]
    pub indexed: usize,
}

/// Run the search command.
pub fn run(source: &Path, settings: &SearchSettings, args: &SearchArgs) -> Result<()> {
    let report = search(source, settings, args)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match &report.panel {
        Some(panel) => println!("{}", panel),
        None => println!("(results hidden)"),
    }

    tracing::info!(
        "{} sections indexed, {} highlights applied",
        report.indexed,
        report.highlights
    );

    Ok(())
}

/// Load the site, type the query into its search box, and report the page.
pub fn search(source: &Path, settings: &SearchSettings, args: &SearchArgs) -> Result<SearchReport> {
    let (site, sections) = load_sections(source, settings)?;

    if !site.config.search {
        bail!(
            "Search is disabled for {}. Set `search: true` in index.yml.",
            source.display()
        );
    }

    let mut builder = IndexBuilder::new().boosts(settings.boosts());
    builder.extend(&sections.documents);
    let index = builder.build();

    let controller = SearchController::new(&index).min_score(settings.min_score);
    let mut session = SearchSession::new(controller, site.page);

    if args.incremental {
        let mut typed = String::new();
        for c in args.query.chars() {
            typed.push(c);
            session.type_text(&typed);
            tracing::debug!("\"{}\": {} highlights", typed, session.highlight_count());
        }
    } else {
        session.type_text(&args.query);
    }

    if args.escape {
        session.press_escape();
    }

    let panel = session
        .results_panel()
        .filter(|panel| panel.has_class(VISIBLE_CLASS))
        .map(|panel| panel.to_html());

    Ok(SearchReport {
        state: session.state().clone(),
        highlights: session.highlight_count(),
        input: session.input_value().to_string(),
        panel,
        indexed: index.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_source(dir: &Path, search: bool) {
        fs::create_dir_all(dir.join("includes")).unwrap();
        fs::write(
            dir.join("index.yml"),
            format!("title: Kittn\nsearch: {}\nincludes:\n  - _main\n", search),
        )
        .unwrap();
        fs::write(
            dir.join("includes/_main.md"),
            "# Introduction\n\nGetting started guide\n\n# Authentication\n\nUse API keys to authenticate\n",
        )
        .unwrap();
    }

    fn args(query: &str) -> SearchArgs {
        SearchArgs {
            query: query.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn typing_incrementally_lists_matching_section() {
        let temp = tempdir().unwrap();
        write_source(temp.path(), true);

        let report = search(
            temp.path(),
            &SearchSettings::default(),
            &SearchArgs {
                incremental: true,
                ..args("api")
            },
        )
        .unwrap();

        assert_eq!(
            report.panel.as_deref(),
            Some(
                "<ul class=\"search-results visible\">\
                 <li><a href=\"#authentication\">Authentication</a></li></ul>"
            )
        );
        assert_eq!(report.highlights, 1);
        assert_eq!(report.input, "api");
        assert_eq!(report.indexed, 2);
    }

    #[test]
    fn report_serializes_panel_state() {
        let temp = tempdir().unwrap();
        write_source(temp.path(), true);

        let report = search(temp.path(), &SearchSettings::default(), &args("zzz")).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["state"], "no_results");
        assert_eq!(json["query"], "zzz");
        assert_eq!(json["highlights"], 0);
        assert_eq!(json["input"], "zzz");
        assert!(json["panel"]
            .as_str()
            .unwrap()
            .contains("No results found for \"zzz\""));
        assert!(json.get("indexed").is_none());
    }

    #[test]
    fn escape_hides_the_panel() {
        let temp = tempdir().unwrap();
        write_source(temp.path(), true);

        let report = search(
            temp.path(),
            &SearchSettings::default(),
            &SearchArgs {
                escape: true,
                ..args("guide")
            },
        )
        .unwrap();

        assert_eq!(report.state, PanelState::Collapsed);
        assert_eq!(report.panel, None);
        assert_eq!(report.highlights, 0);
        assert_eq!(report.input, "");
    }

    #[test]
    fn refuses_when_search_is_disabled() {
        let temp = tempdir().unwrap();
        write_source(temp.path(), false);

        let err = run(temp.path(), &SearchSettings::default(), &args("api")).unwrap_err();
        assert!(err.to_string().contains("Search is disabled"));
    }
}
