//! List the sections the search index is built from.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;
use slate_markdown::Site;
use slate_search::ScanReport;

use super::{load_sections, SearchSettings};

/// Longest body preview printed per section.
const PREVIEW_CHARS: usize = 60;

/// Run the sections command.
pub fn run(source: &Path, settings: &SearchSettings, json: bool) -> Result<()> {
    let (site, report) = load_sections(source, settings)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report.documents)?);
        return Ok(());
    }

    print!("{}", listing(&site, &report));

    tracing::info!(
        "{} sections, {} skipped",
        report.documents.len(),
        report.skipped.len()
    );

    Ok(())
}

/// Human-readable listing of scanned sections and skipped headings.
pub fn listing(site: &Site, report: &ScanReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", site.config.title);
    if !site.config.language_tabs.is_empty() {
        let _ = writeln!(out, "Languages: {}", site.config.langs().join(", "));
    }
    out.push('\n');

    for doc in &report.documents {
        let _ = writeln!(out, "#{:<30} {}", doc.id, doc.title);
        let _ = writeln!(out, "    {}", preview(&doc.body));
    }

    for skipped in &report.skipped {
        let _ = writeln!(out, "skipped: {}", skipped);
    }

    out
}

fn preview(body: &str) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", cut.trim_end())
}
