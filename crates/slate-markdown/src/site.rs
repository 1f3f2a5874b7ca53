//! Site loading: index, includes, and page assembly.

use std::fs;
use std::path::{Path, PathBuf};

use slate_search::session::{CONTENT_CLASS, INPUT_ID, RESULTS_CLASS};
use slate_search::{Element, Node};

use crate::config::{load_config, ConfigError, SiteConfig};
use crate::render::{render_html, render_markdown};

/// File name of the site index inside the source directory.
pub const INDEX_FILE: &str = "index.yml";

/// A loaded documentation site: its index and the rendered page.
#[derive(Debug, Clone)]
pub struct Site {
    /// Parsed site index
    pub config: SiteConfig,

    /// Source directory
    pub source_dir: PathBuf,

    /// Rendered page tree
    pub page: Element,
}

/// Errors that can occur when loading a site.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("Source directory not found: {0}")]
    SourceNotFound(String),

    #[error("Site index error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read include {name} ({path}): {message}")]
    Include {
        name: String,
        path: String,
        message: String,
    },
}

impl Site {
    /// Load `index.yml` and every listed include from a source directory.
    pub fn load(source_dir: &Path) -> Result<Self, SiteError> {
        if !source_dir.is_dir() {
            return Err(SiteError::SourceNotFound(source_dir.display().to_string()));
        }

        let config = load_config(&source_dir.join(INDEX_FILE))?;

        let mut includes = Vec::with_capacity(config.includes.len());
        for name in &config.includes {
            let path = include_path(source_dir, name);
            let markdown = fs::read_to_string(&path).map_err(|e| SiteError::Include {
                name: name.clone(),
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            tracing::debug!("Rendering include {}", path.display());
            includes.push(markdown);
        }

        tracing::info!(
            "Loaded {} includes from {}",
            includes.len(),
            source_dir.display()
        );

        Ok(Self::from_markdown(config, source_dir.to_path_buf(), &includes))
    }

    /// Build a site from already-read include sources, in order.
    pub fn from_markdown(config: SiteConfig, source_dir: PathBuf, includes: &[String]) -> Self {
        let content = includes
            .iter()
            .flat_map(|markdown| render_markdown(markdown))
            .collect();
        let page = assemble_page(&config, content);

        Self {
            config,
            source_dir,
            page,
        }
    }

    /// The content region of the page.
    pub fn content(&self) -> Option<&Element> {
        self.page.find_by_class(CONTENT_CLASS)
    }
}

/// Path of an include: `<source>/includes/<name>.md`.
pub fn include_path(source_dir: &Path, name: &str) -> PathBuf {
    source_dir.join("includes").join(format!("{}.md", name))
}

/// Assemble the page layout around rendered content.
///
/// The search input and results panel are only present when search is
/// enabled in the site index. Footer snippets are listed after them.
pub fn assemble_page(config: &SiteConfig, content: Vec<Node>) -> Element {
    let mut toc = Element::new("div").with_class("toc-wrapper").with_child(
        Element::new("div")
            .with_class("site-title")
            .with_text(config.title.clone()),
    );

    if config.search {
        toc = toc.with_child(
            Element::new("div")
                .with_class("search")
                .with_child(
                    Element::new("input")
                        .with_id(INPUT_ID)
                        .with_class("search")
                        .with_attr("type", "text")
                        .with_attr("placeholder", "Search"),
                ),
        );
        toc = toc.with_child(Element::new("ul").with_class(RESULTS_CLASS));
    }

    if !config.toc_footers.is_empty() {
        let mut footer = Element::new("ul").with_class("toc-footer");
        for snippet in &config.toc_footers {
            let mut item = Element::new("li");
            item.children = render_html(snippet);
            footer = footer.with_child(item);
        }
        toc = toc.with_child(footer);
    }

    let mut content_el = Element::new("div").with_class(CONTENT_CLASS);
    content_el.children = content;

    Element::new("body")
        .with_child(toc)
        .with_child(
            Element::new("div")
                .with_class("page-wrapper")
                .with_child(content_el),
        )
}
