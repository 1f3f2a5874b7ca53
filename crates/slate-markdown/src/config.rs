//! Site index (`index.yml`) loading and parsing.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Parsed site index.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SiteConfig {
    /// Page title
    #[serde(default = "default_title")]
    pub title: String,

    /// Code sample languages shown as tabs
    #[serde(default)]
    pub language_tabs: Vec<LanguageTab>,

    /// HTML snippets listed under the table of contents
    #[serde(default)]
    pub toc_footers: Vec<String>,

    /// Include names, rendered in order from `includes/<name>.md`
    #[serde(default)]
    pub includes: Vec<String>,

    /// Whether the page gets a search box
    #[serde(default)]
    pub search: bool,

    /// Code highlighting theme name
    #[serde(default)]
    pub highlight_theme: Option<String>,
}

fn default_title() -> String {
    "API Reference".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            language_tabs: Vec::new(),
            toc_footers: Vec::new(),
            includes: Vec::new(),
            search: false,
            highlight_theme: None,
        }
    }
}

impl SiteConfig {
    /// Language keys of the configured tabs, in order.
    pub fn langs(&self) -> Vec<&str> {
        self.language_tabs
            .iter()
            .filter_map(LanguageTab::key)
            .collect()
    }
}

/// A language tab: either `shell` or `{ shell: cURL }`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LanguageTab {
    Key(String),
    Labeled(BTreeMap<String, String>),
}

impl LanguageTab {
    /// Language key used for code block matching.
    pub fn key(&self) -> Option<&str> {
        match self {
            LanguageTab::Key(key) => Some(key),
            LanguageTab::Labeled(map) => map.keys().next().map(String::as_str),
        }
    }

    /// Display label (the key when no label is given).
    pub fn label(&self) -> Option<&str> {
        match self {
            LanguageTab::Key(key) => Some(key),
            LanguageTab::Labeled(map) => map.values().next().map(String::as_str),
        }
    }
}

/// Parse a site index from YAML.
pub fn parse_config(source: &str) -> Result<SiteConfig, ConfigError> {
    if source.trim().is_empty() {
        return Ok(SiteConfig::default());
    }
    serde_yaml::from_str(source).map_err(|e| ConfigError::InvalidYaml(e.to_string()))
}

/// Read and parse a site index file.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let source = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_config(&source)
}

/// Errors that can occur when loading the site index.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Invalid YAML in site index: {0}")]
    InvalidYaml(String),
}
