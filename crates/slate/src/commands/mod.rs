//! CLI commands and shared tool configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use slate_markdown::Site;
use slate_search::{scan_sections, Boundary, FieldBoosts, ScanOptions, ScanReport, MIN_SCORE};

pub mod search;
pub mod sections;

/// Configuration file structure (slate.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub search: SearchSettings,
}

#[derive(Debug, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_dir")]
    pub dir: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            dir: default_source_dir(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    #[serde(default = "default_title_boost")]
    pub title_boost: f64,
    #[serde(default = "default_body_boost")]
    pub body_boost: f64,
    #[serde(default)]
    pub boundary: Boundary,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            title_boost: default_title_boost(),
            body_boost: default_body_boost(),
            boundary: Boundary::default(),
        }
    }
}

impl SearchSettings {
    pub fn boosts(&self) -> FieldBoosts {
        FieldBoosts {
            title: self.title_boost,
            body: self.body_boost,
        }
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            boundary: self.boundary,
            ..Default::default()
        }
    }
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("source")
}
fn default_min_score() -> f64 {
    MIN_SCORE
}
fn default_title_boost() -> f64 {
    FieldBoosts::default().title
}
fn default_body_boost() -> f64 {
    FieldBoosts::default().body
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    Ok(ConfigFile::default())
}

/// Load the site and scan its content region for sections.
pub fn load_sections(source: &Path, settings: &SearchSettings) -> Result<(Site, ScanReport)> {
    let site = Site::load(source)
        .with_context(|| format!("Failed to load site from {}", source.display()))?;

    let report = match site.content() {
        Some(content) => scan_sections(content, &settings.scan_options()),
        None => ScanReport::default(),
    };

    Ok((site, report))
}
