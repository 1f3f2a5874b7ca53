//! Markdown include rendering for slate API docs.
//!
//! Reads the site index (`index.yml`), renders each listed include with
//! pulldown-cmark into the page tree, and assembles the page the search layer
//! runs against.

pub mod codeblock;
pub mod config;
pub mod html;
pub mod render;
pub mod site;

pub use config::{load_config, parse_config, ConfigError, LanguageTab, SiteConfig};
pub use render::{render_html, render_markdown, slugify};
pub use site::{Site, SiteError};
