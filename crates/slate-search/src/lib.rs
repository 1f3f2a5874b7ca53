//! Client-side section search for single-page API docs.
//!
//! Scans a rendered page for `h1`/`h2` sections, indexes them with field
//! boosts, and answers per-keystroke queries by listing matching sections and
//! highlighting the query text in the page.

pub mod controller;
pub mod dom;
pub mod highlight;
pub mod index;
pub mod pipeline;
pub mod scan;
pub mod session;

pub use controller::{KeyEvent, PageCommand, PanelState, SearchController, Transition};
pub use dom::{Element, Node};
pub use highlight::HighlightOptions;
pub use index::{FieldBoosts, IndexBuilder, QueryResult, SearchIndex, MIN_SCORE};
pub use pipeline::Pipeline;
pub use scan::{scan_sections, Boundary, Document, ScanOptions, ScanReport, SkipReason};
pub use session::SearchSession;
