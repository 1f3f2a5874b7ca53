//! Inverted index with field boosts and cosine-similarity ranking.
//!
//! Built in two steps: an [`IndexBuilder`] collects documents, then
//! [`IndexBuilder::build`] freezes them into a read-only [`SearchIndex`] with
//! precomputed document vectors. Queries only ever borrow the index.
//!
//! # Scoring
//!
//! - Term weight in a document: `sum(count / field_len * boost)` over fields
//! - `idf(t) = 1 + ln(N / (df(t) + 1))`
//! - Query tokens expand to every vocabulary term they prefix; expanded terms
//!   are damped by `1 / ln(max(3, extra_len))`
//! - Documents must match every query token (after expansion)
//! - Score is the cosine similarity of query and document `tf * idf` vectors

use std::collections::{BTreeMap, HashSet};
use std::ops::Bound;

use serde::Serialize;

use crate::pipeline::Pipeline;
use crate::scan::Document;

/// Score at or below which results are treated as noise.
pub const MIN_SCORE: f64 = 0.0001;

/// Per-field boost weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldBoosts {
    pub title: f64,
    pub body: f64,
}

impl Default for FieldBoosts {
    fn default() -> Self {
        Self {
            title: 10.0,
            body: 1.0,
        }
    }
}

impl FieldBoosts {
    fn total(&self) -> f64 {
        self.title + self.body
    }
}

/// A scored match for a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    /// Id of the matched document
    #[serde(rename = "ref")]
    pub reference: String,
    /// Relevance score in `(0, 1]`
    pub score: f64,
}

/// Index position of a document (insertion order).
type DocIdx = usize;

/// Accumulates documents before the index is frozen.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    pipeline: Pipeline,
    boosts: FieldBoosts,
    refs: Vec<String>,
    /// term -> (doc, tf) in insertion order
    postings: BTreeMap<String, Vec<(DocIdx, f64)>>,
}

impl IndexBuilder {
    /// Create a builder with the default pipeline and boosts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: use custom boosts.
    pub fn boosts(mut self, boosts: FieldBoosts) -> Self {
        self.boosts = boosts;
        self
    }

    /// Builder: use a custom normalization pipeline.
    ///
    /// The same pipeline is used for queries against the built index.
    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Add a document.
    pub fn add(&mut self, doc: &Document) {
        let doc_idx = self.refs.len();
        self.refs.push(doc.id.clone());

        let title = self.pipeline.run(&doc.title);
        let body = self.pipeline.run(&doc.body);

        let mut weights: BTreeMap<&str, f64> = BTreeMap::new();
        for (tokens, boost) in [(&title, self.boosts.title), (&body, self.boosts.body)] {
            if tokens.is_empty() {
                continue;
            }
            let len = tokens.len() as f64;
            for token in tokens {
                *weights.entry(token.as_str()).or_default() += boost / len;
            }
        }

        for (term, tf) in weights {
            self.postings
                .entry(term.to_string())
                .or_default()
                .push((doc_idx, tf));
        }
    }

    /// Add every document from an iterator.
    pub fn extend<'a>(&mut self, docs: impl IntoIterator<Item = &'a Document>) {
        for doc in docs {
            self.add(doc);
        }
    }

    /// Freeze into a read-only index.
    pub fn build(self) -> SearchIndex {
        let n_docs = self.refs.len();

        let terms: BTreeMap<String, Term> = self
            .postings
            .into_iter()
            .map(|(term, postings)| {
                let idf = 1.0 + (n_docs as f64 / (postings.len() as f64 + 1.0)).ln();
                (term, Term { idf, postings })
            })
            .collect();

        let mut vectors: Vec<BTreeMap<String, f64>> = vec![BTreeMap::new(); n_docs];
        for (term, entry) in &terms {
            for &(doc, tf) in &entry.postings {
                vectors[doc].insert(term.clone(), tf * entry.idf);
            }
        }

        let documents = self
            .refs
            .into_iter()
            .zip(vectors)
            .map(|(reference, vector)| {
                let magnitude = vector.values().map(|w| w * w).sum::<f64>().sqrt();
                DocVector {
                    reference,
                    vector,
                    magnitude,
                }
            })
            .collect();

        tracing::debug!("Built search index: {} documents, {} terms", n_docs, terms.len());

        SearchIndex {
            pipeline: self.pipeline,
            boosts: self.boosts,
            terms,
            documents,
        }
    }
}

#[derive(Debug)]
struct Term {
    idf: f64,
    postings: Vec<(DocIdx, f64)>,
}

#[derive(Debug)]
struct DocVector {
    reference: String,
    vector: BTreeMap<String, f64>,
    magnitude: f64,
}

/// Read-only inverted index over section documents.
#[derive(Debug)]
pub struct SearchIndex {
    pipeline: Pipeline,
    boosts: FieldBoosts,
    terms: BTreeMap<String, Term>,
    documents: Vec<DocVector>,
}

impl SearchIndex {
    /// Build an index from documents with default settings.
    pub fn from_documents<'a>(docs: impl IntoIterator<Item = &'a Document>) -> Self {
        let mut builder = IndexBuilder::new();
        builder.extend(docs);
        builder.build()
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Ids of all indexed documents in insertion order.
    pub fn refs(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|d| d.reference.as_str())
    }

    /// Normalize text with the index's pipeline.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        self.pipeline.run(text)
    }

    /// Vocabulary terms that start with `prefix`.
    fn expand<'s>(&'s self, prefix: &'s str) -> impl Iterator<Item = (&'s String, &'s Term)> {
        self.terms
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(term, _)| term.starts_with(prefix))
    }

    /// Run a query, returning matches by descending score.
    ///
    /// Ties keep insertion order. No threshold is applied here.
    pub fn search(&self, query: &str) -> Vec<QueryResult> {
        let tokens = self.normalize(query);
        if tokens.is_empty() || self.documents.is_empty() {
            return Vec::new();
        }

        if !tokens.iter().any(|t| self.expand(t).next().is_some()) {
            return Vec::new();
        }

        let query_tf = 2.0 * self.boosts.total() / tokens.len() as f64;
        let mut query_vector: BTreeMap<&str, f64> = BTreeMap::new();
        let mut candidates: Option<HashSet<DocIdx>> = None;

        for token in &tokens {
            let mut matched = HashSet::new();

            for (term, entry) in self.expand(token) {
                let similarity = if term == token {
                    1.0
                } else {
                    let extra = term.chars().count() - token.chars().count();
                    1.0 / (extra.max(3) as f64).ln()
                };

                *query_vector.entry(term.as_str()).or_default() +=
                    query_tf * entry.idf * similarity;
                matched.extend(entry.postings.iter().map(|&(doc, _)| doc));
            }

            candidates = Some(match candidates {
                None => matched,
                Some(prev) => prev.intersection(&matched).copied().collect(),
            });
        }

        let query_magnitude = query_vector.values().map(|w| w * w).sum::<f64>().sqrt();

        let mut hits: Vec<DocIdx> = candidates.unwrap_or_default().into_iter().collect();
        hits.sort_unstable();

        let mut results: Vec<QueryResult> = hits
            .into_iter()
            .map(|doc| {
                let doc = &self.documents[doc];
                QueryResult {
                    reference: doc.reference.clone(),
                    score: cosine(&query_vector, query_magnitude, doc),
                }
            })
            .collect();

        // Stable sort keeps insertion order for equal scores
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results
    }
}

fn cosine(query: &BTreeMap<&str, f64>, query_magnitude: f64, doc: &DocVector) -> f64 {
    if query_magnitude == 0.0 || doc.magnitude == 0.0 {
        return 0.0;
    }
    let dot: f64 = query
        .iter()
        .filter_map(|(term, w)| doc.vector.get(*term).map(|d| w * d))
        .sum();
    dot / (query_magnitude * doc.magnitude)
}
