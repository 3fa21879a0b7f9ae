//! Okapi BM25 over an in-memory, fit-once corpus.
//!
//! - `Corpus::fit` tokenizes every document once and freezes the corpus statistics
//!   (document lengths, document frequencies, IDF, per-document term frequencies)
//! - `k1` and `b` are validated and bound at fit time; every query against a corpus uses
//!   the same parameters
//! - scoring uses the "+1" IDF variant, which is never negative
//! - ranking is deterministic (score desc, then document index asc)
//!
//! A fitted `Corpus` is never mutated, so it can be shared across threads and queried
//! concurrently without synchronization.
//!
//! References:
//! - Robertson & Walker (1994). "Some simple effective approximations to the 2-Poisson model..."
//! - Robertson & Zaragoza (2009). "The Probabilistic Relevance Framework: BM25 and Beyond."

use crate::tokenize::tokenize;
use crate::Error;
use std::collections::HashMap;

/// BM25 parameters.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    /// Term-frequency saturation parameter.
    pub k1: f64,
    /// Length normalization parameter.
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

impl Bm25Params {
    /// Create validated parameters.
    pub fn new(k1: f64, b: f64) -> Result<Self, Error> {
        let params = Self { k1, b };
        params.validate()?;
        Ok(params)
    }

    /// Check that `k1 >= 0` and `0 <= b <= 1`, both finite.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(Error::InvalidParams("k1 must be finite and >= 0"));
        }
        if !self.b.is_finite() || !(0.0..=1.0).contains(&self.b) {
            return Err(Error::InvalidParams("b must be within [0, 1]"));
        }
        Ok(())
    }
}

/// BM25 IDF with the "+1" inside the log: `ln((N - df + 0.5) / (df + 0.5) + 1)`.
///
/// Non-negative for every `0 <= df <= N`.
pub fn idf_plus1(num_docs: f64, doc_frequency: f64) -> f64 {
    ((num_docs - doc_frequency + 0.5) / (doc_frequency + 0.5) + 1.0).ln()
}

/// Saturated, length-normalized term-frequency weight.
///
/// When `avg_doc_len` is 0 (every document is empty) the length ratio is treated as 1.
pub fn tf_weight(tf: f64, doc_len: f64, avg_doc_len: f64, k1: f64, b: f64) -> f64 {
    let norm = if avg_doc_len > 0.0 {
        1.0 - b + b * doc_len / avg_doc_len
    } else {
        1.0
    };
    tf * (k1 + 1.0) / (tf + k1 * norm)
}

#[derive(Debug, Clone, Default)]
struct DocStats {
    len: u32,
    // Built once at fit time; never touched afterwards.
    term_freqs: HashMap<String, u32>,
}

/// Fitted corpus statistics.
///
/// Documents are identified by their 0-based position in the input passed to [`Corpus::fit`].
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    docs: Vec<DocStats>,
    doc_frequency: HashMap<String, u32>,
    idf: HashMap<String, f64>,
    avg_doc_len: f64,
    params: Bm25Params,
}

impl Corpus {
    /// Tokenize and index `documents` with the default parameters, preserving input order.
    pub fn fit<I>(documents: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self::build(documents, Bm25Params::default())
    }

    /// Like [`Corpus::fit`], but scores with `params`.
    ///
    /// Returns [`Error::InvalidParams`] if `params` fails [`Bm25Params::validate`].
    pub fn fit_with<I>(documents: I, params: Bm25Params) -> Result<Self, Error>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        params.validate()?;
        Ok(Self::build(documents, params))
    }

    fn build<I>(documents: I, params: Bm25Params) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut docs = Vec::new();
        let mut doc_frequency: HashMap<String, u32> = HashMap::new();
        let mut total_len: u64 = 0;

        for text in documents {
            let terms = tokenize(text.as_ref());
            let mut term_freqs: HashMap<String, u32> = HashMap::new();
            for term in &terms {
                *term_freqs.entry(term.clone()).or_insert(0) += 1;
            }
            // Each document counts once per distinct term.
            for term in term_freqs.keys() {
                *doc_frequency.entry(term.clone()).or_insert(0) += 1;
            }
            total_len += terms.len() as u64;
            docs.push(DocStats {
                len: terms.len() as u32,
                term_freqs,
            });
        }

        if docs.is_empty() {
            return Self {
                params,
                ..Self::default()
            };
        }

        let n = docs.len() as f64;
        let avg_doc_len = total_len as f64 / n;
        let idf = doc_frequency
            .iter()
            .map(|(term, &df)| (term.clone(), idf_plus1(n, df as f64)))
            .collect();

        tracing::debug!(
            num_docs = docs.len(),
            num_terms = doc_frequency.len(),
            avg_doc_len,
            k1 = params.k1,
            b = params.b,
            "fitted bm25 corpus"
        );

        Self {
            docs,
            doc_frequency,
            idf,
            avg_doc_len,
            params,
        }
    }

    /// Parameters every query against this corpus is scored with.
    pub fn params(&self) -> Bm25Params {
        self.params
    }

    /// Number of documents.
    pub fn num_docs(&self) -> usize {
        self.docs.len()
    }

    /// Whether the corpus has no documents.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Document length (in terms). Returns 0 for unknown indices.
    pub fn document_length(&self, doc: usize) -> u32 {
        self.docs.get(doc).map_or(0, |d| d.len)
    }

    /// Average document length (in terms); 0 for an empty corpus.
    pub fn avg_doc_len(&self) -> f64 {
        self.avg_doc_len
    }

    /// Number of documents containing `term` at least once.
    pub fn doc_frequency(&self, term: &str) -> u32 {
        self.doc_frequency.get(term).copied().unwrap_or(0)
    }

    /// IDF of `term`, or `None` if the term never occurred in the corpus.
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.idf.get(term).copied()
    }

    /// Occurrences of `term` in document `doc` (0 if doc missing / term absent).
    pub fn term_frequency(&self, doc: usize, term: &str) -> u32 {
        self.docs
            .get(doc)
            .and_then(|d| d.term_freqs.get(term))
            .copied()
            .unwrap_or(0)
    }

    /// Iterate all distinct terms seen at fit time (unordered).
    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ {
        self.doc_frequency.keys().map(String::as_str)
    }

    /// Rank every document against a raw query string.
    ///
    /// Returns all `num_docs()` documents as `(index, score)`, sorted by score desc and then
    /// index asc. An empty corpus yields an empty ranking; a query with no known terms yields
    /// every document at 0 in original order.
    pub fn score(&self, query: &str) -> Vec<(usize, f64)> {
        if self.is_empty() {
            return Vec::new();
        }
        self.score_terms(&tokenize(query))
    }

    /// Rank every document against pre-tokenized query terms.
    ///
    /// Terms are scored with multiplicity; terms unseen at fit time contribute nothing.
    pub fn score_terms(&self, query_terms: &[String]) -> Vec<(usize, f64)> {
        let query_idfs: Vec<(&str, f64)> = query_terms
            .iter()
            .filter_map(|t| self.idf(t).map(|idf| (t.as_str(), idf)))
            .collect();

        let mut ranked: Vec<(usize, f64)> = (0..self.docs.len())
            .map(|doc| (doc, self.score_doc(doc, &query_idfs)))
            .collect();

        // Deterministic: score desc, then doc index asc.
        ranked.sort_unstable_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    /// BM25 score of a single document (caller provides tokenized query terms).
    pub fn score_document(&self, doc: usize, query_terms: &[String]) -> f64 {
        let query_idfs: Vec<(&str, f64)> = query_terms
            .iter()
            .filter_map(|t| self.idf(t).map(|idf| (t.as_str(), idf)))
            .collect();
        self.score_doc(doc, &query_idfs)
    }

    fn score_doc(&self, doc: usize, query_idfs: &[(&str, f64)]) -> f64 {
        let Some(stats) = self.docs.get(doc) else {
            return 0.0;
        };
        let doc_len = stats.len as f64;
        let Bm25Params { k1, b } = self.params;
        let mut score = 0.0;
        for &(term, idf) in query_idfs {
            let tf = stats.term_freqs.get(term).copied().unwrap_or(0) as f64;
            if tf == 0.0 {
                continue;
            }
            score += idf * tf_weight(tf, doc_len, self.avg_doc_len, k1, b);
        }
        score
    }

    /// Top-k documents with a positive score.
    ///
    /// This is the caller-level cut over [`Corpus::score`]: same order, zero scores dropped,
    /// at most `k` entries.
    pub fn retrieve(&self, query: &str, k: usize) -> Vec<(usize, f64)> {
        self.score(query)
            .into_iter()
            .take(k)
            .filter(|&(_, score)| score > 0.0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_corpus() -> Corpus {
        Corpus::fit([
            "oauth2 authorization code flow",
            "jwt bearer token validation",
            "session cookie storage",
        ])
    }

    #[test]
    fn jwt_query_ranks_jwt_document_first() {
        let corpus = auth_corpus();
        let ranked = corpus.score("jwt token");
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].0, 1);
        assert!(ranked[0].1 > 0.0);
        assert_eq!(ranked[1], (0, 0.0));
        assert_eq!(ranked[2], (2, 0.0));
    }

    #[test]
    fn fit_statistics() {
        let corpus = Corpus::fit(["token token refresh", "token bearer", "an"]);
        assert_eq!(corpus.num_docs(), 3);
        assert_eq!(corpus.document_length(0), 3);
        assert_eq!(corpus.document_length(1), 2);
        assert_eq!(corpus.document_length(2), 0);
        assert_eq!(corpus.document_length(99), 0);
        assert!((corpus.avg_doc_len() - 5.0 / 3.0).abs() < 1e-12);
        // Repeats inside a document count once.
        assert_eq!(corpus.doc_frequency("token"), 2);
        assert_eq!(corpus.doc_frequency("refresh"), 1);
        assert_eq!(corpus.doc_frequency("missing"), 0);
        assert_eq!(corpus.term_frequency(0, "token"), 2);
        assert_eq!(corpus.terms().count(), 3);
    }

    #[test]
    fn idf_matches_formula_and_is_absent_for_unseen_terms() {
        let corpus = Corpus::fit(["token token refresh", "token bearer"]);
        let expected = ((2.0 - 2.0 + 0.5) / (2.0 + 0.5) + 1.0_f64).ln();
        assert_eq!(corpus.idf("token"), Some(expected));
        assert!(corpus.idf("token").unwrap() > 0.0);
        assert_eq!(corpus.idf("unseen"), None);
    }

    #[test]
    fn empty_corpus_yields_empty_ranking() {
        let corpus = Corpus::fit(Vec::<String>::new());
        assert!(corpus.is_empty());
        assert_eq!(corpus.avg_doc_len(), 0.0);
        assert!(corpus.score("jwt").is_empty());
        assert!(corpus.retrieve("jwt", 3).is_empty());
    }

    #[test]
    fn empty_query_keeps_original_order_at_zero() {
        let corpus = auth_corpus();
        let ranked = corpus.score("a !! of");
        assert_eq!(ranked, vec![(0, 0.0), (1, 0.0), (2, 0.0)]);
        let ranked = corpus.score("kerberos");
        assert_eq!(ranked, vec![(0, 0.0), (1, 0.0), (2, 0.0)]);
    }

    #[test]
    fn all_empty_documents_do_not_divide_by_zero() {
        let corpus = Corpus::fit(["", "a b", "!!"]);
        assert_eq!(corpus.avg_doc_len(), 0.0);
        let ranked = corpus.score("anything");
        assert_eq!(ranked, vec![(0, 0.0), (1, 0.0), (2, 0.0)]);
        assert!(tf_weight(1.0, 0.0, 0.0, 1.5, 0.75).is_finite());
        // Length ratio treated as 1: tf * (k1 + 1) / (tf + k1).
        assert!((tf_weight(1.0, 0.0, 0.0, 1.5, 0.75) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn repeated_query_terms_count_twice() {
        let corpus = auth_corpus();
        let once = corpus.score("jwt")[0].1;
        let twice = corpus.score("jwt jwt")[0].1;
        assert!((twice - 2.0 * once).abs() < 1e-12);
    }

    #[test]
    fn term_frequency_saturates() {
        // Same length, tf of "token" = 1..=4.
        let corpus = Corpus::fit([
            "token fill fill fill",
            "token token fill fill",
            "token token token fill",
            "token token token token",
            "other other other other",
        ]);
        let terms = vec!["token".to_string()];
        let scores: Vec<f64> = (0..4).map(|d| corpus.score_document(d, &terms)).collect();
        for w in scores.windows(2) {
            assert!(w[1] >= w[0]);
        }
        let gains: Vec<f64> = scores.windows(2).map(|w| w[1] - w[0]).collect();
        for g in gains.windows(2) {
            assert!(g[1] < g[0], "marginal gain should shrink: {gains:?}");
        }
    }

    #[test]
    fn shorter_document_wins_on_equal_tf() {
        let corpus = Corpus::fit([
            "token bearer header padding padding padding",
            "token bearer",
            "unrelated words here",
        ]);
        let ranked = corpus.score("token");
        assert_eq!(ranked[0].0, 1);
        assert_eq!(ranked[1].0, 0);
        assert!(ranked[0].1 >= ranked[1].1);
    }

    #[test]
    fn retrieve_tie_breaks_by_doc_index() {
        let corpus = Corpus::fit(["token alpha", "token alpha", "beta gamma"]);
        let hits = corpus.retrieve("token", 10);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, 0);
        assert_eq!(hits[1].0, 1);
        assert_eq!(hits[0].1, hits[1].1);
    }

    #[test]
    fn retrieve_truncates_to_k() {
        let corpus = Corpus::fit(["token one", "token two", "token three"]);
        assert_eq!(corpus.retrieve("token", 2).len(), 2);
        assert!(corpus.retrieve("token", 0).is_empty());
    }

    #[test]
    fn params_validation() {
        assert!(Bm25Params::new(1.2, 0.75).is_ok());
        assert!(matches!(
            Bm25Params::new(-1.0, 0.75),
            Err(Error::InvalidParams(_))
        ));
        assert!(Bm25Params::new(1.2, 1.5).is_err());
        assert!(Bm25Params::new(f64::NAN, 0.5).is_err());
    }

    #[test]
    fn fit_with_rejects_invalid_params() {
        let docs = ["jwt bearer token", "session cookie storage"];
        assert!(matches!(
            Corpus::fit_with(docs, Bm25Params { k1: -1.0, b: 0.75 }),
            Err(Error::InvalidParams(_))
        ));
        assert!(Corpus::fit_with(docs, Bm25Params { k1: 1.5, b: 2.0 }).is_err());
        assert!(Corpus::fit_with(docs, Bm25Params { k1: f64::INFINITY, b: 0.5 }).is_err());
        let empty: [&str; 0] = [];
        assert!(Corpus::fit_with(empty, Bm25Params { k1: -1.0, b: 0.75 }).is_err());
    }

    #[test]
    fn fit_binds_params_for_every_query() {
        let docs = ["jwt bearer token refresh", "session cookie"];
        assert_eq!(Corpus::fit(docs).params(), Bm25Params::default());

        let p = Bm25Params::new(0.9, 0.4).unwrap();
        let corpus = Corpus::fit_with(docs, p).unwrap();
        assert_eq!(corpus.params(), p);
        let ranked = corpus.score("jwt");
        let doc_len = corpus.document_length(0) as f64;
        let expected = corpus.idf("jwt").unwrap()
            * tf_weight(1.0, doc_len, corpus.avg_doc_len(), 0.9, 0.4);
        assert!((ranked[0].1 - expected).abs() < 1e-12);
        assert_ne!(ranked[0].1, Corpus::fit(docs).score("jwt")[0].1);
        assert_eq!(ranked, corpus.score("jwt"));
    }

    #[test]
    fn b_zero_disables_length_normalization() {
        let corpus = Corpus::fit_with(
            ["token padding padding padding", "token"],
            Bm25Params { k1: 1.5, b: 0.0 },
        )
        .unwrap();
        let ranked = corpus.score("token");
        assert_eq!(ranked[0].1, ranked[1].1);
        assert_eq!(ranked[0].0, 0);
    }

    #[test]
    fn corpus_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Corpus>();

        let corpus = std::sync::Arc::new(auth_corpus());
        let expected = corpus.score("jwt token");
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let c = std::sync::Arc::clone(&corpus);
                std::thread::spawn(move || c.score("jwt token"))
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    }
}
