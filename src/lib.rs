//! `authlex`: BM25 lookup over authentication/authorization reference tables.
//!
//! The crate has two layers:
//! - the **ranking engine** (`tokenize`, `bm25`): tokenization, corpus statistics and
//!   BM25 scoring over an in-memory list of documents;
//! - the **lookup layer** (`catalog`, `classify`, `table`, `search`, `render`): CSV tables,
//!   keyword-based domain detection and result rendering around the engine.
//!
//! Scope:
//! - In-memory, fit-once corpora (no persisted index)
//! - Deterministic ranking (score desc, tie-break by document index)
//! - Bag-of-terms queries
//!
//! Non-goals:
//! - Stemming / lemmatization, stop words
//! - Phrase, proximity or fuzzy queries
//! - Per-field weighting
//!
//! References:
//! - Robertson & Zaragoza (2009): BM25 and beyond

pub mod bm25;
pub mod catalog;
pub mod classify;
pub mod render;
pub mod search;
pub mod table;
pub mod tokenize;

pub use bm25::{Bm25Params, Corpus};
pub use catalog::{CatalogConfig, Columns, Domain, Stack, TableSpec};
pub use classify::classify;
pub use error::Error;
pub use search::{SearchResponse, Searcher};
pub use tokenize::tokenize;

mod error {
    use std::path::PathBuf;

    /// Errors for the lookup layer.
    ///
    /// The ranking engine itself never fails; these come from loading data and config.
    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        /// A configured data file does not exist.
        #[error("file not found: {}", path.display())]
        TableNotFound {
            /// Path that was looked up.
            path: PathBuf,
        },
        /// Reading a file failed.
        #[error(transparent)]
        Io(#[from] std::io::Error),
        /// A CSV table could not be parsed.
        #[error("csv: {0}")]
        Csv(#[from] csv::Error),
        /// A catalog config file could not be parsed.
        #[error("invalid config: {0}")]
        Config(#[from] toml::de::Error),
        /// A config file named a domain or stack that does not exist.
        #[error("{0}")]
        UnknownName(String),
        /// BM25 parameters were out of range.
        #[error("invalid bm25 parameters: {0}")]
        InvalidParams(&'static str),
    }
}
