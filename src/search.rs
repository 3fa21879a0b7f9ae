//! Table lookup: resolve a domain or stack, rank its rows with BM25, keep the best hits.

use crate::bm25::Corpus;
use crate::catalog::{CatalogConfig, Domain, Stack, TableSpec};
use crate::classify::classify;
use crate::table::{Row, Table};
use crate::Error;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One lookup's results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    /// Domain name, or `"stack"` for stack lookups.
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    pub query: String,
    /// Data file, relative to the data directory.
    pub file: String,
    pub count: usize,
    pub results: Vec<Row>,
}

/// Runs lookups against CSV tables under a data directory.
#[derive(Debug, Clone)]
pub struct Searcher {
    data_dir: PathBuf,
    config: CatalogConfig,
}

impl Searcher {
    /// Searcher over the tables in `data_dir`, laid out as `config` describes.
    pub fn new(data_dir: impl Into<PathBuf>, config: CatalogConfig) -> Self {
        Self {
            data_dir: data_dir.into(),
            config,
        }
    }

    /// Directory the table paths are resolved against.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Catalog this searcher was built with.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Search one domain, auto-detecting it from the query when `domain` is `None`.
    ///
    /// `max_results` defaults to the catalog's `max_results`.
    pub fn search(
        &self,
        query: &str,
        domain: Option<Domain>,
        max_results: Option<usize>,
    ) -> Result<SearchResponse, Error> {
        let domain = domain.unwrap_or_else(|| classify(query));
        let spec = self.config.domain_table(domain);
        let results = self.search_table(&spec, query, max_results)?;
        Ok(SearchResponse {
            domain: domain.to_string(),
            stack: None,
            query: query.to_string(),
            file: spec.file.display().to_string(),
            count: results.len(),
            results,
        })
    }

    /// Search a stack's guideline table.
    pub fn search_stack(
        &self,
        query: &str,
        stack: Stack,
        max_results: Option<usize>,
    ) -> Result<SearchResponse, Error> {
        let spec = self
            .config
            .stack_table(stack)
            .ok_or_else(|| Error::UnknownName(format!("stack not configured: {stack}")))?;
        let results = self.search_table(&spec, query, max_results)?;
        Ok(SearchResponse {
            domain: "stack".to_string(),
            stack: Some(stack.to_string()),
            query: query.to_string(),
            file: spec.file.display().to_string(),
            count: results.len(),
            results,
        })
    }

    fn search_table(
        &self,
        spec: &TableSpec,
        query: &str,
        max_results: Option<usize>,
    ) -> Result<Vec<Row>, Error> {
        let path = self.data_dir.join(&spec.file);
        let table = Table::from_path(&path)?;
        table.check_columns(&spec.columns.search_cols);

        let corpus = Corpus::fit_with(
            table.documents(&spec.columns.search_cols),
            self.config.params,
        )?;
        let k = max_results.unwrap_or(self.config.max_results);
        let hits = corpus.retrieve(query, k);

        tracing::debug!(
            file = %spec.file.display(),
            rows = table.len(),
            hits = hits.len(),
            "searched table"
        );

        Ok(hits
            .into_iter()
            .map(|(row, _score)| table.project(row, &spec.columns.output_cols))
            .collect())
    }
}
