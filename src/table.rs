//! CSV tables with a header row.

use crate::Error;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Ordered `(column, value)` pairs for one result.
///
/// Serializes as a JSON object whose keys keep column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row(pub Vec<(String, String)>);

impl Row {
    /// Value of `column`, if present.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    /// `(column, value)` pairs in output order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0.iter().map(|(c, v)| (c.as_str(), v.as_str()))
    }

    /// Number of projected columns.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (column, value) in &self.0 {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// An in-memory CSV table.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<csv::StringRecord>,
}

impl Table {
    /// Load a table from a CSV file. A missing file is [`Error::TableNotFound`].
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Err(Error::TableNotFound {
                path: path.to_path_buf(),
            });
        }
        Self::from_reader(File::open(path)?)
    }

    /// Parse CSV from any reader. Rows may be shorter or longer than the header.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = rdr.headers()?.iter().map(str::to_owned).collect();
        let rows = rdr.records().collect::<Result<Vec<_>, _>>()?;
        Ok(Self { headers, rows })
    }

    /// Header row, in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows (the header is not counted).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Cell at `(row, column)`; `None` if the column is unknown or the row is short.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Warn about configured columns the header does not have.
    pub fn check_columns(&self, columns: &[String]) {
        for column in columns {
            if self.column_index(column).is_none() {
                tracing::warn!(%column, "column missing from table header");
            }
        }
    }

    /// Searchable text for every row: the `search_cols` cells joined by single spaces.
    ///
    /// Missing cells contribute an empty string.
    pub fn documents(&self, search_cols: &[String]) -> Vec<String> {
        (0..self.rows.len())
            .map(|row| {
                search_cols
                    .iter()
                    .map(|col| self.cell(row, col).unwrap_or(""))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    /// The `output_cols` of `row` that exist in the header, in `output_cols` order.
    pub fn project(&self, row: usize, output_cols: &[String]) -> Row {
        Row(output_cols
            .iter()
            .filter(|col| self.column_index(col).is_some())
            .map(|col| {
                let value = self.cell(row, col).unwrap_or("");
                (col.clone(), value.to_string())
            })
            .collect())
    }
}
