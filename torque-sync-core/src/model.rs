//! Competition data model consumed by the publishers.
//!
//! The model is produced elsewhere (ETL steps that compute rows, titles and
//! tables of contents); this crate only reads it. The publishers need exactly
//! the collaborator surface exposed here: [`Competition::to_csv`],
//! [`Competition::key_column_name`], [`Competition::ordered_records`],
//! [`Competition::tocs`], [`Record::cell`] and [`Record::key`].

use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::PublishError;

/// Column the title adder step populates with each record's wiki page title.
pub const DEFAULT_TITLE_COLUMN: &str = "MediaWiki Title";

/// One row of the competition sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    key: String,
    cells: HashMap<String, String>,
}

impl Record {
    pub fn new(key: impl Into<String>, cells: HashMap<String, String>) -> Self {
        Self {
            key: key.into(),
            cells,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Value of `column`, or `None` when the record has no such cell.
    pub fn cell(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }
}

/// A named, templated grouping over the competition's records.
#[derive(Debug, Clone, PartialEq)]
pub struct Toc {
    pub name: String,
    /// Contents of the template file the wiki renders the TOC with.
    pub template: Vec<u8>,
    /// Grouped data handed to the template, serialized as JSON on upload.
    pub grouped_data: serde_json::Value,
    /// Raw TOCs bypass the wiki-side template wrapping.
    pub raw: bool,
}

/// A binary file tied to one record and the column that governs who may see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub key: String,
    pub column_name: String,
    pub file: String,
    pub path: PathBuf,
}

/// The full dataset published under one namespace.
#[derive(Debug, Clone)]
pub struct Competition {
    columns: Vec<String>,
    key_column: String,
    title_column: String,
    records: Vec<Record>,
    pub tocs: Vec<Toc>,
}

impl Competition {
    pub fn new(
        columns: Vec<String>,
        key_column: impl Into<String>,
        records: Vec<Record>,
    ) -> Self {
        Self {
            columns,
            key_column: key_column.into(),
            title_column: DEFAULT_TITLE_COLUMN.to_string(),
            records,
            tocs: Vec::new(),
        }
    }

    pub fn with_title_column(mut self, title_column: impl Into<String>) -> Self {
        self.title_column = title_column.into();
        self
    }

    pub fn with_tocs(mut self, tocs: Vec<Toc>) -> Self {
        self.tocs = tocs;
        self
    }

    /// Reads a competition from CSV. The header row declares the columns and
    /// `key_column` must be one of them.
    pub fn from_csv_reader<R: Read>(
        reader: R,
        key_column: &str,
        title_column: &str,
    ) -> Result<Self, PublishError> {
        let mut rdr = csv::Reader::from_reader(reader);
        let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let key_idx = columns
            .iter()
            .position(|c| c == key_column)
            .ok_or_else(|| {
                csv::Error::from(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("key column {key_column:?} not found in sheet header"),
                ))
            })?;

        let mut records = Vec::new();
        for row in rdr.records() {
            let row = row?;
            let key = row.get(key_idx).unwrap_or_default().to_string();
            let cells = columns
                .iter()
                .cloned()
                .zip(row.iter().map(str::to_string))
                .collect();
            records.push(Record::new(key, cells));
        }

        info!(
            records = records.len(),
            columns = columns.len(),
            key_column,
            "Loaded competition sheet"
        );

        Ok(Self::new(columns, key_column, records).with_title_column(title_column))
    }

    pub fn key_column_name(&self) -> &str {
        &self.key_column
    }

    pub fn title_column_name(&self) -> &str {
        &self.title_column
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn ordered_records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Page title of `record`, if the title adder has populated it.
    pub fn title_of<'a>(&self, record: &'a Record) -> Option<&'a str> {
        record.cell(&self.title_column)
    }

    /// Serializes every record, one row each, under the declared columns.
    /// Missing cells are written as empty fields.
    pub fn to_csv(&self) -> Result<Vec<u8>, PublishError> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(&self.columns)?;
        for record in &self.records {
            wtr.write_record(
                self.columns
                    .iter()
                    .map(|column| record.cell(column).unwrap_or_default()),
            )?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        debug!(bytes = bytes.len(), "Serialized competition sheet to CSV");
        Ok(bytes)
    }
}
