//! Delimited-table loading and saving.
//!
//! Loading sniffs the delimiter from the header line and skips lines that
//! cannot be read as a row of the header's shape. Saving always writes
//! comma-separated UTF-8.

use std::fs;
use std::path::Path;

use log::{debug, info, warn};

use super::BomError;

/// Candidate delimiters, in tie-break order.
const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// An in-memory table of text cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BomTable {
    pub headers: Vec<String>,
    /// Rows padded to `headers.len()`
    pub rows: Vec<Vec<String>>,
    /// Input lines dropped as malformed
    pub skipped: usize,
}

impl BomTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers,
            rows,
            skipped: 0,
        }
    }

    /// Load a table from disk.
    pub fn load(path: &Path) -> Result<Self, BomError> {
        let bytes = fs::read(path).map_err(|e| BomError::io(path, e))?;
        let table = Self::parse(&String::from_utf8_lossy(&bytes))?;
        info!(
            "Loaded {} rows from {} ({} skipped)",
            table.rows.len(),
            path.display(),
            table.skipped
        );
        Ok(table)
    }

    /// Parse table text with an auto-detected delimiter.
    pub fn parse(content: &str) -> Result<Self, BomError> {
        let content = content.trim_start_matches('\u{feff}');
        let delimiter = detect_delimiter(content);
        debug!("Parsing table with delimiter {:?}", delimiter as char);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .has_headers(true)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(BomError::EmptyTable);
        }

        let mut rows = Vec::new();
        let mut skipped = 0;

        for (line, result) in reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping unreadable row {}: {}", line + 2, e);
                    skipped += 1;
                    continue;
                }
            };

            if record.len() > headers.len() {
                debug!(
                    "Skipping row {}: {} fields, expected {}",
                    line + 2,
                    record.len(),
                    headers.len()
                );
                skipped += 1;
                continue;
            }

            let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
            fields.resize(headers.len(), String::new());
            rows.push(fields);
        }

        if skipped > 0 {
            warn!("Skipped {} malformed rows", skipped);
        }

        Ok(Self {
            headers,
            rows,
            skipped,
        })
    }

    /// Index of a column by exact header name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Like [`BomTable::column`], but a missing column is an error.
    pub fn require_column(&self, name: &str) -> Result<usize, BomError> {
        self.column(name)
            .ok_or_else(|| BomError::MissingColumn(name.to_string()))
    }

    /// Write the table as comma-separated UTF-8.
    pub fn save(&self, path: &Path) -> Result<(), BomError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush().map_err(|e| BomError::io(path, e))?;
        Ok(())
    }
}

/// Pick the candidate delimiter occurring most often in the header line.
fn detect_delimiter(content: &str) -> u8 {
    let header = content
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or_default();

    let mut best = b',';
    let mut max_count = 0;
    for delimiter in DELIMITERS {
        let count = header.bytes().filter(|b| *b == delimiter).count();
        if count > max_count {
            max_count = count;
            best = delimiter;
        }
    }
    best
}
