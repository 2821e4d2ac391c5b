use crate::core::error::QcError;
use crate::core::io::{self, InputData};
use anyhow::{Context, Result};
use csv::{ErrorKind, ReaderBuilder, StringRecord};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Tab-separated table kept exactly as read: header order, row order, cell text.
///
/// Cells follow the usual quoting rules, so `"a<TAB>b"` is one cell. Empty
/// lines are skipped; every row remembers the file line it started on.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TsvTable {
    pub header: StringRecord,
    pub rows: Vec<StringRecord>,
    lines: Vec<usize>,
}

impl TsvTable {
    pub fn read(path: &Path) -> Result<Self> {
        let data = InputData::open(path)?;
        let text = data.text(path)?;
        Self::parse(text).with_context(|| format!("failed to read table {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self, QcError> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());
        let mut tracker = LineTracker::new(text);

        let header = rdr.headers().map_err(csv_error)?.clone();
        if header.is_empty() {
            return Ok(Self::default());
        }
        tracker.advance(&header);

        let mut rows = Vec::new();
        let mut lines = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(csv_error)?;
            let line = tracker.advance(&record);
            if record.len() != header.len() {
                return Err(QcError::RaggedRow {
                    line,
                    expected: header.len(),
                    found: record.len(),
                });
            }
            rows.push(record);
            lines.push(line);
        }
        Ok(Self {
            header,
            rows,
            lines,
        })
    }

    pub fn column(&self, name: &str) -> Result<usize, QcError> {
        self.header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| QcError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Typed rows keyed by header name. Cells are trimmed first; columns not
    /// named by `T` are ignored.
    pub fn deserialize<T: DeserializeOwned>(&self, required: &[&str]) -> Result<Vec<T>, QcError> {
        for name in required {
            self.column(name)?;
        }
        self.rows
            .iter()
            .zip(&self.lines)
            .map(|(row, &line)| {
                let mut row = row.clone();
                row.trim();
                row.deserialize::<T>(Some(&self.header))
                    .map_err(|err| self.invalid_value(line, &row, &err))
            })
            .collect()
    }

    fn invalid_value(&self, line: usize, row: &StringRecord, err: &csv::Error) -> QcError {
        let field = match err.kind() {
            ErrorKind::Deserialize { err, .. } => err.field(),
            _ => None,
        };
        match field.map(|i| i as usize) {
            Some(i) => QcError::InvalidValue {
                line,
                column: self.header.get(i).unwrap_or_default().to_string(),
                value: row.get(i).unwrap_or_default().to_string(),
            },
            None => QcError::Table {
                line,
                message: err.to_string(),
            },
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Follows the reader through the physical lines: empty lines are skipped
/// and quoted cells may span several lines.
struct LineTracker {
    empty: Vec<bool>,
    next: usize,
}

impl LineTracker {
    fn new(text: &str) -> Self {
        Self {
            empty: io::lines(text).map(str::is_empty).collect(),
            next: 0,
        }
    }

    /// 1-based line on which `record` starts.
    fn advance(&mut self, record: &StringRecord) -> usize {
        while self.empty.get(self.next) == Some(&true) {
            self.next += 1;
        }
        let line = self.next + 1;
        let spans: usize = record.iter().map(|cell| cell.matches('\n').count()).sum();
        self.next += 1 + spans;
        line
    }
}

fn csv_error(err: csv::Error) -> QcError {
    QcError::Table {
        line: err.position().map_or(0, |p| p.line() as usize),
        message: err.to_string(),
    }
}
