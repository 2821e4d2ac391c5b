use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QcError {
    /// An alignment file does not follow the block structure.
    Format {
        /// 1-based line number
        line: usize,
        message: String,
    },
    /// A sample key matched zero or several summary rows.
    KeyLookup { key: String, matches: usize },
    /// A required column is absent from a table header.
    MissingColumn { column: String },
    /// A table cell could not be converted to the column type.
    InvalidValue {
        line: usize,
        column: String,
        value: String,
    },
    /// A table row has a different cell count than the header.
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
    /// The tab-separated reader rejected the input.
    Table { line: usize, message: String },
}

impl QcError {
    pub fn format(line: usize, message: impl Into<String>) -> Self {
        QcError::Format {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for QcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QcError::Format { line, message } => {
                write!(f, "malformed alignment at line {}: {}", line, message)
            }
            QcError::KeyLookup { key, matches: 0 } => {
                write!(f, "sample '{}' has no row in the summary table", key)
            }
            QcError::KeyLookup { key, matches } => write!(
                f,
                "sample '{}' matches {} rows in the summary table",
                key, matches
            ),
            QcError::MissingColumn { column } => {
                write!(f, "required column '{}' not found in header", column)
            }
            QcError::InvalidValue {
                line,
                column,
                value,
            } => write!(
                f,
                "invalid value '{}' for column '{}' at line {}",
                value, column, line
            ),
            QcError::RaggedRow {
                line,
                expected,
                found,
            } => write!(
                f,
                "line {} has {} fields, header has {}",
                line, found, expected
            ),
            QcError::Table { line, message } => {
                write!(f, "unreadable table at line {}: {}", line, message)
            }
        }
    }
}

impl std::error::Error for QcError {}
