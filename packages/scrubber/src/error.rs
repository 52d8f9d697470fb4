//! Error types for the scrubber.
//!
//! Parse-level XML failures never surface here: extraction and discovery
//! convert them into empty values. `ScrubberError` covers the orchestration
//! layer (table handling, CSV I/O, configuration).

use thiserror::Error;

/// Main error type for the scrubber library.
#[derive(Debug, Error)]
pub enum ScrubberError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The uploaded table has no header row.
    #[error("Input table is empty: {0}")]
    EmptyInput(String),

    /// A column name appears twice.
    #[error("Duplicate column name: '{0}'")]
    DuplicateColumn(String),

    /// A referenced column does not exist.
    #[error("Unknown column: '{column}'{}", .available.as_ref().map(|a| format!(" (available: {a})")).unwrap_or_default())]
    UnknownColumn {
        column: String,
        available: Option<String>,
    },

    /// A row has more cells than the header.
    #[error("Row {row} has {found} cells, expected at most {expected}")]
    RowLength {
        row: usize,
        found: usize,
        expected: usize,
    },

    /// A new column does not have exactly one value per row.
    #[error("Column '{column}' needs one value per row: got {found}, table has {expected} rows")]
    ColumnLength {
        column: String,
        found: usize,
        expected: usize,
    },

    /// No column looks like XML and none was given explicitly.
    #[error("Could not auto-detect the XML column; choose one with --column ({0})")]
    NoXmlColumn(String),

    /// Sample size outside the accepted range.
    #[error("Invalid sample size: {0}. Expected a number between 1 and {max}", max = crate::config::MAX_SAMPLE_SIZE)]
    InvalidSampleSize(usize),

    /// Tag name is not a valid XML local name.
    #[error("Invalid tag name: '{0}'. Expected an XML local name without prefix (e.g., Status)")]
    InvalidTagName(String),

    /// Unknown namespace policy name.
    #[error("Invalid strategy: '{0}'. Expected one of: fixed, any, fixed-then-any")]
    InvalidStrategy(String),

    /// Unknown column heuristic name.
    #[error("Invalid heuristic: '{0}'. Expected one of: xml-declaration, root-marker:<Name>, leading-angle, tag-shape")]
    InvalidHeuristic(String),

    /// Configuration value could not be used.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for scrubber operations.
pub type Result<T> = std::result::Result<T, ScrubberError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScrubberError::InvalidTagName("ns:Status".to_string());
        assert!(err.to_string().contains("ns:Status"));
        assert!(err.to_string().contains("without prefix"));
    }

    #[test]
    fn test_unknown_column_with_available() {
        let err = ScrubberError::UnknownColumn {
            column: "payload".to_string(),
            available: Some("id, body".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Unknown column: 'payload' (available: id, body)"
        );
    }

    #[test]
    fn test_unknown_column_without_available() {
        let err = ScrubberError::UnknownColumn {
            column: "payload".to_string(),
            available: None,
        };
        assert_eq!(err.to_string(), "Unknown column: 'payload'");
    }

    #[test]
    fn test_column_length_message() {
        let err = ScrubberError::ColumnLength {
            column: "Status".to_string(),
            found: 1,
            expected: 3,
        };
        assert_eq!(
            err.to_string(),
            "Column 'Status' needs one value per row: got 1, table has 3 rows"
        );
    }

    #[test]
    fn test_invalid_sample_size_mentions_limit() {
        let err = ScrubberError::InvalidSampleSize(0);
        assert!(err.to_string().contains(&crate::config::MAX_SAMPLE_SIZE.to_string()));
    }
}
