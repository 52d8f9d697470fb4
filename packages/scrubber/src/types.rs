//! Core data types for the scrubber.
//!
//! A [`Table`] is the in-memory form of an uploaded CSV file; a
//! [`TagSelection`] is the set of tag names a user wants flattened into it.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{Result, ScrubberError};

/// An ordered table of string cells with unique column names.
///
/// Rows are stored positionally; every row has exactly one cell per column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given header.
    ///
    /// # Errors
    /// Returns `ScrubberError::DuplicateColumn` if a name appears twice.
    ///
    /// # Examples
    /// ```
    /// use bulk_xml_scrubber::Table;
    ///
    /// assert!(Table::new(["id", "payload"]).is_ok());
    /// assert!(Table::new(["id", "id"]).is_err());
    /// ```
    pub fn new(columns: impl IntoIterator<Item = impl Into<String>>) -> Result<Self> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(ScrubberError::DuplicateColumn(column.clone()));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Append a row, padding missing trailing cells with empty strings.
    ///
    /// # Errors
    /// Returns `ScrubberError::RowLength` if the row has more cells than columns.
    pub fn push_row(&mut self, cells: impl IntoIterator<Item = impl Into<String>>) -> Result<()> {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
        if row.len() > self.columns.len() {
            return Err(ScrubberError::RowLength {
                row: self.rows.len() + 1,
                found: row.len(),
                expected: self.columns.len(),
            });
        }
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
        Ok(())
    }

    /// Column names in display order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in table order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, if present.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Check whether a column exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Iterate over the cells of one column, or `None` if the column is unknown.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &str> + '_> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[index].as_str()))
    }

    /// Look up a single cell by row index and column name.
    #[must_use]
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|r| r[index].as_str())
    }

    /// Append a new column holding one value per row.
    ///
    /// # Errors
    /// - `ScrubberError::DuplicateColumn` if the name is taken
    /// - `ScrubberError::ColumnLength` if `values` does not have one entry per row
    pub fn append_column(&mut self, name: impl Into<String>, values: Vec<String>) -> Result<()> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(ScrubberError::DuplicateColumn(name));
        }
        if values.len() != self.rows.len() {
            return Err(ScrubberError::ColumnLength {
                column: name,
                found: values.len(),
                expected: self.rows.len(),
            });
        }
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        self.columns.push(name);
        Ok(())
    }

    /// Build a new table holding only `columns`, in the given order.
    ///
    /// # Errors
    /// - `ScrubberError::UnknownColumn` if a name is not in the table
    /// - `ScrubberError::DuplicateColumn` if a name is requested twice
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> Result<Table> {
        let indices = columns
            .iter()
            .map(|c| {
                self.column_index(c.as_ref())
                    .ok_or_else(|| self.unknown_column(c.as_ref()))
            })
            .collect::<Result<Vec<usize>>>()?;

        let mut selected = Table::new(columns.iter().map(|c| c.as_ref().to_string()))?;
        selected.rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(selected)
    }

    /// Error for a column that is not part of this table.
    pub(crate) fn unknown_column(&self, name: &str) -> ScrubberError {
        ScrubberError::UnknownColumn {
            column: name.to_string(),
            available: (!self.columns.is_empty()).then(|| self.columns.join(", ")),
        }
    }
}

/// Tag names chosen for extraction, de-duplicated, in first-seen order.
///
/// Order only matters for the order of the appended output columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagSelection {
    tags: Vec<String>,
}

impl TagSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag; returns `false` if it was already selected.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for TagSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = Self::new();
        for tag in iter {
            selection.insert(tag);
        }
        selection
    }
}
