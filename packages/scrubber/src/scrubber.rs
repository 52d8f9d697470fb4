//! Main scrubber service that ties discovery and extraction to a table.

use crate::config::ScrubberConfig;
use crate::discovery::{Discoverer, Discovery};
use crate::error::{Result, ScrubberError};
use crate::extract::Extractor;
use crate::types::{Table, TagSelection};

/// Result of flattening selected tags into a table.
#[derive(Debug, Clone)]
pub struct ScrubOutput {
    /// The augmented table, filtered to the requested fields.
    pub table: Table,
    /// 1-based row numbers whose document could not be parsed.
    pub unparsable_rows: Vec<usize>,
    /// Non-fatal problems worth showing to the user.
    pub warnings: Vec<String>,
}

/// Runs discovery and per-row extraction with one configuration.
#[derive(Debug, Clone, Default)]
pub struct Scrubber {
    discoverer: Discoverer,
    extractor: Extractor,
}

impl Scrubber {
    #[must_use]
    pub fn new(config: &ScrubberConfig) -> Self {
        Self {
            discoverer: Discoverer::new(config.heuristics.clone())
                .with_column_sample_size(config.column_sample_size)
                .with_tag_sample_size(config.tag_sample_size),
            extractor: Extractor::new(config.policy).with_namespace(config.namespace.clone()),
        }
    }

    #[must_use]
    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Auto-detect the XML column and discover its tags.
    #[must_use]
    pub fn discover(&self, table: &Table) -> Discovery {
        self.discoverer.discover(table)
    }

    /// Discover tags in an explicitly chosen column.
    ///
    /// # Errors
    /// Returns `ScrubberError::UnknownColumn` if the column does not exist.
    pub fn discover_in_column(&self, table: &Table, column: &str) -> Result<Discovery> {
        self.discoverer
            .discover_in_column(table, column)
            .ok_or_else(|| table.unknown_column(column))
    }

    /// Extract `tags` from every row of `column` and append them as new columns.
    ///
    /// Tag columns are appended in selection order. If `fields` is non-empty the
    /// result is narrowed to those columns, in that order.
    ///
    /// # Errors
    /// - `ScrubberError::UnknownColumn` if `column` or a field does not exist
    /// - `ScrubberError::DuplicateColumn` if a tag collides with an existing column
    pub fn scrub<S: AsRef<str>>(
        &self,
        table: &Table,
        column: &str,
        tags: &TagSelection,
        fields: &[S],
    ) -> Result<ScrubOutput> {
        self.scrub_with_progress(table, column, tags, fields, |_| {})
    }

    /// Like [`Scrubber::scrub`], calling `on_row` after each row is extracted.
    pub fn scrub_with_progress<S: AsRef<str>>(
        &self,
        table: &Table,
        column: &str,
        tags: &TagSelection,
        fields: &[S],
        mut on_row: impl FnMut(usize),
    ) -> Result<ScrubOutput> {
        let values = table.column(column).ok_or_else(|| table.unknown_column(column))?;

        // Check collisions before doing any work
        if let Some(taken) = tags.iter().find(|t| table.has_column(t)) {
            return Err(ScrubberError::DuplicateColumn(taken.to_string()));
        }

        let mut extracted: Vec<Vec<String>> = vec![Vec::with_capacity(table.len()); tags.len()];
        let mut unparsable_rows = Vec::new();

        for (index, xml) in values.enumerate() {
            let extraction = self.extractor.extract(xml, tags);
            if !extraction.is_parsed() {
                unparsable_rows.push(index + 1);
            }
            let mut row_values = extraction.into_values();
            for (tag, column_values) in tags.iter().zip(extracted.iter_mut()) {
                column_values.push(row_values.remove(tag).unwrap_or_default());
            }
            on_row(index + 1);
        }

        let mut output = table.clone();
        for (tag, column_values) in tags.iter().zip(extracted) {
            output.append_column(tag, column_values)?;
        }

        let output = if fields.is_empty() {
            output
        } else {
            output.select(fields)?
        };

        let mut warnings = Vec::new();
        if !tags.is_empty() && !unparsable_rows.is_empty() {
            tracing::warn!(
                rows = unparsable_rows.len(),
                column = %column,
                "some documents were not well-formed XML"
            );
            warnings.push(format!(
                "{} of {} rows in '{column}' were not well-formed XML; their extracted fields are empty",
                unparsable_rows.len(),
                table.len()
            ));
        }

        tracing::info!(
            rows = table.len(),
            tags = tags.len(),
            columns = output.columns().len(),
            "scrubbed table"
        );

        Ok(ScrubOutput {
            table: output,
            unparsable_rows,
            warnings,
        })
    }
}
