//! Column and tag discovery.
//!
//! Discovery runs once per table: it guesses which column holds XML and
//! enumerates the tag names found in a sample of that column's documents.
//! Nothing here fails; problems are reported as warnings on [`Discovery`].

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::{DEFAULT_COLUMN_SAMPLE_SIZE, DEFAULT_TAG_SAMPLE_SIZE};
use crate::heuristics::{ColumnHeuristic, HeuristicPipeline};
use crate::types::Table;
use crate::xml::{element_tree, local_name, parse_document};

/// The column chosen as holding XML, and the heuristic that accepted its first sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnGuess {
    pub column: String,
    pub heuristic: ColumnHeuristic,
}

/// Tags found in a sample of documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagDiscovery {
    /// Sorted, de-duplicated local names.
    pub tags: Vec<String>,
    /// Number of non-empty values inspected.
    pub sampled: usize,
    /// Number of inspected values that parsed as XML.
    pub parsed: usize,
}

/// Outcome of discovery over a whole table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discovery {
    /// The column the tags were taken from; `None` if nothing qualified.
    pub column: Option<String>,
    /// Set only when the column was auto-detected.
    pub guess: Option<ColumnGuess>,
    pub tags: Vec<String>,
    pub sampled: usize,
    pub parsed: usize,
    /// Non-fatal problems worth showing to the user.
    pub warnings: Vec<String>,
}

impl Discovery {
    fn from_tags(column: String, guess: Option<ColumnGuess>, found: TagDiscovery) -> Self {
        let mut warnings = Vec::new();
        if found.sampled == 0 {
            warnings.push(format!("Column '{column}' has no non-empty values"));
        } else if found.parsed == 0 {
            warnings.push(format!(
                "No tags discovered: none of the {} sampled values in '{column}' parsed as XML",
                found.sampled
            ));
        } else if found.parsed < found.sampled {
            warnings.push(format!(
                "{} of {} sampled values in '{column}' were not well-formed XML",
                found.sampled - found.parsed,
                found.sampled
            ));
        }

        Self {
            column: Some(column),
            guess,
            tags: found.tags,
            sampled: found.sampled,
            parsed: found.parsed,
            warnings,
        }
    }

    fn no_column() -> Self {
        Self {
            column: None,
            guess: None,
            tags: Vec::new(),
            sampled: 0,
            parsed: 0,
            warnings: vec!["Could not auto-detect the XML column; choose one manually".to_string()],
        }
    }
}

/// Take the first `sample_size` non-empty values.
fn sample<'a>(values: impl IntoIterator<Item = &'a str>, sample_size: usize) -> impl Iterator<Item = &'a str> {
    values
        .into_iter()
        .filter(|v| !v.trim().is_empty())
        .take(sample_size)
}

/// Guess which column holds XML documents.
///
/// Columns are scanned in table order. A column qualifies when it has at
/// least one non-empty value among the first `sample_size`, and every one of
/// them is accepted by `heuristics`. The first qualifying column wins.
///
/// # Examples
/// ```
/// use bulk_xml_scrubber::Table;
/// use bulk_xml_scrubber::discovery::guess_xml_column;
/// use bulk_xml_scrubber::heuristics::HeuristicPipeline;
///
/// let mut table = Table::new(["id", "payload"]).unwrap();
/// table.push_row(["1", "<r><a>1</a></r>"]).unwrap();
///
/// let guess = guess_xml_column(&table, &HeuristicPipeline::default(), 5).unwrap();
/// assert_eq!(guess.column, "payload");
/// ```
#[must_use]
pub fn guess_xml_column(
    table: &Table,
    heuristics: &HeuristicPipeline,
    sample_size: usize,
) -> Option<ColumnGuess> {
    for column in table.columns() {
        let Some(values) = table.column(column) else {
            continue;
        };

        let mut first: Option<&ColumnHeuristic> = None;
        let mut accepted = true;
        for value in sample(values, sample_size) {
            match heuristics.classify(value) {
                Some(h) => {
                    first.get_or_insert(h);
                }
                None => {
                    accepted = false;
                    break;
                }
            }
        }

        if let (true, Some(heuristic)) = (accepted, first) {
            tracing::debug!(column = %column, heuristic = %heuristic, "detected XML column");
            return Some(ColumnGuess {
                column: column.clone(),
                heuristic: heuristic.clone(),
            });
        }
    }

    tracing::debug!("no column looks like XML");
    None
}

/// Collect the local names of every element in the first `sample_size`
/// non-empty documents. Documents that fail to parse are skipped.
///
/// # Examples
/// ```
/// use bulk_xml_scrubber::discovery::discover_tags;
///
/// let found = discover_tags(["<a><b/></a>", "<b><c/></b>", "<broken"], 10);
/// assert_eq!(found.tags, vec!["a", "b", "c"]);
/// assert_eq!((found.sampled, found.parsed), (3, 2));
/// ```
#[must_use]
pub fn discover_tags<'a>(values: impl IntoIterator<Item = &'a str>, sample_size: usize) -> TagDiscovery {
    let mut tags = BTreeSet::new();
    let mut sampled = 0;
    let mut parsed = 0;

    for (index, value) in sample(values, sample_size).enumerate() {
        sampled += 1;
        match parse_document(value) {
            Ok(doc) => {
                parsed += 1;
                for element in element_tree(doc.root_element()) {
                    tags.insert(local_name(element).to_string());
                }
            }
            Err(e) => {
                tracing::debug!(sample = index, error = %e, "skipping sample that is not well-formed");
            }
        }
    }

    TagDiscovery {
        tags: tags.into_iter().collect(),
        sampled,
        parsed,
    }
}

/// Discovery with a configured heuristic pipeline and sample sizes.
#[derive(Debug, Clone)]
pub struct Discoverer {
    heuristics: HeuristicPipeline,
    column_sample_size: usize,
    tag_sample_size: usize,
}

impl Default for Discoverer {
    fn default() -> Self {
        Self::new(HeuristicPipeline::default())
    }
}

impl Discoverer {
    #[must_use]
    pub fn new(heuristics: HeuristicPipeline) -> Self {
        Self {
            heuristics,
            column_sample_size: DEFAULT_COLUMN_SAMPLE_SIZE,
            tag_sample_size: DEFAULT_TAG_SAMPLE_SIZE,
        }
    }

    #[must_use]
    pub fn with_column_sample_size(mut self, size: usize) -> Self {
        self.column_sample_size = size;
        self
    }

    #[must_use]
    pub fn with_tag_sample_size(mut self, size: usize) -> Self {
        self.tag_sample_size = size;
        self
    }

    /// Guess the XML column and discover its tags.
    #[must_use]
    pub fn discover(&self, table: &Table) -> Discovery {
        let Some(guess) = guess_xml_column(table, &self.heuristics, self.column_sample_size) else {
            tracing::warn!("could not auto-detect the XML column");
            return Discovery::no_column();
        };

        let column = guess.column.clone();
        let found = self.tags_in(table, &column);
        Discovery::from_tags(column, Some(guess), found)
    }

    /// Discover tags in a caller-chosen column; `None` if the column does not exist.
    #[must_use]
    pub fn discover_in_column(&self, table: &Table, column: &str) -> Option<Discovery> {
        if !table.has_column(column) {
            return None;
        }
        let found = self.tags_in(table, column);
        Some(Discovery::from_tags(column.to_string(), None, found))
    }

    fn tags_in(&self, table: &Table, column: &str) -> TagDiscovery {
        let found = table
            .column(column)
            .map(|values| discover_tags(values, self.tag_sample_size))
            .unwrap_or_default();
        if found.tags.is_empty() {
            tracing::warn!(column = %column, sampled = found.sampled, "no tags discovered");
        }
        found
    }
}

/// Guess the XML column and discover its tags using `sample_size` for both steps.
///
/// Returns the guessed column (if any) and the sorted tag names.
#[must_use]
pub fn discover(table: &Table, sample_size: usize) -> (Option<String>, Vec<String>) {
    let discovery = Discoverer::default()
        .with_column_sample_size(sample_size)
        .with_tag_sample_size(sample_size)
        .discover(table);
    (discovery.column, discovery.tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        let mut table = Table::new(columns.iter().copied()).unwrap();
        for row in rows {
            table.push_row(row.iter().copied()).unwrap();
        }
        table
    }

    #[test]
    fn test_discover_tags_merges_and_sorts() {
        let found = discover_tags(["<a><b/></a>", "<<<", "<b><c/></b>"], 3);
        assert_eq!(found.tags, vec!["a", "b", "c"]);
        assert_eq!(found.sampled, 3);
        assert_eq!(found.parsed, 2);
    }

    #[test]
    fn test_discover_tags_strips_namespaces() {
        let xml = r#"<s:Root xmlns:s="urn:s" xmlns="urn:d"><Item/><s:Item/></s:Root>"#;
        let found = discover_tags([xml], 1);
        assert_eq!(found.tags, vec!["Item", "Root"]);
    }

    #[test]
    fn test_discover_tags_case_sensitive() {
        let found = discover_tags(["<r><Status/><status/></r>"], 1);
        assert_eq!(found.tags, vec!["Status", "r", "status"]);
    }

    #[test]
    fn test_discover_tags_respects_sample_size_and_skips_empty() {
        let found = discover_tags(["", "  ", "<a/>", "<b/>", "<c/>"], 2);
        assert_eq!(found.tags, vec!["a", "b"]);
        assert_eq!(found.sampled, 2);
    }

    #[test]
    fn test_discover_tags_nothing_parses() {
        let found = discover_tags(["nope", "<still nope"], 10);
        assert!(found.tags.is_empty());
        assert_eq!((found.sampled, found.parsed), (2, 0));
    }

    #[test]
    fn test_guess_first_matching_column() {
        let t = table(
            &["id", "note", "xml", "xml2"],
            &[
                &["1", "<not", "<?xml version=\"1.0\"?><r/>", "<r/>"],
                &["2", "plain", "<?xml version=\"1.0\"?><r/>", "<r/>"],
            ],
        );
        let guess = guess_xml_column(&t, &HeuristicPipeline::default(), 5).unwrap();
        assert_eq!(guess.column, "xml");
        assert_eq!(guess.heuristic, ColumnHeuristic::XmlDeclaration);
    }

    #[test]
    fn test_guess_ignores_empty_cells() {
        let t = table(&["payload"], &[&[""], &["<r/>"], &[""]]);
        let guess = guess_xml_column(&t, &HeuristicPipeline::default(), 5).unwrap();
        assert_eq!(guess.column, "payload");
        assert_eq!(guess.heuristic, ColumnHeuristic::TagShape);
    }

    #[test]
    fn test_guess_rejects_all_empty_column() {
        let t = table(&["empty", "payload"], &[&["", "<r/>"]]);
        let guess = guess_xml_column(&t, &HeuristicPipeline::default(), 5).unwrap();
        assert_eq!(guess.column, "payload");
    }

    #[test]
    fn test_guess_only_inspects_sample() {
        let t = table(&["payload"], &[&["<r/>"], &["<r/>"], &["oops"]]);
        assert!(guess_xml_column(&t, &HeuristicPipeline::default(), 2).is_some());
        assert!(guess_xml_column(&t, &HeuristicPipeline::default(), 3).is_none());
    }

    #[test]
    fn test_guess_none() {
        let t = table(&["a", "b"], &[&["x", "y"]]);
        assert!(guess_xml_column(&t, &HeuristicPipeline::default(), 5).is_none());
    }

    #[test]
    fn test_guess_with_custom_pipeline() {
        let t = table(&["payload"], &[&["<3 you"]]);
        assert!(guess_xml_column(&t, &HeuristicPipeline::default(), 5).is_none());

        let loose = HeuristicPipeline::new(vec![ColumnHeuristic::LeadingAngle]);
        assert!(guess_xml_column(&t, &loose, 5).is_some());
    }

    #[test]
    fn test_discover_full_table() {
        let t = table(
            &["id", "payload"],
            &[&["1", "<a><b/></a>"], &["2", "<b><c/></b>"], &["3", "<broken"]],
        );
        let (column, tags) = discover(&t, 3);
        assert_eq!(column.as_deref(), Some("payload"));
        assert_eq!(tags, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_discovery_reports_partial_parse_warning() {
        let t = table(&["payload"], &[&["<a/>"], &["<broken"]]);
        let discovery = Discoverer::default().discover(&t);
        assert_eq!(discovery.parsed, 1);
        assert_eq!(discovery.warnings.len(), 1);
        assert!(discovery.warnings[0].contains("1 of 2"));
    }

    #[test]
    fn test_discovery_without_column() {
        let t = table(&["a"], &[&["plain"]]);
        let discovery = Discoverer::default().discover(&t);
        assert!(discovery.column.is_none());
        assert!(discovery.tags.is_empty());
        assert!(!discovery.warnings.is_empty());
    }

    #[test]
    fn test_discover_in_column() {
        let t = table(&["raw"], &[&["nothing here"], &["<x/>"]]);
        let discovery = Discoverer::default().discover_in_column(&t, "raw").unwrap();
        assert_eq!(discovery.column.as_deref(), Some("raw"));
        assert!(discovery.guess.is_none());
        assert_eq!(discovery.tags, vec!["x"]);

        assert!(Discoverer::default().discover_in_column(&t, "missing").is_none());
    }

    #[test]
    fn test_discover_in_column_nothing_parses_is_warning() {
        let t = table(&["raw"], &[&["a"], &["b"]]);
        let discovery = Discoverer::default().discover_in_column(&t, "raw").unwrap();
        assert!(discovery.tags.is_empty());
        assert!(discovery.warnings[0].starts_with("No tags discovered"));
    }
}
