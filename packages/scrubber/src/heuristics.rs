//! Heuristics deciding whether a cell value looks like an XML document.
//!
//! Heuristics are combined into a [`HeuristicPipeline`]: an ordered list of
//! predicates where the first one accepting a value wins.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::config::DEFAULT_ROOT_MARKER;
use crate::error::{Result, ScrubberError};

/// Start of a value shaped like an element tag: `<name`, `<ns:name` or `<?xml`,
/// followed by whitespace, `>`, `/>` or the end of the value (a truncated tag).
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static TAG_SHAPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<(\?xml|([\p{L}_][\p{L}\p{N}_.\-]*:)?[\p{L}_][\p{L}\p{N}_.\-]*)(\s|/?>|$)")
        .expect("valid regex")
});

/// A single "looks like XML" predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "name")]
pub enum ColumnHeuristic {
    /// Value starts with an XML declaration (`<?xml`).
    XmlDeclaration,
    /// Value contains the opening of a known root element (`<Name`).
    RootMarker(String),
    /// Value starts with `<`.
    LeadingAngle,
    /// Value starts with a tag-shaped token.
    TagShape,
}

impl ColumnHeuristic {
    /// Check a single cell value.
    ///
    /// # Examples
    /// ```
    /// use bulk_xml_scrubber::heuristics::ColumnHeuristic;
    ///
    /// assert!(ColumnHeuristic::XmlDeclaration.matches("<?xml version=\"1.0\"?><r/>"));
    /// assert!(ColumnHeuristic::TagShape.matches("<sa:Order id=\"1\">"));
    /// assert!(!ColumnHeuristic::TagShape.matches("a < b"));
    /// ```
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        let value = normalize(value);
        match self {
            Self::XmlDeclaration => value.starts_with("<?xml"),
            Self::RootMarker(name) => value.contains(&format!("<{name}")),
            Self::LeadingAngle => value.starts_with('<'),
            Self::TagShape => TAG_SHAPE_PATTERN.is_match(value),
        }
    }
}

impl fmt::Display for ColumnHeuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::XmlDeclaration => f.write_str("xml-declaration"),
            Self::RootMarker(name) => write!(f, "root-marker:{name}"),
            Self::LeadingAngle => f.write_str("leading-angle"),
            Self::TagShape => f.write_str("tag-shape"),
        }
    }
}

impl FromStr for ColumnHeuristic {
    type Err = ScrubberError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "xml-declaration" => Ok(Self::XmlDeclaration),
            "leading-angle" => Ok(Self::LeadingAngle),
            "tag-shape" => Ok(Self::TagShape),
            other => match other.strip_prefix("root-marker:") {
                Some(name) if !name.trim().is_empty() => Ok(Self::RootMarker(name.trim().to_string())),
                _ => Err(ScrubberError::InvalidHeuristic(s.to_string())),
            },
        }
    }
}

/// Ordered list of heuristics; the first one accepting a value wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeuristicPipeline {
    heuristics: Vec<ColumnHeuristic>,
}

impl Default for HeuristicPipeline {
    /// Declaration, then the known root marker, then a generic tag shape.
    fn default() -> Self {
        Self::new(vec![
            ColumnHeuristic::XmlDeclaration,
            ColumnHeuristic::RootMarker(DEFAULT_ROOT_MARKER.to_string()),
            ColumnHeuristic::TagShape,
        ])
    }
}

impl HeuristicPipeline {
    #[must_use]
    pub fn new(heuristics: Vec<ColumnHeuristic>) -> Self {
        Self { heuristics }
    }

    /// Parse a list of heuristic names, e.g. from repeated CLI flags.
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        names
            .iter()
            .map(|n| n.as_ref().parse())
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }

    /// Return the first heuristic accepting `value`.
    #[must_use]
    pub fn classify(&self, value: &str) -> Option<&ColumnHeuristic> {
        self.heuristics.iter().find(|h| h.matches(value))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnHeuristic> {
        self.heuristics.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heuristics.is_empty()
    }
}

fn normalize(value: &str) -> &str {
    value.trim_start_matches('\u{feff}').trim_start()
}
