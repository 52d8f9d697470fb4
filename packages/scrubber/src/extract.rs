//! Selective field extraction from a single XML document.
//!
//! [`Extractor::extract`] is total: whatever the input, every requested tag
//! appears in the result, mapped to the first matching element's text or to
//! an empty string.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use roxmltree::Node;
use serde::Serialize;

use crate::config::DEFAULT_NAMESPACE;
use crate::error::{Result, ScrubberError};
use crate::types::TagSelection;
use crate::xml::{find_descendant, find_descendant_in_namespace, get_text, parse_document};

/// How requested tag names are matched against element namespaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamespacePolicy {
    /// Only elements in the configured namespace match.
    FixedNamespace,
    /// Elements match by local name in any namespace, or none.
    AnyNamespace,
    /// Try the configured namespace first, then any namespace.
    #[default]
    FixedThenAny,
}

impl NamespacePolicy {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FixedNamespace => "fixed",
            Self::AnyNamespace => "any",
            Self::FixedThenAny => "fixed-then-any",
        }
    }
}

impl fmt::Display for NamespacePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NamespacePolicy {
    type Err = ScrubberError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "fixed" | "fixed-namespace" => Ok(Self::FixedNamespace),
            "any" | "any-namespace" => Ok(Self::AnyNamespace),
            "fixed-then-any" => Ok(Self::FixedThenAny),
            _ => Err(ScrubberError::InvalidStrategy(s.to_string())),
        }
    }
}

/// Whether the document behind an extraction could be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParseOutcome {
    Parsed,
    /// The document was not well-formed; carries the parser's message.
    Unparsable(String),
}

/// Result of extracting a tag selection from one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    values: HashMap<String, String>,
    outcome: ParseOutcome,
}

impl Extraction {
    fn empty(tags: &TagSelection, outcome: ParseOutcome) -> Self {
        Self {
            values: tags.iter().map(|t| (t.to_string(), String::new())).collect(),
            outcome,
        }
    }

    /// Value extracted for `tag`; `None` only if the tag was not requested.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.values.get(tag).map(String::as_str)
    }

    /// Parse outcome of the underlying document.
    #[must_use]
    pub fn outcome(&self) -> &ParseOutcome {
        &self.outcome
    }

    #[must_use]
    pub fn is_parsed(&self) -> bool {
        self.outcome == ParseOutcome::Parsed
    }

    /// Borrow the tag to value mapping.
    #[must_use]
    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> HashMap<String, String> {
        self.values
    }
}

/// Extracts tag values from XML documents under one namespace policy.
#[derive(Debug, Clone)]
pub struct Extractor {
    policy: NamespacePolicy,
    namespace: String,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(NamespacePolicy::default())
    }
}

impl Extractor {
    /// Create an extractor using the default namespace.
    #[must_use]
    pub fn new(policy: NamespacePolicy) -> Self {
        Self {
            policy,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// Override the namespace used by the fixed-namespace lookup.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    #[must_use]
    pub fn policy(&self) -> NamespacePolicy {
        self.policy
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Extract every requested tag from `xml`.
    ///
    /// Never fails: unparsable documents and missing tags yield empty strings.
    ///
    /// # Examples
    /// ```
    /// use bulk_xml_scrubber::{Extractor, TagSelection};
    ///
    /// let tags: TagSelection = ["Status", "Missing"].into_iter().collect();
    /// let result = Extractor::default().extract("<r><Status>OK</Status></r>", &tags);
    /// assert_eq!(result.get("Status"), Some("OK"));
    /// assert_eq!(result.get("Missing"), Some(""));
    ///
    /// let broken = Extractor::default().extract("not xml", &tags);
    /// assert!(!broken.is_parsed());
    /// assert_eq!(broken.get("Status"), Some(""));
    /// ```
    #[must_use]
    pub fn extract(&self, xml: &str, tags: &TagSelection) -> Extraction {
        let doc = match parse_document(xml) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::debug!(error = %e, "document is not well-formed, extracting empty values");
                return Extraction::empty(tags, ParseOutcome::Unparsable(e.to_string()));
            }
        };

        let root = doc.root_element();
        let values = tags
            .iter()
            .map(|tag| {
                let value = self.find(root, tag).map(get_text).unwrap_or_default();
                (tag.to_string(), value)
            })
            .collect();

        Extraction {
            values,
            outcome: ParseOutcome::Parsed,
        }
    }

    fn find<'a, 'input>(&self, root: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
        match self.policy {
            NamespacePolicy::FixedNamespace => {
                find_descendant_in_namespace(root, tag, &self.namespace)
            }
            NamespacePolicy::AnyNamespace => find_descendant(root, tag),
            NamespacePolicy::FixedThenAny => {
                find_descendant_in_namespace(root, tag, &self.namespace)
                    .or_else(|| find_descendant(root, tag))
            }
        }
    }
}
