//! Configuration constants and validation functions for the scrubber.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Result, ScrubberError};
use crate::extract::NamespacePolicy;
use crate::heuristics::HeuristicPipeline;

/// Default namespace URI for the fixed-namespace lookup.
///
/// Matches the SmartAccess `ClientResponse` payloads the tool was built for.
pub const DEFAULT_NAMESPACE: &str = "http://www.smartaccess.co.uk/SmartAccess";

/// Root element name whose presence marks a value as XML.
pub const DEFAULT_ROOT_MARKER: &str = "ClientResponse";

/// Number of leading non-empty rows inspected when guessing the XML column.
pub const DEFAULT_COLUMN_SAMPLE_SIZE: usize = 5;

/// Number of leading non-empty rows parsed when discovering tags.
pub const DEFAULT_TAG_SAMPLE_SIZE: usize = 10;

/// Upper bound for any sample size.
pub const MAX_SAMPLE_SIZE: usize = 10_000;

/// Default output file name for the extract command.
pub const DEFAULT_OUTPUT_FILE: &str = "xml_extraction_output.csv";

/// Environment variable overriding the default namespace.
pub const ENV_NAMESPACE: &str = "SCRUBBER_NAMESPACE";

/// Environment variable overriding both sample sizes.
pub const ENV_SAMPLE_SIZE: &str = "SCRUBBER_SAMPLE_SIZE";

/// Environment variable overriding the namespace policy.
pub const ENV_STRATEGY: &str = "SCRUBBER_STRATEGY";

/// XML local name: no prefix, no whitespace.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LOCAL_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}_][\p{L}\p{N}_.\-]*$").expect("valid regex")
});

/// Validate a sample size.
///
/// # Examples
/// ```
/// use bulk_xml_scrubber::config::validate_sample_size;
///
/// assert!(validate_sample_size(10).is_ok());
/// assert!(validate_sample_size(0).is_err());
/// ```
pub fn validate_sample_size(sample_size: usize) -> Result<()> {
    if (1..=MAX_SAMPLE_SIZE).contains(&sample_size) {
        Ok(())
    } else {
        Err(ScrubberError::InvalidSampleSize(sample_size))
    }
}

/// Validate that a requested tag is a bare local name.
///
/// # Examples
/// ```
/// use bulk_xml_scrubber::config::validate_tag_name;
///
/// assert!(validate_tag_name("Status").is_ok());
/// assert!(validate_tag_name("ns:Status").is_err());
/// assert!(validate_tag_name("").is_err());
/// ```
pub fn validate_tag_name(tag: &str) -> Result<()> {
    if LOCAL_NAME_PATTERN.is_match(tag) {
        Ok(())
    } else {
        Err(ScrubberError::InvalidTagName(tag.to_string()))
    }
}

/// Runtime configuration for discovery and extraction.
#[derive(Debug, Clone)]
pub struct ScrubberConfig {
    /// Namespace URI used by the fixed-namespace lookup.
    pub namespace: String,
    /// How tag names are matched against element namespaces.
    pub policy: NamespacePolicy,
    /// Rows inspected when guessing the XML column.
    pub column_sample_size: usize,
    /// Rows parsed when discovering tags.
    pub tag_sample_size: usize,
    /// Predicates deciding whether a value looks like XML.
    pub heuristics: HeuristicPipeline,
}

impl Default for ScrubberConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            policy: NamespacePolicy::default(),
            column_sample_size: DEFAULT_COLUMN_SAMPLE_SIZE,
            tag_sample_size: DEFAULT_TAG_SAMPLE_SIZE,
            heuristics: HeuristicPipeline::default(),
        }
    }
}

impl ScrubberConfig {
    /// Build a configuration from defaults overridden by the environment.
    ///
    /// Unset variables fall back to defaults; set but invalid values are errors.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(namespace) = lookup(ENV_NAMESPACE) {
            config = config.with_namespace(namespace);
        }

        if let Some(raw) = lookup(ENV_SAMPLE_SIZE) {
            let size: usize = raw
                .trim()
                .parse()
                .map_err(|_| ScrubberError::Config(format!("{ENV_SAMPLE_SIZE}='{raw}' is not a number")))?;
            validate_sample_size(size)?;
            config = config.with_sample_size(size);
        }

        if let Some(raw) = lookup(ENV_STRATEGY) {
            config = config.with_policy(raw.parse()?);
        }

        Ok(config)
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_policy(mut self, policy: NamespacePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_column_sample_size(mut self, size: usize) -> Self {
        self.column_sample_size = size;
        self
    }

    pub fn with_tag_sample_size(mut self, size: usize) -> Self {
        self.tag_sample_size = size;
        self
    }

    /// Use one sample size for column detection and tag discovery alike.
    pub fn with_sample_size(self, size: usize) -> Self {
        self.with_column_sample_size(size).with_tag_sample_size(size)
    }

    pub fn with_heuristics(mut self, heuristics: HeuristicPipeline) -> Self {
        self.heuristics = heuristics;
        self
    }

    /// Check every numeric setting is within bounds.
    pub fn validate(&self) -> Result<()> {
        validate_sample_size(self.column_sample_size)?;
        validate_sample_size(self.tag_sample_size)?;
        if self.namespace.trim().is_empty() {
            return Err(ScrubberError::Config("namespace must not be empty".into()));
        }
        Ok(())
    }
}
