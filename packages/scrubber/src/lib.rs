//! Bulk XML Scrubber - Flatten selected XML tags into CSV columns.
//!
//! Spreadsheet exports often carry a whole XML document in one column. This
//! crate guesses which column that is, discovers the tag names used in a
//! sample of its documents, and extracts chosen tags from every row into
//! new columns.
//!
//! # Example
//!
//! ```
//! use bulk_xml_scrubber::{discover, Scrubber, Table, TagSelection};
//!
//! let mut table = Table::new(["id", "payload"]).unwrap();
//! table.push_row(["1", "<r><Status>OK</Status></r>"]).unwrap();
//! table.push_row(["2", "<r><Status>truncated"]).unwrap();
//!
//! // Malformed rows still look like XML, so the column is detected
//! let (column, tags) = discover(&table, 10);
//! assert_eq!(column.as_deref(), Some("payload"));
//! assert_eq!(tags, vec!["Status", "r"]);
//!
//! let selection: TagSelection = ["Status"].into_iter().collect();
//! let fields: &[&str] = &[];
//! let out = Scrubber::default().scrub(&table, "payload", &selection, fields).unwrap();
//! let status: Vec<_> = out.table.column("Status").unwrap().collect();
//! assert_eq!(status, vec!["OK", ""]);
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Configuration constants, validation and [`ScrubberConfig`]
//! - [`types`]: [`Table`] and [`TagSelection`]
//! - [`error`]: Error types and Result alias
//! - [`xml`]: XML parsing and element lookup helpers
//! - [`heuristics`]: "Looks like XML" predicates for column detection
//! - [`discovery`]: XML column guessing and tag enumeration
//! - [`extract`]: Per-document tag extraction under a namespace policy
//! - [`scrubber`]: Per-row extraction merged back into a table
//! - [`table_io`]: CSV reading and writing
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod heuristics;
pub mod scrubber;
pub mod table_io;
pub mod types;
pub mod xml;

// Re-export main entry points
pub use discovery::{discover, Discoverer, Discovery};
pub use extract::{Extraction, Extractor, NamespacePolicy, ParseOutcome};
pub use scrubber::{ScrubOutput, Scrubber};

// Re-export commonly used items
pub use config::ScrubberConfig;
pub use error::{Result, ScrubberError};
pub use types::{Table, TagSelection};
