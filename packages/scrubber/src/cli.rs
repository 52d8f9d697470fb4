//! Command-line interface for the scrubber.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{validate_tag_name, ScrubberConfig, DEFAULT_OUTPUT_FILE};
use crate::discovery::Discovery;
use crate::error::{Result, ScrubberError};
use crate::heuristics::HeuristicPipeline;
use crate::scrubber::Scrubber;
use crate::table_io::{load_table, save_table, write_table};
use crate::types::{Table, TagSelection};

/// Bulk XML Scrubber - Flatten selected XML tags from a CSV column into new columns.
#[derive(Parser)]
#[command(name = "bulk-xml-scrubber")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that runs discovery.
#[derive(Args, Debug, Clone, Default)]
pub struct DiscoveryArgs {
    /// Number of leading non-empty rows to sample, for column detection and tag
    /// discovery (default: 5 and 10, or SCRUBBER_SAMPLE_SIZE)
    #[arg(long)]
    pub sample_size: Option<usize>,

    /// Column detection heuristic, in priority order (repeatable):
    /// xml-declaration, root-marker:<Name>, leading-angle, tag-shape
    #[arg(long = "heuristic", value_name = "HEURISTIC")]
    pub heuristics: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect the XML column and list the tags found in a sample of rows.
    Detect {
        /// Input CSV file
        input: PathBuf,

        /// Column holding XML (default: auto-detect)
        #[arg(short, long)]
        column: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        discovery: DiscoveryArgs,
    },

    /// Extract selected tags into new columns and write the result as CSV.
    Extract {
        /// Input CSV file
        input: PathBuf,

        /// Column holding XML (default: auto-detect)
        #[arg(short, long)]
        column: Option<String>,

        /// Tag to extract into a new column (repeatable)
        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Column to keep in the output, in order (repeatable; default: all)
        #[arg(short, long = "field", value_name = "FIELD")]
        fields: Vec<String>,

        /// Output CSV file, or - for stdout (default: xml_extraction_output.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Namespace matching: fixed, any or fixed-then-any (default: fixed-then-any)
        #[arg(long)]
        strategy: Option<String>,

        /// Namespace URI for the fixed-namespace lookup
        #[arg(long)]
        namespace: Option<String>,

        #[command(flatten)]
        discovery: DiscoveryArgs,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Detect {
            input,
            column,
            json,
            discovery,
        } => detect_command(&input, column.as_deref(), json, &discovery),
        Commands::Extract {
            input,
            column,
            tags,
            fields,
            output,
            strategy,
            namespace,
            discovery,
        } => extract_command(ExtractRequest {
            input: &input,
            column: column.as_deref(),
            tags: &tags,
            fields: &fields,
            output: output.as_deref(),
            strategy: strategy.as_deref(),
            namespace: namespace.as_deref(),
            discovery: &discovery,
        }),
    }
}

/// Apply command-line overrides on top of a base (environment) configuration.
fn build_config(
    mut config: ScrubberConfig,
    discovery: &DiscoveryArgs,
    strategy: Option<&str>,
    namespace: Option<&str>,
) -> Result<ScrubberConfig> {
    if let Some(size) = discovery.sample_size {
        config = config.with_sample_size(size);
    }
    if !discovery.heuristics.is_empty() {
        config = config.with_heuristics(HeuristicPipeline::parse_list(discovery.heuristics.as_slice())?);
    }
    if let Some(strategy) = strategy {
        config = config.with_policy(strategy.parse()?);
    }
    if let Some(namespace) = namespace {
        config = config.with_namespace(namespace);
    }

    config.validate()?;
    Ok(config)
}

/// Pick the explicit column, or fall back to auto-detection.
fn resolve_discovery(scrubber: &Scrubber, table: &Table, column: Option<&str>) -> Result<Discovery> {
    match column {
        Some(column) => scrubber.discover_in_column(table, column),
        None => Ok(scrubber.discover(table)),
    }
}

/// Execute the detect command.
fn detect_command(
    input: &Path,
    column: Option<&str>,
    json: bool,
    discovery_args: &DiscoveryArgs,
) -> Result<()> {
    let config = build_config(ScrubberConfig::from_env()?, discovery_args, None, None)?;
    let table = load_table(input)?;
    let scrubber = Scrubber::new(&config);
    let discovery = resolve_discovery(&scrubber, &table, column)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&discovery)?);
        return Ok(());
    }

    match (&discovery.column, &discovery.guess) {
        (Some(column), Some(guess)) => println!(
            "{} {} (detected by {})",
            style("Column:").bold(),
            style(column).cyan(),
            guess.heuristic
        ),
        (Some(column), None) => println!("{} {}", style("Column:").bold(), style(column).cyan()),
        (None, _) => println!(
            "{} none detected; available: {}",
            style("Column:").bold(),
            table.columns().join(", ")
        ),
    }

    if discovery.column.is_some() {
        println!(
            "  Sampled: {} rows, {} parsed",
            discovery.sampled, discovery.parsed
        );
        println!("  Tags: {}", style(discovery.tags.len()).green());
        for tag in &discovery.tags {
            println!("    {tag}");
        }
    }

    print_warnings(&discovery.warnings, false);
    Ok(())
}

/// Arguments of the extract command, borrowed from the parsed CLI.
struct ExtractRequest<'a> {
    input: &'a Path,
    column: Option<&'a str>,
    tags: &'a [String],
    fields: &'a [String],
    output: Option<&'a Path>,
    strategy: Option<&'a str>,
    namespace: Option<&'a str>,
    discovery: &'a DiscoveryArgs,
}

/// Execute the extract command.
fn extract_command(request: ExtractRequest<'_>) -> Result<()> {
    for tag in request.tags {
        validate_tag_name(tag)?;
    }
    let tags: TagSelection = request.tags.iter().cloned().collect();

    let config = build_config(
        ScrubberConfig::from_env()?,
        request.discovery,
        request.strategy,
        request.namespace,
    )?;
    let table = load_table(request.input)?;
    let scrubber = Scrubber::new(&config);

    let output = request
        .output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE));
    let to_stdout = output.as_os_str() == "-";

    let discovery = resolve_discovery(&scrubber, &table, request.column)?;
    let Some(column) = discovery.column.clone() else {
        return Err(ScrubberError::NoXmlColumn(format!(
            "available: {}",
            table.columns().join(", ")
        )));
    };

    status(
        to_stdout,
        format!(
            "{} {} from column {} ({} rows)",
            style("Extracting").bold(),
            style(tags.len()).cyan(),
            style(&column).cyan(),
            table.len()
        ),
    );

    let mut warnings = discovery.warnings.clone();
    for tag in tags.iter() {
        if !discovery.tags.iter().any(|t| t == tag) {
            warnings.push(format!(
                "Tag '{tag}' was not seen in the sampled rows; it may be empty everywhere"
            ));
        }
    }

    let pb = ProgressBar::new(table.len() as u64);
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template"),
    );
    pb.set_message("rows");

    let result = scrubber.scrub_with_progress(&table, &column, &tags, request.fields, |row| {
        pb.set_position(row as u64);
    });
    pb.finish_and_clear();
    let scrubbed = result?;
    warnings.extend(scrubbed.warnings);

    if to_stdout {
        write_table(&scrubbed.table, std::io::stdout().lock())?;
    } else {
        save_table(&scrubbed.table, &output)?;
    }

    print_warnings(&warnings, to_stdout);
    if !to_stdout {
        println!();
        println!(
            "{} {} ({} rows, {} columns)",
            style("Saved to:").green().bold(),
            output.display(),
            scrubbed.table.len(),
            scrubbed.table.columns().len()
        );
    }

    Ok(())
}

/// Print a status line, on stderr when stdout carries data.
fn status(to_stderr: bool, message: impl Display) {
    if to_stderr {
        eprintln!("{message}");
    } else {
        println!("{message}");
    }
}

fn print_warnings(warnings: &[String], to_stderr: bool) {
    if warnings.is_empty() {
        return;
    }
    status(
        to_stderr,
        format!("  Warnings: {}", style(warnings.len()).yellow().bold()),
    );
    for warning in warnings {
        status(to_stderr, format!("    {} {warning}", style("!").yellow()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_detect() {
        let cli = Cli::parse_from(["bulk-xml-scrubber", "detect", "input.csv"]);

        let Commands::Detect {
            input,
            column,
            json,
            discovery,
        } = cli.command
        else {
            panic!("expected detect command");
        };
        assert_eq!(input, PathBuf::from("input.csv"));
        assert!(column.is_none());
        assert!(!json);
        assert!(discovery.sample_size.is_none());
        assert!(discovery.heuristics.is_empty());
    }

    #[test]
    fn test_cli_parse_extract_repeated_flags() {
        let cli = Cli::parse_from([
            "bulk-xml-scrubber",
            "extract",
            "input.csv",
            "--column",
            "payload",
            "-t",
            "Status",
            "--tag",
            "Reference",
            "-f",
            "id",
            "--field",
            "Status",
            "--strategy",
            "any",
            "--heuristic",
            "leading-angle",
            "--sample-size",
            "3",
        ]);

        let Commands::Extract {
            column,
            tags,
            fields,
            output,
            strategy,
            discovery,
            ..
        } = cli.command
        else {
            panic!("expected extract command");
        };
        assert_eq!(column.as_deref(), Some("payload"));
        assert_eq!(tags, vec!["Status", "Reference"]);
        assert_eq!(fields, vec!["id", "Status"]);
        assert!(output.is_none());
        assert_eq!(strategy.as_deref(), Some("any"));
        assert_eq!(discovery.heuristics, vec!["leading-angle"]);
        assert_eq!(discovery.sample_size, Some(3));
    }

    #[test]
    fn test_build_config_overrides() {
        let args = DiscoveryArgs {
            sample_size: Some(3),
            heuristics: vec!["leading-angle".to_string()],
        };
        let config =
            build_config(ScrubberConfig::default(), &args, Some("fixed"), Some("urn:x")).unwrap();
        assert_eq!(config.column_sample_size, 3);
        assert_eq!(config.tag_sample_size, 3);
        assert_eq!(config.namespace, "urn:x");
        assert_eq!(config.policy.as_str(), "fixed");
        assert_eq!(config.heuristics.iter().count(), 1);
    }

    #[test]
    fn test_build_config_flags_override_base() {
        let base = ScrubberConfig::default()
            .with_namespace("urn:env")
            .with_sample_size(7);

        let untouched = build_config(base.clone(), &DiscoveryArgs::default(), None, None).unwrap();
        assert_eq!(untouched.namespace, "urn:env");
        assert_eq!(untouched.column_sample_size, 7);

        let args = DiscoveryArgs {
            sample_size: Some(2),
            heuristics: Vec::new(),
        };
        let config = build_config(base, &args, None, Some("urn:flag")).unwrap();
        assert_eq!(config.namespace, "urn:flag");
        assert_eq!(config.column_sample_size, 2);
        assert_eq!(config.tag_sample_size, 2);
    }

    #[test]
    fn test_build_config_rejects_invalid() {
        let args = DiscoveryArgs {
            sample_size: Some(0),
            heuristics: Vec::new(),
        };
        assert!(build_config(ScrubberConfig::default(), &args, None, None).is_err());
        assert!(build_config(
            ScrubberConfig::default(),
            &DiscoveryArgs::default(),
            Some("sometimes"),
            None
        )
        .is_err());

        let args = DiscoveryArgs {
            sample_size: None,
            heuristics: vec!["guess".to_string()],
        };
        assert!(build_config(ScrubberConfig::default(), &args, None, None).is_err());
    }
}
