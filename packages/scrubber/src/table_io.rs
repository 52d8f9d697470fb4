//! CSV ingestion and serialization for [`Table`].

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{Result, ScrubberError};
use crate::types::Table;

/// Read a CSV table; the first record is the header.
///
/// Rows shorter than the header are padded with empty cells.
///
/// # Errors
/// - `ScrubberError::EmptyInput` if there is no header record
/// - `ScrubberError::DuplicateColumn` if the header repeats a name
/// - `ScrubberError::RowLength` if a row is longer than the header
/// - `ScrubberError::Csv` on malformed CSV or invalid UTF-8
///
/// # Examples
/// ```
/// use bulk_xml_scrubber::table_io::read_table;
///
/// let table = read_table("id,payload\n1,<r/>\n".as_bytes()).unwrap();
/// assert_eq!(table.columns(), ["id", "payload"]);
/// assert_eq!(table.get(0, "payload"), Some("<r/>"));
/// ```
pub fn read_table<R: Read>(reader: R) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record?,
        None => return Err(ScrubberError::EmptyInput("no header row".to_string())),
    };
    if header.iter().all(|h| h.trim().is_empty()) {
        return Err(ScrubberError::EmptyInput("header row is blank".to_string()));
    }

    let mut table = Table::new(header.iter().map(|h| h.trim_start_matches('\u{feff}')))?;
    for record in records {
        let record = record?;
        table.push_row(record.iter())?;
    }

    tracing::debug!(columns = table.columns().len(), rows = table.len(), "read table");
    Ok(table)
}

/// Write a table as CSV, header first.
pub fn write_table<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().from_writer(writer);
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a CSV table from a file.
pub fn load_table(path: &Path) -> Result<Table> {
    let file = File::open(path).map_err(|e| {
        ScrubberError::Io(std::io::Error::new(
            e.kind(),
            format!("Cannot open {}: {e}", path.display()),
        ))
    })?;
    read_table(file)
}

/// Write a table to a CSV file, replacing any existing file.
pub fn save_table(table: &Table, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_table(table, file)
}

/// Render a table as a CSV string.
pub fn table_to_string(table: &Table) -> Result<String> {
    let mut buffer = Vec::new();
    write_table(table, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| ScrubberError::Config(format!("CSV output is not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_quoted_xml() {
        let csv = "id,payload\n1,\"<r a=\"\"1\"\">x, y</r>\"\n";
        let table = read_table(csv.as_bytes()).unwrap();
        assert_eq!(table.get(0, "payload"), Some(r#"<r a="1">x, y</r>"#));
    }

    #[test]
    fn test_read_multiline_cell() {
        let csv = "payload\n\"<r>\n  <a>1</a>\n</r>\"\n";
        let table = read_table(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.get(0, "payload").unwrap().contains('\n'));
    }

    #[test]
    fn test_read_pads_short_rows() {
        let table = read_table("a,b\n1\n".as_bytes()).unwrap();
        assert_eq!(table.rows()[0], vec!["1", ""]);
    }

    #[test]
    fn test_read_rejects_long_rows() {
        let err = read_table("a\n1,2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ScrubberError::RowLength { .. }));
    }

    #[test]
    fn test_read_empty_input() {
        assert!(matches!(
            read_table("".as_bytes()),
            Err(ScrubberError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_read_duplicate_header() {
        assert!(matches!(
            read_table("a,a\n".as_bytes()),
            Err(ScrubberError::DuplicateColumn(_))
        ));
    }

    #[test]
    fn test_read_strips_bom() {
        let table = read_table("\u{feff}id,payload\n".as_bytes()).unwrap();
        assert_eq!(table.columns(), ["id", "payload"]);
    }

    #[test]
    fn test_write_quotes_when_needed() {
        let mut table = Table::new(["id", "payload"]).unwrap();
        table.push_row(["1", r#"<r a="1">x, y</r>"#]).unwrap();
        let out = table_to_string(&table).unwrap();
        assert_eq!(out, "id,payload\n1,\"<r a=\"\"1\"\">x, y</r>\"\n");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut table = Table::new(["Status"]).unwrap();
        table.push_row(["OK"]).unwrap();
        table.push_row([""]).unwrap();
        save_table(&table, &path).unwrap();

        assert_eq!(load_table(&path).unwrap(), table);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_table(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(err.to_string().contains("here.csv"));
    }
}
