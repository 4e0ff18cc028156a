//! RDB (tab-delimited) parsing for the site service.
//!
//! RDB format structure:
//! - Lines starting with '#' are comments; they are collected verbatim into
//!   `SiteTable::info`, one `\n`-terminated line each
//! - First non-comment line: tab-delimited column names
//! - Up to two further lines of column format descriptors (`5s`, `15s`,
//!   `16n`, `10d`), which are skipped
//! - Remaining lines: tab-delimited data rows
//!
//! So at most the first three non-comment lines are header material. A line
//! after the column names only counts as a descriptor line if every cell is
//! a one to three digit width followed by `s`, `n` or `d`; anything else
//! starts the data, so a document without a descriptor line loses no rows.
//! The one exception is a descriptor-less document whose first data rows
//! consist solely of such cells (`12s`, `365d`): those rows are taken as
//! header and skipped.

use std::collections::HashSet;

use log::debug;

use crate::model::{NwisError, Result, SiteRecord, SiteTable};

/// Column names plus at most two descriptor lines.
const MAX_HEADER_LINES: usize = 3;

/// Parses an RDB document into its comment block and data rows.
///
/// Each data row is zipped against the column names. A row whose cell count
/// differs from the number of columns is rejected rather than padded or
/// truncated. Empty lines are skipped and a trailing `\r` is dropped from
/// every line.
///
/// # Errors
/// `NwisError::MalformedResponse` when there is no column header line or a
/// data row has the wrong number of cells.
///
/// # Example
/// ```
/// use nwis_client::ingest::rdb::parse_rdb;
///
/// let table = parse_rdb("# USGS\nsite_no\tstation_nm\n5s\t50s\n01646500\tPOTOMAC RIVER\n").unwrap();
/// assert_eq!(table.info, "# USGS\n");
/// assert_eq!(table.rows[0]["station_nm"], "POTOMAC RIVER");
/// ```
pub fn parse_rdb(rdb_text: &str) -> Result<SiteTable> {
    let mut info = String::new();
    let mut columns: Option<Vec<String>> = None;
    let mut header_lines = 0;
    let mut in_data = false;
    let mut rows = Vec::new();

    for (index, raw_line) in rdb_text.split('\n').enumerate() {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        if line.is_empty() {
            continue;
        }

        if line.starts_with('#') {
            info.push_str(line);
            info.push('\n');
            continue;
        }

        let cells: Vec<&str> = line.split('\t').collect();

        let Some(names) = columns.as_ref() else {
            check_unique_columns(&cells, index + 1)?;
            columns = Some(cells.iter().map(|c| c.to_string()).collect());
            header_lines = 1;
            continue;
        };

        if !in_data && header_lines < MAX_HEADER_LINES && is_format_line(&cells) {
            header_lines += 1;
            continue;
        }
        in_data = true;

        if cells.len() != names.len() {
            return Err(NwisError::MalformedResponse(format!(
                "RDB line {} has {} cells but the header has {} columns",
                index + 1,
                cells.len(),
                names.len()
            )));
        }

        let row: SiteRecord = names
            .iter()
            .cloned()
            .zip(cells.iter().map(|c| c.to_string()))
            .collect();
        rows.push(row);
    }

    let columns = columns
        .ok_or_else(|| NwisError::MalformedResponse("No header line found in RDB data".to_string()))?;

    debug!("RDB: {} columns, {} rows", columns.len(), rows.len());

    Ok(SiteTable { info, columns, rows })
}

/// Widest column descriptor accepted, in digits.
const MAX_WIDTH_DIGITS: usize = 3;

/// True when every cell is an RDB column descriptor: a width of one to
/// three digits followed by `s` (string), `d` (date) or `n` (number).
fn is_format_line(cells: &[&str]) -> bool {
    cells.iter().all(|cell| {
        let cell = cell.trim();
        match cell.char_indices().last() {
            Some((pos, kind)) if matches!(kind, 's' | 'd' | 'n') => {
                let width = &cell[..pos];
                (1..=MAX_WIDTH_DIGITS).contains(&width.len()) && width.chars().all(|c| c.is_ascii_digit())
            }
            _ => false,
        }
    })
}

/// Rejects a header that names a column twice; rows are keyed by name, so
/// one of the two cells would be lost.
fn check_unique_columns(names: &[&str], line: usize) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(*name) {
            return Err(NwisError::MalformedResponse(format!(
                "RDB header on line {} repeats column '{}'",
                line, name
            )));
        }
    }
    Ok(())
}
