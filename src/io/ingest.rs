//! CSV ingest and cleaning.
//!
//! This module turns the economic-data CSV into a dense, date-ordered set of
//! rows that are safe to derive metrics from and resample.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Fail fast**: unparsable dates or numbers abort the run
//! - **Blunt density**: a row with a missing cell in *any* column is dropped
//! - **Separation of concerns**: no derivation or modeling here

use std::collections::HashSet;
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::{debug, info};

use crate::domain::{COL_DATE, COL_INFLATION, COL_POPULATION, COL_RATE, REQUIRED_COLUMNS};
use crate::error::AppError;

/// Cell values treated as missing, in addition to empty cells.
const NA_TOKENS: [&str; 10] = ["NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A", "<NA>"];

/// One raw CSV row. `None` marks a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based line number in the source file.
    pub line: usize,
    pub cells: Vec<Option<String>>,
}

/// The input table exactly as read, before any typing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Index of a column, matched case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = normalize_header_name(name);
        self.headers
            .iter()
            .position(|h| normalize_header_name(h) == wanted)
    }

    /// Missing-value count for every column, in header order.
    pub fn missing_counts(&self) -> Vec<(String, usize)> {
        self.headers
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let missing = self
                    .rows
                    .iter()
                    .filter(|r| r.cells.get(idx).is_none_or(Option::is_none))
                    .count();
                (name.clone(), missing)
            })
            .collect()
    }
}

/// A cleaned, typed row (before derivation).
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRow {
    pub date: NaiveDate,
    pub unemployment_rate: f64,
    pub population: f64,
    pub inflation_rate: f64,
}

/// What cleaning did to the table.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingReport {
    /// Per-column missing counts before cleaning.
    pub per_column: Vec<(String, usize)>,
    pub rows_read: usize,
    pub rows_dropped: usize,
}

/// Cleaner output: dense rows + a report of what was removed.
#[derive(Debug, Clone)]
pub struct CleanedData {
    pub rows: Vec<CleanRow>,
    pub missing: MissingReport,
}

/// Read the CSV at `path` into a `RawTable`.
///
/// A missing file is reported as its own error so the caller can halt before
/// doing anything else.
pub fn load_table(path: &Path) -> Result<RawTable, AppError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => {
            AppError::input(format!("Error: file at {} was not found.", path.display()))
        }
        _ => AppError::input(format!("Failed to open CSV '{}': {e}", path.display())),
    })?;

    let table = read_table(file)?;
    info!(path = %path.display(), rows = table.rows.len(), columns = table.headers.len(), "loaded table");
    Ok(table)
}

/// Read a `RawTable` from any reader (used by `load_table` and tests).
pub fn read_table<R: std::io::Read>(reader: R) -> Result<RawTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    ensure_required_columns_exist(&headers)?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header line, and lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::input(format!("CSV parse error on line {line}: {e}")))?;
        rows.push(RawRow {
            line,
            cells: to_cells(&record, headers.len()),
        });
    }

    Ok(RawTable { headers, rows })
}

/// Parse dates, drop incomplete rows, and normalize numeric columns.
pub fn clean_table(table: &RawTable) -> Result<CleanedData, AppError> {
    let idx = ColumnIndex::resolve(table)?;
    let per_column = table.missing_counts();

    // Dates are parsed for every row that has one, before dropping anything:
    // an unparsable date fails the run even on a row that would be dropped.
    let mut dates = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let date = match cell(row, idx.date) {
            Some(s) => Some(parse_date(s).map_err(|e| AppError::input(format!("Line {}: {e}", row.line)))?),
            None => None,
        };
        dates.push(date);
    }

    let mut rows = Vec::with_capacity(table.rows.len());
    for (row, date) in table.rows.iter().zip(dates) {
        let complete = (0..table.headers.len()).all(|i| cell(row, i).is_some());
        let (true, Some(date)) = (complete, date) else {
            debug!(line = row.line, "dropping row with missing values");
            continue;
        };

        let unemployment_rate = parse_f64(required(row, idx.rate, COL_RATE)?)
            .map_err(|e| AppError::input(format!("Line {}: `{COL_RATE}`: {e}", row.line)))?;
        let inflation_rate = parse_f64(required(row, idx.inflation, COL_INFLATION)?)
            .map_err(|e| AppError::input(format!("Line {}: `{COL_INFLATION}`: {e}", row.line)))?;
        let population = normalize_population(required(row, idx.population, COL_POPULATION)?)
            .map_err(|e| AppError::input(format!("Line {}: `{COL_POPULATION}`: {e}", row.line)))?;

        rows.push(CleanRow {
            date,
            unemployment_rate,
            population,
            inflation_rate,
        });
    }

    rows.sort_by_key(|r| r.date);

    let missing = MissingReport {
        per_column,
        rows_read: table.rows.len(),
        rows_dropped: table.rows.len() - rows.len(),
    };
    info!(
        rows_read = missing.rows_read,
        rows_dropped = missing.rows_dropped,
        rows_kept = rows.len(),
        "cleaned table"
    );

    Ok(CleanedData { rows, missing })
}

/// Expand a population cell into a head count.
///
/// A trailing magnitude suffix (`K`, `M`, `B`, `T`, case-insensitive) is
/// stripped and the number scaled; a bare number is returned unchanged.
/// Thousands separators are ignored.
pub fn normalize_population(raw: &str) -> Result<f64, String> {
    let s: String = raw.trim().chars().filter(|c| *c != ',' && *c != '_').collect();
    let (number, scale) = match s.chars().last().map(|c| c.to_ascii_uppercase()) {
        Some('K') => (&s[..s.len() - 1], 1e3),
        Some('M') => (&s[..s.len() - 1], 1e6),
        Some('B') => (&s[..s.len() - 1], 1e9),
        Some('T') => (&s[..s.len() - 1], 1e12),
        _ => (s.as_str(), 1.0),
    };
    let value = parse_f64(number.trim()).map_err(|_| format!("Invalid population '{raw}'."))?;
    let scaled = value * scale;
    if !scaled.is_finite() {
        return Err(format!("Population '{raw}' is out of range."));
    }
    Ok(scaled)
}

/// Parse a date cell.
///
/// ISO dates are preferred, but exports from spreadsheets often carry
/// month-first dates, timestamps, or bare years. We accept a small fixed set
/// of formats so parsing stays deterministic.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const DATE_FMTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    const DATETIME_FMTS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    // `YYYY-MM` -> first of month.
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
        return Ok(d);
    }
    // `YYYY` -> January 1st.
    if s.len() == 4 {
        if let Some(d) = s.parse::<i32>().ok().and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1)) {
            return Ok(d);
        }
    }

    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, MM/DD/YYYY, YYYY-MM-DD HH:MM:SS, YYYY-MM, YYYY."
    ))
}

struct ColumnIndex {
    date: usize,
    rate: usize,
    population: usize,
    inflation: usize,
}

impl ColumnIndex {
    fn resolve(table: &RawTable) -> Result<Self, AppError> {
        let find = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| AppError::input(format!("Missing required column: `{name}`")))
        };
        Ok(Self {
            date: find(COL_DATE)?,
            rate: find(COL_RATE)?,
            population: find(COL_POPULATION)?,
            inflation: find(COL_INFLATION)?,
        })
    }
}

fn ensure_required_columns_exist(headers: &[String]) -> Result<(), AppError> {
    let present: HashSet<String> = headers.iter().map(|h| normalize_header_name(h)).collect();
    for name in REQUIRED_COLUMNS {
        if !present.contains(&normalize_header_name(name)) {
            return Err(AppError::input(format!("Missing required column: `{name}`")));
        }
    }
    Ok(())
}

fn normalize_header_name(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn to_cells(record: &StringRecord, width: usize) -> Vec<Option<String>> {
    (0..width)
        .map(|i| {
            record
                .get(i)
                .map(str::trim)
                .filter(|s| !is_missing(s))
                .map(str::to_string)
        })
        .collect()
}

fn is_missing(s: &str) -> bool {
    s.is_empty() || NA_TOKENS.contains(&s)
}

fn cell(row: &RawRow, idx: usize) -> Option<&str> {
    row.cells.get(idx).and_then(|c| c.as_deref())
}

fn required<'a>(row: &'a RawRow, idx: usize, name: &str) -> Result<&'a str, AppError> {
    cell(row, idx).ok_or_else(|| AppError::input(format!("Line {}: missing `{name}`.", row.line)))
}

fn parse_f64(s: &str) -> Result<f64, String> {
    let v = s.parse::<f64>().map_err(|_| format!("Invalid number '{s}'."))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite number '{s}'."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Date,Unemployment Rate (%),Population,Inflation Rate (%)\n";

    fn table(body: &str) -> RawTable {
        read_table(format!("{HEADER}{body}").as_bytes()).unwrap()
    }

    #[test]
    fn population_suffix_scales_to_head_count() {
        assert_eq!(normalize_population("2.5B").unwrap(), 2.5e9);
        assert!((normalize_population("7.9b").unwrap() - 7.9e9).abs() < 1.0);
        assert_eq!(normalize_population("330M").unwrap(), 330e6);
        assert_eq!(normalize_population("1,234,567").unwrap(), 1_234_567.0);
        assert_eq!(normalize_population("5300000000").unwrap(), 5.3e9);
        assert!(normalize_population("many").is_err());
    }

    #[test]
    fn population_overflowing_to_infinity_is_rejected() {
        assert!(normalize_population("1e300B").is_err());

        let raw = read_table(
            "Date,Unemployment Rate (%),Population,Inflation Rate (%)\n1991-12-31,5.0,1e300B,2.0\n".as_bytes(),
        )
        .unwrap();
        let err = clean_table(&raw).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("out of range"));
    }

    #[test]
    fn parse_date_accepts_common_formats() {
        let d = NaiveDate::from_ymd_opt(1991, 1, 1).unwrap();
        assert_eq!(parse_date("1991-01-01").unwrap(), d);
        assert_eq!(parse_date("01/01/1991").unwrap(), d);
        assert_eq!(parse_date("1991-01").unwrap(), d);
        assert_eq!(parse_date("1991").unwrap(), d);
        assert_eq!(parse_date("1991-01-01 00:00:00").unwrap(), d);
        assert!(parse_date("first of jan").is_err());
    }

    #[test]
    fn cleaning_drops_rows_with_any_missing_cell() {
        let raw = read_table(
            "Date,Unemployment Rate (%),Population,Inflation Rate (%),Note\n\
             1991-12-31,5.0,5.3B,3.1,a\n\
             1992-12-31,,5.4B,2.9,b\n\
             1993-12-31,5.2,5.5B,2.7,\n\
             1994-12-31,5.3,NaN,2.5,d\n\
             1995-12-31,5.4,5.7B,2.3,e\n"
                .as_bytes(),
        )
        .unwrap();

        let cleaned = clean_table(&raw).unwrap();
        assert_eq!(cleaned.rows.len(), 2);
        assert_eq!(cleaned.missing.rows_read, 5);
        assert_eq!(cleaned.missing.rows_dropped, 3);

        let counts: std::collections::HashMap<String, usize> = cleaned.missing.per_column.into_iter().collect();
        assert_eq!(counts["Unemployment Rate (%)"], 1);
        assert_eq!(counts["Population"], 1);
        assert_eq!(counts["Note"], 1);
        assert_eq!(counts["Date"], 0);
    }

    #[test]
    fn cleaning_sorts_rows_by_date() {
        let raw = table("1993-12-31,5.2,5.5B,2.7\n1991-12-31,5.0,5.3B,3.1\n");
        let cleaned = clean_table(&raw).unwrap();
        assert_eq!(cleaned.rows[0].date.to_string(), "1991-12-31");
        assert!((cleaned.rows[0].population - 5.3e9).abs() < 1.0);
    }

    #[test]
    fn unparsable_date_fails_even_on_incomplete_row() {
        let raw = table("1991-12-31,5.0,5.3B,3.1\nnot-a-date,,5.4B,2.9\n");
        let err = clean_table(&raw).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("Line 3"));
    }

    #[test]
    fn missing_required_column_is_rejected() {
        let err = read_table("Date,Population\n1991-12-31,5.3B\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("Unemployment Rate (%)"));
    }

    #[test]
    fn headers_match_case_insensitively_and_strip_bom() {
        let raw = read_table(
            "\u{feff}date,unemployment rate (%),POPULATION,Inflation Rate (%)\n1991-12-31,5.0,5.3B,3.1\n".as_bytes(),
        )
        .unwrap();
        assert_eq!(clean_table(&raw).unwrap().rows.len(), 1);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_table(Path::new("definitely/not/here.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("not found"));
    }
}
