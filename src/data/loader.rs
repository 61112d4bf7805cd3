//! CSV Data Loader Module
//! Reads the gas price log with Polars and turns it into typed records.

use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Names assigned to the five unlabeled fields, in file order.
pub const COLUMNS: [&str; 5] = ["DateStamp", "Time", "Price", "Address", "City"];

const DATE_FORMAT: &str = "%Y%m%d";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Malformed input: {0}")]
    DataFormat(String),
}

/// Knobs for reading the log file.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoaderOptions {
    /// Skip the first line. Off by default: the first line is read as data.
    pub has_header: bool,
}

/// One observation from the log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GasRecord {
    pub date_stamp: String,
    pub time: String,
    pub price: f64,
    pub address: String,
    pub city: String,
    pub date: NaiveDate,
}

/// The full set of records, immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct GasTable {
    records: Vec<GasRecord>,
}

impl GasTable {
    pub fn from_records(records: Vec<GasRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[GasRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct cities in first-encounter order.
    pub fn cities(&self) -> Vec<String> {
        let mut cities: Vec<String> = Vec::new();
        for record in &self.records {
            if !cities.iter().any(|c| c == &record.city) {
                cities.push(record.city.clone());
            }
        }
        cities
    }
}

/// Handles CSV file loading with Polars.
#[derive(Debug, Clone, Default)]
pub struct DataLoader {
    options: LoaderOptions,
}

impl DataLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Load the log file, failing on the first malformed row.
    pub fn load_csv(&self, file_path: impl AsRef<Path>) -> Result<GasTable, LoaderError> {
        let path = file_path.as_ref();
        if !path.is_file() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        let df = self.read_frame(path)?;

        if df.width() != COLUMNS.len() {
            return Err(self.field_count_error(path));
        }
        debug!(rows = df.height(), "read raw frame from {}", path.display());

        let records = self.parse_records(&df)?;
        if records.is_empty() {
            return Err(no_rows_error(path));
        }
        let table = GasTable::from_records(records);

        info!(
            rows = table.len(),
            cities = table.cities().len(),
            "loaded gas price log from {}",
            path.display()
        );
        Ok(table)
    }

    /// Read every field as a string; typing happens in `parse_records`.
    fn read_frame(&self, path: &Path) -> Result<DataFrame, LoaderError> {
        let result = LazyCsvReader::new(path)
            .with_has_header(self.options.has_header)
            .with_infer_schema_length(Some(0))
            .finish()
            .and_then(|lazy| lazy.collect());

        let err = match result {
            Ok(df) => return Ok(df),
            Err(e) => root_error(e),
        };

        match err {
            // Polars reports ragged rows as a compute error without a line number.
            PolarsError::ComputeError(_) => Err(self.field_count_error(path)),
            PolarsError::NoData(_) => Err(no_rows_error(path)),
            e => Err(LoaderError::CsvError(e)),
        }
    }

    fn field_count_error(&self, path: &Path) -> LoaderError {
        let lines = data_lines(path, self.options.has_header);
        if matches!(&lines, Some(lines) if lines.is_empty()) {
            return no_rows_error(path);
        }

        let ragged = lines
            .unwrap_or_default()
            .into_iter()
            .find(|&(_, found)| found != COLUMNS.len());
        LoaderError::DataFormat(match ragged {
            Some((line, found)) => format!(
                "line {line}: expected {} fields, found {found}",
                COLUMNS.len()
            ),
            None => format!(
                "{}: rows do not all have {} fields",
                path.display(),
                COLUMNS.len()
            ),
        })
    }

    fn parse_records(&self, df: &DataFrame) -> Result<Vec<GasRecord>, LoaderError> {
        // Positional: whatever the source calls its columns, they map onto COLUMNS.
        let columns = df.get_columns();
        let date_stamps = columns[0].as_materialized_series().str()?;
        let times = columns[1].as_materialized_series().str()?;
        let prices = columns[2].as_materialized_series().str()?;
        let addresses = columns[3].as_materialized_series().str()?;
        let cities = columns[4].as_materialized_series().str()?;

        // Line numbers as a user would count them in the file.
        let first_line = if self.options.has_header { 2 } else { 1 };

        let mut records = Vec::with_capacity(df.height());
        for (i, ((((date_stamp, time), price), address), city)) in date_stamps
            .into_iter()
            .zip(times)
            .zip(prices)
            .zip(addresses)
            .zip(cities)
            .enumerate()
        {
            // Polars reads a blank line as a row of nulls; it still counts as a line.
            if [date_stamp, time, price, address, city]
                .iter()
                .all(Option::is_none)
            {
                continue;
            }

            let line = first_line + i;
            let field = |value: Option<&str>, name: &str| -> Result<String, LoaderError> {
                value.map(str::to_string).ok_or_else(|| {
                    LoaderError::DataFormat(format!("line {line}: missing {name} field"))
                })
            };
            // Time and Address are informational; an empty one is kept as "".
            let optional = |value: Option<&str>| value.unwrap_or_default().to_string();

            let date_stamp = field(date_stamp, COLUMNS[0])?;
            let date = parse_date_stamp(&date_stamp).ok_or_else(|| {
                LoaderError::DataFormat(format!(
                    "line {line}: unparseable date '{date_stamp}' (expected YYYYMMDD)"
                ))
            })?;

            let price_text = field(price, COLUMNS[2])?;
            let price = parse_price(&price_text).ok_or_else(|| {
                LoaderError::DataFormat(format!("line {line}: unparseable price '{price_text}'"))
            })?;

            records.push(GasRecord {
                date_stamp,
                time: optional(time),
                price,
                address: optional(address),
                city: field(city, COLUMNS[4])?,
                date,
            });
        }

        Ok(records)
    }
}

/// Strip the `Context` wrappers polars adds around scan errors.
fn root_error(mut err: PolarsError) -> PolarsError {
    loop {
        match err {
            PolarsError::Context { error, .. } => err = *error,
            other => return other,
        }
    }
}

fn no_rows_error(path: &Path) -> LoaderError {
    LoaderError::DataFormat(format!("{}: file contains no rows", path.display()))
}

/// Line number and quote-aware field count of every non-blank data line.
fn data_lines(path: &Path, has_header: bool) -> Option<Vec<(usize, usize)>> {
    let text = std::fs::read_to_string(path).ok()?;
    let skip = usize::from(has_header);

    Some(
        text.lines()
            .enumerate()
            .skip(skip)
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| (i + 1, count_fields(line)))
            .collect(),
    )
}

fn count_fields(line: &str) -> usize {
    let mut in_quotes = false;
    let mut fields = 1;
    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields += 1,
            _ => {}
        }
    }
    fields
}

/// Strict `YYYYMMDD`: exactly eight digits forming a real calendar date.
pub fn parse_date_stamp(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

fn parse_price(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|p| p.is_finite())
}
