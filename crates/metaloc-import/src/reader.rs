//! Reading location records from the import CSV.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use metaloc_core::{LocationRecord, RecordError};

use crate::error::ImportError;

/// Columns the directory needs to build a usable listing.
pub const ESSENTIAL_HEADERS: [&str; 6] = [
    "Name",
    "Address",
    "City",
    "State",
    "Monday Hours",
    "category1",
];

/// A data row dropped because its column count differs from the header's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line number in the file.
    pub line: u64,
    pub expected: usize,
    pub found: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CsvLoad {
    pub headers: Vec<String>,
    pub records: Vec<LocationRecord>,
    pub skipped: Vec<SkippedRow>,
}

/// Read every location in the CSV at `path`.
///
/// # Errors
///
/// - [`ImportError::CsvNotFound`] if `path` does not exist.
/// - [`ImportError::CsvIo`] if it cannot be opened.
/// - [`ImportError::EmptyCsv`] / [`ImportError::Csv`], see [`read_locations_from`].
pub fn read_locations(path: &Path) -> Result<CsvLoad, ImportError> {
    let source = path.display().to_string();
    if !path.exists() {
        return Err(ImportError::CsvNotFound { path: source });
    }
    let file = File::open(path).map_err(|e| ImportError::CsvIo {
        path: source.clone(),
        source: e,
    })?;
    read_locations_from(file, &source)
}

/// Read locations from any CSV stream. `source` names it in errors.
///
/// Rows whose fields are all empty are dropped silently; rows with the wrong
/// number of columns are dropped and listed in
/// [`CsvLoad::skipped`].
///
/// # Errors
///
/// - [`ImportError::EmptyCsv`] if there is no header row.
/// - [`ImportError::Csv`] if the stream cannot be read or decoded.
pub fn read_locations_from<R: Read>(reader: R, source: &str) -> Result<CsvLoad, ImportError> {
    let csv_error = |e: csv::Error| ImportError::Csv {
        path: source.to_owned(),
        source: e,
    };

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(csv_error)?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_owned()
            } else {
                h.to_owned()
            }
        })
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(ImportError::EmptyCsv {
            path: source.to_owned(),
        });
    }

    let mut load = CsvLoad {
        headers,
        ..CsvLoad::default()
    };

    for row in rdr.records() {
        let row = row.map_err(csv_error)?;
        if row.iter().all(str::is_empty) {
            continue;
        }

        let line = row.position().map_or(0, csv::Position::line);
        let values: Vec<&str> = row.iter().collect();
        match LocationRecord::from_row(&load.headers, &values) {
            Ok(record) => load.records.push(record),
            Err(RecordError::ArityMismatch { expected, found }) => {
                tracing::debug!(
                    line,
                    expected,
                    found,
                    "skipping CSV row with mismatched column count"
                );
                load.skipped.push(SkippedRow {
                    line,
                    expected,
                    found,
                });
            }
        }
    }

    tracing::debug!(
        source,
        records = load.records.len(),
        skipped = load.skipped.len(),
        "read CSV"
    );
    Ok(load)
}

/// Essential columns absent from `headers`, in [`ESSENTIAL_HEADERS`] order.
#[must_use]
pub fn missing_headers(headers: &[String]) -> Vec<&'static str> {
    ESSENTIAL_HEADERS
        .iter()
        .copied()
        .filter(|essential| !headers.iter().any(|h| h == essential))
        .collect()
}
