// CSV repository implementation
use crate::application::dataset_repository::{DatasetRepository, LoadError};
use crate::domain::river::{canonical_column_name, DatasetKind, RiverProfile, TIMESTAMP_COLUMN};
use crate::domain::table::{Column, Table};
use crate::infrastructure::config::prepare_path;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y"];

#[derive(Debug, Clone)]
pub struct CsvRepository {
    directory: PathBuf,
    raw_pattern: String,
    cleaned_pattern: String,
}

impl CsvRepository {
    pub fn new(directory: PathBuf, raw_pattern: String, cleaned_pattern: String) -> Self {
        Self {
            directory,
            raw_pattern,
            cleaned_pattern,
        }
    }

    pub fn path_for(&self, river: &str, kind: DatasetKind) -> PathBuf {
        let pattern = match kind {
            DatasetKind::Raw => &self.raw_pattern,
            DatasetKind::Cleaned => &self.cleaned_pattern,
        };
        let mut vars = HashMap::new();
        vars.insert("river".to_string(), river.to_string());
        vars.insert("kind".to_string(), kind.to_string());
        self.directory.join(prepare_path(pattern, &vars))
    }
}

#[async_trait]
impl DatasetRepository for CsvRepository {
    async fn load_table(&self, profile: &RiverProfile, kind: DatasetKind) -> Result<Table, LoadError> {
        let path = self.path_for(&profile.id, kind);
        tracing::debug!("Reading {} {} dataset from {}", profile.id, kind, path.display());

        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LoadError::NotFound(path));
            }
            Err(source) => return Err(LoadError::Io { path, source }),
        };

        parse_table(&data, profile.source_columns(kind), &path)
    }
}

/// Parse CSV bytes into a table holding only the declared columns, in
/// declared order. The first declared column is the time column.
pub fn parse_table(data: &[u8], declared: &[String], path: &Path) -> Result<Table, LoadError> {
    let csv_error = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader.headers().map_err(csv_error)?.clone();
    let mut positions = Vec::with_capacity(declared.len());
    let mut missing = Vec::new();
    for name in declared {
        match headers.iter().position(|h| h == name.as_str()) {
            Some(i) => positions.push(i),
            None => missing.push(name.clone()),
        }
    }
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns {
            path: path.to_path_buf(),
            missing,
        });
    }

    let Some((&time_idx, value_idx)) = positions.split_first() else {
        return Ok(Table::empty::<&str>(&[]));
    };

    let mut timestamps = Vec::new();
    let mut values: Vec<Vec<Option<f64>>> = vec![Vec::new(); value_idx.len()];
    for result in reader.byte_records() {
        let record = result.map_err(csv_error)?;
        timestamps.push(cell(&record, time_idx).and_then(parse_timestamp));
        for (column, &idx) in values.iter_mut().zip(value_idx) {
            column.push(cell(&record, idx).and_then(parse_number));
        }
    }

    let columns = declared[1..]
        .iter()
        .zip(values)
        .map(|(name, values)| Column::new(canonical_column_name(name), values))
        .collect();

    debug_assert_eq!(canonical_column_name(&declared[0]), TIMESTAMP_COLUMN);
    Ok(Table::new(timestamps, columns))
}

/// One cell as text; a stray byte only blanks its own cell
fn cell(record: &csv::ByteRecord, idx: usize) -> Option<&str> {
    record.get(idx).and_then(|bytes| std::str::from_utf8(bytes).ok())
}

/// Lenient date-time parsing: anything unrecognised, or outside the range a
/// nanosecond epoch offset can hold, is missing
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.naive_utc()),
        Err(_) => parse_naive(raw),
    };
    parsed.filter(|dt| dt.and_utc().timestamp_nanos_opt().is_some())
}

fn parse_naive(raw: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Numeric coercion: blanks, text and non-finite values are missing
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
