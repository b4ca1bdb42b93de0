use crate::error::StoreError;
use core_types::{DateKey, PriceSeries};
use csv::{ReaderBuilder, Terminator, WriterBuilder};
use std::fs::OpenOptions;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub const OUTPUT_HEADER: [&str; 3] = ["Period Number", "Value", "Date"];

/// One line of an existing result file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputRow {
    pub period: usize,
    pub value: f64,
    pub date: DateKey,
}

/// Period number of result `index` when `result_len` results close a run of
/// `total_periods` admissible days.
pub fn period_number(total_periods: usize, result_len: usize, index: usize) -> usize {
    total_periods - result_len + index + 1
}

/// Parses the contents of a result file, header included.
pub fn parse_output(bytes: &[u8]) -> Result<Vec<OutputRow>, StoreError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let line = index + 2;
        let field = |i: usize| {
            record.get(i).ok_or_else(|| StoreError::MalformedOutput {
                line,
                reason: format!("missing column {}", i + 1),
            })
        };
        let malformed = |reason: &str| StoreError::MalformedOutput { line, reason: reason.to_string() };

        rows.push(OutputRow {
            period: field(0)?.parse().map_err(|_| malformed("bad period number"))?,
            value: field(1)?.parse().map_err(|_| malformed("bad value"))?,
            date: field(2)?.parse().map_err(|_| malformed("bad date"))?,
        });
    }
    Ok(rows)
}

/// Why a prior result file cannot be extended.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriorMismatch {
    #[error("row {line} has period {found} where {expected} was expected")]
    PeriodGap { line: usize, expected: usize, found: usize },

    #[error("{rows} rows written but only {admissible} days are admissible")]
    TooManyRows { rows: usize, admissible: usize },

    #[error("period {period} was written for {written} but the series now has {current}")]
    DateMismatch { period: usize, written: DateKey, current: DateKey },
}

/// Checks that `rows` are a prefix of the results the current series would
/// produce and returns how many days they already cover.
pub fn verify_prior(rows: &[OutputRow], series: &PriceSeries, window: usize) -> Result<usize, PriorMismatch> {
    for (index, row) in rows.iter().enumerate() {
        if row.period != index + 1 {
            return Err(PriorMismatch::PeriodGap { line: index + 2, expected: index + 1, found: row.period });
        }
    }
    let admissible = series.admissible_days(window);
    if rows.len() > admissible {
        return Err(PriorMismatch::TooManyRows { rows: rows.len(), admissible });
    }
    if let Some(last) = rows.last() {
        let current = series.dates()[window + rows.len() - 1];
        if last.date != current {
            return Err(PriorMismatch::DateMismatch { period: last.period, written: last.date, current });
        }
    }
    Ok(rows.len())
}

/// Writes results for the last `results.len()` admissible days of `series`.
///
/// With `append` the rows are added to the end of the existing file and no
/// header is written; otherwise the file is replaced.
pub fn write_results(
    path: &Path,
    results: &[f64],
    series: &PriceSeries,
    window: usize,
    append: bool,
) -> Result<(), StoreError> {
    let total = series.admissible_days(window);
    if results.len() > total {
        return Err(StoreError::MalformedOutput {
            line: 0,
            reason: format!("{} results for {} admissible days", results.len(), total),
        });
    }
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)
        .map_err(|e| StoreError::io(path, e))?;

    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(file);
    if !append {
        writer.write_record(OUTPUT_HEADER)?;
    }

    let dates = series.dates();
    let first_date = dates.len() - results.len();
    for (index, value) in results.iter().enumerate() {
        writer.write_record([
            period_number(total, results.len(), index).to_string(),
            value.to_string(),
            dates[first_date + index].to_string(),
        ])?;
    }
    writer.flush().map_err(|e| StoreError::io(path, e))?;
    debug!(path = %path.display(), rows = results.len(), append, "Results written.");
    Ok(())
}
