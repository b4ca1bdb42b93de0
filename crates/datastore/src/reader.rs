use crate::error::StoreError;
use core_types::{DateKey, PriceSeries};
use csv::{ByteRecord, ReaderBuilder};
use std::path::Path;
use tracing::{debug, warn};

/// How a two-column price file is laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// The first line is a header and is skipped.
    pub has_header: bool,
    /// Rows carry a leading identifier column that is ignored.
    pub update: bool,
}

/// Reads a daily price history from disk.
pub fn read_series(path: &Path, options: ReadOptions) -> Result<PriceSeries, StoreError> {
    let bytes = std::fs::read(path).map_err(|e| StoreError::io(path, e))?;
    parse_series(&bytes, options, &path.display().to_string())
}

/// Reads a daily price history already held in memory.
pub fn read_series_bytes(bytes: &[u8], options: ReadOptions) -> Result<PriceSeries, StoreError> {
    parse_series(bytes, options, "in-memory data")
}

fn parse_series(bytes: &[u8], options: ReadOptions, origin: &str) -> Result<PriceSeries, StoreError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(sniff_delimiter(bytes))
        .has_headers(options.has_header)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let offset = usize::from(options.update);
    let mut dates: Vec<DateKey> = Vec::new();
    let mut prices = Vec::new();
    let mut skipped = 0usize;

    for (row, record) in reader.byte_records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                warn!(origin, row, error = %e, "Skipping unreadable row.");
                skipped += 1;
                continue;
            }
        };
        match parse_row(&record, offset) {
            Ok((date, price)) => {
                if dates.last().is_some_and(|last| date <= *last) {
                    warn!(origin, row, %date, "Skipping out-of-order row.");
                    skipped += 1;
                    continue;
                }
                dates.push(date);
                prices.push(price);
            }
            Err(reason) => {
                warn!(origin, row, reason, "Skipping malformed row.");
                skipped += 1;
            }
        }
    }

    if dates.is_empty() {
        return Err(StoreError::NoData(origin.to_string()));
    }
    debug!(origin, rows = dates.len(), skipped, "Price series loaded.");
    PriceSeries::new(dates, prices).map_err(|source| StoreError::Series { origin: origin.to_string(), source })
}

fn parse_row(record: &ByteRecord, offset: usize) -> Result<(DateKey, f64), &'static str> {
    let date = record.get(offset).ok_or("missing date column")?;
    let price = record.get(offset + 1).ok_or("missing price column")?;
    let date = std::str::from_utf8(date).map_err(|_| "date is not valid UTF-8")?;
    let price = std::str::from_utf8(price).map_err(|_| "price is not valid UTF-8")?;
    let date: DateKey = date.parse().map_err(|_| "unparseable date")?;
    let price: f64 = price.parse().map_err(|_| "unparseable price")?;
    if !price.is_finite() || price <= 0.0 {
        return Err("price is not positive");
    }
    Ok((date, price))
}

/// Files use either tabs or commas; the first non-empty line decides.
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes
        .split(|b| *b == b'\n')
        .find(|line| line.iter().any(|b| !b.is_ascii_whitespace()))
        .unwrap_or_default();
    if first_line.contains(&b'\t') { b'\t' } else { b',' }
}
