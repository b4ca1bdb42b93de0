use crate::error::ScanError;
use core_types::{ModelParameters, ScanPath};
use std::ops::Range;

/// A way of running the sliding-window scan over one price history.
///
/// Every implementation must return, for the same input, the same values in
/// the same order: index `i` of the result belongs to the window ending at
/// day `window + skip + i`.
pub trait ScanBackend: Send + Sync {
    fn path(&self) -> ScanPath;

    /// Scans only the windows after the first `skip` admissible days.
    fn scan_from(&self, prices: &[f64], params: &ModelParameters, skip: usize) -> Result<Vec<f64>, ScanError>;

    /// One value per day from `window` to the end of the series.
    fn scan(&self, prices: &[f64], params: &ModelParameters) -> Result<Vec<f64>, ScanError> {
        self.scan_from(prices, params, 0)
    }
}

/// Resolves the window-end days a scan must cover.
///
/// A series no longer than the window yields an empty range. Every price
/// inside the range's windows must be finite and positive.
pub(crate) fn plan_days(prices: &[f64], params: &ModelParameters, skip: usize) -> Result<Range<usize>, ScanError> {
    let window = params.window();
    let admissible = prices.len().saturating_sub(window);
    if skip > admissible {
        return Err(ScanError::InvalidInput(format!(
            "cannot skip {} days of a series with {} admissible days",
            skip, admissible
        )));
    }
    let days = (window + skip)..prices.len().max(window);
    if days.is_empty() {
        return Ok(days);
    }

    let first_price = days.start + 1 - window;
    if let Some((index, value)) = prices[first_price..]
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || **p <= 0.0)
    {
        return Err(ScanError::InvalidInput(format!(
            "price {} at index {} is not positive",
            value,
            first_price + index
        )));
    }
    Ok(days)
}
