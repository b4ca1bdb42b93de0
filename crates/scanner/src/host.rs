use crate::backend::{ScanBackend, plan_days};
use crate::error::ScanError;
use crate::fit::fit_window;
use crate::regressors::Regressors;
use core_types::{ModelParameters, ScanPath};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

/// The host-parallel scan: window positions are fitted independently on a
/// dedicated rayon pool and collected back in day order.
pub struct HostScan {
    pool: ThreadPool,
}

impl HostScan {
    pub fn new(threads: usize) -> Result<Self, ScanError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("bubble-scan-{}", i))
            .build()
            .map_err(|e| ScanError::ThreadPool(e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl ScanBackend for HostScan {
    fn path(&self) -> ScanPath {
        ScanPath::Host
    }

    fn scan_from(&self, prices: &[f64], params: &ModelParameters, skip: usize) -> Result<Vec<f64>, ScanError> {
        let days = plan_days(prices, params, skip)?;
        if days.is_empty() {
            return Ok(Vec::new());
        }
        let window = params.window();
        let regressors = Regressors::build(params);
        debug!(windows = days.len(), window, threads = self.threads(), "Host scan started.");

        self.pool.install(|| {
            days.into_par_iter()
                .map(|day| {
                    fit_window(&prices[day + 1 - window..=day], &regressors)
                        .map(|fit| fit.bubble_index())
                        .map_err(|source| ScanError::Numerical { day, source })
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_size_follows_request() {
        assert_eq!(HostScan::new(3).unwrap().threads(), 3);
        assert_eq!(HostScan::new(0).unwrap().threads(), 1);
    }

    #[test]
    fn result_has_one_value_per_admissible_day() {
        let prices: Vec<f64> = (0..40).map(|i| 50.0 + (i as f64 * 0.3).sin()).collect();
        let params = ModelParameters::new(6.28, 0.38, 21.0, 10).unwrap();
        let values = HostScan::new(2).unwrap().scan(&prices, &params).unwrap();
        assert_eq!(values.len(), 30);
        assert!(values.iter().all(|v| v.is_finite()));
    }
}
