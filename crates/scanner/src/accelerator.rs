use crate::backend::{ScanBackend, plan_days};
use crate::error::ScanError;
use crate::fit::bubble_index;
use crate::regressors::Regressors;
use core_types::{ModelParameters, ScanPath};
use numerics::{Coefficients, NumericsError};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeviceError {
    #[error("No usable compute device: {0}")]
    Unavailable(String),

    #[error("Kernel launch failed: {0}")]
    Launch(String),

    #[error("Device returned {found} fits for {expected} windows")]
    OutputLength { expected: usize, found: usize },
}

/// One kernel invocation: `count` overlapping windows of `window` prices.
///
/// Window `i` covers `prices[i..i + window]`. Regressors are chronological
/// and shared by every window.
#[derive(Debug, Clone, Copy)]
pub struct KernelBatch<'a> {
    pub prices: &'a [f64],
    pub time_power: &'a [f64],
    pub cos_term: &'a [f64],
    pub window: usize,
    pub count: usize,
}

/// A device that fits every window of a batch in one blocking call.
///
/// The result holds `[intercept, power_coeff, cos_coeff]` per window in batch
/// order. A window whose design could not be solved is reported as a triple
/// of NaN rather than failing the whole dispatch.
pub trait ComputeDevice: Send + Sync {
    fn name(&self) -> String;

    fn dispatch(&self, batch: &KernelBatch<'_>) -> Result<Vec<[f64; 3]>, DeviceError>;
}

/// The accelerator scan: the whole task becomes a single kernel batch.
pub struct AcceleratorScan {
    device: Box<dyn ComputeDevice>,
}

impl AcceleratorScan {
    pub fn new(device: Box<dyn ComputeDevice>) -> Self {
        Self { device }
    }

    pub fn device_name(&self) -> String {
        self.device.name()
    }
}

impl ScanBackend for AcceleratorScan {
    fn path(&self) -> ScanPath {
        ScanPath::Accelerator
    }

    fn scan_from(&self, prices: &[f64], params: &ModelParameters, skip: usize) -> Result<Vec<f64>, ScanError> {
        let days = plan_days(prices, params, skip)?;
        if days.is_empty() {
            return Ok(Vec::new());
        }
        let window = params.window();
        let regressors = Regressors::build(params);
        let batch = KernelBatch {
            prices: &prices[days.start + 1 - window..],
            time_power: regressors.time_power(),
            cos_term: regressors.cos_term(),
            window,
            count: days.len(),
        };
        debug!(windows = batch.count, window, device = %self.device.name(), "Accelerator scan dispatched.");

        let fits = self.device.dispatch(&batch).map_err(|e| match e {
            DeviceError::Unavailable(msg) => ScanError::AcceleratorUnavailable(msg),
            other => ScanError::Kernel(other.to_string()),
        })?;
        if fits.len() != batch.count {
            return Err(ScanError::Kernel(
                DeviceError::OutputLength { expected: batch.count, found: fits.len() }.to_string(),
            ));
        }

        days.zip(fits)
            .map(|(day, [intercept, power_coeff, cos_coeff])| {
                if !(intercept.is_finite() && power_coeff.is_finite() && cos_coeff.is_finite()) {
                    return Err(ScanError::Numerical {
                        day,
                        source: NumericsError::RankDeficient("device could not solve the window".to_string()),
                    });
                }
                Ok(bubble_index(&Coefficients { intercept, power_coeff, cos_coeff }))
            })
            .collect()
    }
}

/// Opens the compute device this build supports.
pub fn default_device() -> Result<Box<dyn ComputeDevice>, DeviceError> {
    #[cfg(feature = "cuda")]
    {
        let device = crate::cuda::CudaDevice::new(0)?;
        Ok(Box::new(device))
    }

    #[cfg(not(feature = "cuda"))]
    {
        Err(DeviceError::Unavailable("built without the `cuda` feature".to_string()))
    }
}
