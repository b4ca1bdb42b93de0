use crate::ScanBackend;
use crate::accelerator::{AcceleratorScan, ComputeDevice, default_device};
use crate::error::ScanError;
use crate::host::HostScan;
use core_types::{RunContext, ScanPath};
use tracing::{info, warn};

/// Both scan paths, initialized once per process and shared by every task.
///
/// A path that failed to initialize keeps its error so each task can report
/// why it was not used.
pub struct ScanEngines {
    host: Result<HostScan, ScanError>,
    accelerator: Result<AcceleratorScan, ScanError>,
}

impl ScanEngines {
    /// Builds the host pool and, unless `force_host` is set, opens the default device.
    pub fn initialize(context: &RunContext) -> Self {
        let accelerator = if context.force_host {
            Err(ScanError::AcceleratorUnavailable("disabled by force_host".to_string()))
        } else {
            default_device()
                .map(AcceleratorScan::new)
                .map_err(|e| ScanError::AcceleratorUnavailable(e.to_string()))
        };
        Self::assemble(context, accelerator)
    }

    /// Uses the given device for the accelerator path.
    pub fn with_device(context: &RunContext, device: Box<dyn ComputeDevice>) -> Self {
        Self::assemble(context, Ok(AcceleratorScan::new(device)))
    }

    fn assemble(context: &RunContext, accelerator: Result<AcceleratorScan, ScanError>) -> Self {
        let host = HostScan::new(context.threads);
        match &host {
            Ok(scan) => info!(threads = scan.threads(), "Host scan path ready."),
            Err(e) => warn!(error = %e, "Host scan path failed to initialize."),
        }
        match &accelerator {
            Ok(scan) => info!(device = %scan.device_name(), "Accelerator scan path ready."),
            Err(e) => info!(reason = %e, "Accelerator scan path not in use."),
        }
        Self { host, accelerator }
    }

    /// The backend for the given path, or the reason it cannot be used.
    pub fn backend(&self, path: ScanPath) -> Result<&dyn ScanBackend, ScanError> {
        match path {
            ScanPath::Host => self.host.as_ref().map(|h| h as &dyn ScanBackend).map_err(Clone::clone),
            ScanPath::Accelerator => self
                .accelerator
                .as_ref()
                .map(|a| a as &dyn ScanBackend)
                .map_err(Clone::clone),
        }
    }

    pub fn is_available(&self, path: ScanPath) -> bool {
        self.backend(path).is_ok()
    }
}
