//! # Bubble Index Window Scanner
//!
//! Slides a fixed-length window across a price history and, for every
//! admissible day, fits the log-periodic model to that window and reports the
//! bubble index for the day.
//!
//! ## Architectural Principles
//!
//! - **Two paths, one contract:** `HostScan` (a rayon pool) and
//!   `AcceleratorScan` (a `ComputeDevice` kernel) both implement
//!   `ScanBackend` and must agree value for value within floating-point
//!   tolerance.
//! - **No file or task knowledge:** the scanner consumes price slices and
//!   `ModelParameters` and returns values. Caching, persistence and retries
//!   live in the run-task crate.
//! - **Honest failure:** an accelerator that is missing or fails is reported
//!   as an error. Falling back to the host is the caller's decision.
//!
//! ## Public API
//!
//! - `ScanBackend`: the scan contract, including the incremental `scan_from`.
//! - `ScanEngines`: holds both initialized paths for a whole run.
//! - `ComputeDevice` / `KernelBatch`: the seam for accelerator implementations.
//! - `Regressors`, `fit_window`: the single-window math shared by both paths.

pub mod accelerator;
pub mod backend;
#[cfg(feature = "cuda")]
pub mod cuda;
pub mod error;
pub mod factory;
pub mod fit;
pub mod host;
pub mod regressors;

pub use accelerator::{AcceleratorScan, ComputeDevice, DeviceError, KernelBatch, default_device};
pub use backend::ScanBackend;
#[cfg(feature = "cuda")]
pub use cuda::{CudaDevice, cuda_available};
pub use error::ScanError;
pub use factory::ScanEngines;
pub use fit::{WindowFit, bubble_index, fit_window};
pub use host::HostScan;
pub use regressors::Regressors;
