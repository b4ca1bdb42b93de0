//! # Bubble Index Numeric Kernel
//!
//! Stateless math primitives used by the window scan engine.
//!
//! ## Architectural Principles
//!
//! - **Pure functions:** nothing here holds state or knows about files, tasks
//!   or threads. Every function takes slices and returns owned results.
//! - **Explicit failure:** domain errors (non-positive prices, rank-deficient
//!   designs) are returned as `NumericsError`, never patched over with NaN.
//!
//! ## Public API
//!
//! - `normalize_log_returns`: rebases prices to 100.0 and takes the log.
//! - `fit_three_parameter`: least squares for `y ≈ a + b·x1 + c·x2`.
//! - `transform`: reverse and elementwise helpers.

// Declare the modules that constitute this crate.
pub mod error;
pub mod normalize;
pub mod regression;
pub mod transform;

// Re-export the key components to create a clean, public-facing API.
pub use error::NumericsError;
pub use normalize::normalize_log_returns;
pub use regression::{Coefficients, fit_three_parameter};
