//! # Bubble Index Data Store
//!
//! File-system adapter for the data folder: price histories in, per-window
//! result files out.
//!
//! ## Architectural Principles
//!
//! - **Adapter layer:** every path convention and file format lives here.
//!   Run tasks see `PathResolver`, `PriceSeries` and plain result vectors.
//! - **Append, never rewrite, when history is unchanged:** existing result
//!   files are verified against the current series and only extended.
//!   Anything that does not line up is replaced from scratch.
//!
//! ## Public API
//!
//! - `DataLayout` / `PathResolver`: where inputs and outputs live.
//! - `read_series`, `read_series_bytes`: tolerant two-column price readers.
//! - `snapshot` / `restore`: single-entry archives for prior output.
//! - `parse_output`, `verify_prior`, `write_results`: the append protocol.

pub mod error;
pub mod layout;
pub mod output;
pub mod reader;
pub mod snapshot;

pub use error::StoreError;
pub use layout::{DataLayout, PathResolver};
pub use output::{OUTPUT_HEADER, OutputRow, PriorMismatch, parse_output, period_number, verify_prior, write_results};
pub use reader::{ReadOptions, read_series, read_series_bytes};
pub use snapshot::{restore, snapshot};
