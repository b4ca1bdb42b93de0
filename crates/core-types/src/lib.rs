pub mod context;
pub mod date;
pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use context::{RunContext, StopSignal};
pub use date::DateKey;
pub use enums::{ScanPath, TaskStatus};
pub use error::CoreError;
pub use structs::{ModelParameters, PriceSeries, Selection};
