pub mod core;
pub mod export;
pub mod extract;
pub mod harvest;
pub mod report;
pub mod scraping;

// --- Primary core exports ---
pub use core::error::{ExportError, HarvestError};
pub use core::types;
pub use core::types::*;
pub use harvest::Harvester;
pub use report::{Reporter, TracingReporter};
