pub mod config;
pub mod error;
pub mod types;

pub use config::{load_harvest_config, HarvestConfig};
pub use error::{ExportError, HarvestError};
