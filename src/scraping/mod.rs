pub mod browser_manager;
pub mod host;
pub mod pagination;

#[cfg(test)]
pub(crate) mod testing;

pub use host::{CdpPageHost, PageHost};
pub use pagination::PaginationDriver;
