//! Boundary with whatever presents the results (banner, modal, CLI).

use crate::types::Record;
use tracing::info;

pub trait Reporter: Send + Sync {
    /// Human-readable status while the run is in progress.
    fn on_progress(&self, message: &str);

    /// Fired exactly once per run. An empty slice means "no requests found"
    /// and should be surfaced as a notice, not as a failure.
    fn on_complete(&self, records: &[Record]);
}

/// Logs progress and a completion summary through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn on_progress(&self, message: &str) {
        info!("{}", message);
    }

    fn on_complete(&self, records: &[Record]) {
        if records.is_empty() {
            info!("No member requests found on this page. Make sure the group's member requests page is open and has pending requests.");
        } else {
            let with_contact = records.iter().filter(|r| r.has_contact()).count();
            info!(
                "Collected {} request(s), {} with an email or phone",
                records.len(),
                with_contact
            );
        }
    }
}
