//! Scroll-until-stable driver for lazily loaded lists.
//!
//! The host gives no "everything loaded" signal, so this polls: scroll to the
//! bottom, wait, re-measure, and stop once the height has held still for a few
//! consecutive rounds. The step bound makes a never-settling page a soft
//! timeout rather than a hang.

use super::host::PageHost;
use crate::core::config::ScrollConfig;
use crate::report::Reporter;
use crate::types::PaginationReport;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationDriver {
    pub max_steps: usize,
    pub settle_delay: Duration,
    pub stable_rounds: usize,
}

impl Default for PaginationDriver {
    fn default() -> Self {
        Self {
            max_steps: 150,
            settle_delay: Duration::from_millis(1200),
            stable_rounds: 3,
        }
    }
}

impl PaginationDriver {
    pub fn from_config(cfg: &ScrollConfig) -> Self {
        Self {
            max_steps: cfg.resolve_max_steps(),
            settle_delay: cfg.resolve_settle_delay(),
            stable_rounds: cfg.resolve_stable_rounds(),
        }
    }

    /// Scroll until the content height converges (or the step bound runs
    /// out), then return to the top.
    pub async fn reveal_all(&self, host: &dyn PageHost, reporter: &dyn Reporter) -> PaginationReport {
        let mut prev: u64 = 0;
        let mut stable = 0usize;
        let mut report = PaginationReport::default();

        for step in 1..=self.max_steps {
            report.steps = step;

            let bottom = host.content_extent().await.unwrap_or(prev);
            if let Err(e) = host.scroll_to(bottom).await {
                warn!("pagination: scroll step {} error: {}", step, e);
            }
            tokio::time::sleep(self.settle_delay).await;

            let cur = match host.content_extent().await {
                Ok(h) => h,
                Err(e) => {
                    warn!("pagination: extent read at step {} failed: {}", step, e);
                    prev
                }
            };
            report.final_extent = cur;

            if cur == prev {
                stable += 1;
                if stable >= self.stable_rounds {
                    report.converged = true;
                    break;
                }
            } else {
                stable = 0;
            }
            prev = cur;
            reporter.on_progress(&format!("Scrolling… step {}, loaded {}px", step, cur));
        }

        if report.converged {
            info!(
                "pagination: converged after {} step(s) at {}px",
                report.steps, report.final_extent
            );
        } else {
            warn!(
                "pagination: no convergence within {} step(s), continuing with {}px loaded",
                self.max_steps, report.final_extent
            );
        }

        if let Err(e) = host.scroll_to(0).await {
            warn!("pagination: scroll back to top failed: {}", e);
        }
        report
    }
}
