//! One harvest run: reveal the whole list, snapshot it, turn it into records.

use crate::core::config::HarvestConfig;
use crate::extract::{capture_date, NamePolicy, RecordAssembler, Segmenter};
use crate::report::Reporter;
use crate::scraping::{PageHost, PaginationDriver};
use crate::types::{HarvestOutcome, Record, RunState, Strategy};
use crate::HarvestError;
use scraper::Html;
use std::sync::{Mutex, MutexGuard};
use tracing::{error, info};

pub struct Harvester {
    config: HarvestConfig,
    segmenter: Segmenter,
    policy: NamePolicy,
    driver: PaginationDriver,
    state: Mutex<RunState>,
}

impl Harvester {
    pub fn new(config: HarvestConfig) -> Self {
        Self {
            segmenter: Segmenter::new(&config.segment),
            policy: NamePolicy::new(&config.names),
            driver: PaginationDriver::from_config(&config.scroll),
            state: Mutex::new(RunState::Idle),
            config,
        }
    }

    /// Builder: override the pagination driver.
    pub fn with_driver(mut self, driver: PaginationDriver) -> Self {
        self.driver = driver;
        self
    }

    /// Builder: override the segmenter (e.g. a different container locator).
    pub fn with_segmenter(mut self, segmenter: Segmenter) -> Self {
        self.segmenter = segmenter;
        self
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        *lock_state(&self.state)
    }

    /// Full run against a live page. Only one run at a time; a second call
    /// while one is active returns [`HarvestError::RunInProgress`] at once.
    ///
    /// Everything past the guard degrades instead of failing: a non-converging
    /// list is a soft timeout and a failed snapshot yields zero records.
    pub async fn run(
        &self,
        host: &dyn PageHost,
        reporter: &dyn Reporter,
    ) -> Result<HarvestOutcome, HarvestError> {
        let guard = RunGuard::arm(&self.state)?;

        guard.set(RunState::Scrolling);
        info!("harvest: revealing the full request list");
        let pagination = self.driver.reveal_all(host, reporter).await;

        guard.set(RunState::Scanning);
        reporter.on_progress("Scanning requests…");
        let (strategy, records) = match host.snapshot_html().await {
            Ok(html) => self.scan_html(&html),
            Err(e) => {
                error!("harvest: snapshot failed, reporting no records: {}", e);
                (None, Vec::new())
            }
        };

        guard.set(RunState::Done);
        reporter.on_complete(&records);

        Ok(HarvestOutcome {
            records,
            strategy,
            pagination,
        })
    }

    /// Segment + assemble over an already captured snapshot.
    ///
    /// Strategies are tried in order and the first one whose segments turn
    /// into at least one record wins. Each attempt starts with an empty
    /// seen-set; a failed attempt emitted nothing, so none is lost.
    pub fn scan_html(&self, html: &str) -> (Option<Strategy>, Vec<Record>) {
        let document = Html::parse_document(html);
        let date = capture_date();

        for strategy in self.segmenter.strategies() {
            let segments = self.segmenter.segment_with(strategy, &document);
            if segments.is_empty() {
                continue;
            }

            let mut assembler =
                RecordAssembler::new(&self.policy, self.config.contact_rule, date.clone());
            let records = assembler.assemble_all(&segments);
            if records.is_empty() {
                info!(
                    "harvest: {} segment(s) via {} gave no usable record, trying next strategy",
                    segments.len(),
                    strategy
                );
                continue;
            }

            info!(
                "harvest: {} record(s) from {} segment(s) via {}",
                records.len(),
                segments.len(),
                strategy
            );
            return (Some(strategy), records);
        }

        info!("harvest: no strategy produced any records");
        (None, Vec::new())
    }
}

impl Default for Harvester {
    fn default() -> Self {
        Self::new(HarvestConfig::default())
    }
}

fn lock_state(state: &Mutex<RunState>) -> MutexGuard<'_, RunState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Holds the run slot; puts the state back to `Idle` when the run ends or its
/// future is dropped mid-way.
struct RunGuard<'a> {
    state: &'a Mutex<RunState>,
}

impl<'a> RunGuard<'a> {
    fn arm(state: &'a Mutex<RunState>) -> Result<Self, HarvestError> {
        let mut current = lock_state(state);
        if *current != RunState::Idle {
            return Err(HarvestError::RunInProgress);
        }
        *current = RunState::Scrolling;
        Ok(Self { state })
    }

    fn set(&self, next: RunState) {
        *lock_state(self.state) = next;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        *lock_state(self.state) = RunState::Idle;
    }
}
