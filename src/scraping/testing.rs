//! Scripted page host and recording reporter shared by the unit tests.

use super::host::PageHost;
use crate::report::Reporter;
use crate::types::Record;
use crate::HarvestError;
use async_trait::async_trait;
use std::sync::Mutex;

/// Content height grows one entry of `heights` per scroll away from the top.
pub struct ScriptedHost {
    heights: Vec<u64>,
    html: String,
    fail_extent: bool,
    state: Mutex<HostState>,
}

#[derive(Default)]
struct HostState {
    loads: usize,
    scrolls: Vec<u64>,
    extent_reads: usize,
}

impl ScriptedHost {
    pub fn new(heights: Vec<u64>, html: impl Into<String>) -> Self {
        Self {
            heights,
            html: html.into(),
            fail_extent: false,
            state: Mutex::new(HostState::default()),
        }
    }

    /// Height that never stops growing.
    pub fn endless(html: impl Into<String>) -> Self {
        Self::new(Vec::new(), html)
    }

    pub fn failing_extent(mut self) -> Self {
        self.fail_extent = true;
        self
    }

    pub fn scrolls(&self) -> Vec<u64> {
        self.state.lock().unwrap().scrolls.clone()
    }

    pub fn extent_reads(&self) -> usize {
        self.state.lock().unwrap().extent_reads
    }
}

#[async_trait]
impl PageHost for ScriptedHost {
    async fn content_extent(&self) -> Result<u64, HarvestError> {
        let mut state = self.state.lock().unwrap();
        state.extent_reads += 1;
        if self.fail_extent {
            return Err(HarvestError::Host("tab detached".to_string()));
        }
        if self.heights.is_empty() {
            return Ok(1000 + 400 * state.loads as u64);
        }
        Ok(self.heights[state.loads.min(self.heights.len() - 1)])
    }

    async fn scroll_to(&self, y: u64) -> Result<(), HarvestError> {
        let mut state = self.state.lock().unwrap();
        state.scrolls.push(y);
        if y > 0 {
            state.loads += 1;
        }
        Ok(())
    }

    async fn snapshot_html(&self) -> Result<String, HarvestError> {
        Ok(self.html.clone())
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    pub progress: Mutex<Vec<String>>,
    pub completed: Mutex<Vec<Vec<Record>>>,
}

impl RecordingReporter {
    pub fn progress(&self) -> Vec<String> {
        self.progress.lock().unwrap().clone()
    }

    pub fn completed(&self) -> Vec<Vec<Record>> {
        self.completed.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn on_progress(&self, message: &str) {
        self.progress.lock().unwrap().push(message.to_string());
    }

    fn on_complete(&self, records: &[Record]) {
        self.completed.lock().unwrap().push(records.to_vec());
    }
}
