use serde::{Deserialize, Serialize};

/// One pending member request, as handed to the reporter.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Record {
    /// Unique within one run's output.
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// Capture date, `DD/MM/YYYY`.
    pub date: String,
}

impl Record {
    pub fn has_contact(&self) -> bool {
        !self.email.is_empty() || !self.phone.is_empty()
    }
}

/// Which segmentation strategy produced a segment.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Per-card "approve" controls.
    ActionAnchor,
    /// Profile links whose card carries a contact field.
    LinkAnchor,
    /// Plain-text lines cut at "approve" labels.
    LineAnchor,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::ActionAnchor => "action_anchor",
            Strategy::LinkAnchor => "link_anchor",
            Strategy::LineAnchor => "line_anchor",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the pagination loop ended.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaginationReport {
    /// Scroll steps actually performed.
    pub steps: usize,
    /// Last content extent read from the host, in px.
    pub final_extent: u64,
    /// `false` when the step bound was exhausted (soft timeout).
    pub converged: bool,
}

/// Result of one full run.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct HarvestOutcome {
    pub records: Vec<Record>,
    /// Strategy whose segments produced the records, `None` when none did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    pub pagination: PaginationReport,
}

/// Run state machine: `Idle → Scrolling → Scanning → Done → Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Scrolling,
    Scanning,
    Done,
}
