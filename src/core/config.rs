use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

// ---------------------------------------------------------------------------
// HarvestConfig: file-based config loader (member-harvest.json) with env-var fallback
// ---------------------------------------------------------------------------

pub const ENV_CONFIG_PATH: &str = "MEMBER_HARVEST_CONFIG";
pub const ENV_SETTLE_MS: &str = "MEMBER_HARVEST_SETTLE_MS";
pub const ENV_MAX_STEPS: &str = "MEMBER_HARVEST_MAX_STEPS";
pub const ENV_DEBUG_URL: &str = "MEMBER_HARVEST_DEBUG_URL";

pub const DEFAULT_DEBUG_URL: &str = "http://127.0.0.1:9222";

/// Pagination loop tuning (mirrors the `scroll` key in member-harvest.json).
#[derive(Deserialize, Default, Clone, Debug)]
pub struct ScrollConfig {
    /// Hard bound on scroll steps. Default: 150.
    pub max_steps: Option<usize>,
    /// Wait after each scroll for lazy content to render. Default: 1200 ms.
    pub settle_ms: Option<u64>,
    /// Consecutive unchanged readings that count as fully loaded. Default: 3.
    pub stable_rounds: Option<usize>,
}

impl ScrollConfig {
    /// Max steps: JSON field → `MEMBER_HARVEST_MAX_STEPS` env var → 150.
    pub fn resolve_max_steps(&self) -> usize {
        if let Some(n) = self.max_steps {
            return n;
        }
        std::env::var(ENV_MAX_STEPS)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(150)
    }

    /// Settle delay: JSON field → `MEMBER_HARVEST_SETTLE_MS` env var → 1200 ms.
    pub fn resolve_settle_delay(&self) -> Duration {
        let ms = self.settle_ms.unwrap_or_else(|| {
            std::env::var(ENV_SETTLE_MS)
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(1200)
        });
        Duration::from_millis(ms)
    }

    pub fn resolve_stable_rounds(&self) -> usize {
        self.stable_rounds.unwrap_or(3).max(1)
    }
}

/// Bounds for the upward walk from an anchor to its entity container.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContainerBounds {
    /// Ancestors visited before giving up and taking the last one.
    pub max_depth: usize,
    /// Container must be strictly taller than this, in px.
    pub min_height: u32,
    /// Container must be at least this wide, in px.
    #[serde(default)]
    pub min_width: u32,
}

impl ContainerBounds {
    /// Large enough to hold name + Q&A answers + the action buttons.
    pub const ACTION_CARD: ContainerBounds = ContainerBounds {
        max_depth: 12,
        min_height: 120,
        min_width: 0,
    };

    pub const LINK_CARD: ContainerBounds = ContainerBounds {
        max_depth: 8,
        min_height: 100,
        min_width: 0,
    };
}

#[derive(Deserialize, Default, Clone, Debug)]
pub struct SegmentConfig {
    pub action_container: Option<ContainerBounds>,
    pub link_container: Option<ContainerBounds>,
    /// Extra per-entity approve labels (exact match), e.g. new UI copy.
    #[serde(default)]
    pub extra_approve_labels: Vec<String>,
    /// Extra bulk-approve labels that must never act as anchors.
    #[serde(default)]
    pub extra_bulk_labels: Vec<String>,
}

impl SegmentConfig {
    pub fn resolve_action_bounds(&self) -> ContainerBounds {
        self.action_container.unwrap_or(ContainerBounds::ACTION_CARD)
    }

    pub fn resolve_link_bounds(&self) -> ContainerBounds {
        self.link_container.unwrap_or(ContainerBounds::LINK_CARD)
    }
}

/// Name-plausibility tuning. The built-in denylist is always active;
/// entries here extend it.
#[derive(Deserialize, Default, Clone, Debug)]
pub struct NameConfig {
    #[serde(default)]
    pub extra_denylist: Vec<String>,
    #[serde(default)]
    pub extra_suffixes: Vec<String>,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    pub max_words: Option<usize>,
}

/// Whether a record needs an email or phone to be accepted, per strategy.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContactRule {
    /// Action-anchor cards are trusted without contact info; link and line
    /// fallbacks need at least one contact field.
    #[default]
    FallbackOnly,
    Always,
    Never,
}

impl ContactRule {
    pub fn requires_contact(&self, strategy: crate::types::Strategy) -> bool {
        match self {
            ContactRule::Always => true,
            ContactRule::Never => false,
            ContactRule::FallbackOnly => strategy != crate::types::Strategy::ActionAnchor,
        }
    }
}

#[derive(Deserialize, Default, Clone, Debug)]
pub struct ExportConfig {
    /// `"en"` (default) or `"he"`.
    pub labels: Option<String>,
}

/// Top-level config (member-harvest.json).
#[derive(Deserialize, Default, Clone, Debug)]
pub struct HarvestConfig {
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub segment: SegmentConfig,
    #[serde(default)]
    pub names: NameConfig,
    #[serde(default)]
    pub contact_rule: ContactRule,
    #[serde(default)]
    pub export: ExportConfig,
    /// Remote-debugging endpoint of the browser holding the page.
    pub debug_url: Option<String>,
}

impl HarvestConfig {
    /// Debug endpoint: JSON field → `MEMBER_HARVEST_DEBUG_URL` env var → `http://127.0.0.1:9222`.
    pub fn resolve_debug_url(&self) -> String {
        if let Some(u) = &self.debug_url {
            if !u.trim().is_empty() {
                return u.trim().to_string();
            }
        }
        std::env::var(ENV_DEBUG_URL)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DEBUG_URL.to_string())
    }
}

fn config_candidates() -> Vec<PathBuf> {
    let mut v = vec![PathBuf::from("member-harvest.json")];
    if let Some(home) = dirs::home_dir() {
        v.push(home.join(".member-harvest").join("config.json"));
    }
    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        v.insert(0, PathBuf::from(env_path));
    }
    v
}

/// Load `member-harvest.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `MEMBER_HARVEST_CONFIG` env var path
/// 2. `./member-harvest.json`
/// 3. `~/.member-harvest/config.json`
///
/// Missing file → `HarvestConfig::default()` (silent, all env-var fallbacks apply).
/// Parse error → log a warning, return `HarvestConfig::default()`.
pub fn load_harvest_config() -> HarvestConfig {
    for path in &config_candidates() {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                return match parse_harvest_config(&contents) {
                    Ok(cfg) => {
                        tracing::info!("member-harvest config loaded from {}", path.display());
                        cfg
                    }
                    Err(e) => {
                        tracing::warn!(
                            "member-harvest config parse error at {}: {}, using defaults",
                            path.display(),
                            e
                        );
                        HarvestConfig::default()
                    }
                };
            }
            Err(_) => continue,
        }
    }

    HarvestConfig::default()
}

pub fn parse_harvest_config(contents: &str) -> Result<HarvestConfig, crate::HarvestError> {
    serde_json::from_str(contents).map_err(|e| crate::HarvestError::Config(e.to_string()))
}
