//! Name-plausibility filter.
//!
//! Decides whether a text fragment pulled from a card reads like a person's
//! name or like UI copy (buttons, counters, headings, relative times). The
//! phrase lists are data: the built-ins below plus whatever the config adds.

use crate::core::config::NameConfig;
use aho_corasick::AhoCorasick;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Boilerplate fragments seen on member-request pages (English + Hebrew).
/// Matched case-insensitively, on whole-word boundaries for alphanumeric edges.
pub const DEFAULT_DENYLIST: &[&str] = &[
    // actions
    "approve",
    "approve all",
    "decline",
    "decline all",
    "block",
    "אישור",
    "אשר הכל",
    "דחייה",
    "דחה",
    "דחה הכל",
    "חסימה",
    // navigation / headings
    "members",
    "member requests",
    "membership",
    "group",
    "groups",
    "requests",
    "admin",
    "admins",
    "moderator",
    "notifications",
    "home",
    "feed",
    "rules",
    "חברים",
    "בקשות",
    "בקשות חברות",
    "קבוצה",
    "קבוצות",
    "מנהל",
    "מנהלים",
    "התראות",
    // counters / profile facts
    "mutual",
    "friends",
    "joined facebook",
    "lives in",
    "works at",
    "studied",
    "חברים משותפים",
    "הצטרף לפייסבוק",
    // filter / help copy
    "filter",
    "filters",
    "sort",
    "search",
    "see more",
    "see less",
    "learn more",
    "more options",
    "answered",
    "questions",
    "no answer",
    "סינון",
    "מיון",
    "חיפוש",
    "הצג עוד",
    "ראה עוד",
    "מידע נוסף",
    "שאלות",
    "לא ענה",
    "?",
];

/// Trailing boilerplate that some layouts glue onto the name itself.
pub const DEFAULT_SUFFIXES: &[&str] = &[
    "sent you a membership request",
    "requested to join",
    "wants to join",
    "שלח/ה בקשת הצטרפות",
    "שלח בקשת הצטרפות",
    "שלחה בקשת הצטרפות",
    "ביקש/ה להצטרף",
];

static RELATIVE_TIME_RE: OnceLock<Regex> = OnceLock::new();
static DIGIT_RUN_RE: OnceLock<Regex> = OnceLock::new();

fn relative_time_re() -> &'static Regex {
    RELATIVE_TIME_RE.get_or_init(|| {
        Regex::new(r"(?i)\bago\b|\byesterday\b|\bjust now\b|לפני|אתמול|עכשיו")
            .expect("valid relative-time regex")
    })
}

fn digit_run_re() -> &'static Regex {
    DIGIT_RUN_RE.get_or_init(|| Regex::new(r"\d{4,}").expect("valid digit-run regex"))
}

pub struct NamePolicy {
    denylist: AhoCorasick,
    suffixes: Vec<String>,
    min_len: usize,
    max_len: usize,
    max_words: usize,
}

impl NamePolicy {
    pub fn new(cfg: &NameConfig) -> Self {
        let patterns: Vec<&str> = DEFAULT_DENYLIST
            .iter()
            .copied()
            .chain(cfg.extra_denylist.iter().map(String::as_str))
            .filter(|p| !p.trim().is_empty())
            .collect();
        let denylist = build_denylist(&patterns).unwrap_or_else(|e| {
            warn!("configured denylist rejected ({}), using the built-in one", e);
            build_denylist(DEFAULT_DENYLIST).expect("valid built-in denylist")
        });

        let suffixes = DEFAULT_SUFFIXES
            .iter()
            .map(|s| s.to_string())
            .chain(cfg.extra_suffixes.iter().cloned())
            .filter(|s| !s.trim().is_empty())
            .collect();

        Self {
            denylist,
            suffixes,
            min_len: cfg.min_len.unwrap_or(2),
            max_len: cfg.max_len.unwrap_or(50),
            max_words: cfg.max_words.unwrap_or(5).max(1),
        }
    }

    /// Returns the cleaned name when `raw` passes every plausibility rule.
    pub fn qualify(&self, raw: &str) -> Option<String> {
        let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        let name = self.strip_suffixes(&collapsed);

        let len = name.chars().count();
        if len < self.min_len || len > self.max_len {
            return None;
        }
        if name.contains('@') || digit_run_re().is_match(name) {
            return None;
        }
        let words = name.split_whitespace().count();
        if words == 0 || words > self.max_words {
            return None;
        }
        if relative_time_re().is_match(name) || self.hits_denylist(name) {
            debug!("name candidate rejected as boilerplate: {:?}", name);
            return None;
        }

        Some(name.to_string())
    }

    fn strip_suffixes<'a>(&self, text: &'a str) -> &'a str {
        let mut out = text.trim();
        for suffix in &self.suffixes {
            out = strip_suffix_ignore_case(out, suffix).trim_end();
        }
        out
    }

    fn hits_denylist(&self, name: &str) -> bool {
        self.denylist
            .find_overlapping_iter(name)
            .any(|m| on_word_boundary(name, m.start(), m.end()))
    }
}

impl Default for NamePolicy {
    fn default() -> Self {
        Self::new(&NameConfig::default())
    }
}

fn build_denylist(patterns: &[&str]) -> Result<AhoCorasick, aho_corasick::BuildError> {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(patterns)
}

fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> &'a str {
    if let Some(stripped) = text.strip_suffix(suffix) {
        return stripped;
    }
    let lower = text.to_lowercase();
    let suffix_lower = suffix.to_lowercase();
    // Only byte-for-byte case folds can be sliced back onto the original.
    if lower.len() != text.len() || !lower.ends_with(&suffix_lower) {
        return text;
    }
    let cut = text.len() - suffix_lower.len();
    if text.is_char_boundary(cut) {
        &text[..cut]
    } else {
        text
    }
}

/// A hit only counts when it is not glued to letters/digits on an
/// alphanumeric edge ("sort" must not reject "Sortino").
fn on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let hit = &text[start..end];
    let first_alnum = hit.chars().next().is_some_and(char::is_alphanumeric);
    let last_alnum = hit.chars().last().is_some_and(char::is_alphanumeric);

    let before_ok = !first_alnum
        || text[..start]
            .chars()
            .last()
            .is_none_or(|c| !c.is_alphanumeric());
    let after_ok = !last_alnum
        || text[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
    before_ok && after_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> NamePolicy {
        NamePolicy::default()
    }

    #[test]
    fn test_accepts_plain_names() {
        let p = policy();
        assert_eq!(p.qualify("Dana Levi"), Some("Dana Levi".to_string()));
        assert_eq!(p.qualify("  יוסי   כהן "), Some("יוסי כהן".to_string()));
        assert_eq!(p.qualify("Santiago Sortino"), Some("Santiago Sortino".to_string()));
    }

    #[test]
    fn test_rejects_bulk_and_action_labels() {
        let p = policy();
        assert_eq!(p.qualify("אשר הכל"), None);
        assert_eq!(p.qualify("Approve all"), None);
        assert_eq!(p.qualify("Approve"), None);
        assert_eq!(p.qualify("Decline"), None);
        assert_eq!(p.qualify("דחייה"), None);
    }

    #[test]
    fn test_rejects_contacts_and_counters() {
        let p = policy();
        assert_eq!(p.qualify("dana@example.com"), None);
        assert_eq!(p.qualify("Dana 2024"), None);
        assert_eq!(p.qualify("0501234567"), None);
        assert_eq!(p.qualify("12 mutual friends"), None);
        assert_eq!(p.qualify("1,234 members"), None);
    }

    #[test]
    fn test_rejects_relative_time_and_questions() {
        let p = policy();
        assert_eq!(p.qualify("Requested 5 hours ago"), None);
        assert_eq!(p.qualify("לפני 3 שעות"), None);
        assert_eq!(p.qualify("What is your email?"), None);
    }

    #[test]
    fn test_length_and_word_bounds() {
        let p = policy();
        assert_eq!(p.qualify("A"), None);
        assert_eq!(p.qualify("Al"), Some("Al".to_string()));
        assert_eq!(p.qualify("one two three four five six"), None);
        assert_eq!(p.qualify(&"x".repeat(51)), None);
    }

    #[test]
    fn test_strips_trailing_request_boilerplate() {
        let p = policy();
        assert_eq!(
            p.qualify("Dana Levi sent you a membership request"),
            Some("Dana Levi".to_string())
        );
        assert_eq!(
            p.qualify("Dana Levi Sent You A Membership Request"),
            Some("Dana Levi".to_string())
        );
        assert_eq!(
            p.qualify("רונית שמש שלח/ה בקשת הצטרפות"),
            Some("רונית שמש".to_string())
        );
    }

    #[test]
    fn test_extra_denylist_from_config() {
        let p = NamePolicy::new(&NameConfig {
            extra_denylist: vec!["Pinned Post".to_string()],
            ..Default::default()
        });
        assert_eq!(p.qualify("pinned post"), None);
        assert_eq!(p.qualify("Dana Levi"), Some("Dana Levi".to_string()));
    }
}
