//! Candidate segmentation: split a loaded page into per-request spans.
//!
//! Three independent strategies, most structural first:
//! * action anchor: per-card "approve" controls, walked up to their card;
//! * link anchor: profile links whose card carries an email or phone;
//! * line anchor: rendered text lines cut at "approve" label lines.

use super::dom::{self, ContainerLocator, RenderedSizeLocator};
use super::matchers::{match_email, match_phone};
use crate::core::config::{ContainerBounds, SegmentConfig};
use crate::types::Strategy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info};

/// Per-entity affirmative action labels (exact match).
pub const DEFAULT_APPROVE_LABELS: &[&str] = &["Approve", "Approve request", "אישור", "אשר"];

/// Bulk variants that must never be treated as a per-card anchor.
pub const DEFAULT_BULK_LABELS: &[&str] = &[
    "Approve all",
    "Approve All",
    "Approve all requests",
    "אשר הכל",
    "אישור הכל",
    "אשר את כולם",
];

/// Approve labels that are also given names. They still anchor on controls,
/// but a text line holding only one of them is not a separator.
const NAME_LIKE_LABELS: &[&str] = &["אשר"];

/// Link shapes that point at a member profile.
const PROFILE_LINK_SELECTOR: &str = r#"a[href*="/user/"], a[href*="profile.php"], a[role="link"]"#;
const ACTION_CONTROL_SELECTOR: &str = r#"[aria-label], button, [role="button"]"#;

/// Profile link texts outside this length range are not worth a container walk.
const LINK_TEXT_MIN_CHARS: usize = 2;
const LINK_TEXT_MAX_CHARS: usize = 60;

/// One hypothesized entity. Borrowed from the snapshot, consumed right away.
#[derive(Debug, Clone)]
pub enum Segment<'a> {
    Container {
        strategy: Strategy,
        root: ElementRef<'a>,
        /// Texts of the anchor links that led here, preferred as names.
        anchor_texts: Vec<String>,
    },
    Lines { lines: Vec<String> },
}

impl Segment<'_> {
    pub fn strategy(&self) -> Strategy {
        match self {
            Segment::Container { strategy, .. } => *strategy,
            Segment::Lines { .. } => Strategy::LineAnchor,
        }
    }

    /// Full text the contact matchers run over.
    pub fn text(&self) -> String {
        match self {
            Segment::Container { root, .. } => dom::rendered_text(root),
            Segment::Lines { lines } => lines.join("\n"),
        }
    }
}

pub struct Segmenter {
    approve_labels: Vec<String>,
    bulk_labels: Vec<String>,
    action_bounds: ContainerBounds,
    link_bounds: ContainerBounds,
    locator: Box<dyn ContainerLocator + Send + Sync>,
}

impl Segmenter {
    pub fn new(cfg: &SegmentConfig) -> Self {
        let approve_labels = DEFAULT_APPROVE_LABELS
            .iter()
            .map(|s| s.to_string())
            .chain(cfg.extra_approve_labels.iter().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty())
            .collect();
        let bulk_labels = DEFAULT_BULK_LABELS
            .iter()
            .map(|s| s.to_string())
            .chain(cfg.extra_bulk_labels.iter().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            approve_labels,
            bulk_labels,
            action_bounds: cfg.resolve_action_bounds(),
            link_bounds: cfg.resolve_link_bounds(),
            locator: Box::new(RenderedSizeLocator),
        }
    }

    /// Builder: swap the ancestor-walk heuristic.
    pub fn with_locator(mut self, locator: impl ContainerLocator + Send + Sync + 'static) -> Self {
        self.locator = Box::new(locator);
        self
    }

    /// Strategies in the order they are attempted.
    pub fn strategies(&self) -> [Strategy; 3] {
        [
            Strategy::ActionAnchor,
            Strategy::LinkAnchor,
            Strategy::LineAnchor,
        ]
    }

    /// Segments produced by exactly one strategy.
    pub fn segment_with<'a>(&self, strategy: Strategy, document: &'a Html) -> Vec<Segment<'a>> {
        let segments = match strategy {
            Strategy::ActionAnchor => self.action_anchor_segments(document),
            Strategy::LinkAnchor => self.link_anchor_segments(document),
            Strategy::LineAnchor => self.line_anchor_segments(document),
        };
        info!("segmenter: {} produced {} segment(s)", strategy, segments.len());
        segments
    }

    fn is_approve_label(&self, text: &str) -> bool {
        let text = text.trim();
        !self.is_bulk_label(text) && self.approve_labels.iter().any(|l| l == text)
    }

    fn is_bulk_label(&self, text: &str) -> bool {
        let text = text.trim();
        self.bulk_labels.iter().any(|l| l.eq_ignore_ascii_case(text))
    }

    fn action_anchor_segments<'a>(&self, document: &'a Html) -> Vec<Segment<'a>> {
        let Ok(selector) = Selector::parse(ACTION_CONTROL_SELECTOR) else {
            return Vec::new();
        };

        let mut seen_cards = HashSet::new();
        let mut segments = Vec::new();

        for control in document.select(&selector) {
            let by_label = control
                .value()
                .attr("aria-label")
                .is_some_and(|label| self.is_approve_label(label));
            let by_text = matches!(control.value().name(), "button")
                || control.value().attr("role") == Some("button");
            let by_text = by_text && self.is_approve_label(&dom::inline_text(&control));
            if !by_label && !by_text {
                continue;
            }

            let card = self.locator.enclosing_container(control, self.action_bounds);
            if seen_cards.insert(card.id()) {
                segments.push(Segment::Container {
                    strategy: Strategy::ActionAnchor,
                    root: card,
                    anchor_texts: Vec::new(),
                });
            }
        }

        segments
    }

    fn link_anchor_segments<'a>(&self, document: &'a Html) -> Vec<Segment<'a>> {
        let Ok(selector) = Selector::parse(PROFILE_LINK_SELECTOR) else {
            return Vec::new();
        };
        let main = dom::main_region(document);

        // Several links can resolve to the same card; keep card order and
        // every link text so the assembler can pick the first plausible name.
        let mut cards: Vec<(ElementRef<'a>, Vec<String>)> = Vec::new();
        let mut rejected = Vec::new();

        for link in main.select(&selector) {
            let text = dom::inline_text(&link);
            let chars = text.chars().count();
            if !(LINK_TEXT_MIN_CHARS..=LINK_TEXT_MAX_CHARS).contains(&chars) {
                continue;
            }

            let card = self.locator.enclosing_container(link, self.link_bounds);
            if rejected.contains(&card.id()) {
                continue;
            }
            if let Some((_, texts)) = cards.iter_mut().find(|(c, _)| c.id() == card.id()) {
                texts.push(text);
                continue;
            }

            let card_text = dom::rendered_text(&card);
            if match_email(&card_text).is_none() && match_phone(&card_text).is_none() {
                debug!("link anchor {:?}: container has no contact field", text);
                rejected.push(card.id());
                continue;
            }
            cards.push((card, vec![text]));
        }

        cards
            .into_iter()
            .map(|(root, anchor_texts)| Segment::Container {
                strategy: Strategy::LinkAnchor,
                root,
                anchor_texts,
            })
            .collect()
    }

    fn line_anchor_segments<'a>(&self, document: &'a Html) -> Vec<Segment<'a>> {
        let lines = dom::rendered_lines(&dom::main_region(document));
        split_at_action_lines(lines, |line| {
            self.is_approve_label(line) && !NAME_LIKE_LABELS.contains(&line.trim())
        })
            .into_iter()
            .map(|lines| Segment::Lines { lines })
            .collect()
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(&SegmentConfig::default())
    }
}

/// Lines between consecutive action lines, the first chunk starting at the
/// top of the content. Anything after the last action line is dropped.
fn split_at_action_lines(
    lines: Vec<String>,
    is_action: impl Fn(&str) -> bool,
) -> Vec<Vec<String>> {
    let mut chunks = Vec::new();
    let mut current = Vec::new();
    for line in lines {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        if is_action(&line) {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    chunks
}
