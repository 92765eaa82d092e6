use super::dom;
use super::matchers::{match_email, match_phone};
use super::names::NamePolicy;
use super::segment::Segment;
use crate::core::config::ContactRule;
use crate::types::Record;
use scraper::Selector;
use std::collections::HashSet;
use tracing::debug;

/// "Likely name" locations inside a card, in preference order.
const NAME_SELECTORS: &[&str] = &[
    r#"a[role="link"] span"#,
    r#"a[href*="/user/"] span"#,
    r#"a[href*="facebook.com/"] strong"#,
    "a strong",
    r#"a[href*="/user/"]"#,
    r#"a[href*="profile.php"]"#,
    r#"a[role="link"]"#,
    "h1, h2, h3, h4",
    "strong, b",
];

/// Turns segments into records for one run.
///
/// Holds the run's seen-set, so a name is emitted at most once and the
/// first segment that resolves to it wins.
pub struct RecordAssembler<'p> {
    policy: &'p NamePolicy,
    rule: ContactRule,
    date: String,
    seen: HashSet<String>,
}

impl<'p> RecordAssembler<'p> {
    pub fn new(policy: &'p NamePolicy, rule: ContactRule, date: impl Into<String>) -> Self {
        Self {
            policy,
            rule,
            date: date.into(),
            seen: HashSet::new(),
        }
    }

    pub fn assemble(&mut self, segment: &Segment<'_>) -> Option<Record> {
        let Some(name) = self.resolve_name(segment) else {
            debug!("{} segment dropped: no plausible name", segment.strategy());
            return None;
        };
        if self.seen.contains(&name) {
            debug!("duplicate name dropped: {:?}", name);
            return None;
        }

        let text = segment.text();
        let record = Record {
            email: match_email(&text).unwrap_or_default().to_string(),
            phone: match_phone(&text).unwrap_or_default().to_string(),
            name,
            date: self.date.clone(),
        };

        if self.rule.requires_contact(segment.strategy()) && !record.has_contact() {
            debug!(
                "{} segment dropped: {:?} has no email or phone",
                segment.strategy(),
                record.name
            );
            return None;
        }

        self.seen.insert(record.name.clone());
        Some(record)
    }

    /// Assembles every segment in order, skipping the ones that yield nothing.
    pub fn assemble_all(&mut self, segments: &[Segment<'_>]) -> Vec<Record> {
        segments.iter().filter_map(|s| self.assemble(s)).collect()
    }

    pub fn emitted(&self) -> usize {
        self.seen.len()
    }

    fn resolve_name(&self, segment: &Segment<'_>) -> Option<String> {
        match segment {
            Segment::Container {
                root, anchor_texts, ..
            } => anchor_texts
                .iter()
                .find_map(|t| self.policy.qualify(t))
                .or_else(|| {
                    NAME_SELECTORS.iter().find_map(|css| {
                        let selector = Selector::parse(css).ok()?;
                        root.select(&selector)
                            .find_map(|el| self.policy.qualify(&dom::inline_text(&el)))
                    })
                }),
            Segment::Lines { lines } => lines.iter().find_map(|l| self.policy.qualify(l)),
        }
    }
}

/// Today's capture stamp, `DD/MM/YYYY`.
pub fn capture_date() -> String {
    chrono::Local::now().format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::segment::Segmenter;
    use crate::types::Strategy;
    use scraper::Html;

    const TWO_CARDS_SAME_NAME: &str = r#"
        <body><div role="main">
          <div data-harvest-h="200"><a role="link" href="/user/1/"><span>Dana Levi</span></a>
               <div>first@example.com</div><div role="button" aria-label="Approve"></div></div>
          <div data-harvest-h="200"><a role="link" href="/user/9/"><span>Dana Levi</span></a>
               <div>second@example.com</div><div role="button" aria-label="Approve"></div></div>
        </div></body>"#;

    #[test]
    fn test_dedup_keeps_first_segment() {
        let doc = Html::parse_document(TWO_CARDS_SAME_NAME);
        let segments = Segmenter::default().segment_with(Strategy::ActionAnchor, &doc);
        assert_eq!(segments.len(), 2);

        let policy = NamePolicy::default();
        let mut assembler = RecordAssembler::new(&policy, ContactRule::default(), "19/10/2026");
        let records = assembler.assemble_all(&segments);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Dana Levi");
        assert_eq!(records[0].email, "first@example.com");
        assert_eq!(records[0].date, "19/10/2026");
        assert_eq!(assembler.emitted(), 1);
    }

    #[test]
    fn test_name_prefers_link_span_over_heading() {
        let doc = Html::parse_document(
            r#"<div id="c" data-harvest-h="200"><h3>Approve all</h3><strong>Group rules</strong>
                 <a role="link" href="/user/5/"><span>Noa Bar</span></a>
                 <div role="button" aria-label="Approve"></div></div>"#,
        );
        let segments = Segmenter::default().segment_with(Strategy::ActionAnchor, &doc);
        let policy = NamePolicy::default();
        let mut assembler = RecordAssembler::new(&policy, ContactRule::default(), "01/01/2026");
        let record = assembler.assemble(&segments[0]).unwrap();
        assert_eq!(record.name, "Noa Bar");
        assert!(!record.has_contact());
    }

    #[test]
    fn test_name_from_plain_profile_link_text() {
        let doc = Html::parse_document(
            r#"<body><div role="main">
                 <div data-harvest-h="200"><a href="/groups/5/user/1/">Dana Levi</a>
                      <div>dana@example.com</div><div role="button" aria-label="Approve"></div></div>
                 <div data-harvest-h="200"><a href="https://www.facebook.com/profile.php?id=2">Yossi Cohen</a>
                      <div>050-1234567</div><div role="button" aria-label="Approve"></div></div>
               </div></body>"#,
        );
        let segments = Segmenter::default().segment_with(Strategy::ActionAnchor, &doc);
        let policy = NamePolicy::default();
        let mut assembler = RecordAssembler::new(&policy, ContactRule::default(), "01/01/2026");
        let records = assembler.assemble_all(&segments);
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Dana Levi", "Yossi Cohen"]);
        assert_eq!(records[1].phone, "050-1234567");
    }

    #[test]
    fn test_line_segment_skips_boilerplate_lines() {
        let segment = Segment::Lines {
            lines: vec![
                "דחייה".to_string(),
                "Requested 2 hours ago".to_string(),
                "Avi Mizrahi".to_string(),
                "What's your phone?".to_string(),
                "054-9876543".to_string(),
            ],
        };
        let policy = NamePolicy::default();
        let mut assembler = RecordAssembler::new(&policy, ContactRule::default(), "01/01/2026");
        let record = assembler.assemble(&segment).unwrap();
        assert_eq!(record.name, "Avi Mizrahi");
        assert_eq!(record.phone, "054-9876543");
        assert_eq!(record.email, "");
    }

    #[test]
    fn test_line_segment_without_contact_is_dropped_by_default() {
        let segment = Segment::Lines {
            lines: vec!["Avi Mizrahi".to_string(), "Hello".to_string()],
        };
        let policy = NamePolicy::default();
        let mut assembler = RecordAssembler::new(&policy, ContactRule::default(), "01/01/2026");
        assert!(assembler.assemble(&segment).is_none());

        let mut lenient = RecordAssembler::new(&policy, ContactRule::Never, "01/01/2026");
        assert_eq!(lenient.assemble(&segment).unwrap().name, "Avi Mizrahi");
    }

    #[test]
    fn test_dropped_contactless_name_can_still_appear_later() {
        let policy = NamePolicy::default();
        let mut assembler = RecordAssembler::new(&policy, ContactRule::default(), "01/01/2026");
        let without = Segment::Lines {
            lines: vec!["Avi Mizrahi".to_string()],
        };
        let with = Segment::Lines {
            lines: vec!["Avi Mizrahi".to_string(), "avi@example.com".to_string()],
        };
        assert!(assembler.assemble(&without).is_none());
        assert_eq!(assembler.assemble(&with).unwrap().email, "avi@example.com");
    }

    #[test]
    fn test_capture_date_format() {
        let date = capture_date();
        assert_eq!(date.len(), 10);
        assert_eq!(&date[2..3], "/");
        assert_eq!(&date[5..6], "/");
    }
}
