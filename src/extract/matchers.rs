//! Email / phone token recognition over arbitrary rendered text.
//!
//! Both matchers are first-match-wins: the leftmost hit of the first pattern
//! that matches anything is returned, and only one value per call.

use regex::Regex;
use std::sync::OnceLock;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static PHONE_RES: OnceLock<Vec<Regex>> = OnceLock::new();
static GENERIC_PHONE_RE: OnceLock<Regex> = OnceLock::new();

/// Digits a generic phone-shaped run must carry.
const GENERIC_MIN_DIGITS: usize = 9;

fn email_re() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"[\w.+\-]+@[\w\-]+(?:\.[\w\-]+)*\.[A-Za-z]{2,}").expect("valid email regex")
    })
}

/// Region-specific patterns, most specific first. Separators are space,
/// hyphen or dot only; a newline never joins two halves of a number.
fn phone_res() -> &'static [Regex] {
    PHONE_RES.get_or_init(|| {
        [
            // 050-1234567, 050 123 4567, 03-123-4567
            r"\b0[2-9]\d?[ \-.]\d{3}[ \-.]?\d{3,4}\b",
            // 0501234567, 031234567
            r"\b0[2-9]\d{7,8}\b",
            // +972 50-123-4567, +972501234567, +1 (555) 123-4567
            r"\+\d{1,3}[ \-.]?\(?\d{1,3}\)?[ \-.]?\d{3}[ \-.]?\d{3,4}\b",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid phone regex"))
        .collect()
    })
}

fn generic_phone_re() -> &'static Regex {
    GENERIC_PHONE_RE.get_or_init(|| {
        Regex::new(r"\+?\d[\d \-.()]*\d").expect("valid generic phone regex")
    })
}

/// First `local@domain.tld` token in `text`.
pub fn match_email(text: &str) -> Option<&str> {
    email_re().find(text).map(|m| m.as_str())
}

/// First phone-shaped token in `text`, trimmed.
///
/// The permissive digit-run pattern only engages when none of the
/// region-specific ones match anywhere in the text.
pub fn match_phone(text: &str) -> Option<&str> {
    for re in phone_res() {
        if let Some(m) = re.find(text) {
            return Some(m.as_str().trim());
        }
    }

    generic_phone_re()
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .find(|candidate| {
            candidate.chars().filter(|c| c.is_ascii_digit()).count() >= GENERIC_MIN_DIGITS
        })
}
