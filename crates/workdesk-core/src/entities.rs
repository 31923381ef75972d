//! Entity extraction from free text.
//!
//! Pure functions that pull email addresses, trailing context, dates and times
//! out of user utterances. None of these fail: unrecognized input yields an
//! empty result or `None`.

use std::collections::HashSet;
use std::sync::OnceLock;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use regex::Regex;

fn re_email() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\w.\-]+@[\w.\-]+\.[A-Za-z]+\b").expect("email regex must compile"))
}

fn re_day_month() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d{1,2})\s+(january|february|march|april|may|june|july|august|september|october|november|december)").expect("day-month regex must compile")
    })
}

fn re_month_day() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(january|february|march|april|may|june|july|august|september|october|november|december)\s+(\d{1,2})").expect("month-day regex must compile")
    })
}

fn re_twelve_hour() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})(?::(\d{2}))?\s*(am|pm)").expect("12-hour regex must compile"))
}

/// Extract email-like addresses in order of first appearance, without duplicates.
///
/// Deduplication is case-sensitive on the literal address.
///
/// # Examples
/// ```
/// use workdesk_core::entities::extract_emails;
///
/// let found = extract_emails("cc bob@x.com, alice@example.org; bob@x.com");
/// assert_eq!(found, vec!["bob@x.com", "alice@example.org"]);
/// assert!(extract_emails("").is_empty());
/// ```
pub fn extract_emails(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for m in re_email().find_iter(text) {
        let email = m.as_str().trim().trim_matches(|c| c == ',' || c == ';');
        if !email.is_empty() && seen.insert(email.to_string()) {
            out.push(email.to_string());
        }
    }
    out
}

/// Return whatever follows the first keyword (in priority order) found in `text`.
///
/// Matching is case-insensitive but the returned slice keeps the original casing.
/// Returns an empty string when no keyword occurs.
pub fn extract_context_after_keyword(text: &str, keywords: &[&str]) -> String {
    for keyword in keywords {
        if keyword.is_empty() {
            continue;
        }
        let pattern = format!("(?i){}", regex::escape(keyword));
        let Ok(re) = Regex::new(&pattern) else {
            continue;
        };
        if let Some(m) = re.find(text) {
            return text[m.end()..].trim().to_string();
        }
    }
    String::new()
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name {
        "january" => 1,
        "february" => 2,
        "march" => 3,
        "april" => 4,
        "may" => 5,
        "june" => 6,
        "july" => 7,
        "august" => 8,
        "september" => 9,
        "october" => 10,
        "november" => 11,
        "december" => 12,
        _ => return None,
    };
    Some(month)
}

const WEEKDAYS: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

const DATE_FORMATS: [&str; 10] = [
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%d-%m-%Y",
];

/// Parse a calendar date relative to `today`.
///
/// Understands relative words (today, tomorrow, day after tomorrow, next week,
/// next month, next <weekday>), numeric and month-name formats, and bare
/// "<day> <month>" phrases which roll over to next year once already past.
pub fn parse_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let value = text.trim().to_lowercase();
    if value.is_empty() {
        return None;
    }

    match value.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "day after tomorrow" => return Some(today + Duration::days(2)),
        "next week" => return Some(today + Duration::weeks(1)),
        "next month" => return Some(today + Duration::days(30)),
        _ => {}
    }

    for (name, weekday) in WEEKDAYS {
        if value.contains(&format!("next {name}")) {
            let mut ahead = weekday.num_days_from_monday() as i64
                - today.weekday().num_days_from_monday() as i64;
            if ahead <= 0 {
                ahead += 7;
            }
            // "next friday" means the friday of the following week
            return Some(today + Duration::days(ahead + 7));
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&value, format) {
            return Some(date);
        }
    }

    let (day, month) = if let Some(caps) = re_day_month().captures(&value) {
        (caps[1].parse::<u32>().ok()?, month_number(&caps[2])?)
    } else if let Some(caps) = re_month_day().captures(&value) {
        (caps[2].parse::<u32>().ok()?, month_number(&caps[1])?)
    } else {
        return None;
    };

    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    if this_year < today {
        NaiveDate::from_ymd_opt(today.year() + 1, month, day)
    } else {
        Some(this_year)
    }
}

/// Parse a clock time such as "10pm", "10:30 p.m.", "22:00" or a bare hour "14".
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let value = text.trim().to_lowercase().replace('.', "");
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(caps) = re_twelve_hour().captures(value) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        if !(1..=12).contains(&hour) {
            return None;
        }
        let hour = match (&caps[3], hour) {
            ("pm", 12) => 12,
            ("pm", h) => h + 12,
            ("am", 12) => 0,
            (_, h) => h,
        };
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    if let Some((hour, minute)) = value.split_once(':') {
        let hour: u32 = hour.trim().parse().ok()?;
        let minute: u32 = minute.trim().parse().ok()?;
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    if value.chars().all(|c| c.is_ascii_digit()) {
        let hour: u32 = value.parse().ok()?;
        return NaiveTime::from_hms_opt(hour, 0, 0);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_extract_emails_dedup_and_order() {
        let text = "send to carol@corp.io, bob@x.com; carol@corp.io and Bob@x.com.";
        assert_eq!(
            extract_emails(text),
            vec!["carol@corp.io", "bob@x.com", "Bob@x.com"]
        );
    }

    #[test]
    fn test_extract_emails_requires_alpha_tld() {
        assert!(extract_emails("user@host").is_empty());
        assert!(extract_emails("user@host.123").is_empty());
        assert!(extract_emails("user@host.com1").is_empty());
        assert!(extract_emails("user@host.com_x").is_empty());
        assert_eq!(extract_emails("mail bob@x.com."), vec!["bob@x.com"]);
        assert_eq!(extract_emails("first.last-x@sub.domain.co"), vec!["first.last-x@sub.domain.co"]);
    }

    #[test]
    fn test_extract_emails_idempotent() {
        let text = "a@b.com junk c.d@e-f.org, a@b.com; zz@yy.net";
        let first = extract_emails(text);
        let second = extract_emails(&first.join(" "));
        assert_eq!(first, second);
    }

    #[test]
    fn test_extract_emails_control_characters() {
        assert!(extract_emails("\0\u{7}\n\t").is_empty());
        assert_eq!(extract_emails("x\0a@b.com\0"), vec!["a@b.com"]);
    }

    #[test]
    fn test_context_after_keyword_priority_and_case() {
        let text = "Please write something ABOUT the Q4 Budget for Alice";
        assert_eq!(
            extract_context_after_keyword(text, &["about", "for"]),
            "the Q4 Budget for Alice"
        );
        assert_eq!(extract_context_after_keyword(text, &["for", "about"]), "Alice");
        assert_eq!(extract_context_after_keyword(text, &["regarding"]), "");
    }

    #[test]
    fn test_parse_relative_dates() {
        // 2026-10-16 is a Friday
        let today = date(2026, 10, 16);
        assert_eq!(parse_date("Today", today), Some(today));
        assert_eq!(parse_date("tomorrow", today), Some(date(2026, 10, 17)));
        assert_eq!(parse_date("day after tomorrow", today), Some(date(2026, 10, 18)));
        assert_eq!(parse_date("next week", today), Some(date(2026, 10, 23)));
        assert_eq!(parse_date("next month", today), Some(date(2026, 11, 15)));
        assert_eq!(parse_date("next monday", today), Some(date(2026, 10, 26)));
        assert_eq!(parse_date("next friday", today), Some(date(2026, 10, 30)));
    }

    #[test]
    fn test_parse_formatted_dates() {
        let today = date(2026, 10, 16);
        assert_eq!(parse_date("2026-12-01", today), Some(date(2026, 12, 1)));
        assert_eq!(parse_date("12/01/2026", today), Some(date(2026, 12, 1)));
        assert_eq!(parse_date("Dec 01, 2026", today), Some(date(2026, 12, 1)));
        assert_eq!(parse_date("march 19", today), Some(date(2027, 3, 19)));
        assert_eq!(parse_date("19 november", today), Some(date(2026, 11, 19)));
        assert_eq!(parse_date("someday", today), None);
        assert_eq!(parse_date("february 31", today), None);
    }

    #[test]
    fn test_parse_time_formats() {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        assert_eq!(parse_time("10pm"), Some(t(22, 0)));
        assert_eq!(parse_time("10:30 p.m."), Some(t(22, 30)));
        assert_eq!(parse_time("12am"), Some(t(0, 0)));
        assert_eq!(parse_time("12 pm"), Some(t(12, 0)));
        assert_eq!(parse_time("22:00"), Some(t(22, 0)));
        assert_eq!(parse_time("14"), Some(t(14, 0)));
        assert_eq!(parse_time("13pm"), None);
        assert_eq!(parse_time("25:00"), None);
        assert_eq!(parse_time("noon"), None);
    }
}
