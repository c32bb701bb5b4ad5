//! Set-time extraction from free-form chat text.
//!
//! Recognised forms (the text is expected to be lowercased already):
//!
//! - `58.320 seconds`
//! - `02 minutes and 03.500 seconds`
//! - `1 hours 02 minutes and 03.500 seconds`
//!
//! Hours are a single digit, minutes exactly two digits, seconds two digits
//! with exactly three decimals. Nothing looser is accepted.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;

static SET_SCORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:(?P<h>[0-9]) hours )?(?:(?P<m>[0-9]{2}) minutes and )?(?P<s>[0-9]{2}\.[0-9]{3}) seconds",
    )
    .expect("set score pattern is valid")
});

/// A structural match of a set time inside a message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreMatch {
    /// The matched slice of the message, e.g. `"02 minutes and 03.500 seconds"`
    pub text: String,
    pub hours: Option<u32>,
    pub minutes: Option<u32>,
    pub seconds: f64,
}

impl ScoreMatch {
    fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        let hours = match caps.name("h") {
            Some(h) => Some(h.as_str().parse().ok()?),
            None => None,
        };
        let minutes = match caps.name("m") {
            Some(m) => Some(m.as_str().parse().ok()?),
            None => None,
        };
        let seconds = caps.name("s")?.as_str().parse().ok()?;

        Some(Self {
            text: caps.get(0)?.as_str().to_string(),
            hours,
            minutes,
            seconds,
        })
    }

    /// Total duration in seconds. Absent hours or minutes count as zero.
    pub fn to_seconds(&self) -> f64 {
        let hours = f64::from(self.hours.unwrap_or(0));
        let minutes = f64::from(self.minutes.unwrap_or(0));
        hours * 3600.0 + minutes * 60.0 + self.seconds
    }
}

/// Find the first set time in `text`.
pub fn find_match(text: &str) -> Option<ScoreMatch> {
    SET_SCORE
        .captures(text)
        .and_then(|caps| ScoreMatch::from_captures(&caps))
}

/// Shorthand for `find_match(text).map(|m| m.to_seconds())`.
pub fn parse_score(text: &str) -> Option<f64> {
    find_match(text).map(|m| m.to_seconds())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_seconds_only() {
        let m = find_match("ran a 58.320 seconds set today").unwrap();
        assert_eq!(m.hours, None);
        assert_eq!(m.minutes, None);
        assert_eq!(m.text, "58.320 seconds");
        assert_close(m.to_seconds(), 58.32);
    }

    #[test]
    fn test_hours_minutes_seconds() {
        let m = find_match("finished in 1 hours 02 minutes and 03.500 seconds").unwrap();
        assert_eq!(m.hours, Some(1));
        assert_eq!(m.minutes, Some(2));
        assert_close(m.to_seconds(), 3723.5);
    }

    #[test]
    fn test_minutes_and_seconds() {
        assert_close(
            parse_score("took me 01 minutes and 12.345 seconds").unwrap(),
            72.345,
        );
    }

    #[test]
    fn test_hours_without_minutes() {
        assert_close(parse_score("2 hours 10.000 seconds").unwrap(), 7210.0);
    }

    #[test]
    fn test_no_match() {
        assert_eq!(find_match("great workout!"), None);
        assert_eq!(find_match(""), None);
    }

    #[test]
    fn test_requires_three_decimals() {
        assert_eq!(find_match("ran a 58.32 seconds set today"), None);
        assert_eq!(find_match("58 seconds"), None);
    }

    #[test]
    fn test_single_digit_minutes_fall_back_to_seconds() {
        // "2 minutes and" is not a minutes clause, so only the seconds match.
        let m = find_match("2 minutes and 05.000 seconds").unwrap();
        assert_eq!(m.minutes, None);
        assert_close(m.to_seconds(), 5.0);
    }

    #[test]
    fn test_is_case_sensitive() {
        // Callers lowercase first.
        assert_eq!(find_match("58.320 SECONDS"), None);
        assert!(find_match(&"58.320 SECONDS".to_lowercase()).is_some());
    }

    #[test]
    fn test_first_match_wins() {
        let m = find_match("10.000 seconds then 20.000 seconds").unwrap();
        assert_close(m.to_seconds(), 10.0);
    }

    #[test]
    fn test_arbitrary_input_does_not_panic() {
        for text in ["\u{0}", "seconds", ".000 seconds", "٥٥.٥٥٥ seconds", "99.999"] {
            let _ = find_match(text);
        }
    }

    #[test]
    fn test_formatted_values_parse_back() {
        for hours in [0u32, 1, 5, 9] {
            for minutes in [0u32, 1, 30, 59] {
                for seconds in [0.0f64, 0.001, 12.5, 59.999] {
                    let text = format!(
                        "{hours} hours {minutes:02} minutes and {seconds:06.3} seconds"
                    );
                    let expected = f64::from(hours) * 3600.0 + f64::from(minutes) * 60.0 + seconds;
                    assert_close(parse_score(&text).unwrap(), expected);
                }
            }
        }
    }
}
