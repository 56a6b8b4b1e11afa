/// Strict parser for the `H:MM AM/PM` expected-time format.
///
/// Accepts an hour of 1–12 (optionally zero-padded), a two-digit minute,
/// exactly one space and an upper-case meridiem. Everything else is a
/// [`PillCheckError::Format`].
use std::sync::OnceLock;

use regex::Regex;

use crate::errors::{PillCheckError, PillCheckResult};
use crate::timeline::types::TimeOfDay;

const TIME_PATTERN: &str = r"^(0?[1-9]|1[0-2]):([0-5][0-9]) (AM|PM)$";

static TIME_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn time_regex() -> PillCheckResult<&'static Regex> {
    TIME_RE
        .get_or_init(|| Regex::new(TIME_PATTERN).ok())
        .as_ref()
        .ok_or_else(|| PillCheckError::Format("time pattern failed to compile".into()))
}

pub fn parse_time_12h(input: &str) -> PillCheckResult<TimeOfDay> {
    let caps = time_regex()?
        .captures(input)
        .ok_or_else(|| PillCheckError::Format(format!("expected `H:MM AM/PM`, got {input:?}")))?;

    let hour12: u32 = caps[1]
        .parse()
        .map_err(|_| PillCheckError::Format(format!("bad hour in {input:?}")))?;
    let minute: u32 = caps[2]
        .parse()
        .map_err(|_| PillCheckError::Format(format!("bad minute in {input:?}")))?;

    let hour = match (&caps[3], hour12) {
        ("AM", 12) => 0,
        ("AM", h) => h,
        ("PM", 12) => 12,
        (_, h) => h + 12,
    };

    TimeOfDay::new(hour, minute)
        .ok_or_else(|| PillCheckError::Format(format!("time out of range: {input:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(s: &str) -> (u32, u32) {
        let t = parse_time_12h(s).unwrap();
        (t.hour(), t.minute())
    }

    #[test]
    fn parses_meridiem_edges() {
        assert_eq!(hm("8:00 PM"), (20, 0));
        assert_eq!(hm("08:00 PM"), (20, 0));
        assert_eq!(hm("12:00 AM"), (0, 0));
        assert_eq!(hm("12:30 PM"), (12, 30));
        assert_eq!(hm("11:59 PM"), (23, 59));
        assert_eq!(hm("4:00 PM"), (16, 0));
    }

    #[test]
    fn accepts_own_12h_output() {
        let t = TimeOfDay::new(7, 45).unwrap();
        assert_eq!(parse_time_12h(&t.to_12h_string()).unwrap(), t);
    }

    #[test]
    fn rejects_everything_else() {
        for bad in [
            "", "8 PM", "8:0 PM", "8:00PM", "8:00  PM", "8:00 pm", "13:00 PM", "0:30 AM",
            "8:60 AM", "20:00", " 8:00 PM", "8:00 PM ", "8:00 XM",
        ] {
            assert!(
                matches!(parse_time_12h(bad), Err(PillCheckError::Format(_))),
                "accepted {bad:?}"
            );
        }
    }
}
