use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Screen bounds of a container or element, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Offset of `other`'s origin relative to this rectangle's origin.
    pub fn relative_origin_of(&self, other: &Rect) -> Position {
        Position {
            x: other.x - self.x,
            y: other.y - self.y,
        }
    }
}

/// A point relative to a container's origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Wall-clock time with minute resolution. Always within 00:00..=23:59.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    /// Returns `None` when `hour > 23` or `minute > 59`.
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn minutes_since_midnight(&self) -> u32 {
        self.hour * 60 + self.minute
    }

    /// Fractional hours since midnight, e.g. 20:30 -> 20.5.
    pub fn fractional_hours(&self) -> f64 {
        self.hour as f64 + self.minute as f64 / 60.0
    }

    pub fn to_naive_time(&self) -> NaiveTime {
        // Fields are range-checked on construction.
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or_default()
    }

    /// 12-hour clock with zero-padded hour, e.g. "08:00 PM".
    pub fn to_12h_string(&self) -> String {
        self.to_naive_time().format("%I:%M %p").to_string()
    }
}

/// 24-hour clock, e.g. "20:00".
impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Outcome of one validation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub message: String,
}

impl ValidationResult {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
        }
    }

    pub fn verdict(&self) -> &'static str {
        if self.is_valid {
            "Valid"
        } else {
            "Invalid"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_of_day_rejects_out_of_range() {
        assert!(TimeOfDay::new(24, 0).is_none());
        assert!(TimeOfDay::new(23, 60).is_none());
        assert!(TimeOfDay::new(23, 59).is_some());
    }

    #[test]
    fn formats_both_clocks() {
        let t = TimeOfDay::new(20, 5).unwrap();
        assert_eq!(t.to_string(), "20:05");
        assert_eq!(t.to_12h_string(), "08:05 PM");
        assert_eq!(TimeOfDay::new(0, 0).unwrap().to_12h_string(), "12:00 AM");
    }

    #[test]
    fn relative_origin() {
        let graph = Rect::new(100.0, 400.0, 2400.0, 300.0);
        let pill = Rect::new(1700.0, 410.0, 20.0, 20.0);
        assert_eq!(graph.relative_origin_of(&pill), Position::new(1600.0, 10.0));
    }
}
