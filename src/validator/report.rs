//! Human-readable validation reports.
use crate::timeline::TimeOfDay;

fn verdict(ok: bool) -> &'static str {
    if ok {
        "Valid"
    } else {
        "Invalid"
    }
}

pub struct AppReport<'a> {
    pub time_valid: bool,
    pub expected: &'a str,
    pub actual: TimeOfDay,
    pub difference_minutes: u32,
    pub y_valid: bool,
    pub y: f64,
    pub y_limit: f64,
}

impl AppReport<'_> {
    pub fn render(&self) -> String {
        [
            format!("Time position: {}", verdict(self.time_valid)),
            format!("Expected time: {}", self.expected),
            format!("Actual time: {}", self.actual.to_12h_string()),
            format!("Difference: {} minutes", self.difference_minutes),
            format!(
                "Y-position: {} ({:.2}, limit {:.2})",
                verdict(self.y_valid),
                self.y,
                self.y_limit
            ),
        ]
        .join("\n")
    }
}

pub struct ImageReport<'a> {
    pub time_valid: bool,
    pub expected: &'a str,
    pub detected: TimeOfDay,
    pub x_difference: f64,
    pub x_tolerance: f64,
    pub y_valid: bool,
    pub y: f64,
}

impl ImageReport<'_> {
    pub fn render(&self) -> String {
        [
            format!("Time position: {}", verdict(self.time_valid)),
            format!("Expected time: {}", self.expected),
            format!("Detected time: {}", self.detected),
            format!(
                "X difference: {:.2} pixels (tolerance: {:.2})",
                self.x_difference, self.x_tolerance
            ),
            "Time check: pixel distance (detected time is truncated to the minute)".to_string(),
            format!("Y position: {} ({:.2})", verdict(self.y_valid), self.y),
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_report_lines() {
        let text = AppReport {
            time_valid: false,
            expected: "8:00 PM",
            actual: TimeOfDay::new(20, 6).unwrap(),
            difference_minutes: 6,
            y_valid: true,
            y: 12.0,
            y_limit: 45.0,
        }
        .render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Time position: Invalid",
                "Expected time: 8:00 PM",
                "Actual time: 08:06 PM",
                "Difference: 6 minutes",
                "Y-position: Valid (12.00, limit 45.00)",
            ]
        );
    }

    #[test]
    fn image_report_lines() {
        let text = ImageReport {
            time_valid: true,
            expected: "8:00 PM",
            detected: TimeOfDay::new(20, 1).unwrap(),
            x_difference: 1.234,
            x_tolerance: 8.333,
            y_valid: false,
            y: 70.5,
        }
        .render();
        assert!(text.contains("Detected time: 20:01"));
        assert!(text.contains("X difference: 1.23 pixels (tolerance: 8.33)"));
        assert!(text.contains("Time check: pixel distance"));
        assert!(text.ends_with("Y position: Invalid (70.50)"));
    }
}
