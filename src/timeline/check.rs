use crate::timeline::types::TimeOfDay;

/// Pills must sit in the top 15% of the graph.
pub const TOP_BAND_FRACTION: f64 = 0.15;

pub const DEFAULT_TOLERANCE_MINUTES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeComparison {
    pub difference_minutes: u32,
    pub within_tolerance: bool,
}

/// Linear minute difference. Midnight is not wrapped: 23:59 and 00:01 are
/// 1438 minutes apart.
pub fn compare_times(expected: TimeOfDay, actual: TimeOfDay, tolerance_minutes: u32) -> TimeComparison {
    let difference_minutes = expected
        .minutes_since_midnight()
        .abs_diff(actual.minutes_since_midnight());
    TimeComparison {
        difference_minutes,
        within_tolerance: difference_minutes <= tolerance_minutes,
    }
}

/// Largest y offset still inside the top band of a container `height` tall.
pub fn top_band_limit(height: f64) -> f64 {
    height * TOP_BAND_FRACTION
}

/// No lower bound: anything at or above the container top passes.
pub fn in_top_band(y: f64, height: f64) -> bool {
    y <= top_band_limit(height)
}
