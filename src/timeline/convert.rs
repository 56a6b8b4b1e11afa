use crate::errors::{PillCheckError, PillCheckResult};
use crate::timeline::types::TimeOfDay;

/// The graph's horizontal span covers one full day.
pub const HOURS_PER_SPAN: f64 = 24.0;
pub const MINUTES_PER_SPAN: f64 = HOURS_PER_SPAN * 60.0;

/// Map a horizontal offset inside a container of `container_width` pixels to a
/// time of day. Hours and minutes are truncated, never rounded.
///
/// `x` must lie in `[0, container_width]`; anything else is
/// [`PillCheckError::OutOfBounds`]. The right edge (which would be 24:00)
/// reports 23:59.
pub fn position_to_time(x: f64, container_width: f64) -> PillCheckResult<TimeOfDay> {
    if !(container_width > 0.0) || !container_width.is_finite() {
        return Err(PillCheckError::UninitializedBounds);
    }

    if !(0.0..=container_width).contains(&x) {
        return Err(PillCheckError::OutOfBounds { x, width: container_width });
    }

    let hours = (x / container_width) * HOURS_PER_SPAN;
    let hour = hours.floor();
    let minute = ((hours - hour) * 60.0).floor();

    let (hour, minute) = if hour >= HOURS_PER_SPAN {
        (23, 59)
    } else {
        (hour as u32, (minute as u32).min(59))
    };

    TimeOfDay::new(hour, minute).ok_or(PillCheckError::UninitializedBounds)
}

/// Inverse of [`position_to_time`]: the x offset where `time` sits on a
/// timeline `width` pixels wide.
pub fn time_to_x_position(time: TimeOfDay, width: f64) -> f64 {
    (time.fractional_hours() / HOURS_PER_SPAN) * width
}

/// Pixel distance equivalent to `tolerance_minutes` on a `width`-pixel timeline.
pub fn minutes_to_pixels(tolerance_minutes: u32, width: f64) -> f64 {
    (tolerance_minutes as f64 / MINUTES_PER_SPAN) * width
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64, w: f64) -> (u32, u32) {
        let t = position_to_time(x, w).unwrap();
        (t.hour(), t.minute())
    }

    #[test]
    fn hundred_pixels_per_hour() {
        assert_eq!(at(1600.0, 2400.0), (16, 0));
        assert_eq!(at(1650.0, 2400.0), (16, 30));
        assert_eq!(at(0.0, 2400.0), (0, 0));
    }

    #[test]
    fn truncates_instead_of_rounding() {
        // 1599.9 px is 15:59.94 -> 15:59
        assert_eq!(at(1599.9, 2400.0), (15, 59));
        assert_eq!(at(26.0, 2400.0), (0, 15));
        assert_eq!(at(24.9, 2400.0), (0, 14));
    }

    #[test]
    fn right_edge_reports_last_minute() {
        assert_eq!(at(2400.0, 2400.0), (23, 59));
    }

    #[test]
    fn off_graph_x_is_out_of_bounds() {
        for x in [5000.0, 2400.5, -0.1, -900.0, f64::NAN] {
            assert!(
                matches!(position_to_time(x, 2400.0), Err(PillCheckError::OutOfBounds { .. })),
                "accepted x={x}"
            );
        }
    }

    #[test]
    fn every_in_range_pixel_is_a_valid_time() {
        let w = 937.0;
        let mut x = 0.0;
        while x < w {
            let t = position_to_time(x, w).unwrap();
            assert!(t.hour() <= 23 && t.minute() <= 59);
            x += 0.37;
        }
    }

    #[test]
    fn zero_or_missing_width_is_uninitialized() {
        assert!(matches!(position_to_time(10.0, 0.0), Err(PillCheckError::UninitializedBounds)));
        assert!(matches!(
            position_to_time(10.0, f64::NAN),
            Err(PillCheckError::UninitializedBounds)
        ));
    }

    #[test]
    fn round_trips_through_x() {
        let w = 2400.0;
        for x in [0.0, 600.0, 1200.0, 1600.0, 2350.0] {
            let back = time_to_x_position(position_to_time(x, w).unwrap(), w);
            // minute resolution: at most one minute of pixels lost
            assert!((back - x).abs() <= w / MINUTES_PER_SPAN, "x={x} back={back}");
        }
        let noon = position_to_time(w / 2.0, w).unwrap();
        assert_eq!(noon, TimeOfDay::new(12, 0).unwrap());
        assert_eq!(time_to_x_position(noon, w), w / 2.0);
    }

    #[test]
    fn tolerance_in_pixels() {
        assert!((minutes_to_pixels(5, 1440.0) - 5.0).abs() < 1e-9);
        assert!((minutes_to_pixels(60, 2400.0) - 100.0).abs() < 1e-9);
    }
}
