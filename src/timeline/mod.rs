//! Position/time arithmetic shared by the driver-based and image-based validators.
pub mod check;
pub mod convert;
pub mod format;
pub mod types;

pub use check::{compare_times, in_top_band, TimeComparison, DEFAULT_TOLERANCE_MINUTES, TOP_BAND_FRACTION};
pub use convert::{minutes_to_pixels, position_to_time, time_to_x_position};
pub use format::parse_time_12h;
pub use types::{Position, Rect, TimeOfDay, ValidationResult};
