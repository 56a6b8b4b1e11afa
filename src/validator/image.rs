/// Screenshot-based pill validation: colour-threshold the graph image, take the
/// centroid of the red pixels and compare its column against the expected time.
use std::path::Path;

use ndarray::{Array2, Array4};

use crate::config::{ComputeBackend, DetectionConfig};
use crate::errors::{PillCheckError, PillCheckResult};
use crate::perception::annotator::{self, Overlay};
use crate::perception::{self, Normalization, RedThresholds};
use crate::timeline::{self, Position, ValidationResult};
use crate::validator::report::ImageReport;

pub struct ImagePillValidator {
    normalization: Normalization,
    thresholds: RedThresholds,
    backend: ComputeBackend,
}

impl ImagePillValidator {
    pub fn new(cfg: &DetectionConfig) -> PillCheckResult<Self> {
        let backend = cfg.device.resolve();
        tracing::debug!(device = ?cfg.device, backend = ?backend, "image validator ready");
        Ok(Self {
            normalization: Normalization::new(cfg.mean, cfg.std)?,
            thresholds: RedThresholds {
                red_min: cfg.red_min,
                green_max: cfg.green_max,
                blue_max: cfg.blue_max,
            },
            backend,
        })
    }

    pub fn backend(&self) -> ComputeBackend {
        self.backend
    }

    /// Normalised NCHW tensor plus the image's `(width, height)`.
    pub fn load_image(&self, path: &Path) -> PillCheckResult<(Array4<f32>, (u32, u32))> {
        let rgb = perception::load_rgb(path)?;
        Ok(self.tensor_from_rgb(&rgb))
    }

    pub fn tensor_from_rgb(&self, rgb: &image::RgbImage) -> (Array4<f32>, (u32, u32)) {
        (perception::to_normalized_tensor(rgb, &self.normalization), rgb.dimensions())
    }

    /// Red mask of a normalised tensor, evaluated in the 0..1 colour range.
    pub fn detect_red_pill(&self, tensor: &Array4<f32>) -> Array2<bool> {
        let unit = perception::denormalize(tensor, &self.normalization);
        perception::red_mask(&unit, &self.thresholds)
    }

    /// Centroid of the mask, or `None` when no pixel matched.
    pub fn find_pill_position(&self, mask: &Array2<bool>) -> Option<Position> {
        let pos = perception::centroid(mask);
        match pos {
            Some(p) => tracing::debug!(x = p.x, y = p.y, "pill centroid"),
            None => tracing::debug!("no red pixels"),
        }
        pos
    }

    /// Load `path` and locate the pill; an image without red pixels is
    /// [`PillCheckError::NoDetection`].
    pub fn locate_pill(&self, path: &Path) -> PillCheckResult<(Position, (u32, u32))> {
        let (tensor, size) = self.load_image(path)?;
        let mask = self.detect_red_pill(&tensor);
        let pos = self.find_pill_position(&mask).ok_or(PillCheckError::NoDetection)?;
        Ok((pos, size))
    }

    /// Expected x for an `H:MM AM/PM` time on an image `image_width` wide.
    pub fn time_to_x_position(&self, expected_time: &str, image_width: u32) -> PillCheckResult<f64> {
        let t = timeline::parse_time_12h(expected_time)?;
        Ok(timeline::time_to_x_position(t, image_width as f64))
    }

    /// Pixel-space check: the centroid column must be within the tolerance
    /// (converted to pixels) of the expected column, and the centroid must sit
    /// in the top band of the image.
    ///
    /// The reported detected time is truncated to the minute and is informative
    /// only; a centroid at 20:05.5 shows "20:05" yet fails a 5 minute tolerance.
    pub fn validate_position(
        &self,
        detected: Option<Position>,
        expected_time: &str,
        image_size: (u32, u32),
        tolerance_minutes: u32,
    ) -> PillCheckResult<ValidationResult> {
        let Some(pos) = detected else {
            return Ok(ValidationResult::invalid(PillCheckError::NoDetection.to_string()));
        };
        let (width, height) = image_size;

        let expected_x = self.time_to_x_position(expected_time, width)?;
        let x_tolerance = timeline::minutes_to_pixels(tolerance_minutes, width as f64);
        let x_difference = (pos.x - expected_x).abs();
        let time_valid = x_difference <= x_tolerance;

        let y_valid = timeline::in_top_band(pos.y, height as f64);
        let detected_time = timeline::position_to_time(pos.x, width as f64).map_err(|e| match e {
            PillCheckError::UninitializedBounds => {
                PillCheckError::Image(format!("image has zero width: {width}x{height}"))
            }
            other => other,
        })?;

        let is_valid = time_valid && y_valid;
        tracing::info!(
            expected = %expected_time,
            detected = %detected_time,
            x_difference,
            x_tolerance,
            y = pos.y,
            valid = is_valid,
            "pill position checked"
        );

        let message = ImageReport {
            time_valid,
            expected: expected_time,
            detected: detected_time,
            x_difference,
            x_tolerance,
            y_valid,
            y: pos.y,
        }
        .render();
        Ok(ValidationResult { is_valid, message })
    }

    /// Write `path` with detected/expected markers to `out`.
    pub fn visualize_validation(
        &self,
        path: &Path,
        detected: Option<Position>,
        expected_time: &str,
        out: &Path,
    ) -> PillCheckResult<()> {
        let rgb = perception::load_rgb(path)?;
        let width = rgb.width();
        let overlay = Overlay {
            detected,
            expected_x: self.time_to_x_position(expected_time, width)?,
            detected_time: detected.and_then(|p| timeline::position_to_time(p.x, width as f64).ok()),
        };
        let canvas = annotator::annotate(&rgb, &overlay);
        annotator::save_png(&canvas, out)
    }
}

/// Full pipeline for one image: load, detect, validate, optionally annotate.
pub fn validate_graph_image(
    validator: &ImagePillValidator,
    path: &Path,
    expected_time: &str,
    tolerance_minutes: u32,
    annotate_to: Option<&Path>,
) -> PillCheckResult<ValidationResult> {
    let (tensor, size) = validator.load_image(path)?;
    let mask = validator.detect_red_pill(&tensor);
    let detected = validator.find_pill_position(&mask);
    let result = validator.validate_position(detected, expected_time, size, tolerance_minutes)?;

    if let Some(out) = annotate_to {
        validator.visualize_validation(path, detected, expected_time, out)?;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> ImagePillValidator {
        ImagePillValidator::new(&DetectionConfig::default()).unwrap()
    }

    /// 1440x200 white graph (1px per minute) with a red square centred at (cx, cy).
    fn graph_with_pill(cx: u32, cy: u32) -> image::RgbImage {
        let mut img = image::RgbImage::from_pixel(1440, 200, image::Rgb([255, 255, 255]));
        for y in cy - 3..=cy + 3 {
            for x in cx - 3..=cx + 3 {
                img.put_pixel(x, y, image::Rgb([220, 30, 30]));
            }
        }
        img
    }

    fn locate(v: &ImagePillValidator, img: &image::RgbImage) -> Option<Position> {
        let (tensor, _) = v.tensor_from_rgb(img);
        v.find_pill_position(&v.detect_red_pill(&tensor))
    }

    #[test]
    fn centroid_of_red_square() {
        let v = validator();
        let pos = locate(&v, &graph_with_pill(1200, 20)).unwrap();
        assert!((pos.x - 1200.0).abs() < 1e-9);
        assert!((pos.y - 20.0).abs() < 1e-9);
    }

    #[test]
    fn eight_pm_within_tolerance() {
        let v = validator();
        let img = graph_with_pill(1203, 20);
        let res = v
            .validate_position(locate(&v, &img), "8:00 PM", img.dimensions(), 5)
            .unwrap();
        assert!(res.is_valid, "{}", res.message);
        assert!(res.message.contains("Detected time: 20:03"));
        assert!(res.message.contains("X difference: 3.00 pixels (tolerance: 5.00)"));
    }

    #[test]
    fn pixel_tolerance_boundary() {
        let v = validator();
        let size = (1440, 200);
        let at = |x: f64| v.validate_position(Some(Position::new(x, 0.0)), "8:00 PM", size, 5).unwrap();
        assert!(at(1205.0).is_valid);
        assert!(at(1195.0).is_valid);
        assert!(!at(1206.0).is_valid);
    }

    #[test]
    fn verdict_follows_pixels_not_truncated_minutes() {
        let v = validator();
        let res = v
            .validate_position(Some(Position::new(1205.5, 10.0)), "8:00 PM", (1440, 200), 5)
            .unwrap();
        assert!(!res.is_valid);
        assert!(res.message.contains("Detected time: 20:05"));
        assert!(res.message.contains("Time check: pixel distance"));
    }

    #[test]
    fn pill_below_top_band_is_invalid() {
        let v = validator();
        // band limit is 200 * 0.15 = 30
        let img = graph_with_pill(1200, 40);
        let res = v
            .validate_position(locate(&v, &img), "8:00 PM", img.dimensions(), 5)
            .unwrap();
        assert!(!res.is_valid);
        assert!(res.message.contains("Time position: Valid"));
        assert!(res.message.contains("Y position: Invalid (40.00)"));
    }

    #[test]
    fn no_red_pixels_reports_no_pill() {
        let v = validator();
        let img = image::RgbImage::from_pixel(100, 50, image::Rgb([255, 255, 255]));
        let detected = locate(&v, &img);
        assert!(detected.is_none());
        let res = v.validate_position(detected, "8:00 PM", img.dimensions(), 5).unwrap();
        assert!(!res.is_valid);
        assert_eq!(res.message, "No pill detected");
    }

    #[test]
    fn locate_pill_errors_without_detection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.png");
        image::RgbImage::from_pixel(30, 30, image::Rgb([10, 10, 10])).save(&path).unwrap();
        assert!(matches!(validator().locate_pill(&path), Err(PillCheckError::NoDetection)));
    }

    #[test]
    fn bad_expected_time_is_format_error() {
        let v = validator();
        assert!(matches!(
            v.validate_position(Some(Position::new(1.0, 1.0)), "8:00pm", (100, 100), 5),
            Err(PillCheckError::Format(_))
        ));
    }

    #[test]
    fn end_to_end_with_annotation() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("graph.png");
        let out = dir.path().join("annotated").join("graph.png");
        graph_with_pill(1200, 15).save(&src).unwrap();

        let res = validate_graph_image(&validator(), &src, "8:00 PM", 5, Some(&out)).unwrap();
        assert!(res.is_valid, "{}", res.message);
        let annotated = image::open(&out).unwrap();
        assert_eq!((annotated.width(), annotated.height()), (1440, 200));
    }
}
