/// Image → normalised NCHW tensor, and back to the 0..1 range.
use std::path::Path;

use ndarray::{s, Array4};

use crate::errors::{PillCheckError, PillCheckResult};

/// Per-channel `(v - mean) / std` normalisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl Normalization {
    pub fn new(mean: [f32; 3], std: [f32; 3]) -> PillCheckResult<Self> {
        if std.iter().any(|s| !(s.abs() > f32::EPSILON)) {
            return Err(PillCheckError::Config(format!(
                "normalization std must be non-zero, got {std:?}"
            )));
        }
        Ok(Self { mean, std })
    }
}

pub fn load_rgb(path: &Path) -> PillCheckResult<image::RgbImage> {
    let img = image::open(path)
        .map_err(|e| PillCheckError::Image(format!("{}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), width = img.width(), height = img.height(), "image loaded");
    Ok(img.to_rgb8())
}

/// HWC u8 → NCHW f32, scaled to [0, 1] then normalised.
pub fn to_normalized_tensor(rgb: &image::RgbImage, norm: &Normalization) -> Array4<f32> {
    let (w, h) = rgb.dimensions();
    let mut tensor = Array4::<f32>::zeros((1, 3, h as usize, w as usize));
    for (x, y, p) in rgb.enumerate_pixels() {
        for c in 0..3 {
            let v = p[c] as f32 / 255.0;
            tensor[[0, c, y as usize, x as usize]] = (v - norm.mean[c]) / norm.std[c];
        }
    }
    tensor
}

/// Undo [`to_normalized_tensor`]'s normalisation, giving values back in ~[0, 1].
pub fn denormalize(tensor: &Array4<f32>, norm: &Normalization) -> Array4<f32> {
    let mut out = tensor.clone();
    for c in 0..3 {
        let (mean, std) = (norm.mean[c], norm.std[c]);
        out.slice_mut(s![.., c, .., ..]).mapv_inplace(|v| v * std + mean);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imagenet() -> Normalization {
        Normalization::new([0.485, 0.456, 0.406], [0.229, 0.224, 0.225]).unwrap()
    }

    #[test]
    fn tensor_layout_is_nchw() {
        let mut img = image::RgbImage::new(4, 2);
        img.put_pixel(3, 1, image::Rgb([255, 0, 51]));
        let identity = Normalization::new([0.0; 3], [1.0; 3]).unwrap();
        let t = to_normalized_tensor(&img, &identity);
        assert_eq!(t.dim(), (1, 3, 2, 4));
        assert_eq!(t[[0, 0, 1, 3]], 1.0);
        assert_eq!(t[[0, 1, 1, 3]], 0.0);
        assert!((t[[0, 2, 1, 3]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn denormalize_restores_unit_range() {
        let img = image::RgbImage::from_pixel(3, 3, image::Rgb([200, 40, 90]));
        let norm = imagenet();
        let back = denormalize(&to_normalized_tensor(&img, &norm), &norm);
        for (c, expected) in [200.0f32, 40.0, 90.0].iter().enumerate() {
            assert!((back[[0, c, 1, 1]] - expected / 255.0).abs() < 1e-5);
        }
    }

    #[test]
    fn zero_std_is_rejected() {
        assert!(Normalization::new([0.5; 3], [0.2, 0.0, 0.2]).is_err());
    }

    #[test]
    fn missing_file_is_image_error() {
        let err = load_rgb(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, PillCheckError::Image(_)));
    }
}
