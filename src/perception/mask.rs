use ndarray::{Array2, Array4};

use crate::timeline::Position;

/// Colour gate for "red" pixels, all channels in 0..1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RedThresholds {
    pub red_min: f32,
    pub green_max: f32,
    pub blue_max: f32,
}

impl Default for RedThresholds {
    fn default() -> Self {
        Self {
            red_min: 0.6,
            green_max: 0.4,
            blue_max: 0.4,
        }
    }
}

/// Boolean (H, W) mask of the first image in a 0..1 NCHW batch.
/// Comparisons are strict on every channel.
pub fn red_mask(image: &Array4<f32>, t: &RedThresholds) -> Array2<bool> {
    let (_, _, h, w) = image.dim();
    Array2::from_shape_fn((h, w), |(y, x)| {
        image[[0, 0, y, x]] > t.red_min && image[[0, 1, y, x]] < t.green_max && image[[0, 2, y, x]] < t.blue_max
    })
}

/// Mean x/y index of all set pixels; `None` when nothing is set.
pub fn centroid(mask: &Array2<bool>) -> Option<Position> {
    let (mut sum_x, mut sum_y, mut count) = (0.0f64, 0.0f64, 0usize);
    for ((y, x), &hit) in mask.indexed_iter() {
        if hit {
            sum_x += x as f64;
            sum_y += y as f64;
            count += 1;
        }
    }
    if count == 0 {
        return None;
    }
    Some(Position::new(sum_x / count as f64, sum_y / count as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(pixels: &[[f32; 3]], w: usize) -> Array4<f32> {
        let h = pixels.len() / w;
        Array4::from_shape_fn((1, 3, h, w), |(_, c, y, x)| pixels[y * w + x][c])
    }

    #[test]
    fn thresholds_are_strict() {
        let img = batch(
            &[
                [0.9, 0.1, 0.1],   // red
                [0.6, 0.1, 0.1],   // R not > 0.6
                [0.9, 0.4, 0.1],   // G not < 0.4
                [0.9, 0.1, 0.4],   // B not < 0.4
                [0.61, 0.39, 0.39], // red
                [0.2, 0.2, 0.2],
            ],
            3,
        );
        let m = red_mask(&img, &RedThresholds::default());
        assert_eq!(m.dim(), (2, 3));
        assert!(m[[0, 0]]);
        assert!(!m[[0, 1]]);
        assert!(!m[[0, 2]]);
        assert!(!m[[1, 0]]);
        assert!(m[[1, 1]]);
        assert!(!m[[1, 2]]);
    }

    #[test]
    fn centroid_is_mean_of_indices() {
        let mut m = Array2::from_elem((10, 20), false);
        m[[2, 4]] = true;
        m[[2, 6]] = true;
        m[[5, 5]] = true;
        let c = centroid(&m).unwrap();
        assert!((c.x - 5.0).abs() < 1e-12);
        assert!((c.y - 3.0).abs() < 1e-12);
    }

    #[test]
    fn empty_mask_has_no_centroid() {
        assert!(centroid(&Array2::from_elem((4, 4), false)).is_none());
    }
}
