pub mod annotator;
pub mod mask;
pub mod tensor;

pub use mask::{centroid, red_mask, RedThresholds};
pub use tensor::{denormalize, load_rgb, to_normalized_tensor, Normalization};
