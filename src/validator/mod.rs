pub mod app;
pub mod image;
pub mod report;

pub use app::AppPillValidator;
pub use self::image::{validate_graph_image, ImagePillValidator};
