pub mod traits;
pub mod webdriver;

pub use traits::GeometrySource;
pub use webdriver::WebDriverSession;
