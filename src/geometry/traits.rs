use async_trait::async_trait;

use crate::errors::PillCheckResult;
use crate::timeline::Rect;

/// Anything that can resolve a UI element identifier to its screen bounds.
/// Implemented by the WebDriver session; tests use an in-memory map.
#[async_trait]
pub trait GeometrySource: Send + Sync {
    /// Fails with `ElementNotFound` when `element_id` does not resolve.
    async fn element_rect(&self, element_id: &str) -> PillCheckResult<Rect>;
}
