/// Driver-based pill validation: element rectangles from a [`GeometrySource`].
use crate::errors::{PillCheckError, PillCheckResult};
use crate::geometry::GeometrySource;
use crate::timeline::{self, Position, Rect, TimeOfDay, ValidationResult};
use crate::validator::report::AppReport;

pub struct AppPillValidator<'a, S: GeometrySource + ?Sized> {
    source: &'a S,
    /// Set once by [`Self::load_graph_bounds`]; read-only afterwards.
    graph_bounds: Option<Rect>,
}

impl<'a, S: GeometrySource + ?Sized> AppPillValidator<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            graph_bounds: None,
        }
    }

    /// Query and cache the rectangle of the element spanning the 24h timeline.
    pub async fn load_graph_bounds(&mut self, graph_element_id: &str) -> PillCheckResult<Rect> {
        let rect = self.source.element_rect(graph_element_id).await?;
        tracing::debug!(element = %graph_element_id, width = rect.width, height = rect.height, "graph bounds cached");
        self.graph_bounds = Some(rect);
        Ok(rect)
    }

    pub fn graph_bounds(&self) -> Option<Rect> {
        self.graph_bounds
    }

    fn bounds(&self) -> PillCheckResult<&Rect> {
        self.graph_bounds.as_ref().ok_or(PillCheckError::UninitializedBounds)
    }

    /// Pill origin relative to the graph origin.
    pub async fn pill_position(&self, pill_element_id: &str) -> PillCheckResult<Position> {
        let graph = *self.bounds()?;
        let pill = self.source.element_rect(pill_element_id).await?;
        Ok(graph.relative_origin_of(&pill))
    }

    pub fn convert_position_to_time(&self, x: f64) -> PillCheckResult<TimeOfDay> {
        timeline::position_to_time(x, self.bounds()?.width)
    }

    /// Check the pill sits at `expected_time` (`H:MM AM/PM`) within
    /// `tolerance_minutes` and inside the graph's top band.
    pub async fn validate_pill_position(
        &self,
        pill_element_id: &str,
        expected_time: &str,
        tolerance_minutes: u32,
    ) -> PillCheckResult<ValidationResult> {
        let expected = timeline::parse_time_12h(expected_time)?;
        let graph = *self.bounds()?;

        let position = self.pill_position(pill_element_id).await?;
        let actual = self.convert_position_to_time(position.x)?;

        let cmp = timeline::compare_times(expected, actual, tolerance_minutes);
        let y_valid = timeline::in_top_band(position.y, graph.height);
        let is_valid = cmp.within_tolerance && y_valid;

        tracing::info!(
            pill = %pill_element_id,
            expected = %expected,
            actual = %actual,
            difference = cmp.difference_minutes,
            y = position.y,
            valid = is_valid,
            "pill position checked"
        );

        let message = AppReport {
            time_valid: cmp.within_tolerance,
            expected: expected_time,
            actual,
            difference_minutes: cmp.difference_minutes,
            y_valid,
            y: position.y,
            y_limit: timeline::check::top_band_limit(graph.height),
        }
        .render();

        Ok(ValidationResult { is_valid, message })
    }
}
