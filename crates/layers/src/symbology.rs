use scene::components::Color;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum RampError {
    #[error("degenerate range: min and max are both {value}")]
    DegenerateRange { value: f64 },
    #[error("non-finite input to color ramp")]
    NonFinite,
    #[error("color ramp has no stops")]
    Empty,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct GradientStop {
    /// Position along the ramp in `[0, 1]`.
    pub offset: f32,
    pub color: Color,
}

impl GradientStop {
    pub const fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Piecewise-linear color gradient over normalized values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorRamp {
    stops: Vec<GradientStop>,
}

impl ColorRamp {
    /// Stops are sorted by offset; offsets are clamped into `[0, 1]`.
    pub fn new(mut stops: Vec<GradientStop>) -> Result<Self, RampError> {
        if stops.is_empty() {
            return Err(RampError::Empty);
        }
        if stops.iter().any(|s| !s.offset.is_finite()) {
            return Err(RampError::NonFinite);
        }
        for stop in &mut stops {
            stop.offset = stop.offset.clamp(0.0, 1.0);
        }
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        Ok(Self { stops })
    }

    /// Blue at the low end, green in the middle, red at the high end.
    pub fn elevation() -> Self {
        Self {
            stops: vec![
                GradientStop::new(0.0, Color::BLUE),
                GradientStop::new(0.5, Color::GREEN),
                GradientStop::new(1.0, Color::RED),
            ],
        }
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Color at normalized position `t`, clamped into `[0, 1]`.
    pub fn sample(&self, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let first = self.stops[0];
        if t <= first.offset {
            return first.color;
        }
        for pair in self.stops.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if t <= hi.offset {
                let span = hi.offset - lo.offset;
                if span <= 0.0 {
                    return hi.color;
                }
                return lo.color.lerp(hi.color, (t - lo.offset) / span);
            }
        }
        self.stops[self.stops.len() - 1].color
    }

    /// Color for `value` within `[min, max]`. Values outside the range take
    /// the end colors.
    pub fn color_for(&self, value: f64, min: f64, max: f64) -> Result<Color, RampError> {
        if !(value.is_finite() && min.is_finite() && max.is_finite()) {
            return Err(RampError::NonFinite);
        }
        if min == max {
            return Err(RampError::DegenerateRange { value: min });
        }
        let t = (value - min) / (max - min);
        Ok(self.sample(t as f32))
    }
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self::elevation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_color(actual: Color, expected: Color) {
        let close = |a: f32, b: f32| (a - b).abs() <= 1e-6;
        assert!(
            close(actual.r, expected.r) && close(actual.g, expected.g) && close(actual.b, expected.b),
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn endpoints_and_midpoint() {
        let ramp = ColorRamp::default();
        assert_color(ramp.color_for(100.0, 100.0, 300.0).unwrap(), Color::BLUE);
        assert_color(ramp.color_for(200.0, 100.0, 300.0).unwrap(), Color::GREEN);
        assert_color(ramp.color_for(300.0, 100.0, 300.0).unwrap(), Color::RED);
    }

    #[test]
    fn interpolates_between_stops() {
        let ramp = ColorRamp::default();
        let quarter = ramp.color_for(25.0, 0.0, 100.0).unwrap();
        assert_color(quarter, Color::rgb(0.0, 0.5, 0.5));
        let three_quarters = ramp.sample(0.75);
        assert_color(three_quarters, Color::rgb(0.5, 0.5, 0.0));
    }

    #[test]
    fn out_of_range_values_clamp_to_end_colors() {
        let ramp = ColorRamp::default();
        assert_color(ramp.color_for(-50.0, 0.0, 10.0).unwrap(), Color::BLUE);
        assert_color(ramp.color_for(99.0, 0.0, 10.0).unwrap(), Color::RED);
    }

    #[test]
    fn rejects_degenerate_and_non_finite_input() {
        let ramp = ColorRamp::default();
        assert_eq!(
            ramp.color_for(5.0, 5.0, 5.0),
            Err(RampError::DegenerateRange { value: 5.0 })
        );
        assert_eq!(
            ramp.color_for(f64::NAN, 0.0, 1.0),
            Err(RampError::NonFinite)
        );
        assert_eq!(
            ramp.color_for(0.5, 0.0, f64::INFINITY),
            Err(RampError::NonFinite)
        );
    }

    #[test]
    fn custom_stops_are_sorted() {
        let ramp = ColorRamp::new(vec![
            GradientStop::new(1.0, Color::RED),
            GradientStop::new(0.0, Color::BLUE),
        ])
        .unwrap();
        assert_eq!(ramp.stops()[0].color, Color::BLUE);
        assert_color(ramp.sample(0.5), Color::rgb(0.5, 0.0, 0.5));
        assert_eq!(ColorRamp::new(Vec::new()), Err(RampError::Empty));
    }
}
