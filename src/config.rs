//! Numeric policy shared by the shape algebra and the rotated-conic engine.

use crate::geometry::Extent;

/// Default tolerance rule for shapes whose tolerance is computed automatically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TolerancePolicy {
    /// Smallest tolerance ever assigned.
    pub global_epsilon: f64,
    /// Fraction of the largest absolute extent coordinate.
    pub epsilon_multiplier: f64,
}

impl Default for TolerancePolicy {
    fn default() -> Self {
        Self {
            global_epsilon: 1e-10,
            epsilon_multiplier: 1e-12,
        }
    }
}

impl TolerancePolicy {
    /// Tolerance for geometry covering `extent`.
    #[must_use]
    pub fn tolerance_for(&self, extent: &Extent) -> f64 {
        if extent.is_empty() {
            return self.global_epsilon;
        }
        let largest = [extent.x_min, extent.x_max, extent.y_min, extent.y_max]
            .iter()
            .filter(|v| v.is_finite())
            .fold(0.0_f64, |acc, v| acc.max(v.abs()));
        self.global_epsilon.max(self.epsilon_multiplier * largest)
    }
}

/// Settings for the torus grid contour tracer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracerConfig {
    /// Requested angular grid step, radians.
    pub angle_step: f64,
    /// The grid step is never finer than this.
    pub min_angle_step: f64,
    /// Consecutive contour points closer than `filter_fraction * step` are merged.
    pub filter_fraction: f64,
    /// Maximum number of points delivered per handler call.
    pub max_points: usize,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            angle_step: 0.05,
            min_angle_step: 0.05,
            filter_fraction: 0.1,
            max_points: 400,
        }
    }
}

impl TracerConfig {
    /// Effective grid step.
    #[must_use]
    pub fn step(&self) -> f64 {
        self.angle_step.max(self.min_angle_step)
    }
}

/// Fixed tolerances of the rotated-conic engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConicTolerances {
    /// Residual accepted by the shared unit-circle quadratic solver.
    pub unit_circle: f64,
    /// Below this `|z|` component a normalized plane is treated as vertical.
    pub vertical_plane: f64,
    /// Lines are clipped to `[-max_line_param, max_line_param]`.
    pub max_line_param: f64,
    /// Relative size below which a radius or angle counts as zero.
    pub small_angle: f64,
}

impl Default for ConicTolerances {
    fn default() -> Self {
        Self {
            unit_circle: 1e-12,
            vertical_plane: 1e-8,
            max_line_param: 1e12,
            small_angle: 1e-10,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_has_floor() {
        let policy = TolerancePolicy::default();
        let extent = Extent::new(0.0, 0.0, 1.0, 1.0);
        assert!((policy.tolerance_for(&extent) - 1e-10).abs() < 1e-20);
    }

    #[test]
    fn tolerance_grows_with_coordinates() {
        let policy = TolerancePolicy::default();
        let extent = Extent::new(-1e6, 0.0, 1e3, 5e5);
        assert!((policy.tolerance_for(&extent) - 1e-6).abs() < 1e-15);
    }

    #[test]
    fn tracer_step_is_clamped() {
        let config = TracerConfig {
            angle_step: 0.001,
            ..TracerConfig::default()
        };
        assert!((config.step() - 0.05).abs() < 1e-15);
    }
}
