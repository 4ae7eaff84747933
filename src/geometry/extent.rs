use crate::math::Point2;

/// Axis-aligned 2D bounding box.
///
/// An extent with `x_min > x_max` or `y_min > y_max` is empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Extent {
    /// Creates an extent from its corners, ordering the coordinates.
    #[must_use]
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x_min: x0.min(x1),
            y_min: y0.min(y1),
            x_max: x0.max(x1),
            y_max: y0.max(y1),
        }
    }

    /// The empty extent, identity for [`Extent::union`].
    #[must_use]
    pub fn empty() -> Self {
        Self {
            x_min: f64::INFINITY,
            y_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            y_max: f64::NEG_INFINITY,
        }
    }

    /// The extent covering the whole plane.
    #[must_use]
    pub fn infinite() -> Self {
        Self {
            x_min: f64::NEG_INFINITY,
            y_min: f64::NEG_INFINITY,
            x_max: f64::INFINITY,
            y_max: f64::INFINITY,
        }
    }

    /// Smallest extent containing all `points`.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2>) -> Self {
        points
            .into_iter()
            .fold(Self::empty(), |acc, p| acc.including(p))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x_min > self.x_max || self.y_min > self.y_max
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.x_max - self.x_min
        }
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.y_max - self.y_min
        }
    }

    /// Grows the extent to contain `p`.
    #[must_use]
    pub fn including(&self, p: &Point2) -> Self {
        Self {
            x_min: self.x_min.min(p.x),
            y_min: self.y_min.min(p.y),
            x_max: self.x_max.max(p.x),
            y_max: self.y_max.max(p.y),
        }
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }

    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            x_min: self.x_min.max(other.x_min),
            y_min: self.y_min.max(other.y_min),
            x_max: self.x_max.min(other.x_max),
            y_max: self.y_max.min(other.y_max),
        }
    }

    /// True if the two boxes overlap or touch within `tol`.
    #[must_use]
    pub fn overlaps(&self, other: &Self, tol: f64) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x_min <= other.x_max + tol
            && other.x_min <= self.x_max + tol
            && self.y_min <= other.y_max + tol
            && other.y_min <= self.y_max + tol
    }

    #[must_use]
    pub fn contains_point(&self, p: &Point2, tol: f64) -> bool {
        p.x >= self.x_min - tol
            && p.x <= self.x_max + tol
            && p.y >= self.y_min - tol
            && p.y <= self.y_max + tol
    }

    /// Compares corners within `tol`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        (self.x_min - other.x_min).abs() <= tol
            && (self.y_min - other.y_min).abs() <= tol
            && (self.x_max - other.x_max).abs() <= tol
            && (self.y_max - other.y_max).abs() <= tol
    }
}
