use crate::error::Result;
use crate::geometry::{Extent, Pline, RotationDirection};
use crate::math::{Matrix3, Point2, Vector2};
use crate::operations::Region;

use super::kind::ShapeKind;

/// Several disjoint simple or holed shapes taken together.
///
/// Produced when an operation splits a region into separate parts. Parts
/// never nest another complex shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComplexShape {
    parts: Vec<ShapeKind>,
}

impl ComplexShape {
    /// Collects `parts`, flattening nested complex shapes.
    #[must_use]
    pub fn new(parts: impl IntoIterator<Item = ShapeKind>) -> Self {
        let mut flat = Vec::new();
        for part in parts {
            match part {
                ShapeKind::Complex(inner) => flat.extend(inner.parts),
                other => flat.push(other),
            }
        }
        Self { parts: flat }
    }

    #[must_use]
    pub fn parts(&self) -> &[ShapeKind] {
        &self.parts
    }

    #[must_use]
    pub fn into_parts(self) -> Vec<ShapeKind> {
        self.parts
    }

    #[must_use]
    pub fn is_empty(&self, tol: f64) -> bool {
        self.parts.iter().all(|p| p.is_empty(tol))
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.parts.iter().map(ShapeKind::area).sum()
    }

    #[must_use]
    pub fn perimeter(&self) -> f64 {
        self.parts.iter().map(ShapeKind::perimeter).sum()
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        self.parts
            .iter()
            .fold(Extent::empty(), |acc, p| acc.union(&p.extent()))
    }

    #[must_use]
    pub fn is_point_in(&self, p: &Point2, tol: f64) -> bool {
        self.parts.iter().any(|part| part.is_point_in(p, tol))
    }

    #[must_use]
    pub fn is_point_on(&self, p: &Point2, tol: f64) -> bool {
        self.parts.iter().any(|part| part.is_point_on(p, tol))
    }

    #[must_use]
    pub fn closest_point(&self, p: &Point2, tol: f64) -> Option<Point2> {
        self.parts
            .iter()
            .filter_map(|part| part.closest_point(p, tol))
            .min_by(|a, b| (a - p).norm().total_cmp(&(b - p).norm()))
    }

    #[must_use]
    pub fn boundaries(&self, direction: RotationDirection, tol: f64) -> Vec<Pline> {
        self.parts
            .iter()
            .flat_map(|part| part.boundaries(direction, tol))
            .collect()
    }

    /// Parts are disjoint, so their loops simply add up.
    #[must_use]
    pub fn region(&self, tol: f64) -> Region {
        let mut region = Region::default();
        for part in &self.parts {
            let r = part.region(tol);
            region.loops.extend(r.loops);
            region.unbounded |= r.unbounded;
        }
        region
    }

    #[must_use]
    pub fn translated(&self, d: &Vector2) -> Self {
        Self::new(self.parts.iter().map(|p| p.translated(d)))
    }

    #[must_use]
    pub fn scaled(&self, factor: f64, origin: &Point2) -> Self {
        Self::new(self.parts.iter().map(|p| p.scaled(factor, origin)))
    }

    /// # Errors
    ///
    /// See [`ShapeKind::transformed`].
    pub fn transformed(&self, m: &Matrix3, tol: f64) -> Result<Self> {
        let parts = self
            .parts
            .iter()
            .map(|p| p.transformed(m, tol))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(parts))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shape::{Rectangle, SimpleShape};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> ShapeKind {
        ShapeKind::Simple(SimpleShape::Rectangle(Rectangle::new(x0, y0, x1, y1)))
    }

    #[test]
    fn nested_complex_is_flattened() {
        let inner = ComplexShape::new([rect(0.0, 0.0, 1.0, 1.0), rect(2.0, 0.0, 3.0, 1.0)]);
        let outer = ComplexShape::new([ShapeKind::Complex(inner), rect(5.0, 0.0, 6.0, 2.0)]);
        assert_eq!(outer.parts().len(), 3);
        assert!((outer.area() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn point_in_any_part() {
        let c = ComplexShape::new([rect(0.0, 0.0, 1.0, 1.0), rect(2.0, 0.0, 3.0, 1.0)]);
        assert!(c.is_point_in(&Point2::new(2.5, 0.5), 1e-10));
        assert!(!c.is_point_in(&Point2::new(1.5, 0.5), 1e-10));
        let e = c.extent();
        assert!((e.x_max - 3.0).abs() < 1e-12);
        assert_eq!(c.region(1e-10).loops.len(), 2);
    }
}
