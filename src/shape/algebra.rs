//! The four set operators on shape geometry, dispatched on both operand
//! kinds.
//!
//! The sentinels act as identity or absorbing elements, two rectangles
//! intersect directly, holed shapes with a bounded outer boundary go
//! through their combinators, and everything else runs the loop-set
//! engine.

use tracing::{debug, instrument};

use crate::error::Result;
use crate::operations::{boolean_execute, BooleanOp};

use super::kind::ShapeKind;
use super::simple::SimpleShape;

/// `a ∪ b`.
///
/// # Errors
///
/// Propagates engine and shape construction errors.
#[instrument(level = "debug", skip(a, b))]
pub fn unify(a: &ShapeKind, b: &ShapeKind, tol: f64) -> Result<ShapeKind> {
    if a.is_universe() || b.is_universe() {
        return Ok(SimpleShape::Universe.into());
    }
    if a.is_empty(tol) {
        return Ok(b.clone());
    }
    if b.is_empty(tol) {
        return Ok(a.clone());
    }
    match (a, b) {
        (ShapeKind::Holed(h), ShapeKind::Simple(s)) | (ShapeKind::Simple(s), ShapeKind::Holed(h))
            if h.is_bounded() =>
        {
            h.unify_simple(s, tol)
        }
        (ShapeKind::Holed(h1), ShapeKind::Holed(h2)) if h1.is_bounded() && h2.is_bounded() => {
            h1.unify_holed(h2, tol)
        }
        _ => run_engine(a, b, BooleanOp::Union, tol),
    }
}

/// `a ∩ b`.
///
/// # Errors
///
/// Propagates engine and shape construction errors.
#[instrument(level = "debug", skip(a, b))]
pub fn intersect(a: &ShapeKind, b: &ShapeKind, tol: f64) -> Result<ShapeKind> {
    if a.is_empty(tol) || b.is_empty(tol) {
        return Ok(SimpleShape::Void.into());
    }
    if a.is_universe() {
        return Ok(b.clone());
    }
    if b.is_universe() {
        return Ok(a.clone());
    }
    match (a, b) {
        (
            ShapeKind::Simple(SimpleShape::Rectangle(r1)),
            ShapeKind::Simple(SimpleShape::Rectangle(r2)),
        ) => {
            debug!("rectangle fast path");
            Ok(r1
                .intersect_rectangle(r2, tol)
                .map_or(SimpleShape::Void, SimpleShape::Rectangle)
                .into())
        }
        (ShapeKind::Holed(h), ShapeKind::Simple(s)) | (ShapeKind::Simple(s), ShapeKind::Holed(h))
            if h.is_bounded() =>
        {
            h.intersect_simple(s, tol)
        }
        (ShapeKind::Holed(h1), ShapeKind::Holed(h2)) if h1.is_bounded() && h2.is_bounded() => {
            h1.intersect_holed(h2, tol)
        }
        _ => run_engine(a, b, BooleanOp::Intersect, tol),
    }
}

/// `a − b`.
///
/// # Errors
///
/// Propagates engine and shape construction errors.
#[instrument(level = "debug", skip(a, b))]
pub fn differentiate(a: &ShapeKind, b: &ShapeKind, tol: f64) -> Result<ShapeKind> {
    if a.is_empty(tol) || b.is_universe() {
        return Ok(SimpleShape::Void.into());
    }
    if b.is_empty(tol) {
        return Ok(a.clone());
    }
    if a.is_universe() {
        return complement(b, tol);
    }
    match (a, b) {
        (ShapeKind::Holed(h), ShapeKind::Simple(s)) if h.is_bounded() => h.differentiate_simple(s, tol),
        (ShapeKind::Simple(s), ShapeKind::Holed(h)) if h.is_bounded() => {
            h.differentiate_from_simple(s, tol)
        }
        (ShapeKind::Holed(h1), ShapeKind::Holed(h2)) if h1.is_bounded() && h2.is_bounded() => {
            h1.differentiate_holed(h2, tol)
        }
        _ => run_engine(a, b, BooleanOp::Difference, tol),
    }
}

/// The rest of the plane. Built from reversed loops, without the engine.
///
/// # Errors
///
/// Returns a shape error if a loop cannot bound a polygon.
pub fn complement(shape: &ShapeKind, tol: f64) -> Result<ShapeKind> {
    ShapeKind::from_region(&shape.region(tol).complement(), tol)
}

fn run_engine(a: &ShapeKind, b: &ShapeKind, op: BooleanOp, tol: f64) -> Result<ShapeKind> {
    let region = boolean_execute(&a.region(tol), &b.region(tol), op, tol)?;
    ShapeKind::from_region(&region, tol)
}
