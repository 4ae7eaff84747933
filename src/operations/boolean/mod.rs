//! Boolean operations on regions bounded by segments and circular arcs.

mod assemble;
mod classify;
mod contiguity;
mod engine;
mod region;
mod select;
mod split;

pub use classify::{classify_point, PieceClassification, PointClassification};
pub use contiguity::{are_adjacent, are_contiguous, contiguousness_points};
pub use engine::{boolean_execute, spatial_position, SpatialPosition};
pub use region::Region;
pub use select::BooleanOp;
pub use split::{split_boundaries, Operand, PieceId, SplitBoundaries, SplitPiece};
