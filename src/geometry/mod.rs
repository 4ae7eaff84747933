pub mod curve;
pub mod extent;
pub mod pline;
pub mod surface;

pub use curve::{Curve, CurveDomain, Piece};
pub use extent::Extent;
pub use pline::{ExtremityPolicy, Pline, PlineVertex, RotationDirection};
pub use surface::{Surface, SurfaceDomain};
