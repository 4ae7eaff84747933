pub mod boolean;

pub use boolean::{boolean_execute, spatial_position, BooleanOp, Region, SpatialPosition};
