pub mod config;
pub mod conic;
pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod shape;

pub use error::{FiguraError, Result};
