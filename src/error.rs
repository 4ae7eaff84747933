use thiserror::Error;

/// Top-level error type for the Figura kernel.
#[derive(Debug, Error)]
pub enum FiguraError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Conic(#[from] ConicError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Contract violations detected while building or editing a shape.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("radius must be positive, got {0}")]
    NonPositiveRadius(f64),

    #[error("scale factor must be non-zero")]
    ZeroScale,

    #[error("boundary does not close on itself")]
    NotClosed,

    #[error("boundary needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    #[error("corners do not form a rectangle")]
    NotRectangular,

    #[error("invalid hole: {0}")]
    InvalidHole(String),

    #[error("tolerance must be positive, got {0}")]
    NegativeTolerance(f64),

    #[error("{0} is not defined for an unbounded shape")]
    Unbounded(&'static str),
}

/// Errors related to shape operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Errors raised by the rotated-conic engine.
#[derive(Debug, Error)]
pub enum ConicError {
    #[error("placement map is not invertible")]
    SingularMap,

    #[error("degenerate surface frame: {0}")]
    DegenerateFrame(String),

    #[error("curve handler aborted: {0}")]
    Handler(String),

    #[error("{0} needs a classified surface, not a swept generator")]
    Unclassified(&'static str),
}

/// Convenience type alias for results using [`FiguraError`].
pub type Result<T> = std::result::Result<T, FiguraError>;
