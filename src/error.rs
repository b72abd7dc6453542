use thiserror::Error;

/// Top-level error type for the pressure pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error(transparent)]
    Boundary(#[from] BoundaryError),

    #[error(transparent)]
    Transmissibility(#[from] TransmissibilityError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Unit(#[from] UnitError),
}

/// Errors raised while building a grid or deriving its geometry.
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("invalid grid dimension: {0}")]
    InvalidDimension(String),

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("grid geometry has not been computed")]
    MissingGeometry,
}

/// Errors raised when validating rock or fluid properties.
#[derive(Debug, Error, PartialEq)]
pub enum PropertyError {
    #[error("invalid {name}: {reason}")]
    InvalidProperty { name: &'static str, reason: String },

    #[error("{name} has {actual} entries, expected {expected}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Errors raised when constraining faces or cells.
#[derive(Debug, Error, PartialEq)]
pub enum BoundaryError {
    #[error("face {face} is out of range ({num_faces} faces)")]
    FaceOutOfRange { face: usize, num_faces: usize },

    #[error("face {0} is an interior face and cannot carry a boundary condition")]
    InteriorFace(usize),

    #[error("face {0} is already constrained")]
    DuplicateConstraint(usize),

    #[error("cell {cell} is out of range ({num_cells} cells)")]
    CellOutOfRange { cell: usize, num_cells: usize },

    #[error("{given} values given for {expected} faces")]
    ValueCountMismatch { expected: usize, given: usize },

    #[error("non-finite boundary value {value} on face {face}")]
    InvalidValue { face: usize, value: f64 },

    #[error("unknown boundary side: {0}")]
    UnknownSide(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum TransmissibilityError {
    #[error("non-positive half-transmissibility {value:e} between cell {cell} and face {face}")]
    ZeroTransmissibility { cell: usize, face: usize, value: f64 },
}

#[derive(Debug, Error, PartialEq)]
pub enum SolverError {
    #[error("pressure system is singular: {0}")]
    SingularSystem(String),

    #[error("linear solver did not converge in {iterations} iterations (residual {residual:e})")]
    NonConvergence { iterations: usize, residual: f64 },

    #[error("Krylov solve failed: {0}")]
    KrylovFailure(String),

    #[error("{name} has length {actual}, expected {expected}")]
    DimensionMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum UnitError {
    #[error("unknown unit: {0}")]
    UnknownUnit(String),
}

/// Convenience type alias for results using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
