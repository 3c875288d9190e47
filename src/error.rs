
use crate::grid::SolveState;

/// Errors reported by grids, solvers and exporters.
/// Apart from `SolveAborted`, all of them are precondition violations
/// detected before anything is written, so the grid is left untouched.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum DistanceFieldError {
    /// A grid dimension is zero or too large.
    InvalidArgument { width: usize, height: usize },

    /// Coordinates lie outside of the grid.
    OutOfRange { x: u16, y: u16, width: u16, height: u16 },

    /// The operation is not allowed in the current solve state.
    InvalidState(SolveState),

    /// In-place transposition requires a square grid.
    Unsupported { width: u16, height: u16 },

    /// A cell buffer could not be allocated.
    ResourceExhausted { cells: usize },

    /// A seed mask does not hold exactly one byte per pixel.
    MaskLength { expected: usize, actual: usize },

    /// A solver configuration value is out of range.
    InvalidConfiguration(&'static str),

    /// The dedicated worker pool could not be started.
    WorkerPool(String),

    /// The solve panicked or its worker went away.
    /// The grid has been cleared back to `Created`.
    SolveAborted,
}

pub type Result<T> = std::result::Result<T, DistanceFieldError>;

impl std::fmt::Display for DistanceFieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistanceFieldError::InvalidArgument { width, height } => {
                write!(f, "invalid grid dimensions {width}x{height}")
            }
            DistanceFieldError::OutOfRange { x, y, width, height } => {
                write!(f, "coordinates ({x}, {y}) are outside of the {width}x{height} grid")
            }
            DistanceFieldError::InvalidState(state) => {
                write!(f, "operation not allowed while the grid is {state:?}")
            }
            DistanceFieldError::Unsupported { width, height } => {
                write!(f, "cannot transpose a non-square {width}x{height} grid in place")
            }
            DistanceFieldError::ResourceExhausted { cells } => {
                write!(f, "failed to allocate storage for {cells} cells")
            }
            DistanceFieldError::MaskLength { expected, actual } => {
                write!(f, "seed mask holds {actual} bytes instead of {expected}")
            }
            DistanceFieldError::InvalidConfiguration(reason) => {
                write!(f, "invalid solver configuration: {reason}")
            }
            DistanceFieldError::WorkerPool(reason) => {
                write!(f, "failed to start the worker pool: {reason}")
            }
            DistanceFieldError::SolveAborted => {
                write!(f, "the solve was aborted before it finished")
            }
        }
    }
}

impl std::error::Error for DistanceFieldError {}
