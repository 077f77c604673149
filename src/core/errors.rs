use num_complex::Complex64;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum GateError {
    #[error("matrix is not unitary (U†U != I)")]
    NonUnitary,

    #[error("matrix must be square")]
    NotSquare,

    #[error("matrix dimension must be a power of two")]
    InvalidDimensions,
}

#[derive(Error, Debug, Clone)]
pub enum MeasurementError {
    #[error("a measurement needs at least one projector")]
    Empty,

    #[error("projectors do not sum to identity (completeness relation failed)")]
    NotComplete,

    #[error("invalid projector dimensions")]
    InvalidDimensions,
}

#[derive(Error, Debug, Clone)]
pub enum ChannelError {
    #[error("channel must have at least one Kraus operator")]
    Empty,

    #[error("Kraus operators do not sum to identity (trace preserving relation failed)")]
    NotComplete,

    #[error("invalid operator dimensions: matrices must be square and 2^n")]
    InvalidDimensions,

    #[error("all Kraus operators must have the same size")]
    OperatorSizeMismatch,

    #[error("invalid probability: {0}. Must be between 0.0 and 1.0")]
    InvalidProbability(f64),
}

#[derive(Error, Debug, Clone)]
pub enum StateError {
    #[error("trace is not unity: {0}")]
    InvalidTrace(Complex64),

    #[error("dimension mismatch: expected {expected}, got {got_rows}x{got_cols}")]
    DimensionMismatch {
        expected: usize,
        got_rows: usize,
        got_cols: usize,
    },

    #[error("qubit index {index} out of bounds for a {num_qubits}-qubit system")]
    IndexOutOfBounds { index: usize, num_qubits: usize },

    #[error("duplicate qubit index found: {0}")]
    DuplicateQubit(usize),

    #[error("measurement error: {0}")]
    Measurement(#[from] MeasurementError),

    #[error("gate error: {0}")]
    Gate(#[from] GateError),

    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),
}
