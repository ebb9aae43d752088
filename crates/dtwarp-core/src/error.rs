//! Error types for sequence validation and DTW alignment.

/// Errors from sequence validation and DTW path computation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DtwError {
    /// Returned when a sequence has zero frames.
    #[error("sequence must contain at least one frame")]
    EmptySequence,

    /// Returned when the feature dimension is zero.
    #[error("feature dimension must be at least 1")]
    ZeroDimension,

    /// Returned when a flat buffer does not hold exactly `len * dim` values.
    #[error("buffer holds {got} values, expected {expected} (len * dim)")]
    BufferLengthMismatch {
        /// Required number of values.
        expected: usize,
        /// Number of values supplied.
        got: usize,
    },

    /// Returned when a sequence contains NaN or an infinity.
    #[error("sequence contains non-finite value at flat index {index}")]
    NonFiniteValue {
        /// Position of the first non-finite value in the flat buffer.
        index: usize,
    },

    /// Returned when the two sequences have different feature dimensions.
    #[error("feature dimensions differ: {left} vs {right}")]
    DimensionMismatch {
        /// Dimension of the first sequence.
        left: usize,
        /// Dimension of the second sequence.
        right: usize,
    },

    /// Returned when the band window is below -1.
    #[error("band window must be -1 (unconstrained) or non-negative, got {window}")]
    InvalidBand {
        /// The rejected window.
        window: i64,
    },

    /// Returned when the diagonal weight is negative, NaN or infinite.
    #[error("diagonal weight must be finite and non-negative, got {weight}")]
    InvalidDiagonalWeight {
        /// The rejected weight.
        weight: f32,
    },

    /// Returned when the terminal cell cannot be reached inside the band.
    #[error("no alignment path for lengths {n1} x {n2} within band window {window}")]
    NoPathFound {
        /// Length of the first sequence.
        n1: usize,
        /// Length of the second sequence.
        n2: usize,
        /// Band window that was too narrow.
        window: usize,
    },

    /// Returned when cost accumulation yields NaN or overflows.
    #[error("numeric failure accumulating cost at cell ({row}, {col})")]
    NumericError {
        /// Row (first sequence index) of the offending cell.
        row: usize,
        /// Column (second sequence index) of the offending cell.
        col: usize,
    },
}

impl DtwError {
    /// Return true if the same inputs may succeed with different parameters.
    ///
    /// Only [`DtwError::NoPathFound`] qualifies: a wider or unconstrained band
    /// can find a path. Every other variant is a caller error or a defect.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NoPathFound { .. })
    }
}
