//! Domain types for dtwarp-io.

use dtwarp_core::{Alignment, Dtw, SequenceView};
use serde::{Deserialize, Serialize};

use crate::IoError;

/// A validated run name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunName(String);

impl RunName {
    /// Parse and validate a run name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidRunName`] if the name is empty or contains
    /// characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidRunName { name });
        }
        Ok(Self(name))
    }

    /// Return the run name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One step of a serialized alignment path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathEntry {
    /// Frame index in the first sequence.
    pub seq1: usize,
    /// Frame index in the second sequence.
    pub seq2: usize,
    /// Local distance between the two frames.
    pub distance: f32,
}

/// Serializable summary of one alignment, used for stdout and JSON artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentReport {
    /// Number of frames in the first sequence.
    pub n1: usize,
    /// Number of frames in the second sequence.
    pub n2: usize,
    /// Feature dimension shared by both sequences.
    pub dim: usize,
    /// Human-readable band description.
    pub band: String,
    /// Raw band window, -1 when unconstrained.
    pub band_win: i64,
    /// Diagonal weight used by the recurrence.
    pub w_diag: f32,
    /// Number of steps in the path.
    pub path_length: usize,
    /// Accumulated cost at the terminal cell.
    pub total_cost: f32,
    /// Mean local distance along the path.
    pub mean_distance: f32,
    /// Moves advancing both indices.
    pub diagonal_steps: usize,
    /// Moves advancing exactly one index.
    pub off_diagonal_steps: usize,
    /// The path itself; omitted for summary-only output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathEntry>>,
}

impl AlignmentReport {
    /// Summarize an alignment computed by `dtw` between `seq1` and `seq2`.
    #[must_use]
    pub fn new(
        dtw: &Dtw,
        seq1: SequenceView<'_>,
        seq2: SequenceView<'_>,
        alignment: &Alignment,
    ) -> Self {
        let path = alignment.path();
        let band_win = dtw
            .constraint()
            .window()
            .map_or(-1, |w| i64::try_from(w).unwrap_or(i64::MAX));
        Self {
            n1: seq1.len(),
            n2: seq2.len(),
            dim: seq1.dim(),
            band: dtw.constraint().to_string(),
            band_win,
            w_diag: dtw.diagonal_weight(),
            path_length: path.len(),
            total_cost: alignment.total_cost(),
            mean_distance: alignment.mean_distance(),
            diagonal_steps: path.diagonal_steps(),
            off_diagonal_steps: path.off_diagonal_steps(),
            path: Some(
                path.iter()
                    .map(|s| PathEntry {
                        seq1: s.seq1,
                        seq2: s.seq2,
                        distance: s.distance,
                    })
                    .collect(),
            ),
        }
    }

    /// Drop the per-step path, keeping only the summary fields.
    #[must_use]
    pub fn without_path(mut self) -> Self {
        self.path = None;
        self
    }
}
