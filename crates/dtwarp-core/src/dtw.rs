//! DTW alignment: cost matrix, recurrence and path reconstruction composed.

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::band::{BandConstraint, BandLayout};
use crate::cost::CostMatrix;
use crate::error::DtwError;
use crate::path::{Alignment, backtrack};
use crate::sequence::SequenceView;
use crate::table::{AccumulatedTable, rolling_terminal_cost};

/// Immutable DTW configuration. Thread-safe and copyable.
///
/// Holds the band constraint and the diagonal weight `w_diag` applied to the
/// diagonal predecessor in the recurrence. `w_diag < 1` favours near-identity
/// alignments, `w_diag > 1` discourages them. Every call allocates its own
/// table, so one `Dtw` can serve any number of threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dtw {
    constraint: BandConstraint,
    diagonal_weight: f32,
}

impl Default for Dtw {
    fn default() -> Self {
        Self::unconstrained()
    }
}

impl Dtw {
    /// Create an unconstrained DTW calculator with diagonal weight 1.
    #[must_use]
    pub fn unconstrained() -> Self {
        Self {
            constraint: BandConstraint::Unconstrained,
            diagonal_weight: 1.0,
        }
    }

    /// Create a DTW calculator with a Sakoe-Chiba band and diagonal weight 1.
    #[must_use]
    pub fn with_sakoe_chiba(window: usize) -> Self {
        Self {
            constraint: BandConstraint::SakoeChiba(window),
            diagonal_weight: 1.0,
        }
    }

    /// Create a DTW calculator from the raw parameters of the C interface.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::InvalidBand`] | `band_win < -1` |
    /// | [`DtwError::InvalidDiagonalWeight`] | `w_diag` negative, NaN or infinite |
    pub fn from_raw(w_diag: f32, band_win: i64) -> Result<Self, DtwError> {
        let constraint = BandConstraint::from_window(band_win)?;
        Self::unconstrained()
            .with_band(constraint)
            .with_diagonal_weight(w_diag)
    }

    /// Replace the band constraint.
    #[must_use]
    pub fn with_band(mut self, constraint: BandConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    /// Replace the diagonal weight.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::InvalidDiagonalWeight`] if `weight` is negative, NaN or infinite.
    pub fn with_diagonal_weight(mut self, weight: f32) -> Result<Self, DtwError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(DtwError::InvalidDiagonalWeight { weight });
        }
        self.diagonal_weight = weight;
        Ok(self)
    }

    /// Return the band constraint.
    #[must_use]
    pub fn constraint(&self) -> BandConstraint {
        self.constraint
    }

    /// Return the diagonal weight.
    #[must_use]
    pub fn diagonal_weight(&self) -> f32 {
        self.diagonal_weight
    }

    /// Compute the optimal alignment path between two sequences.
    ///
    /// Builds local distances for the admissible cells, fills the banded
    /// accumulated-cost table with direction tags, then backtracks from
    /// `(n1 - 1, n2 - 1)` to `(0, 0)`. Runs in `O(cells * dim)` time and
    /// `O(cells)` space, where `cells` is the number of band-admissible cells.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::DimensionMismatch`] | The sequences have different feature dimensions |
    /// | [`DtwError::NoPathFound`] | The band is too narrow to reach the terminal cell |
    /// | [`DtwError::NumericError`] | A distance or accumulated cost overflows `f32` |
    #[instrument(skip(seq1, seq2), fields(n1 = seq1.len(), n2 = seq2.len(), dim = seq1.dim()))]
    pub fn compute_path(
        &self,
        seq1: SequenceView<'_>,
        seq2: SequenceView<'_>,
    ) -> Result<Alignment, DtwError> {
        check_dims(seq1, seq2)?;
        let (n1, n2) = (seq1.len(), seq2.len());

        let layout = BandLayout::new(self.constraint, n1, n2);
        debug!(cells = layout.cell_count(), "band layout materialized");

        let local = CostMatrix::build(seq1, seq2, layout)?;
        let table = AccumulatedTable::fill(&local, self.diagonal_weight)?;

        let total_cost = table.terminal_cost();
        if total_cost.is_infinite() {
            return Err(self.no_path(n1, n2));
        }

        let path = backtrack(&table)?;
        debug!(path_len = path.len(), total_cost, "alignment complete");
        Ok(Alignment::new(path, total_cost))
    }

    /// Compute only the accumulated cost of the optimal alignment.
    ///
    /// Uses a rolling two-row buffer instead of the full table, so memory is
    /// `O(band_width)`. Equals `compute_path(..)?.total_cost()`.
    ///
    /// # Errors
    ///
    /// Same as [`Dtw::compute_path`].
    #[instrument(skip(seq1, seq2), fields(n1 = seq1.len(), n2 = seq2.len()))]
    pub fn distance(&self, seq1: SequenceView<'_>, seq2: SequenceView<'_>) -> Result<f32, DtwError> {
        check_dims(seq1, seq2)?;
        let (n1, n2) = (seq1.len(), seq2.len());
        let layout = BandLayout::new(self.constraint, n1, n2);
        let cost = rolling_terminal_cost(seq1, seq2, &layout, self.diagonal_weight)?;
        if cost.is_infinite() {
            return Err(self.no_path(n1, n2));
        }
        Ok(cost)
    }

    /// Align many independent pairs in parallel.
    ///
    /// Each pair gets its own table; results are returned in input order.
    #[instrument(skip(self, pairs), fields(n_pairs = pairs.len()))]
    pub fn align_batch(
        &self,
        pairs: &[(SequenceView<'_>, SequenceView<'_>)],
    ) -> Vec<Result<Alignment, DtwError>> {
        pairs
            .par_iter()
            .map(|&(a, b)| self.compute_path(a, b))
            .collect()
    }

    fn no_path(&self, n1: usize, n2: usize) -> DtwError {
        DtwError::NoPathFound {
            n1,
            n2,
            window: self.constraint.window().unwrap_or(usize::MAX),
        }
    }
}

fn check_dims(seq1: SequenceView<'_>, seq2: SequenceView<'_>) -> Result<(), DtwError> {
    if seq1.dim() != seq2.dim() {
        return Err(DtwError::DimensionMismatch {
            left: seq1.dim(),
            right: seq2.dim(),
        });
    }
    Ok(())
}

/// Align two flat `f32` buffers with explicit shapes.
///
/// The language-agnostic entry point: `seq1` holds `n1 * dim` values, `seq2`
/// holds `n2 * dim`, `band_win == -1` means unconstrained.
///
/// # Errors
///
/// Parameter errors from [`Dtw::from_raw`], shape errors from
/// [`SequenceView::with_shape`], then the errors of [`Dtw::compute_path`].
pub fn compute_path(
    seq1: &[f32],
    seq2: &[f32],
    n1: usize,
    n2: usize,
    dim: usize,
    w_diag: f32,
    band_win: i64,
) -> Result<Alignment, DtwError> {
    let dtw = Dtw::from_raw(w_diag, band_win)?;
    let seq1 = SequenceView::with_shape(seq1, n1, dim)?;
    let seq2 = SequenceView::with_shape(seq2, n2, dim)?;
    dtw.compute_path(seq1, seq2)
}
