//! Accumulated-cost recurrence over the banded grid.
//!
//! `C(0,0) = d(0,0)` and
//! `C(i,j) = d(i,j) + min(C(i-1,j), C(i,j-1), w_diag * C(i-1,j-1))`,
//! where predecessors outside the grid, outside the band or themselves
//! unreachable read as `+inf` and never win. Ties resolve diagonal first,
//! then vertical, then horizontal.

use crate::band::BandLayout;
use crate::cost::{CostMatrix, local_distance};
use crate::error::DtwError;
use crate::sequence::SequenceView;

/// The move that produced a cell's accumulated cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Step {
    /// The origin cell `(0, 0)`.
    Origin,
    /// Came from `(i - 1, j - 1)`.
    Diagonal,
    /// Came from `(i - 1, j)`.
    Vertical,
    /// Came from `(i, j - 1)`.
    Horizontal,
    /// No admissible predecessor is reachable.
    Unreachable,
}

/// Resolve one cell given its local distance and the three predecessor costs.
///
/// The diagonal weight applies only to a finite diagonal predecessor, so
/// `w_diag == 0` never produces `0 * inf`.
#[inline]
pub(crate) fn relax(
    d: f32,
    vertical: f32,
    horizontal: f32,
    diagonal: f32,
    w_diag: f32,
    row: usize,
    col: usize,
) -> Result<(f32, Step), DtwError> {
    let diagonal = if diagonal.is_finite() {
        let weighted = w_diag * diagonal;
        if !weighted.is_finite() {
            return Err(DtwError::NumericError { row, col });
        }
        weighted
    } else {
        f32::INFINITY
    };

    let (best, step) = if diagonal <= vertical && diagonal <= horizontal {
        (diagonal, Step::Diagonal)
    } else if vertical <= horizontal {
        (vertical, Step::Vertical)
    } else {
        (horizontal, Step::Horizontal)
    };

    if best.is_infinite() {
        return Ok((f32::INFINITY, Step::Unreachable));
    }
    let total = d + best;
    if total.is_finite() {
        Ok((total, step))
    } else {
        Err(DtwError::NumericError { row, col })
    }
}

#[inline]
fn read(layout: &BandLayout, acc: &[f32], row: usize, col: usize) -> f32 {
    layout.index(row, col).map_or(f32::INFINITY, |k| acc[k])
}

/// Accumulated costs and direction tags for every admissible cell.
///
/// Retains the full band so the optimal path can be reconstructed exactly.
#[derive(Debug, Clone)]
pub struct AccumulatedTable<'a> {
    local: &'a CostMatrix,
    acc: Vec<f32>,
    steps: Vec<Step>,
}

impl<'a> AccumulatedTable<'a> {
    /// Run the recurrence over `local` with diagonal weight `w_diag`.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::NumericError`] if an accumulated cost overflows.
    pub fn fill(local: &'a CostMatrix, w_diag: f32) -> Result<Self, DtwError> {
        let layout = local.layout();
        let n_cells = layout.cell_count();
        let mut acc = vec![f32::INFINITY; n_cells];
        let mut steps = vec![Step::Unreachable; n_cells];

        for row in 0..layout.n_rows() {
            let range = layout.row_range(row);
            let offset = layout.row_offset(row);
            for (k, &d) in local.row(row).iter().enumerate() {
                let col = range.start + k;
                let idx = offset + k;

                if row == 0 && col == 0 {
                    acc[idx] = d;
                    steps[idx] = Step::Origin;
                    continue;
                }

                let vertical = if row > 0 {
                    read(layout, &acc, row - 1, col)
                } else {
                    f32::INFINITY
                };
                let horizontal = if col > 0 {
                    read(layout, &acc, row, col - 1)
                } else {
                    f32::INFINITY
                };
                let diagonal = if row > 0 && col > 0 {
                    read(layout, &acc, row - 1, col - 1)
                } else {
                    f32::INFINITY
                };

                let (value, step) = relax(d, vertical, horizontal, diagonal, w_diag, row, col)?;
                acc[idx] = value;
                steps[idx] = step;
            }
        }

        Ok(Self { local, acc, steps })
    }

    /// Return the local distances the table was built from.
    #[must_use]
    pub fn local(&self) -> &'a CostMatrix {
        self.local
    }

    /// Return `C(row, col)`, or `+inf` if the cell is outside the band or unreachable.
    #[must_use]
    pub fn cost(&self, row: usize, col: usize) -> f32 {
        read(self.local.layout(), &self.acc, row, col)
    }

    /// Return the direction tag of `(row, col)`.
    #[must_use]
    pub fn step(&self, row: usize, col: usize) -> Step {
        self.local
            .layout()
            .index(row, col)
            .map_or(Step::Unreachable, |k| self.steps[k])
    }

    /// Return the accumulated cost of the terminal cell `(n1 - 1, n2 - 1)`.
    #[must_use]
    pub fn terminal_cost(&self) -> f32 {
        let layout = self.local.layout();
        self.cost(layout.n_rows() - 1, layout.n_cols() - 1)
    }
}

/// Accumulated cost of the terminal cell using a rolling two-row buffer.
///
/// Same recurrence and tie-breaks as [`AccumulatedTable::fill`], but only
/// `O(band_width)` memory and no direction tags. Returns `+inf` when the
/// terminal cell is unreachable.
pub(crate) fn rolling_terminal_cost(
    seq1: SequenceView<'_>,
    seq2: SequenceView<'_>,
    layout: &BandLayout,
    w_diag: f32,
) -> Result<f32, DtwError> {
    let n_rows = layout.n_rows();
    let width = (0..n_rows)
        .map(|row| layout.row_range(row).len())
        .max()
        .unwrap_or(0);

    let mut prev = vec![f32::INFINITY; width];
    let mut curr = vec![f32::INFINITY; width];
    let mut prev_range = 0..0;

    for row in 0..n_rows {
        curr.fill(f32::INFINITY);
        let range = layout.row_range(row);

        for col in range.clone() {
            let d = local_distance(seq1, seq2, row, col)?;
            let k = col - range.start;

            if row == 0 && col == 0 {
                curr[k] = d;
                continue;
            }

            let vertical = if prev_range.contains(&col) {
                prev[col - prev_range.start]
            } else {
                f32::INFINITY
            };
            let horizontal = if col > range.start {
                curr[k - 1]
            } else {
                f32::INFINITY
            };
            let diagonal = if col > 0 && prev_range.contains(&(col - 1)) {
                prev[col - 1 - prev_range.start]
            } else {
                f32::INFINITY
            };

            let (value, _) = relax(d, vertical, horizontal, diagonal, w_diag, row, col)?;
            curr[k] = value;
        }

        prev_range = range;
        std::mem::swap(&mut prev, &mut curr);
    }

    // After the final swap `prev` holds the last row.
    let last = layout.n_cols() - 1;
    Ok(if prev_range.contains(&last) {
        prev[last - prev_range.start]
    } else {
        f32::INFINITY
    })
}
