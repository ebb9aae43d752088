//! Band constraint and the windowed grid layout it induces.

use std::fmt;
use std::ops::Range;

use crate::error::DtwError;

/// Constraint on the DTW warping window.
///
/// For grids with unequal sides the window is measured along the longer
/// sequence's index axis, as the distance of cell `(i, j)` from the straight
/// line joining `(0, 0)` and `(n_rows - 1, n_cols - 1)`:
///
/// ```text
/// |i * (n_cols - 1) - j * (n_rows - 1)| <= window * min(n_rows - 1, n_cols - 1)
/// ```
///
/// For square grids this is the classic `|i - j| <= window`. When either side
/// has length 1 every cell lies on that line and is admissible. The test is
/// exact integer arithmetic and symmetric under swapping the two sequences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BandConstraint {
    /// No constraint, the full grid is evaluated.
    #[default]
    Unconstrained,

    /// Sakoe-Chiba band of the given window around the scaled diagonal.
    SakoeChiba(usize),
}

impl BandConstraint {
    /// Build a constraint from the raw integer window of the C interface.
    ///
    /// `-1` means unconstrained, any non-negative value is a Sakoe-Chiba window.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::InvalidBand`] if `window < -1`.
    pub fn from_window(window: i64) -> Result<Self, DtwError> {
        match window {
            -1 => Ok(Self::Unconstrained),
            w if w >= 0 => usize::try_from(w)
                .map(Self::SakoeChiba)
                .map_err(|_| DtwError::InvalidBand { window }),
            _ => Err(DtwError::InvalidBand { window }),
        }
    }

    /// Return the Sakoe-Chiba window, or `None` when unconstrained.
    #[must_use]
    pub fn window(&self) -> Option<usize> {
        match self {
            Self::Unconstrained => None,
            Self::SakoeChiba(w) => Some(*w),
        }
    }

    /// Return the admissible column range for `row` of an `n_rows x n_cols` grid.
    ///
    /// The range may be empty when the window is too narrow for the grid's
    /// aspect ratio.
    #[must_use]
    pub fn column_range(&self, row: usize, n_rows: usize, n_cols: usize) -> Range<usize> {
        let Self::SakoeChiba(window) = *self else {
            return 0..n_cols;
        };
        if n_rows <= 1 || n_cols <= 1 {
            return 0..n_cols;
        }

        let a = (n_rows - 1) as i128;
        let b = (n_cols - 1) as i128;
        let slack = window as i128 * a.min(b);
        let centre = row as i128 * b;

        let lo = ceil_div(centre - slack, a).max(0);
        let hi = (centre + slack).div_euclid(a).min(b);

        let start = lo as usize;
        if lo > hi {
            start..start
        } else {
            start..(hi as usize + 1)
        }
    }

    /// Return true if cell `(row, col)` lies inside the band.
    #[must_use]
    pub fn contains(&self, row: usize, col: usize, n_rows: usize, n_cols: usize) -> bool {
        row < n_rows && self.column_range(row, n_rows, n_cols).contains(&col)
    }

    /// Return the widest row of the band for the given grid.
    #[must_use]
    pub fn band_width(&self, n_rows: usize, n_cols: usize) -> usize {
        match self {
            Self::Unconstrained => n_cols,
            Self::SakoeChiba(_) => (0..n_rows)
                .map(|row| self.column_range(row, n_rows, n_cols).len())
                .max()
                .unwrap_or(0),
        }
    }
}

impl fmt::Display for BandConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconstrained => f.write_str("unconstrained"),
            Self::SakoeChiba(w) => write!(f, "sakoe-chiba({w})"),
        }
    }
}

/// Ceiling division for a positive divisor.
fn ceil_div(n: i128, d: i128) -> i128 {
    -((-n).div_euclid(d))
}

/// The band of one concrete grid, materialized as per-row column ranges.
///
/// Cell `(i, j)` is stored at `offsets[i] + (j - ranges[i].start)` in any
/// flat buffer of length [`BandLayout::cell_count`]. Only admissible cells
/// take storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandLayout {
    n_rows: usize,
    n_cols: usize,
    ranges: Vec<Range<usize>>,
    offsets: Vec<usize>,
}

impl BandLayout {
    /// Materialize `constraint` for an `n_rows x n_cols` grid.
    #[must_use]
    pub fn new(constraint: BandConstraint, n_rows: usize, n_cols: usize) -> Self {
        let ranges: Vec<Range<usize>> = (0..n_rows)
            .map(|row| constraint.column_range(row, n_rows, n_cols))
            .collect();
        let mut offsets = Vec::with_capacity(n_rows + 1);
        let mut total = 0;
        for range in &ranges {
            offsets.push(total);
            total += range.len();
        }
        offsets.push(total);
        Self {
            n_rows,
            n_cols,
            ranges,
            offsets,
        }
    }

    /// Return the number of rows (frames of the first sequence).
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Return the number of columns (frames of the second sequence).
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Return the admissible columns of `row`.
    #[must_use]
    pub fn row_range(&self, row: usize) -> Range<usize> {
        self.ranges[row].clone()
    }

    /// Return the flat index of the first admissible cell of `row`.
    #[must_use]
    pub fn row_offset(&self, row: usize) -> usize {
        self.offsets[row]
    }

    /// Return the total number of admissible cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.offsets[self.n_rows]
    }

    /// Return the flat index of `(row, col)`, or `None` if it lies outside
    /// the grid or the band.
    #[must_use]
    pub fn index(&self, row: usize, col: usize) -> Option<usize> {
        let range = self.ranges.get(row)?;
        range
            .contains(&col)
            .then(|| self.offsets[row] + (col - range.start))
    }
}
