//! Local distances between frames, restricted to the band.

use crate::band::BandLayout;
use crate::error::DtwError;
use crate::sequence::SequenceView;

/// Euclidean (L2) distance between two frames of equal dimension.
///
/// Accumulated in single precision to match the `f32` output buffers.
#[inline]
#[must_use]
pub fn euclidean(x: &[f32], y: &[f32]) -> f32 {
    debug_assert_eq!(x.len(), y.len());
    x.iter()
        .zip(y)
        .map(|(a, b)| {
            let d = a - b;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}

/// Compute `d(row, col)`, rejecting distances that overflow single precision.
#[inline]
pub(crate) fn local_distance(
    seq1: SequenceView<'_>,
    seq2: SequenceView<'_>,
    row: usize,
    col: usize,
) -> Result<f32, DtwError> {
    let d = euclidean(seq1.frame(row), seq2.frame(col));
    if d.is_finite() {
        Ok(d)
    } else {
        Err(DtwError::NumericError { row, col })
    }
}

/// Local distances for every admissible cell of a banded grid.
///
/// Cells outside the band have no storage and read as `+inf`.
#[derive(Debug, Clone)]
pub struct CostMatrix {
    layout: BandLayout,
    values: Vec<f32>,
}

impl CostMatrix {
    /// Evaluate `d(i, j)` for each admissible cell of `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::NumericError`] if a distance overflows `f32`.
    pub fn build(
        seq1: SequenceView<'_>,
        seq2: SequenceView<'_>,
        layout: BandLayout,
    ) -> Result<Self, DtwError> {
        let mut values = Vec::with_capacity(layout.cell_count());
        for row in 0..layout.n_rows() {
            for col in layout.row_range(row) {
                values.push(local_distance(seq1, seq2, row, col)?);
            }
        }
        Ok(Self { layout, values })
    }

    /// Return the layout these distances were computed for.
    #[must_use]
    pub fn layout(&self) -> &BandLayout {
        &self.layout
    }

    /// Return `d(row, col)`, or `+inf` outside the band.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.layout
            .index(row, col)
            .map_or(f32::INFINITY, |idx| self.values[idx])
    }

    /// Return the distances of `row` for its admissible columns, in column order.
    #[must_use]
    pub fn row(&self, row: usize) -> &[f32] {
        let start = self.layout.index(row, self.layout.row_range(row).start);
        match start {
            Some(start) => &self.values[start..start + self.layout.row_range(row).len()],
            None => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band::BandConstraint;
    use crate::sequence::FeatureSequence;

    #[test]
    fn euclidean_three_four_five() {
        assert_eq!(euclidean(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
    }

    #[test]
    fn euclidean_identical_is_zero() {
        assert_eq!(euclidean(&[1.5, -2.0, 7.0], &[1.5, -2.0, 7.0]), 0.0);
    }

    #[test]
    fn overflowing_distance_is_numeric_error() {
        let a = FeatureSequence::new(vec![f32::MAX], 1).unwrap();
        let b = FeatureSequence::new(vec![-f32::MAX], 1).unwrap();
        let layout = BandLayout::new(BandConstraint::Unconstrained, 1, 1);
        let result = CostMatrix::build(a.as_view(), b.as_view(), layout);
        assert!(matches!(result, Err(DtwError::NumericError { row: 0, col: 0 })));
    }

    #[test]
    fn outside_band_reads_infinite() {
        let a = FeatureSequence::new(vec![0.0, 1.0, 2.0, 3.0], 1).unwrap();
        let b = FeatureSequence::new(vec![0.0, 1.0, 2.0, 3.0], 1).unwrap();
        let layout = BandLayout::new(BandConstraint::SakoeChiba(0), 4, 4);
        let cost = CostMatrix::build(a.as_view(), b.as_view(), layout).unwrap();
        assert_eq!(cost.get(2, 2), 0.0);
        assert_eq!(cost.get(0, 3), f32::INFINITY);
        assert_eq!(cost.row(1), &[0.0]);
    }

    #[test]
    fn full_grid_matches_pairwise_distances() {
        let a = FeatureSequence::new(vec![0.0, 0.0, 1.0, 1.0], 2).unwrap();
        let b = FeatureSequence::new(vec![3.0, 4.0, 0.0, 0.0, 1.0, 1.0], 2).unwrap();
        let layout = BandLayout::new(BandConstraint::Unconstrained, 2, 3);
        let cost = CostMatrix::build(a.as_view(), b.as_view(), layout).unwrap();
        assert_eq!(cost.get(0, 0), 5.0);
        assert_eq!(cost.get(0, 1), 0.0);
        assert_eq!(cost.get(1, 2), 0.0);
        assert!((cost.get(0, 2) - 2.0_f32.sqrt()).abs() < 1e-6);
        assert_eq!(cost.row(0).len(), 3);
    }
}
