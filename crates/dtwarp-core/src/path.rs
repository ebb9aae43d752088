//! Alignment path types and backtracking.

use crate::error::DtwError;
use crate::table::{AccumulatedTable, Step};

/// One cell of an alignment path: frame `seq1` of the first sequence matched
/// to frame `seq2` of the second, at local distance `distance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentStep {
    /// Local distance `d(seq1, seq2)`.
    pub distance: f32,
    /// Index in the first sequence.
    pub seq1: usize,
    /// Index in the second sequence.
    pub seq2: usize,
}

/// An ordered path from `(0, 0)` to `(n1 - 1, n2 - 1)`, inclusive.
///
/// Both indices are non-decreasing and each step advances by `(1, 0)`,
/// `(0, 1)` or `(1, 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentPath(Vec<AlignmentStep>);

impl AlignmentPath {
    pub(crate) fn new(steps: Vec<AlignmentStep>) -> Self {
        Self(steps)
    }

    /// Return the path steps as a slice.
    #[must_use]
    pub fn steps(&self) -> &[AlignmentStep] {
        &self.0
    }

    /// Return the number of steps in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the path contains no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the path steps in order.
    pub fn iter(&self) -> std::slice::Iter<'_, AlignmentStep> {
        self.0.iter()
    }

    /// Iterate over the local distances along the path.
    pub fn distances(&self) -> impl ExactSizeIterator<Item = f32> + '_ {
        self.0.iter().map(|s| s.distance)
    }

    /// Iterate over the `(seq1, seq2)` index pairs along the path.
    pub fn index_pairs(&self) -> impl ExactSizeIterator<Item = (usize, usize)> + '_ {
        self.0.iter().map(|s| (s.seq1, s.seq2))
    }

    /// Count the moves that advance both indices.
    #[must_use]
    pub fn diagonal_steps(&self) -> usize {
        self.0
            .windows(2)
            .filter(|w| w[1].seq1 > w[0].seq1 && w[1].seq2 > w[0].seq2)
            .count()
    }

    /// Count the moves that advance exactly one index.
    #[must_use]
    pub fn off_diagonal_steps(&self) -> usize {
        self.0.len().saturating_sub(1) - self.diagonal_steps()
    }

    /// Split into three parallel vectors of exactly the path length:
    /// distances, first-sequence indices, second-sequence indices.
    #[must_use]
    pub fn into_parts(self) -> (Vec<f32>, Vec<usize>, Vec<usize>) {
        let distances = self.0.iter().map(|s| s.distance).collect();
        let seq1 = self.0.iter().map(|s| s.seq1).collect();
        let seq2 = self.0.iter().map(|s| s.seq2).collect();
        (distances, seq1, seq2)
    }
}

impl<'a> IntoIterator for &'a AlignmentPath {
    type Item = &'a AlignmentStep;
    type IntoIter = std::slice::Iter<'a, AlignmentStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The result of one DTW alignment: the optimal path and its accumulated cost.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    path: AlignmentPath,
    total_cost: f32,
}

impl Alignment {
    pub(crate) fn new(path: AlignmentPath, total_cost: f32) -> Self {
        Self { path, total_cost }
    }

    /// Return the optimal path.
    #[must_use]
    pub fn path(&self) -> &AlignmentPath {
        &self.path
    }

    /// Return the accumulated cost `C(n1 - 1, n2 - 1)`.
    #[must_use]
    pub fn total_cost(&self) -> f32 {
        self.total_cost
    }

    /// Return the number of steps in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.path.len()
    }

    /// Return true if the path is empty. Never the case for a computed alignment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Return the mean local distance along the path.
    #[must_use]
    pub fn mean_distance(&self) -> f32 {
        if self.path.is_empty() {
            return 0.0;
        }
        self.path.distances().sum::<f32>() / self.path.len() as f32
    }

    /// Consume and return the path.
    #[must_use]
    pub fn into_path(self) -> AlignmentPath {
        self.path
    }

    /// Consume into three parallel, exactly-sized vectors.
    /// See [`AlignmentPath::into_parts`].
    #[must_use]
    pub fn into_parts(self) -> (Vec<f32>, Vec<usize>, Vec<usize>) {
        self.path.into_parts()
    }
}

/// Follow direction tags from the terminal cell back to the origin.
///
/// The caller has already checked that the terminal cell is reachable.
/// Every reachable cell's tag points at a reachable predecessor, so hitting
/// an unreachable tag means the table is corrupt.
pub(crate) fn backtrack(table: &AccumulatedTable<'_>) -> Result<AlignmentPath, DtwError> {
    let local = table.local();
    let layout = local.layout();
    let (n_rows, n_cols) = (layout.n_rows(), layout.n_cols());

    let mut steps = Vec::with_capacity(n_rows + n_cols - 1);
    let (mut i, mut j) = (n_rows - 1, n_cols - 1);

    loop {
        steps.push(AlignmentStep {
            distance: local.get(i, j),
            seq1: i,
            seq2: j,
        });
        match table.step(i, j) {
            Step::Origin => break,
            Step::Diagonal => {
                i -= 1;
                j -= 1;
            }
            Step::Vertical => i -= 1,
            Step::Horizontal => j -= 1,
            Step::Unreachable => return Err(DtwError::NumericError { row: i, col: j }),
        }
    }

    steps.reverse();
    Ok(AlignmentPath::new(steps))
}
