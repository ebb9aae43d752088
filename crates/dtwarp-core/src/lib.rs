//! Banded Dynamic Time Warping between multivariate feature sequences.
//!
//! Pure math library, zero I/O. Computes local Euclidean distances inside a
//! Sakoe-Chiba band, fills the accumulated-cost table under a weighted
//! diagonal move, and backtracks the optimal alignment path.

mod band;
mod cost;
mod dtw;
mod error;
mod path;
mod sequence;
mod table;

pub use band::{BandConstraint, BandLayout};
pub use cost::{CostMatrix, euclidean};
pub use dtw::{Dtw, compute_path};
pub use error::DtwError;
pub use path::{Alignment, AlignmentPath, AlignmentStep};
pub use sequence::{FeatureSequence, SequenceView};
pub use table::{AccumulatedTable, Step};
