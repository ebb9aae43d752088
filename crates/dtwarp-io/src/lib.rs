//! File I/O, validation, and serialization for dtwarp alignments.

mod domain;
mod error;
mod reader;
mod writer;

pub use domain::{AlignmentReport, PathEntry, RunName};
pub use error::IoError;
pub use reader::FeatureReader;
pub use writer::ResultWriter;
