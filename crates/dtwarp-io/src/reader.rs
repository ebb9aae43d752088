//! CSV feature-matrix reader with full input validation.

use std::path::{Path, PathBuf};

use dtwarp_core::FeatureSequence;
use tracing::{debug, info, instrument};

use crate::IoError;

/// Reads one feature sequence from a CSV file.
///
/// Expected CSV format:
/// - One row per frame, one column per feature
/// - Optional header row (column names are ignored)
/// - All rows must have the same number of columns
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::EmptyDataset`] | Zero frame rows |
/// | [`IoError::InconsistentRowLength`] | Row has a different column count than the first |
/// | [`IoError::NonFiniteValue`] | Cell is NaN, Inf, or unparseable float |
/// | [`IoError::Sequence`] | Parsed values rejected by the kernel |
pub struct FeatureReader {
    path: PathBuf,
    has_header: bool,
}

impl FeatureReader {
    /// Create a new reader for the given CSV file path. No header by default.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            has_header: false,
        }
    }

    /// Treat the first row as a header and skip it.
    #[must_use]
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Read and validate the CSV file, returning a [`FeatureSequence`].
    #[instrument(skip(self), fields(path = %self.path.display(), header = self.has_header))]
    pub fn read(&self) -> Result<FeatureSequence, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) lets the InconsistentRowLength check fire instead of
        // a low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(self.has_header)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut expected = None;
        if self.has_header {
            let header = rdr.headers().map_err(|e| self.parse_error(e))?;
            expected = Some(header.len());
            debug!(expected_cols = header.len(), "read CSV header");
        }

        let mut values = Vec::new();
        let mut n_frames = 0usize;

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.parse_error(e))?;
            let expected_cols = *expected.get_or_insert(record.len());

            if record.len() != expected_cols {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            for (col_index, raw) in record.iter().enumerate() {
                let value = raw
                    .parse::<f32>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| IoError::NonFiniteValue {
                        path: self.path.clone(),
                        row_index,
                        col_index,
                        raw: raw.to_string(),
                    })?;
                values.push(value);
            }
            n_frames += 1;
        }

        let dim = match expected {
            Some(dim) if n_frames > 0 => dim,
            _ => {
                return Err(IoError::EmptyDataset {
                    path: self.path.clone(),
                });
            }
        };

        let sequence = FeatureSequence::new(values, dim).map_err(|e| IoError::Sequence {
            path: self.path.clone(),
            source: e,
        })?;

        info!(n_frames, dim, "feature sequence loaded");
        Ok(sequence)
    }

    fn parse_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtwarp_core::DtwError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_scalar_frames_without_header() {
        let f = write_csv("0.0\n1.5\n-2.25\n");
        let seq = FeatureReader::new(f.path()).read().unwrap();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.dim(), 1);
        assert_eq!(seq.as_ref(), &[0.0, 1.5, -2.25]);
    }

    #[test]
    fn read_multivariate_frames_with_header() {
        let f = write_csv("mfcc0,mfcc1,mfcc2\n1.0,2.0,3.0\n4.0,5.0,6.0\n");
        let seq = FeatureReader::new(f.path()).with_header(true).read().unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.dim(), 3);
        assert_eq!(seq.frame(1), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn whitespace_around_cells_is_ignored() {
        let f = write_csv(" 1.0 , 2.0\n3.0,  4.0 \n");
        let seq = FeatureReader::new(f.path()).read().unwrap();
        assert_eq!(seq.as_ref(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn header_row_without_flag_is_a_value_error() {
        let f = write_csv("a,b\n1.0,2.0\n");
        let result = FeatureReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::NonFiniteValue { row_index: 0, col_index: 0, .. })
        ));
    }

    #[test]
    fn error_file_not_found() {
        let result = FeatureReader::new(Path::new("/nonexistent/features.csv")).read();
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }

    #[test]
    fn error_empty_file() {
        let f = write_csv("");
        let result = FeatureReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::EmptyDataset { .. })));
    }

    #[test]
    fn error_header_only() {
        let f = write_csv("f0,f1\n");
        let result = FeatureReader::new(f.path()).with_header(true).read();
        assert!(matches!(result, Err(IoError::EmptyDataset { .. })));
    }

    #[test]
    fn error_inconsistent_row_length() {
        let f = write_csv("1.0,2.0,3.0\n1.0,2.0\n");
        let result = FeatureReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::InconsistentRowLength { row_index: 1, expected: 3, got: 2, .. })
        ));
    }

    #[test]
    fn error_row_wider_than_header() {
        let f = write_csv("f0,f1\n1.0,2.0,3.0\n");
        let result = FeatureReader::new(f.path()).with_header(true).read();
        assert!(matches!(
            result,
            Err(IoError::InconsistentRowLength { row_index: 0, expected: 2, got: 3, .. })
        ));
    }

    #[test]
    fn error_non_finite_nan() {
        let f = write_csv("1.0,NaN\n");
        let result = FeatureReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::NonFiniteValue { col_index: 1, .. })));
    }

    #[test]
    fn error_non_finite_inf() {
        let f = write_csv("1.0\ninf\n");
        let result = FeatureReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::NonFiniteValue { row_index: 1, .. })));
    }

    #[test]
    fn error_overflowing_value() {
        let f = write_csv("1e39\n");
        let result = FeatureReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::NonFiniteValue { .. })));
    }

    #[test]
    fn error_empty_cell() {
        let f = write_csv("1.0,\n");
        let result = FeatureReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::NonFiniteValue { raw, .. }) if raw.is_empty()));
    }

    #[test]
    fn sequence_error_keeps_kernel_source() {
        let err = IoError::Sequence {
            path: PathBuf::from("x.csv"),
            source: DtwError::ZeroDimension,
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
