//! JSON result writer for alignment artifacts.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{AlignmentReport, RunName};

/// Writes alignment reports to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{run}_alignment.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    run: RunName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and run name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), run = %run))]
    pub fn new(output_dir: &Path, run: RunName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            run,
        })
    }

    /// Return the path of the alignment artifact for this run.
    #[must_use]
    pub fn alignment_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_alignment.json", self.run.as_str()))
    }

    /// Write a report to `{run}_alignment.json` and return the file path.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the report cannot be serialized or
    /// the file cannot be written.
    #[instrument(skip_all, fields(run = %self.run))]
    pub fn write_alignment(&self, report: &AlignmentReport) -> Result<PathBuf, IoError> {
        let path = self.alignment_path();

        let json = serde_json::to_string_pretty(report).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e.into(),
        })?;
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), path_length = report.path_length, "alignment written");
        Ok(path)
    }
}
