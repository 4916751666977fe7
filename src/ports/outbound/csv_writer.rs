use crate::scanning::domain::FlatViolation;
use crate::shared::Result;
use std::path::{Path, PathBuf};
use tempfile::TempPath;

/// Handle to a CSV file produced by a [`CsvWriter`]
///
/// A temporary file is deleted when the handle is dropped; a persistent one
/// is left in place.
#[derive(Debug)]
pub struct CsvFile {
    path: PathBuf,
    _temp_path: Option<TempPath>,
}

impl CsvFile {
    /// Wraps a temporary file that lives as long as this handle
    pub fn temporary(temp_path: TempPath) -> Self {
        Self {
            path: temp_path.to_path_buf(),
            _temp_path: Some(temp_path),
        }
    }

    /// Wraps a file that outlives this handle
    pub fn persistent(path: PathBuf) -> Self {
        Self {
            path,
            _temp_path: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name component, used in notifications
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// CsvWriter port for exporting flattened violations as CSV
pub trait CsvWriter {
    /// Writes `data` as CSV and returns a handle to the written file
    ///
    /// # Arguments
    /// * `resource_name` - Name of the exported resource, used in the file name
    /// * `data` - Rows to write, in order
    /// * `write_header` - Whether to emit the column header line first
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written
    fn write_csv(&self, resource_name: &str, data: &[FlatViolation], write_header: bool)
        -> Result<CsvFile>;

    /// Copies a written CSV into `output_dir` under `file_name`
    ///
    /// The directory is created when missing.
    ///
    /// # Returns
    /// Path of the copy
    ///
    /// # Errors
    /// Returns an error if the directory is unusable or the copy fails
    fn publish_csv(&self, csv: &CsvFile, output_dir: &Path, file_name: &str) -> Result<PathBuf>;
}
