use crate::ports::outbound::{CsvFile, CsvWriter};
use crate::scanning::domain::FlatViolation;
use crate::shared::error::ScanError;
use crate::shared::security::validate_not_symlink;
use crate::shared::Result;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::Builder;

/// TempCsvWriter adapter writing violation rows to temporary CSV files
///
/// Each call to `write_csv` creates a fresh temporary file named after the
/// exported resource; the file is removed when the returned [`CsvFile`] is
/// dropped. `publish_csv` copies it somewhere permanent.
pub struct TempCsvWriter {
    temp_dir: Option<PathBuf>,
}

impl TempCsvWriter {
    /// Writer using the system temporary directory
    pub fn new() -> Self {
        Self { temp_dir: None }
    }

    /// Writer placing its temporary files in `temp_dir`
    pub fn in_dir(temp_dir: PathBuf) -> Self {
        Self {
            temp_dir: Some(temp_dir),
        }
    }

    fn format_row(row: &FlatViolation) -> Result<String> {
        let violation_data = serde_json::to_string(&row.violation_data)?;
        let fields = [
            row.resource_id.clone(),
            row.resource_type.to_string(),
            row.full_name.clone(),
            row.rule_index.to_string(),
            row.rule_name.clone(),
            row.violation_type.to_string(),
            violation_data,
            row.inventory_data.clone(),
        ];
        Ok(fields
            .iter()
            .map(|f| csv_escape(f))
            .collect::<Vec<_>>()
            .join(","))
    }

    fn prepare_output_dir(output_dir: &Path) -> Result<()> {
        if output_dir.to_string_lossy().contains("://") {
            return Err(ScanError::InvalidOutputPath {
                path: output_dir.to_path_buf(),
                reason: "Remote storage destinations are not supported".to_string(),
            }
            .into());
        }

        validate_not_symlink(output_dir, "write").map_err(|e| ScanError::InvalidOutputPath {
            path: output_dir.to_path_buf(),
            reason: e.to_string(),
        })?;

        if output_dir.exists() && !output_dir.is_dir() {
            return Err(ScanError::InvalidOutputPath {
                path: output_dir.to_path_buf(),
                reason: "Path exists and is not a directory".to_string(),
            }
            .into());
        }

        fs::create_dir_all(output_dir).map_err(|e| ScanError::FileWriteError {
            path: output_dir.to_path_buf(),
            details: format!("Failed to create output directory: {}", e),
        })?;
        Ok(())
    }
}

impl Default for TempCsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvWriter for TempCsvWriter {
    fn write_csv(
        &self,
        resource_name: &str,
        data: &[FlatViolation],
        write_header: bool,
    ) -> Result<CsvFile> {
        let mut builder = Builder::new();
        let prefix = format!("{}-", resource_name);
        builder.prefix(&prefix).suffix(".csv");
        let temp_file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| ScanError::FileWriteError {
            path: self.temp_dir.clone().unwrap_or_else(std::env::temp_dir),
            details: format!("Failed to create temporary CSV file: {}", e),
        })?;

        let path = temp_file.path().to_path_buf();
        let write_error = |e: std::io::Error| ScanError::FileWriteError {
            path: path.clone(),
            details: e.to_string(),
        };

        {
            let mut writer = BufWriter::new(temp_file.as_file());
            if write_header {
                writeln!(writer, "{}", FlatViolation::COLUMNS.join(",")).map_err(write_error)?;
            }
            for row in data {
                writeln!(writer, "{}", Self::format_row(row)?).map_err(write_error)?;
            }
            writer.flush().map_err(write_error)?;
        }

        Ok(CsvFile::temporary(temp_file.into_temp_path()))
    }

    fn publish_csv(&self, csv: &CsvFile, output_dir: &Path, file_name: &str) -> Result<PathBuf> {
        Self::prepare_output_dir(output_dir)?;

        let target = output_dir.join(file_name);
        validate_not_symlink(&target, "write").map_err(|e| ScanError::FileWriteError {
            path: target.clone(),
            details: e.to_string(),
        })?;

        fs::copy(csv.path(), &target).map_err(|e| ScanError::FileWriteError {
            path: target.clone(),
            details: e.to_string(),
        })?;
        Ok(target)
    }
}

/// Quotes a CSV field when it contains a separator, quote or line break
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
