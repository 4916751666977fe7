use crate::ports::outbound::{ScanContext, ViolationWriteError, ViolationWriter};
use crate::scanning::domain::FlatViolation;
use crate::shared::error::ScanError;
use crate::shared::security::validate_not_symlink;
use crate::shared::Result;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use uuid::Uuid;

/// One persisted violation row
#[derive(Debug, Serialize)]
struct StoredViolation<'a> {
    scan_id: Uuid,
    snapshot_timestamp: &'a str,
    created_at: String,
    #[serde(flatten)]
    violation: &'a FlatViolation,
}

/// Identity of a violation row within one scan
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RowKey {
    scan_id: Uuid,
    full_name: String,
    rule_index: usize,
    violation_type: String,
    role: String,
    member: String,
}

impl RowKey {
    fn of(scan_id: Uuid, row: &FlatViolation) -> Self {
        Self {
            scan_id,
            full_name: row.full_name.clone(),
            rule_index: row.rule_index,
            violation_type: row.violation_type.to_string(),
            role: row.violation_data.role.clone(),
            member: row.violation_data.member.clone(),
        }
    }
}

/// JsonLinesViolationStore adapter persisting violations to a JSON-lines file
///
/// Rows are appended, one JSON object per line, tagged with the scan id and
/// snapshot timestamp. Every scan has a fresh id, so only rows repeated
/// within one batch (same resource, rule, type, role and member) can collide;
/// those are rejected and reported instead of written. The file is never
/// read back, so it can grow without bound.
pub struct JsonLinesViolationStore {
    path: PathBuf,
}

impl JsonLinesViolationStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ViolationWriter for JsonLinesViolationStore {
    fn write_violations(
        &self,
        context: &ScanContext,
        violations: &[FlatViolation],
    ) -> Result<Vec<ViolationWriteError>> {
        validate_not_symlink(&self.path, "write").map_err(|e| ScanError::FileWriteError {
            path: self.path.clone(),
            details: e.to_string(),
        })?;

        let mut seen = HashSet::new();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| ScanError::FileWriteError {
                path: self.path.clone(),
                details: format!("Failed to open violation store: {}", e),
            })?;
        let mut writer = BufWriter::new(file);

        let created_at = Utc::now().to_rfc3339();
        let mut errors = Vec::new();

        for (row, violation) in violations.iter().enumerate() {
            let reject = |reason: String| ViolationWriteError {
                row,
                resource_id: violation.resource_id.clone(),
                rule_name: violation.rule_name.clone(),
                member: violation.violation_data.member.clone(),
                reason,
            };

            if !seen.insert(RowKey::of(context.scan_id, violation)) {
                errors.push(reject("Duplicate violation for this scan".to_string()));
                continue;
            }

            let stored = StoredViolation {
                scan_id: context.scan_id,
                snapshot_timestamp: &context.snapshot_timestamp,
                created_at: created_at.clone(),
                violation,
            };
            let mut line = match serde_json::to_string(&stored) {
                Ok(line) => line,
                Err(e) => {
                    errors.push(reject(e.to_string()));
                    continue;
                }
            };
            line.push('\n');

            // A failed write may leave a partial line; stop the batch there
            writer
                .write_all(line.as_bytes())
                .map_err(|e| ScanError::FileWriteError {
                    path: self.path.clone(),
                    details: format!("Failed to append violation row {}: {}", row, e),
                })?;
        }

        writer.flush().map_err(|e| ScanError::FileWriteError {
            path: self.path.clone(),
            details: e.to_string(),
        })?;

        Ok(errors)
    }
}
