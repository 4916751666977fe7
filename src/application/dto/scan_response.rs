use crate::ports::outbound::ViolationWriteError;
use crate::scanning::domain::{FlatViolation, ResourceCounts};
use std::path::PathBuf;
use uuid::Uuid;

/// ScanResponse - Internal response DTO from the IAM policy scan use case
#[derive(Debug, Clone)]
pub struct ScanResponse {
    /// Identifier of this scan run
    pub scan_id: Uuid,
    /// Policies retrieved per resource kind
    pub resource_counts: ResourceCounts,
    /// One row per (violation, member)
    pub violations: Vec<FlatViolation>,
    /// Rows the violation store rejected
    pub violation_errors: Vec<ViolationWriteError>,
    /// Copy of the violations CSV in the output directory, if one was written
    pub csv_output: Option<PathBuf>,
    /// Whether the summary notification was sent
    pub notification_sent: bool,
    /// Binding entries dropped because they could not be parsed
    pub dropped_bindings: usize,
    /// Violations without members, absent from `violations`
    pub memberless_violations: usize,
}

impl ScanResponse {
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }
}
