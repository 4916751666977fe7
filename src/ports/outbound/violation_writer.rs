use crate::scanning::domain::FlatViolation;
use crate::shared::Result;
use serde::Serialize;
use uuid::Uuid;

/// Identity of the scan run a batch of violations belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanContext {
    pub scan_id: Uuid,
    pub snapshot_timestamp: String,
}

/// A violation row the store refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViolationWriteError {
    /// Position of the row in the written batch
    pub row: usize,
    pub resource_id: String,
    pub rule_name: String,
    pub member: String,
    pub reason: String,
}

/// ViolationWriter port for persisting flattened violations
///
/// Individual rows may be rejected without failing the batch; rejected rows
/// are returned so the caller can report them.
pub trait ViolationWriter {
    /// Persists `violations` for the scan described by `context`
    ///
    /// # Returns
    /// The rows that could not be written (empty when all were stored)
    ///
    /// # Errors
    /// Returns an error only when the store itself is unusable
    fn write_violations(
        &self,
        context: &ScanContext,
        violations: &[FlatViolation],
    ) -> Result<Vec<ViolationWriteError>>;
}
