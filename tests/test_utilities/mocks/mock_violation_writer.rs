use iam_scan::prelude::*;
use std::sync::{Arc, Mutex};

/// Mock ViolationWriter that keeps written rows in memory
///
/// Rows whose member matches `reject_member` are refused.
#[derive(Default, Clone)]
pub struct MockViolationWriter {
    pub written: Arc<Mutex<Vec<(ScanContext, FlatViolation)>>>,
    reject_member: Option<String>,
}

impl MockViolationWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(member: &str) -> Self {
        Self {
            reject_member: Some(member.to_string()),
            ..Self::default()
        }
    }

    pub fn written_count(&self) -> usize {
        self.written.lock().unwrap().len()
    }
}

impl ViolationWriter for MockViolationWriter {
    fn write_violations(
        &self,
        context: &ScanContext,
        violations: &[FlatViolation],
    ) -> Result<Vec<ViolationWriteError>> {
        let mut errors = Vec::new();
        let mut written = self.written.lock().unwrap();
        for (row, violation) in violations.iter().enumerate() {
            if self.reject_member.as_deref() == Some(violation.violation_data.member.as_str()) {
                errors.push(ViolationWriteError {
                    row,
                    resource_id: violation.resource_id.clone(),
                    rule_name: violation.rule_name.clone(),
                    member: violation.violation_data.member.clone(),
                    reason: "rejected by mock".to_string(),
                });
            } else {
                written.push((context.clone(), violation.clone()));
            }
        }
        Ok(errors)
    }
}
