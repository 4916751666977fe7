use crate::scanning::domain::{PolicyRecord, PolicyTuple, Resource, ResourceCounts, ResourceKind};
use crate::shared::error::ScanError;
use crate::shared::Result;

/// Result of turning raw policy records into scannable tuples
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedPolicies {
    pub tuples: Vec<PolicyTuple>,
    pub resource_counts: ResourceCounts,
    /// Records attached to resource types the scanner does not handle
    pub skipped_records: usize,
    /// Binding entries that could not be parsed and were left out
    pub dropped_bindings: usize,
}

/// PolicyClassifier service building typed resources and bindings from raw records
pub struct PolicyClassifier;

impl PolicyClassifier {
    /// Classifies each record by the type of the resource it is attached to
    ///
    /// Records on unsupported resource types are skipped. Binding entries
    /// that do not parse are dropped and counted.
    ///
    /// # Errors
    /// Returns [`ScanError::PolicyDataParse`] if a record's policy data is
    /// not a JSON object.
    pub fn classify(records: Vec<PolicyRecord>) -> Result<ClassifiedPolicies> {
        let mut tuples = Vec::with_capacity(records.len());
        let mut resource_counts = ResourceCounts::new();
        let mut skipped_records = 0;
        let mut dropped_bindings = 0;

        for record in records {
            let parent = record.parent();
            let Some(kind) = ResourceKind::from_type_name(parent.resource_type()) else {
                skipped_records += 1;
                continue;
            };

            let parsed = record
                .parse_bindings()
                .map_err(|e| ScanError::PolicyDataParse {
                    full_name: parent.full_name().to_string(),
                    details: e.to_string(),
                })?;
            dropped_bindings += parsed.dropped;

            let resource = Resource::new(kind, parent.name(), parent.full_name());
            resource_counts.increment(kind);
            tuples.push(PolicyTuple::new(resource, record, parsed.bindings));
        }

        Ok(ClassifiedPolicies {
            tuples,
            resource_counts,
            skipped_records,
            dropped_bindings,
        })
    }
}
