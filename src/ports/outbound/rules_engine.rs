use crate::scanning::domain::{Binding, PolicyRecord, Resource, Violation};
use crate::shared::Result;

/// RulesEngine port for matching resolved bindings against a rule book
///
/// Implementations are built once per run, before any policy is retrieved,
/// from a rules definition and the snapshot timestamp of the scan.
pub trait RulesEngine {
    /// Finds the violations of one resource's bindings
    ///
    /// # Arguments
    /// * `resource` - The resource the policy is attached to
    /// * `policy` - The raw policy record, reported back as inventory data
    /// * `bindings` - The bindings to check, inherited ones included
    ///
    /// # Errors
    /// Any error is fatal for the scan.
    fn find_policy_violations(
        &self,
        resource: &Resource,
        policy: &PolicyRecord,
        bindings: &[Binding],
    ) -> Result<Vec<Violation>>;

    /// Number of rules in the loaded rule book
    fn rule_count(&self) -> usize;
}
