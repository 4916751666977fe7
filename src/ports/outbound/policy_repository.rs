use crate::scanning::domain::PolicyRecord;
use crate::shared::Result;

/// PolicyRepository port for reading IAM policies out of a data model
///
/// A data model is one inventory snapshot, identified by name. Implementations
/// acquire whatever session they need for the duration of the call and
/// release it before returning.
pub trait PolicyRepository {
    /// Returns every IAM policy record stored in the named data model
    ///
    /// Records are returned for all parent resource types; filtering of
    /// unsupported types is left to the caller.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The data model does not exist
    /// - The underlying storage cannot be read or decoded
    fn fetch_iam_policies(&self, model_name: &str) -> Result<Vec<PolicyRecord>>;
}
