use crate::scanning::domain::{PolicyTuple, Violation};
use crate::shared::Result;

/// ViolationAggregator service collecting rule engine findings for a scan
///
/// The aggregator knows nothing about how violations are found: the caller
/// supplies the evaluation for a single tuple (normally a call into the
/// rules engine) and the aggregator drives it over every tuple.
pub struct ViolationAggregator;

impl ViolationAggregator {
    /// Evaluates every tuple in order and concatenates the findings
    ///
    /// Output order follows tuple order, then the order in which the
    /// evaluation returned violations for each tuple.
    ///
    /// # Errors
    /// The first evaluation error aborts aggregation and is returned as is;
    /// no partial violation list is produced.
    pub fn find_violations<F>(tuples: &[PolicyTuple], mut evaluate: F) -> Result<Vec<Violation>>
    where
        F: FnMut(&PolicyTuple) -> Result<Vec<Violation>>,
    {
        let mut all_violations = Vec::new();
        for tuple in tuples {
            let violations = evaluate(tuple)?;
            all_violations.extend(violations);
        }
        Ok(all_violations)
    }
}
