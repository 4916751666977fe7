mod ancestor_resolver;
mod policy_classifier;
mod violation_aggregator;
mod violation_flattener;

pub use ancestor_resolver::AncestorResolver;
pub use policy_classifier::{ClassifiedPolicies, PolicyClassifier};
pub use violation_aggregator::ViolationAggregator;
pub use violation_flattener::ViolationFlattener;
