/// Scanning domain - IAM resources, bindings and violations
///
/// Pure business logic with no I/O: binding inheritance resolution,
/// violation aggregation and flattening.
pub mod domain;
pub mod policies;
pub mod services;
