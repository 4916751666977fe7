/// Ports module defining interfaces for hexagonal architecture
///
/// Outbound ports (driven ports) describe everything the scan needs from
/// the outside world: policy data, rule evaluation, result sinks and
/// progress reporting.
pub mod outbound;
