use super::{Member, ResourceKind};
use serde::Serialize;
use std::fmt;

/// How a binding breaches a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ViolationType {
    /// Members are present that the rule does not allow
    Added,
    /// Members the rule requires are missing
    Removed,
}

impl ViolationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationType::Added => "ADDED",
            ViolationType::Removed => "REMOVED",
        }
    }
}

impl fmt::Display for ViolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A rule engine finding against one role on one resource
///
/// `members` lists every principal implicated in the breach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub resource_id: String,
    pub resource_type: ResourceKind,
    pub full_name: String,
    pub rule_index: usize,
    pub rule_name: String,
    pub violation_type: ViolationType,
    pub members: Vec<Member>,
    pub role: String,
    pub inventory_data: String,
}

/// Per-member detail of a flattened violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViolationData {
    pub full_name: String,
    pub role: String,
    pub member: String,
}

/// One row of tabular violation output: a violation narrowed to a single member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatViolation {
    pub resource_id: String,
    pub resource_type: ResourceKind,
    pub full_name: String,
    pub rule_index: usize,
    pub rule_name: String,
    pub violation_type: ViolationType,
    pub violation_data: ViolationData,
    pub inventory_data: String,
}

impl FlatViolation {
    /// Column names in CSV order
    pub const COLUMNS: [&'static str; 8] = [
        "resource_id",
        "resource_type",
        "full_name",
        "rule_index",
        "rule_name",
        "violation_type",
        "violation_data",
        "inventory_data",
    ];

    /// Builds the row for `member` of `violation`
    pub fn from_violation(violation: &Violation, member: &Member) -> Self {
        Self {
            resource_id: violation.resource_id.clone(),
            resource_type: violation.resource_type,
            full_name: violation.full_name.clone(),
            rule_index: violation.rule_index,
            rule_name: violation.rule_name.clone(),
            violation_type: violation.violation_type,
            violation_data: ViolationData {
                full_name: violation.full_name.clone(),
                role: violation.role.clone(),
                member: member.to_string(),
            },
            inventory_data: violation.inventory_data.clone(),
        }
    }
}
