use crate::scanning::domain::{FlatViolation, Violation};

/// ViolationFlattener service expanding violations into one row per member
///
/// Tabular sinks (CSV, the violation store) hold one member per row, so a
/// violation naming three members becomes three rows that differ only in
/// `violation_data.member`.
pub struct ViolationFlattener;

impl ViolationFlattener {
    /// Lazily yields one [`FlatViolation`] per (violation, member) pair
    ///
    /// The iterator is single pass; collect it when several sinks need the
    /// rows. Violations without members produce no rows, see
    /// [`count_memberless`](Self::count_memberless).
    pub fn flatten(violations: &[Violation]) -> impl Iterator<Item = FlatViolation> + '_ {
        violations.iter().flat_map(|violation| {
            violation
                .members
                .iter()
                .map(move |member| FlatViolation::from_violation(violation, member))
        })
    }

    /// Number of violations that flattening drops because they name no member
    pub fn count_memberless(violations: &[Violation]) -> usize {
        violations.iter().filter(|v| v.members.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanning::domain::{Member, ResourceKind, ViolationType};

    fn violation(members: &[&str]) -> Violation {
        Violation {
            resource_id: "b1".to_string(),
            resource_type: ResourceKind::Bucket,
            full_name: "organization/1/project/p1/bucket/b1/".to_string(),
            rule_index: 0,
            rule_name: "bucket viewers".to_string(),
            violation_type: ViolationType::Added,
            members: members
                .iter()
                .map(|m| m.parse::<Member>().unwrap())
                .collect(),
            role: "roles/storage.objectViewer".to_string(),
            inventory_data: r#"{"bindings": []}"#.to_string(),
        }
    }

    #[test]
    fn test_two_members_fan_out_to_two_rows() {
        let violations = vec![violation(&["user:m1@example.com", "group:m2@example.com"])];

        let rows: Vec<FlatViolation> = ViolationFlattener::flatten(&violations).collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].violation_data.member, "user:m1@example.com");
        assert_eq!(rows[1].violation_data.member, "group:m2@example.com");

        let mut first = rows[0].clone();
        first.violation_data.member = rows[1].violation_data.member.clone();
        assert_eq!(first, rows[1]);
    }

    #[test]
    fn test_memberless_violation_yields_nothing() {
        let violations = vec![violation(&[])];
        assert_eq!(ViolationFlattener::flatten(&violations).count(), 0);
        assert_eq!(ViolationFlattener::count_memberless(&violations), 1);
    }

    #[test]
    fn test_row_carries_violation_metadata() {
        let violations = vec![violation(&["serviceAccount:sa@p1.iam.gserviceaccount.com"])];
        let row = ViolationFlattener::flatten(&violations).next().unwrap();

        assert_eq!(row.resource_id, "b1");
        assert_eq!(row.resource_type, ResourceKind::Bucket);
        assert_eq!(row.full_name, "organization/1/project/p1/bucket/b1/");
        assert_eq!(row.rule_name, "bucket viewers");
        assert_eq!(row.violation_type, ViolationType::Added);
        assert_eq!(row.violation_data.full_name, row.full_name);
        assert_eq!(row.violation_data.role, "roles/storage.objectViewer");
        assert_eq!(row.inventory_data, r#"{"bindings": []}"#);
    }

    #[test]
    fn test_rows_follow_violation_order() {
        let mut second = violation(&["user:z@example.com"]);
        second.rule_index = 1;
        let violations = vec![violation(&["user:a@example.com", "user:b@example.com"]), second];

        let rules: Vec<usize> = ViolationFlattener::flatten(&violations)
            .map(|row| row.rule_index)
            .collect();
        assert_eq!(rules, vec![0, 0, 1]);
        assert_eq!(ViolationFlattener::count_memberless(&violations), 0);
    }
}
