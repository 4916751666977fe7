use super::rule_book::{Rule, RuleBinding, RuleBook, RuleMode};
use crate::ports::outbound::RulesEngine;
use crate::scanning::domain::{
    Binding, Member, PolicyRecord, Resource, Violation, ViolationType,
};
use crate::shared::error::ScanError;
use crate::shared::security::read_input_file;
use crate::shared::Result;
use std::path::Path;

/// YamlRulesEngine adapter evaluating bindings against a YAML rule book
///
/// - `whitelist`: members of a matching role that no pattern allows are ADDED
/// - `blacklist`: members of a matching role that a pattern forbids are ADDED
/// - `required`: listed members missing from every matching role are REMOVED
#[derive(Debug)]
pub struct YamlRulesEngine {
    rule_book: RuleBook,
}

impl YamlRulesEngine {
    pub fn new(rule_book: RuleBook) -> Self {
        Self { rule_book }
    }

    /// Loads and validates the rule book at `path`
    ///
    /// # Errors
    /// Returns [`ScanError::RuleBookError`] if the file cannot be read or is invalid
    pub fn from_path(path: &Path) -> Result<Self> {
        let rule_book_error = |e: anyhow::Error| ScanError::RuleBookError {
            path: path.to_path_buf(),
            details: e.to_string(),
        };

        let content = read_input_file(path, "rule book").map_err(rule_book_error)?;
        let rule_book = RuleBook::from_yaml(&content).map_err(rule_book_error)?;
        Ok(Self::new(rule_book))
    }

    fn violation(
        rule: &Rule,
        resource: &Resource,
        policy: &PolicyRecord,
        violation_type: ViolationType,
        role: &str,
        members: Vec<Member>,
    ) -> Violation {
        Violation {
            resource_id: resource.name().to_string(),
            resource_type: resource.kind(),
            full_name: resource.full_name().to_string(),
            rule_index: rule.index,
            rule_name: rule.name.clone(),
            violation_type,
            members,
            role: role.to_string(),
            inventory_data: policy.data().to_string(),
        }
    }

    /// Members of `binding` judged by one mode's member filter
    fn offending_members(
        rule_binding: &RuleBinding,
        binding: &Binding,
        allowed: bool,
    ) -> Vec<Member> {
        binding
            .members()
            .iter()
            .filter(|member| {
                let listed = rule_binding.members.iter().any(|p| p.matches(member));
                listed != allowed
            })
            .cloned()
            .collect()
    }

    fn check_rule(
        rule: &Rule,
        resource: &Resource,
        policy: &PolicyRecord,
        bindings: &[Binding],
    ) -> Vec<Violation> {
        let mut violations = Vec::new();

        for rule_binding in &rule.bindings {
            let matching = bindings
                .iter()
                .filter(|b| rule_binding.role.matches(b.role_name()));

            match rule.mode {
                RuleMode::Whitelist | RuleMode::Blacklist => {
                    // Whitelisted members are allowed; blacklisted ones are not
                    let allowed = rule.mode == RuleMode::Whitelist;
                    for binding in matching {
                        let members = Self::offending_members(rule_binding, binding, allowed);
                        if !members.is_empty() {
                            violations.push(Self::violation(
                                rule,
                                resource,
                                policy,
                                ViolationType::Added,
                                binding.role_name(),
                                members,
                            ));
                        }
                    }
                }
                RuleMode::Required => {
                    let matching: Vec<&Binding> = matching.collect();
                    let missing: Vec<Member> = rule_binding
                        .members
                        .iter()
                        .filter(|pattern| {
                            !matching
                                .iter()
                                .any(|b| b.members().iter().any(|m| pattern.matches(m)))
                        })
                        .filter_map(|pattern| pattern.as_member())
                        .collect();
                    if !missing.is_empty() {
                        violations.push(Self::violation(
                            rule,
                            resource,
                            policy,
                            ViolationType::Removed,
                            &rule_binding.role_name,
                            missing,
                        ));
                    }
                }
            }
        }

        violations
    }
}

impl RulesEngine for YamlRulesEngine {
    fn find_policy_violations(
        &self,
        resource: &Resource,
        policy: &PolicyRecord,
        bindings: &[Binding],
    ) -> Result<Vec<Violation>> {
        Ok(self
            .rule_book
            .rules_for(resource)
            .flat_map(|rule| Self::check_rule(rule, resource, policy, bindings))
            .collect())
    }

    fn rule_count(&self) -> usize {
        self.rule_book.len()
    }
}
