use super::pattern::{MemberPattern, PatternMatcher};
use crate::scanning::domain::{Resource, ResourceKind};
use crate::shared::Result;
use serde::Deserialize;

/// How a rule judges the members bound to a role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleMode {
    /// Only the listed members may hold the role
    Whitelist,
    /// The listed members may not hold the role
    Blacklist,
    /// The listed members must hold the role
    Required,
}

/// Which resources a rule's resource entry covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppliesTo {
    #[default]
    #[serde(rename = "self")]
    SelfOnly,
    Children,
    SelfAndChildren,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRuleBook {
    #[serde(default)]
    rules: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRule {
    name: String,
    mode: RuleMode,
    #[serde(default)]
    resource: Vec<RawResource>,
    #[serde(default)]
    bindings: Vec<RawBinding>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawResource {
    #[serde(rename = "type")]
    resource_type: ResourceKind,
    #[serde(default)]
    applies_to: AppliesTo,
    #[serde(default)]
    resource_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBinding {
    role: String,
    #[serde(default)]
    members: Vec<String>,
}

/// One resource entry of a rule
#[derive(Debug, Clone)]
pub struct RuleResource {
    kind: ResourceKind,
    applies_to: AppliesTo,
    resource_ids: Vec<PatternMatcher>,
}

impl RuleResource {
    fn matches_id(&self, kind: ResourceKind, id: &str) -> bool {
        kind == self.kind && self.resource_ids.iter().any(|p| p.matches(id))
    }

    /// Whether this entry covers `resource`
    ///
    /// Children are found through the resource's path; a resource without a
    /// well-formed path can only be matched as `self`.
    pub fn applies_to(&self, resource: &Resource) -> bool {
        let covers_self = matches!(self.applies_to, AppliesTo::SelfOnly | AppliesTo::SelfAndChildren);
        let covers_children =
            matches!(self.applies_to, AppliesTo::Children | AppliesTo::SelfAndChildren);

        if covers_self && self.matches_id(resource.kind(), resource.name()) {
            return true;
        }
        if !covers_children {
            return false;
        }

        resource
            .path()
            .and_then(|path| path.segments().split_last())
            .is_some_and(|(_, ancestors)| {
                ancestors
                    .iter()
                    .any(|segment| self.matches_id(segment.kind(), segment.id()))
            })
    }
}

/// One role entry of a rule
#[derive(Debug, Clone)]
pub struct RuleBinding {
    pub role: PatternMatcher,
    pub role_name: String,
    pub members: Vec<MemberPattern>,
}

/// A validated rule
#[derive(Debug, Clone)]
pub struct Rule {
    pub index: usize,
    pub name: String,
    pub mode: RuleMode,
    pub resources: Vec<RuleResource>,
    pub bindings: Vec<RuleBinding>,
}

impl Rule {
    pub fn applies_to(&self, resource: &Resource) -> bool {
        self.resources.iter().any(|r| r.applies_to(resource))
    }
}

/// Validated, ordered collection of rules
#[derive(Debug, Clone, Default)]
pub struct RuleBook {
    rules: Vec<Rule>,
}

impl RuleBook {
    /// Parses and validates a YAML rule book
    ///
    /// # Errors
    /// Returns an error describing the first invalid rule, or the YAML error
    pub fn from_yaml(content: &str) -> Result<Self> {
        let raw: RawRuleBook = serde_yaml_ng::from_str(content)?;

        let rules = raw
            .rules
            .into_iter()
            .enumerate()
            .map(|(index, rule)| Self::compile_rule(index, rule))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    fn compile_rule(index: usize, raw: RawRule) -> Result<Rule> {
        let name = raw.name.trim().to_string();
        if name.is_empty() {
            anyhow::bail!("Rule #{} has no name", index);
        }
        if raw.resource.is_empty() {
            anyhow::bail!("Rule '{}' lists no resource", name);
        }
        if raw.bindings.is_empty() {
            anyhow::bail!("Rule '{}' lists no binding", name);
        }

        let resources = raw
            .resource
            .into_iter()
            .map(|r| -> Result<RuleResource> {
                if r.resource_ids.is_empty() {
                    anyhow::bail!("Rule '{}' has a {} entry without resource_ids", name, r.resource_type);
                }
                let resource_ids = r
                    .resource_ids
                    .iter()
                    .map(|id| PatternMatcher::compile(id))
                    .collect::<Result<Vec<_>>>()
                    .map_err(|e| anyhow::anyhow!("Rule '{}': {}", name, e))?;
                Ok(RuleResource {
                    kind: r.resource_type,
                    applies_to: r.applies_to,
                    resource_ids,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let bindings = raw
            .bindings
            .into_iter()
            .map(|b| -> Result<RuleBinding> {
                if b.members.is_empty() {
                    anyhow::bail!("Rule '{}' binding for '{}' lists no members", name, b.role);
                }
                let role = PatternMatcher::compile(&b.role)
                    .map_err(|e| anyhow::anyhow!("Rule '{}': {}", name, e))?;
                let members = b
                    .members
                    .iter()
                    .map(|m| MemberPattern::parse(m))
                    .collect::<Result<Vec<_>>>()
                    .map_err(|e| anyhow::anyhow!("Rule '{}': {}", name, e))?;
                Ok(RuleBinding {
                    role,
                    role_name: b.role,
                    members,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Rule {
            index,
            name,
            mode: raw.mode,
            resources,
            bindings,
        })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules covering `resource`, in rule book order
    pub fn rules_for<'a>(&'a self, resource: &'a Resource) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules.iter().filter(move |rule| rule.applies_to(resource))
    }
}
