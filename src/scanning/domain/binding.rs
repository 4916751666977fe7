use crate::shared::Result;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Principal types that can appear in an IAM binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MemberType {
    User,
    Group,
    ServiceAccount,
    Domain,
    AllUsers,
    AllAuthenticatedUsers,
    ProjectOwner,
    ProjectEditor,
    ProjectViewer,
}

impl MemberType {
    const ALL: [MemberType; 9] = [
        MemberType::User,
        MemberType::Group,
        MemberType::ServiceAccount,
        MemberType::Domain,
        MemberType::AllUsers,
        MemberType::AllAuthenticatedUsers,
        MemberType::ProjectOwner,
        MemberType::ProjectEditor,
        MemberType::ProjectViewer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MemberType::User => "user",
            MemberType::Group => "group",
            MemberType::ServiceAccount => "serviceAccount",
            MemberType::Domain => "domain",
            MemberType::AllUsers => "allUsers",
            MemberType::AllAuthenticatedUsers => "allAuthenticatedUsers",
            MemberType::ProjectOwner => "projectOwner",
            MemberType::ProjectEditor => "projectEditor",
            MemberType::ProjectViewer => "projectViewer",
        }
    }

    pub fn from_type_name(type_name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == type_name)
    }

    /// `allUsers` and `allAuthenticatedUsers` are the only nameless principals
    pub fn requires_name(&self) -> bool {
        !matches!(
            self,
            MemberType::AllUsers | MemberType::AllAuthenticatedUsers
        )
    }
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A principal named in a binding, e.g. `user:alice@example.com`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Member {
    member_type: MemberType,
    name: String,
}

impl Member {
    pub fn new(member_type: MemberType, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if member_type.requires_name() && name.is_empty() {
            anyhow::bail!("Member of type '{}' requires a name", member_type);
        }
        if !member_type.requires_name() && !name.is_empty() {
            anyhow::bail!("Member of type '{}' cannot carry a name", member_type);
        }
        Ok(Self { member_type, name })
    }

    pub fn member_type(&self) -> MemberType {
        self.member_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for Member {
    type Err = anyhow::Error;

    /// Parses the IAM string form `<type>:<name>` (or a bare `allUsers`)
    fn from_str(s: &str) -> Result<Self> {
        let (type_name, name) = s.split_once(':').unwrap_or((s, ""));
        let member_type = MemberType::from_type_name(type_name)
            .ok_or_else(|| anyhow::anyhow!("Unknown member type '{}' in '{}'", type_name, s))?;
        Self::new(member_type, name)
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.member_type)
        } else {
            write!(f, "{}:{}", self.member_type, self.name)
        }
    }
}

/// Raw binding entry as found in a policy's `bindings` array
#[derive(Debug, Deserialize)]
struct RawBinding {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    members: Option<Vec<String>>,
}

/// Binding value object: one role granted to a set of members
///
/// Two bindings are equal only when both the role and the member set match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    role_name: String,
    members: BTreeSet<Member>,
}

impl Binding {
    pub fn new(role_name: impl Into<String>, members: impl IntoIterator<Item = Member>) -> Result<Self> {
        let role_name = role_name.into();
        if role_name.trim().is_empty() {
            anyhow::bail!("Binding role cannot be empty");
        }

        let members: BTreeSet<Member> = members.into_iter().collect();
        if members.is_empty() {
            anyhow::bail!("Binding for role '{}' has no members", role_name);
        }

        Ok(Self { role_name, members })
    }

    /// Builds a binding from one JSON entry of a policy's `bindings` array
    ///
    /// # Errors
    /// Returns an error if the role or members are missing or empty, or if
    /// any member string cannot be parsed.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let raw = RawBinding::deserialize(value)?;
        let role = raw
            .role
            .ok_or_else(|| anyhow::anyhow!("Binding has no role"))?;
        let members = raw
            .members
            .unwrap_or_default()
            .iter()
            .map(|m| m.parse::<Member>())
            .collect::<Result<Vec<_>>>()?;
        Self::new(role, members)
    }

    pub fn role_name(&self) -> &str {
        &self.role_name
    }

    pub fn members(&self) -> &BTreeSet<Member> {
        &self.members
    }

    pub fn has_same_role(&self, other: &Binding) -> bool {
        self.role_name == other.role_name
    }

    /// Adds the members of `other` to this binding (set union)
    ///
    /// Does nothing when the roles differ.
    pub fn merge_members(&mut self, other: &Binding) {
        if !self.has_same_role(other) {
            return;
        }
        self.members.extend(other.members.iter().cloned());
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<String> = self.members.iter().map(Member::to_string).collect();
        write!(f, "{} => [{}]", self.role_name, members.join(", "))
    }
}
