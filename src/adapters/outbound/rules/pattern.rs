use crate::scanning::domain::{Member, MemberType};
use crate::shared::Result;

/// Maximum length of a single role or member pattern
const MAX_PATTERN_LENGTH: usize = 255;

/// Wildcard matcher for rule book patterns
///
/// `*` matches zero or more characters. Matching is case-sensitive and
/// anchored at both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternMatcher {
    /// A lone `*`
    Any,
    /// No wildcard: "roles/owner"
    Exact(String),
    /// Leading wildcard: "*@example.com"
    Suffix(String),
    /// Trailing wildcard: "roles/storage.*"
    Prefix(String),
    /// Anything else: "roles/*.admin", "*dev*"
    Glob(Vec<String>),
}

impl PatternMatcher {
    /// Compiles `pattern`
    ///
    /// # Errors
    /// Returns an error if the pattern is empty or too long
    pub fn compile(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            anyhow::bail!("Pattern cannot be empty");
        }
        if pattern.len() > MAX_PATTERN_LENGTH {
            anyhow::bail!(
                "Pattern is too long: '{}' ({} chars). Maximum: {} chars",
                pattern,
                pattern.len(),
                MAX_PATTERN_LENGTH
            );
        }

        if pattern.chars().all(|c| c == '*') {
            return Ok(PatternMatcher::Any);
        }

        let matcher = match pattern.matches('*').count() {
            0 => PatternMatcher::Exact(pattern.to_string()),
            1 if pattern.starts_with('*') => PatternMatcher::Suffix(pattern[1..].to_string()),
            1 if pattern.ends_with('*') => {
                PatternMatcher::Prefix(pattern[..pattern.len() - 1].to_string())
            }
            _ => PatternMatcher::Glob(pattern.split('*').map(str::to_string).collect()),
        };
        Ok(matcher)
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            PatternMatcher::Any => true,
            PatternMatcher::Exact(s) => value == s,
            PatternMatcher::Suffix(suffix) => value.ends_with(suffix.as_str()),
            PatternMatcher::Prefix(prefix) => value.starts_with(prefix.as_str()),
            PatternMatcher::Glob(parts) => glob_matches(parts, value),
        }
    }

    pub fn has_wildcard(&self) -> bool {
        !matches!(self, PatternMatcher::Exact(_))
    }
}

/// Matches `value` against the pieces of a pattern split on `*`
///
/// The first piece is anchored at the start, the last at the end and the
/// ones between are found left to right.
fn glob_matches(parts: &[String], value: &str) -> bool {
    let (Some(first), Some(last)) = (parts.first(), parts.last()) else {
        return true;
    };
    if parts.len() == 1 {
        return value == first;
    }
    if !value.starts_with(first.as_str()) {
        return false;
    }

    let mut rest = &value[first.len()..];
    for middle in &parts[1..parts.len() - 1] {
        match rest.find(middle.as_str()) {
            Some(pos) => rest = &rest[pos + middle.len()..],
            None => return false,
        }
    }
    rest.ends_with(last.as_str())
}

/// A member pattern such as `user:*@example.com`, `domain:example.com` or `allUsers`
///
/// The member type is matched exactly; the name part may use wildcards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPattern {
    original: String,
    member_type: MemberType,
    name: PatternMatcher,
}

impl MemberPattern {
    /// Parses a member pattern
    ///
    /// # Errors
    /// Returns an error for an unknown member type, or a missing name on a
    /// type that requires one
    pub fn parse(pattern: &str) -> Result<Self> {
        let (type_name, name) = pattern.split_once(':').unwrap_or((pattern, ""));
        let member_type = MemberType::from_type_name(type_name).ok_or_else(|| {
            anyhow::anyhow!("Unknown member type '{}' in pattern '{}'", type_name, pattern)
        })?;

        let name = if name.is_empty() {
            if member_type.requires_name() {
                anyhow::bail!("Member pattern '{}' has no name", pattern);
            }
            PatternMatcher::Exact(String::new())
        } else if !member_type.requires_name() {
            anyhow::bail!("Member pattern '{}' cannot carry a name", pattern);
        } else {
            PatternMatcher::compile(name)?
        };

        Ok(Self {
            original: pattern.to_string(),
            member_type,
            name,
        })
    }

    pub fn matches(&self, member: &Member) -> bool {
        member.member_type() == self.member_type && self.name.matches(member.name())
    }

    /// The concrete member this pattern names, if it has no wildcard
    pub fn as_member(&self) -> Option<Member> {
        if self.name.has_wildcard() {
            return None;
        }
        self.original.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.original
    }
}
