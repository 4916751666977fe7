use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of resources whose IAM policies are scanned
///
/// Ordered from the top of the resource hierarchy downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Organization,
    Folder,
    Project,
    Bucket,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Organization,
        ResourceKind::Folder,
        ResourceKind::Project,
        ResourceKind::Bucket,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Organization => "organization",
            ResourceKind::Folder => "folder",
            ResourceKind::Project => "project",
            ResourceKind::Bucket => "bucket",
        }
    }

    /// Parses the inventory type name of a resource (exact, lowercase match)
    ///
    /// Returns `None` for resource types the scanner does not support.
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == type_name)
    }

    /// Whether resources of this kind receive storage bindings from ancestors
    ///
    /// Only buckets are resolved today.
    pub fn inherits_storage_bindings(&self) -> bool {
        matches!(self, ResourceKind::Bucket)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One `<kind>/<id>` step of a hierarchical resource path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    kind: ResourceKind,
    id: String,
}

impl PathSegment {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Parsed form of a resource full name such as
/// `organization/123/folder/456/project/789/bucket/abc/`
///
/// The parent of a path is the same path without its last segment, which
/// gives every resource an explicit link to its parent's identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourcePath(Vec<PathSegment>);

impl ResourcePath {
    /// Parses a full name into path segments
    ///
    /// Returns `None` when the full name is empty, has an odd number of
    /// components, names an unsupported kind or has an empty id.
    pub fn parse(full_name: &str) -> Option<Self> {
        let trimmed = full_name.strip_suffix('/').unwrap_or(full_name);
        if trimmed.is_empty() {
            return None;
        }

        let components: Vec<&str> = trimmed.split('/').collect();
        if components.len() % 2 != 0 {
            return None;
        }

        components
            .chunks(2)
            .map(|pair| {
                let kind = ResourceKind::from_type_name(pair[0])?;
                let id = pair[1];
                if id.is_empty() {
                    return None;
                }
                Some(PathSegment {
                    kind,
                    id: id.to_string(),
                })
            })
            .collect::<Option<Vec<_>>>()
            .map(Self)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// The segment naming the resource itself
    pub fn leaf(&self) -> &PathSegment {
        // parse() never yields an empty path
        &self.0[self.0.len() - 1]
    }

    pub fn parent(&self) -> Option<ResourcePath> {
        if self.0.len() < 2 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Segment prefixes of every strict ancestor, nearest first
    pub fn ancestor_prefixes(&self) -> impl Iterator<Item = &[PathSegment]> {
        (1..self.0.len()).rev().map(move |len| &self.0[..len])
    }

    /// True when `self` is a strict ancestor of `other`
    pub fn is_ancestor_of(&self, other: &ResourcePath) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, "{}/{}/", segment.kind, segment.id)?;
        }
        Ok(())
    }
}

/// Resource value object identifying the owner of an IAM policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    kind: ResourceKind,
    name: String,
    full_name: String,
    path: Option<ResourcePath>,
}

impl Resource {
    /// Creates a resource, deriving its position in the hierarchy from `full_name`
    ///
    /// A full name that cannot be parsed, or whose last segment is not of
    /// `kind`, leaves the resource without a path: it has no ancestors and
    /// is nobody's ancestor.
    pub fn new(kind: ResourceKind, name: impl Into<String>, full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let path = ResourcePath::parse(&full_name).filter(|path| path.leaf().kind() == kind);

        Self {
            kind,
            name: name.into(),
            full_name,
            path,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The resource id as it appears in the inventory (e.g. project id, bucket name)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn path(&self) -> Option<&ResourcePath> {
        self.path.as_ref()
    }

    pub fn is_well_formed(&self) -> bool {
        self.path.is_some()
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.kind, self.name, self.full_name)
    }
}
