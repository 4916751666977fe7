use super::ResourceKind;
use serde::Serialize;
use std::collections::BTreeMap;

/// Number of IAM policies retrieved per resource kind
///
/// Every supported kind is always present, starting at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceCounts(BTreeMap<ResourceKind, usize>);

impl ResourceCounts {
    pub fn new() -> Self {
        Self(ResourceKind::ALL.into_iter().map(|kind| (kind, 0)).collect())
    }

    pub fn increment(&mut self, kind: ResourceKind) {
        *self.0.entry(kind).or_insert(0) += 1;
    }

    pub fn get(&self, kind: ResourceKind) -> usize {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, usize)> + '_ {
        self.0.iter().map(|(kind, count)| (*kind, *count))
    }
}

impl Default for ResourceCounts {
    fn default() -> Self {
        Self::new()
    }
}
