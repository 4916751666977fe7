use super::{Binding, Resource};
use serde::Deserialize;

/// Reference to the resource an IAM policy is attached to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    resource_type: String,
    name: String,
    full_name: String,
}

impl ParentRef {
    pub fn new(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        full_name: impl Into<String>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            full_name: full_name.into(),
        }
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }
}

/// Raw IAM policy record as supplied by the data model
///
/// `data` is the policy JSON text; only its `bindings` array is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRecord {
    name: String,
    parent: ParentRef,
    data: String,
}

/// Bindings recovered from a policy, plus how many entries were unusable
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedBindings {
    pub bindings: Vec<Binding>,
    pub dropped: usize,
}

#[derive(Debug, Deserialize)]
struct RawPolicy {
    #[serde(default)]
    bindings: Vec<serde_json::Value>,
}

impl PolicyRecord {
    pub fn new(name: impl Into<String>, parent: ParentRef, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent,
            data: data.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> &ParentRef {
        &self.parent
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    /// Parses the `bindings` array of the policy data
    ///
    /// Entries that do not form a valid [`Binding`] are skipped and counted
    /// in [`ParsedBindings::dropped`]. A policy without a `bindings` key has
    /// no bindings.
    ///
    /// # Errors
    /// Returns an error if `data` is not a JSON object.
    pub fn parse_bindings(&self) -> serde_json::Result<ParsedBindings> {
        let raw: RawPolicy = serde_json::from_str(&self.data)?;

        let mut parsed = ParsedBindings::default();
        for entry in &raw.bindings {
            match Binding::from_json(entry) {
                Ok(binding) => parsed.bindings.push(binding),
                Err(_) => parsed.dropped += 1,
            }
        }
        Ok(parsed)
    }
}

/// A resource, its raw policy record and the bindings evaluated for it
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyTuple {
    resource: Resource,
    record: PolicyRecord,
    bindings: Vec<Binding>,
}

impl PolicyTuple {
    pub fn new(resource: Resource, record: PolicyRecord, bindings: Vec<Binding>) -> Self {
        Self {
            resource,
            record,
            bindings,
        }
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn record(&self) -> &PolicyRecord {
        &self.record
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Returns a copy of this tuple carrying `bindings` instead
    pub fn with_bindings(&self, bindings: Vec<Binding>) -> Self {
        Self {
            resource: self.resource.clone(),
            record: self.record.clone(),
            bindings,
        }
    }
}
