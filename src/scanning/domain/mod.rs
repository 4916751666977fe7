pub mod binding;
pub mod policy;
pub mod resource;
pub mod resource_counts;
pub mod violation;

pub use binding::{Binding, Member, MemberType};
pub use policy::{ParentRef, ParsedBindings, PolicyRecord, PolicyTuple};
pub use resource::{PathSegment, Resource, ResourceKind, ResourcePath};
pub use resource_counts::ResourceCounts;
pub use violation::{FlatViolation, Violation, ViolationData, ViolationType};
