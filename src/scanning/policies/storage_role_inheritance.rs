use crate::scanning::domain::Binding;

/// Storage roles that flow from ancestors down to buckets
pub const STORAGE_IAM_ROLES: [&str; 4] = [
    "roles/storage.admin",
    "roles/storage.objectViewer",
    "roles/storage.objectCreator",
    "roles/storage.objectAdmin",
];

/// StorageRoleInheritance policy deciding which ancestor grants reach a bucket
///
/// A bucket inherits every grant of an ancestor whose role gives access to
/// the bucket's objects. Grants of any other role (including `roles/owner`)
/// are checked on the ancestor itself and are not copied down.
pub struct StorageRoleInheritance;

impl StorageRoleInheritance {
    /// Whether a grant of `role_name` on an ancestor applies to buckets below it
    ///
    /// Role names compare case-sensitively.
    pub fn is_inheritable_role(role_name: &str) -> bool {
        STORAGE_IAM_ROLES.contains(&role_name)
    }

    pub fn is_inheritable(binding: &Binding) -> bool {
        Self::is_inheritable_role(binding.role_name())
    }
}
