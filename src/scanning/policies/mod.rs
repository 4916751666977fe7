mod storage_role_inheritance;

pub use storage_role_inheritance::{StorageRoleInheritance, STORAGE_IAM_ROLES};
