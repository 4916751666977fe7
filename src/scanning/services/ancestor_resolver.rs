use crate::scanning::domain::{Binding, PathSegment, PolicyTuple};
use crate::scanning::policies::StorageRoleInheritance;
use std::collections::HashMap;

/// Index from a resource's path segments to the tuples attached to it
type PathIndex<'a> = HashMap<&'a [PathSegment], Vec<&'a PolicyTuple>>;

/// AncestorResolver service folding inherited grants into bucket bindings
///
/// Resources inherit policy bindings from their ancestors in the resource
/// hierarchy: a bucket inherits `roles/storage.objectViewer` granted on its
/// project or folder. The rules engine only sees the bindings it is handed,
/// so inherited storage grants are merged into each bucket's binding set
/// before evaluation.
///
/// Ancestors are found by walking the parent chain of each bucket's
/// [`ResourcePath`](crate::scanning::domain::ResourcePath), looking each
/// prefix up in a path index of the scanned tuples. Tuples without a
/// well-formed path are never indexed, so they never act as ancestors, and
/// are never resolved themselves.
///
/// Only buckets receive inherited bindings. Organizations, folders and
/// projects keep their directly attached bindings.
pub struct AncestorResolver;

impl AncestorResolver {
    /// Returns the tuples with inherited storage bindings merged into buckets
    ///
    /// The input is left untouched and the output keeps input order. For
    /// each bucket the result holds, per role, the union of the bucket's own
    /// members and the members granted that role on any ancestor (for
    /// storage roles only), so the order in which buckets and ancestors are
    /// visited does not matter. Resolving an already resolved list is a no-op.
    pub fn resolve(tuples: &[PolicyTuple]) -> Vec<PolicyTuple> {
        let index = Self::index_by_path(tuples);

        tuples
            .iter()
            .map(|tuple| match Self::resolve_bucket(tuple, &index) {
                Some(bindings) => tuple.with_bindings(bindings),
                None => tuple.clone(),
            })
            .collect()
    }

    /// Number of resolved tuples whose bindings differ from the input
    pub fn count_changed(original: &[PolicyTuple], resolved: &[PolicyTuple]) -> usize {
        original
            .iter()
            .zip(resolved)
            .filter(|(before, after)| before.bindings() != after.bindings())
            .count()
    }

    fn index_by_path(tuples: &[PolicyTuple]) -> PathIndex<'_> {
        let mut index: PathIndex<'_> = HashMap::new();
        for tuple in tuples {
            if let Some(path) = tuple.resource().path() {
                index.entry(path.segments()).or_default().push(tuple);
            }
        }
        index
    }

    /// Computes the resolved bindings of `tuple`, or `None` if it inherits nothing
    fn resolve_bucket(tuple: &PolicyTuple, index: &PathIndex<'_>) -> Option<Vec<Binding>> {
        let resource = tuple.resource();
        if !resource.kind().inherits_storage_bindings() {
            return None;
        }
        let path = resource.path()?;

        let mut bindings = Self::fold_duplicate_roles(tuple.bindings());
        for prefix in path.ancestor_prefixes() {
            let Some(ancestors) = index.get(prefix) else {
                continue;
            };
            for ancestor in ancestors {
                for binding in ancestor.bindings() {
                    Self::merge_inherited(&mut bindings, binding);
                }
            }
        }

        Some(bindings)
    }

    /// Merges repeated roles among a resource's own bindings into one entry each
    fn fold_duplicate_roles(own: &[Binding]) -> Vec<Binding> {
        let mut folded: Vec<Binding> = Vec::with_capacity(own.len());
        for binding in own {
            match folded.iter_mut().find(|b| b.has_same_role(binding)) {
                Some(existing) => existing.merge_members(binding),
                None => folded.push(binding.clone()),
            }
        }
        folded
    }

    fn merge_inherited(bindings: &mut Vec<Binding>, inherited: &Binding) {
        if !StorageRoleInheritance::is_inheritable(inherited) {
            return;
        }
        if bindings.contains(inherited) {
            return;
        }

        match bindings.iter_mut().find(|b| b.has_same_role(inherited)) {
            Some(existing) => existing.merge_members(inherited),
            None => bindings.push(inherited.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanning::domain::{Member, ParentRef, PolicyRecord, Resource, ResourceKind};
    use std::collections::{BTreeMap, BTreeSet};

    fn binding(role: &str, members: &[&str]) -> Binding {
        Binding::new(
            role,
            members.iter().map(|m| m.parse::<Member>().unwrap()),
        )
        .unwrap()
    }

    fn tuple(kind: ResourceKind, name: &str, full_name: &str, bindings: Vec<Binding>) -> PolicyTuple {
        let record = PolicyRecord::new(
            format!("policy-{}", name),
            ParentRef::new(kind.as_str(), name, full_name),
            "{}",
        );
        PolicyTuple::new(Resource::new(kind, name, full_name), record, bindings)
    }

    /// Role -> member strings view of a binding list
    fn role_map(bindings: &[Binding]) -> BTreeMap<String, BTreeSet<String>> {
        bindings
            .iter()
            .map(|b| {
                (
                    b.role_name().to_string(),
                    b.members().iter().map(Member::to_string).collect(),
                )
            })
            .collect()
    }

    fn set(members: &[&str]) -> BTreeSet<String> {
        members.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn test_end_to_end_example() {
        let tuples = vec![
            tuple(ResourceKind::Organization, "o1", "organization/o1/", vec![]),
            tuple(
                ResourceKind::Project,
                "p1",
                "organization/o1/project/p1/",
                vec![binding("roles/storage.admin", &["user:alice@example.com"])],
            ),
            tuple(
                ResourceKind::Bucket,
                "b1",
                "organization/o1/project/p1/bucket/b1/",
                vec![binding("roles/storage.objectViewer", &["user:bob@example.com"])],
            ),
        ];

        let resolved = AncestorResolver::resolve(&tuples);
        let bucket = role_map(resolved[2].bindings());

        assert_eq!(bucket.len(), 2);
        assert_eq!(
            bucket["roles/storage.objectViewer"],
            set(&["user:bob@example.com"])
        );
        assert_eq!(bucket["roles/storage.admin"], set(&["user:alice@example.com"]));
        assert_eq!(
            resolved[2].bindings()[0].role_name(),
            "roles/storage.objectViewer"
        );
    }

    #[test]
    fn test_allow_listed_role_is_inherited_once() {
        let tuples = vec![
            tuple(
                ResourceKind::Project,
                "p1",
                "organization/1/project/p1/",
                vec![binding("roles/storage.objectCreator", &["group:writers@example.com"])],
            ),
            tuple(ResourceKind::Bucket, "b1", "organization/1/project/p1/bucket/b1/", vec![]),
        ];

        let resolved = AncestorResolver::resolve(&tuples);
        let bucket = resolved[1].bindings();

        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0], tuples[0].bindings()[0]);
    }

    #[test]
    fn test_same_role_members_are_unioned() {
        let tuples = vec![
            tuple(
                ResourceKind::Folder,
                "f1",
                "organization/1/folder/f1/",
                vec![binding("roles/storage.objectViewer", &["user:y@example.com"])],
            ),
            tuple(
                ResourceKind::Bucket,
                "b1",
                "organization/1/folder/f1/project/p1/bucket/b1/",
                vec![binding("roles/storage.objectViewer", &["user:x@example.com"])],
            ),
        ];

        let resolved = AncestorResolver::resolve(&tuples);
        let bucket = resolved[1].bindings();

        assert_eq!(bucket.len(), 1);
        assert_eq!(
            role_map(bucket)["roles/storage.objectViewer"],
            set(&["user:x@example.com", "user:y@example.com"])
        );
    }

    #[test]
    fn test_grants_from_every_ancestor_level_are_unioned() {
        let tuples = vec![
            tuple(
                ResourceKind::Organization,
                "1",
                "organization/1/",
                vec![binding("roles/storage.admin", &["user:org-admin@example.com"])],
            ),
            tuple(
                ResourceKind::Folder,
                "f1",
                "organization/1/folder/f1/",
                vec![binding("roles/storage.admin", &["user:folder-admin@example.com"])],
            ),
            tuple(
                ResourceKind::Project,
                "p1",
                "organization/1/folder/f1/project/p1/",
                vec![binding("roles/storage.objectAdmin", &["serviceAccount:sa@p1.iam.gserviceaccount.com"])],
            ),
            tuple(
                ResourceKind::Bucket,
                "b1",
                "organization/1/folder/f1/project/p1/bucket/b1/",
                vec![],
            ),
        ];

        let resolved = AncestorResolver::resolve(&tuples);
        let bucket = role_map(resolved[3].bindings());

        assert_eq!(
            bucket["roles/storage.admin"],
            set(&["user:folder-admin@example.com", "user:org-admin@example.com"])
        );
        assert_eq!(
            bucket["roles/storage.objectAdmin"],
            set(&["serviceAccount:sa@p1.iam.gserviceaccount.com"])
        );
    }

    #[test]
    fn test_non_storage_roles_are_not_inherited() {
        let tuples = vec![
            tuple(
                ResourceKind::Project,
                "p1",
                "organization/1/project/p1/",
                vec![
                    binding("roles/owner", &["user:owner@example.com"]),
                    binding("roles/editor", &["user:editor@example.com"]),
                ],
            ),
            tuple(ResourceKind::Bucket, "b1", "organization/1/project/p1/bucket/b1/", vec![]),
        ];

        let resolved = AncestorResolver::resolve(&tuples);
        assert!(resolved[1].bindings().is_empty());
    }

    #[test]
    fn test_sibling_bindings_are_excluded() {
        let tuples = vec![
            tuple(
                ResourceKind::Project,
                "p2",
                "organization/1/project/p2/",
                vec![binding("roles/storage.admin", &["user:other@example.com"])],
            ),
            tuple(
                ResourceKind::Bucket,
                "b2",
                "organization/1/project/p1/bucket/b2/",
                vec![binding("roles/storage.admin", &["user:sibling@example.com"])],
            ),
            tuple(ResourceKind::Bucket, "b1", "organization/1/project/p1/bucket/b1/", vec![]),
        ];

        let resolved = AncestorResolver::resolve(&tuples);
        assert!(resolved[2].bindings().is_empty());
        assert_eq!(resolved[1].bindings(), tuples[1].bindings());
    }

    #[test]
    fn test_numeric_id_prefix_is_not_an_ancestor() {
        let tuples = vec![
            tuple(
                ResourceKind::Organization,
                "12",
                "organization/12/",
                vec![binding("roles/storage.admin", &["user:wrong@example.com"])],
            ),
            tuple(ResourceKind::Bucket, "b1", "organization/123/bucket/b1/", vec![]),
        ];

        let resolved = AncestorResolver::resolve(&tuples);
        assert!(resolved[1].bindings().is_empty());
    }

    #[test]
    fn test_descendant_bindings_do_not_flow_up() {
        let tuples = vec![
            tuple(
                ResourceKind::Bucket,
                "b1",
                "organization/1/project/p1/bucket/b1/",
                vec![binding("roles/storage.admin", &["user:a@example.com"])],
            ),
            tuple(ResourceKind::Project, "p1", "organization/1/project/p1/", vec![]),
        ];

        let resolved = AncestorResolver::resolve(&tuples);
        assert!(resolved[1].bindings().is_empty());
    }

    #[test]
    fn test_non_bucket_resources_are_unchanged() {
        let tuples = vec![
            tuple(
                ResourceKind::Organization,
                "1",
                "organization/1/",
                vec![binding("roles/storage.admin", &["user:a@example.com"])],
            ),
            tuple(
                ResourceKind::Folder,
                "f1",
                "organization/1/folder/f1/",
                vec![binding("roles/viewer", &["user:v@example.com"])],
            ),
            tuple(ResourceKind::Project, "p1", "organization/1/folder/f1/project/p1/", vec![]),
        ];

        let resolved = AncestorResolver::resolve(&tuples);
        assert_eq!(resolved, tuples);
        assert_eq!(AncestorResolver::count_changed(&tuples, &resolved), 0);
    }

    #[test]
    fn test_identical_binding_is_not_duplicated() {
        let shared = binding("roles/storage.objectViewer", &["user:a@example.com"]);
        let tuples = vec![
            tuple(ResourceKind::Project, "p1", "organization/1/project/p1/", vec![shared.clone()]),
            tuple(
                ResourceKind::Bucket,
                "b1",
                "organization/1/project/p1/bucket/b1/",
                vec![shared.clone()],
            ),
        ];

        let resolved = AncestorResolver::resolve(&tuples);
        assert_eq!(resolved[1].bindings(), &[shared]);
    }

    #[test]
    fn test_malformed_full_names_neither_give_nor_receive() {
        let tuples = vec![
            tuple(
                ResourceKind::Project,
                "p1",
                "",
                vec![binding("roles/storage.admin", &["user:empty@example.com"])],
            ),
            tuple(
                ResourceKind::Project,
                "p1",
                "organization",
                vec![binding("roles/storage.admin", &["user:broken@example.com"])],
            ),
            tuple(ResourceKind::Bucket, "b1", "organization/1/project/p1/bucket/b1/", vec![]),
            tuple(
                ResourceKind::Bucket,
                "b2",
                "o1/p1/b2",
                vec![binding("roles/storage.objectViewer", &["user:x@example.com"])],
            ),
            tuple(
                ResourceKind::Organization,
                "1",
                "organization/1/",
                vec![binding("roles/storage.admin", &["user:admin@example.com"])],
            ),
        ];

        let resolved = AncestorResolver::resolve(&tuples);
        assert_eq!(
            role_map(resolved[2].bindings())["roles/storage.admin"],
            set(&["user:admin@example.com"])
        );
        assert_eq!(resolved[3], tuples[3]);
    }

    #[test]
    fn test_bucket_without_ancestors_is_unchanged() {
        let tuples = vec![tuple(
            ResourceKind::Bucket,
            "b1",
            "organization/1/project/p1/bucket/b1/",
            vec![binding("roles/storage.objectViewer", &["user:bob@example.com"])],
        )];

        let resolved = AncestorResolver::resolve(&tuples);
        assert_eq!(resolved, tuples);
    }

    #[test]
    fn test_own_duplicate_roles_are_folded() {
        let tuples = vec![tuple(
            ResourceKind::Bucket,
            "b1",
            "organization/1/bucket/b1/",
            vec![
                binding("roles/storage.admin", &["user:a@example.com"]),
                binding("roles/storage.admin", &["user:b@example.com"]),
            ],
        )];

        let resolved = AncestorResolver::resolve(&tuples);
        assert_eq!(resolved[0].bindings().len(), 1);
        assert_eq!(resolved[0].bindings()[0].members().len(), 2);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let tuples = vec![
            tuple(
                ResourceKind::Organization,
                "1",
                "organization/1/",
                vec![binding("roles/storage.objectViewer", &["domain:example.com"])],
            ),
            tuple(
                ResourceKind::Project,
                "p1",
                "organization/1/project/p1/",
                vec![binding("roles/storage.objectViewer", &["user:p@example.com"])],
            ),
            tuple(
                ResourceKind::Bucket,
                "b1",
                "organization/1/project/p1/bucket/b1/",
                vec![binding("roles/storage.objectViewer", &["user:b@example.com"])],
            ),
        ];

        let once = AncestorResolver::resolve(&tuples);
        let twice = AncestorResolver::resolve(&once);
        assert_eq!(once, twice);
        assert_eq!(AncestorResolver::count_changed(&once, &twice), 0);
        assert_eq!(AncestorResolver::count_changed(&tuples, &once), 1);
    }

    #[test]
    fn test_result_is_independent_of_tuple_order() {
        let org = tuple(
            ResourceKind::Organization,
            "1",
            "organization/1/",
            vec![binding("roles/storage.admin", &["user:o@example.com"])],
        );
        let project = tuple(
            ResourceKind::Project,
            "p1",
            "organization/1/project/p1/",
            vec![binding("roles/storage.admin", &["user:p@example.com"])],
        );
        let bucket = tuple(ResourceKind::Bucket, "b1", "organization/1/project/p1/bucket/b1/", vec![]);

        let forward = AncestorResolver::resolve(&[org.clone(), project.clone(), bucket.clone()]);
        let backward = AncestorResolver::resolve(&[bucket, project, org]);

        assert_eq!(
            role_map(forward[2].bindings()),
            role_map(backward[0].bindings())
        );
    }

    #[test]
    fn test_input_is_not_mutated() {
        let tuples = vec![
            tuple(
                ResourceKind::Project,
                "p1",
                "organization/1/project/p1/",
                vec![binding("roles/storage.admin", &["user:a@example.com"])],
            ),
            tuple(ResourceKind::Bucket, "b1", "organization/1/project/p1/bucket/b1/", vec![]),
        ];
        let snapshot = tuples.clone();

        let _ = AncestorResolver::resolve(&tuples);
        assert_eq!(tuples, snapshot);
    }
}
