use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::{Role, Subject};

/// Subject → role assignments.
///
/// At most one role per subject; `assign` overwrites. A subject that was
/// never assigned has no role, which is a normal state and not an error.
pub trait RoleAssignments: Send + Sync {
    fn assign(&self, subject: Subject, role: Role);
    fn role_of(&self, subject: &Subject) -> Option<Role>;
}

impl<S> RoleAssignments for Arc<S>
where
    S: RoleAssignments + ?Sized,
{
    fn assign(&self, subject: Subject, role: Role) {
        (**self).assign(subject, role)
    }

    fn role_of(&self, subject: &Subject) -> Option<Role> {
        (**self).role_of(subject)
    }
}

/// Process-local assignments behind a reader/writer lock.
///
/// Each assignment is a single insert under the write lock, so readers see
/// either the previous role or the new one.
#[derive(Debug, Default)]
pub struct InMemoryRoleStore {
    inner: RwLock<HashMap<Subject, Role>>,
}

impl InMemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic elsewhere cannot leave a half-applied insert behind, so the
    // map is still consistent after poisoning.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Subject, Role>> {
        self.inner.read().unwrap_or_else(|poisoned| {
            warn!("role store lock poisoned; recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Subject, Role>> {
        self.inner.write().unwrap_or_else(|poisoned| {
            warn!("role store lock poisoned; recovering");
            PoisonError::into_inner(poisoned)
        })
    }
}

impl RoleAssignments for InMemoryRoleStore {
    fn assign(&self, subject: Subject, role: Role) {
        let previous = self.write().insert(subject.clone(), role);
        debug!(%subject, %role, ?previous, "role assigned");
    }

    fn role_of(&self, subject: &Subject) -> Option<Role> {
        self.read().get(subject).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn unassigned_subject_has_no_role() {
        let store = InMemoryRoleStore::new();
        assert_eq!(store.role_of(&Subject::new("nobody")), None);
        assert!(store.is_empty());
    }

    #[test]
    fn assign_then_lookup() {
        let store = InMemoryRoleStore::new();
        store.assign(Subject::new("alice"), Role::User);
        assert_eq!(store.role_of(&Subject::new("alice")), Some(Role::User));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn reassignment_overwrites() {
        let store = InMemoryRoleStore::new();
        let alice = Subject::new("alice");
        store.assign(alice.clone(), Role::Guest);
        store.assign(alice.clone(), Role::Admin);
        assert_eq!(store.role_of(&alice), Some(Role::Admin));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn shared_through_arc() {
        let store = Arc::new(InMemoryRoleStore::new());
        let as_trait: Arc<dyn RoleAssignments> = store.clone();
        as_trait.assign(Subject::new("bob"), Role::Guest);
        assert_eq!(store.role_of(&Subject::new("bob")), Some(Role::Guest));
    }

    #[test]
    fn concurrent_readers_never_see_a_foreign_role() {
        let store = Arc::new(InMemoryRoleStore::new());
        let carol = Subject::new("carol");
        store.assign(carol.clone(), Role::Guest);

        let writer = {
            let store = Arc::clone(&store);
            let carol = carol.clone();
            thread::spawn(move || {
                for i in 0..1_000 {
                    let role = if i % 2 == 0 { Role::User } else { Role::Guest };
                    store.assign(carol.clone(), role);
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let carol = carol.clone();
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        let role = store.role_of(&carol);
                        assert!(matches!(role, Some(Role::User) | Some(Role::Guest)));
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(store.role_of(&carol), Some(Role::Guest));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn role() -> impl Strategy<Value = Role> {
            prop_oneof![Just(Role::Admin), Just(Role::User), Just(Role::Guest)]
        }

        proptest! {
            /// Property: the last assignment per subject wins.
            #[test]
            fn last_assignment_wins(
                ops in proptest::collection::vec(("[a-c]", role()), 1..50)
            ) {
                let store = InMemoryRoleStore::new();
                let mut expected: HashMap<String, Role> = HashMap::new();

                for (subject, role) in &ops {
                    store.assign(Subject::new(subject.clone()), *role);
                    expected.insert(subject.clone(), *role);
                }

                for subject in ["a", "b", "c"] {
                    prop_assert_eq!(
                        store.role_of(&Subject::new(subject)),
                        expected.get(subject).copied()
                    );
                }
                prop_assert_eq!(store.len(), expected.len());
            }
        }
    }
}
