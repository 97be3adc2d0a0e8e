//! Role → capability table.
//!
//! Built once at startup and never mutated afterwards; hand it to a
//! [`PermissionMatcher`](crate::PermissionMatcher) by value.

use serde::Serialize;

use crate::{Permission, Role};

/// Immutable mapping from every [`Role`] to its ordered granted permissions.
///
/// Storage is indexed by role, so every role has an entry (possibly empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleCapabilitySet {
    grants: [Vec<Permission>; 3],
}

impl RoleCapabilitySet {
    pub fn builder() -> RoleCapabilitySetBuilder {
        RoleCapabilitySetBuilder::default()
    }

    /// A table where no role is granted anything.
    pub fn empty() -> Self {
        Self::builder().build()
    }

    /// Granted permissions for `role`, in grant order.
    pub fn grants(&self, role: Role) -> &[Permission] {
        &self.grants[role.index()]
    }

    /// Snapshot of the whole table (for audit/display).
    pub fn definitions(&self) -> Vec<RoleDefinition> {
        Role::ALL
            .into_iter()
            .map(|role| RoleDefinition {
                role,
                permissions: self.grants(role).iter().map(|p| p.to_string()).collect(),
                description: role_description(role),
            })
            .collect()
    }
}

impl Default for RoleCapabilitySet {
    /// `admin -> [*:*]`, `user -> [posts:read, posts:create]`, `guest -> [posts:read]`.
    fn default() -> Self {
        Self::builder()
            .grant(Role::Admin, Permission::all())
            .grant(Role::User, Permission::new("posts", "read"))
            .grant(Role::User, Permission::new("posts", "create"))
            .grant(Role::Guest, Permission::new("posts", "read"))
            .build()
    }
}

#[derive(Debug, Default)]
pub struct RoleCapabilitySetBuilder {
    grants: [Vec<Permission>; 3],
}

impl RoleCapabilitySetBuilder {
    /// Append `permission` to `role`'s grants. Duplicates are dropped.
    pub fn grant(mut self, role: Role, permission: Permission) -> Self {
        let grants = &mut self.grants[role.index()];
        if !grants.contains(&permission) {
            grants.push(permission);
        }
        self
    }

    pub fn grant_all(
        self,
        role: Role,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Self {
        permissions
            .into_iter()
            .fold(self, |builder, p| builder.grant(role, p))
    }

    pub fn build(self) -> RoleCapabilitySet {
        RoleCapabilitySet { grants: self.grants }
    }
}

/// Role definition with its granted permissions (for audit/display).
#[derive(Debug, Clone, Serialize)]
pub struct RoleDefinition {
    pub role: Role,
    pub permissions: Vec<String>,
    pub description: Option<String>,
}

fn role_description(role: Role) -> Option<String> {
    let text = match role {
        Role::Admin => "Full administrator",
        Role::User => "Regular authenticated user",
        Role::Guest => "Read-only visitor",
    };
    Some(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_has_an_entry() {
        let set = RoleCapabilitySet::empty();
        for role in Role::ALL {
            assert!(set.grants(role).is_empty());
        }
    }

    #[test]
    fn grants_keep_order_and_drop_duplicates() {
        let set = RoleCapabilitySet::builder()
            .grant(Role::User, Permission::new("posts", "read"))
            .grant(Role::User, Permission::new("posts", "create"))
            .grant(Role::User, Permission::new("posts", "read"))
            .build();

        assert_eq!(
            set.grants(Role::User),
            &[Permission::new("posts", "read"), Permission::new("posts", "create")]
        );
        assert!(set.grants(Role::Admin).is_empty());
    }

    #[test]
    fn default_policy() {
        let set = RoleCapabilitySet::default();
        assert_eq!(set.grants(Role::Admin), &[Permission::all()]);
        assert_eq!(set.grants(Role::User).len(), 2);
        assert_eq!(set.grants(Role::Guest), &[Permission::new("posts", "read")]);
    }

    #[test]
    fn definitions_cover_all_roles() {
        let defs = RoleCapabilitySet::default().definitions();
        assert_eq!(defs.len(), Role::ALL.len());
        assert_eq!(defs[0].role, Role::Admin);
        assert_eq!(defs[0].permissions, vec!["*:*".to_string()]);
    }
}
