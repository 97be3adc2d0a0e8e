//! Façade composing credentials, role assignments and the permission matcher.

use thiserror::Error;
use tracing::debug;

use crate::{
    AccessExplanation, Credential, CredentialAuthority, CredentialError, InMemoryRoleStore,
    Permission, PermissionMatcher, Role, RoleAssignments, Subject,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(#[from] CredentialError),

    #[error("forbidden: '{subject}' may not {action} {resource}")]
    Forbidden {
        subject: Subject,
        resource: String,
        action: String,
    },
}

/// Authentication plus role-based authorization in one place.
///
/// Checking access reads the role store and then the matcher without holding
/// anything across both reads: an `assign` racing with a check may or may not
/// be visible to that check. Later checks always see it.
#[derive(Debug)]
pub struct AccessControl<S = InMemoryRoleStore> {
    credentials: CredentialAuthority,
    matcher: PermissionMatcher,
    roles: S,
}

impl AccessControl<InMemoryRoleStore> {
    pub fn new(credentials: CredentialAuthority, matcher: PermissionMatcher) -> Self {
        Self::with_store(credentials, matcher, InMemoryRoleStore::new())
    }
}

impl<S: RoleAssignments> AccessControl<S> {
    pub fn with_store(credentials: CredentialAuthority, matcher: PermissionMatcher, roles: S) -> Self {
        Self {
            credentials,
            matcher,
            roles,
        }
    }

    pub fn issue(&self, subject: impl Into<Subject>) -> Result<Credential, CredentialError> {
        self.credentials.issue(subject)
    }

    pub fn verify(&self, token: &str) -> Result<Subject, CredentialError> {
        self.credentials.verify(token)
    }

    pub fn assign(&self, subject: impl Into<Subject>, role: Role) {
        self.roles.assign(subject.into(), role)
    }

    pub fn role_of(&self, subject: &Subject) -> Option<Role> {
        self.roles.role_of(subject)
    }

    pub fn check_access(&self, role: Option<Role>, resource: &str, action: &str) -> bool {
        self.matcher.check_access(role, resource, action)
    }

    /// Whether `subject`'s current role allows `action` on `resource`.
    /// Subjects without a role are denied.
    pub fn subject_may(&self, subject: &Subject, resource: &str, action: &str) -> bool {
        self.check_access(self.role_of(subject), resource, action)
    }

    /// Verify `token` and check its subject's access in one step.
    pub fn authorize(
        &self,
        token: &str,
        resource: &str,
        action: &str,
    ) -> Result<Subject, AccessError> {
        let subject = self.verify(token)?;

        if self.subject_may(&subject, resource, action) {
            debug!(%subject, resource, action, "access granted");
            Ok(subject)
        } else {
            debug!(%subject, resource, action, "access denied");
            Err(AccessError::Forbidden {
                subject,
                resource: resource.to_string(),
                action: action.to_string(),
            })
        }
    }

    pub fn explain(&self, subject: &Subject, resource: &str, action: &str) -> AccessExplanation {
        let required = Permission::new(resource.to_string(), action.to_string());
        self.matcher.explain(self.role_of(subject), &required)
    }
}
