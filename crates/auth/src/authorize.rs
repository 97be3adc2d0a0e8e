use serde::Serialize;

use crate::permissions::WILDCARD;
use crate::{Permission, Role, RoleCapabilitySet};

/// Whether a granted permission covers a required one.
///
/// Each field is compatible when either side is `*` or both are equal; a
/// match needs both fields compatible. The rule has no special case for
/// `*:*`, so it is the same whichever side carries the wildcard.
pub fn matches(required: &Permission, granted: &Permission) -> bool {
    field_matches(required.resource(), granted.resource())
        && field_matches(required.action(), granted.action())
}

fn field_matches(required: &str, granted: &str) -> bool {
    required == WILDCARD || granted == WILDCARD || required == granted
}

/// Role-based permission check over an immutable [`RoleCapabilitySet`].
///
/// - No IO
/// - No panics
/// - No mutation after construction (safe for any number of readers)
#[derive(Debug, Clone, Default)]
pub struct PermissionMatcher {
    capabilities: RoleCapabilitySet,
}

impl PermissionMatcher {
    pub fn new(capabilities: RoleCapabilitySet) -> Self {
        Self { capabilities }
    }

    pub fn capabilities(&self) -> &RoleCapabilitySet {
        &self.capabilities
    }

    /// Granted permissions for `role`; empty when there is no role.
    pub fn grants(&self, role: Option<Role>) -> &[Permission] {
        match role {
            Some(role) => self.capabilities.grants(role),
            None => &[],
        }
    }

    /// True if any of `role`'s grants matches `required`.
    pub fn has_permission(&self, role: Option<Role>, required: &Permission) -> bool {
        self.grants(role).iter().any(|granted| matches(required, granted))
    }

    /// `has_permission` for a `(resource, action)` pair.
    ///
    /// Pass the result of a role lookup straight in: an absent role is
    /// denied, not an error.
    pub fn check_access(&self, role: Option<Role>, resource: &str, action: &str) -> bool {
        let required = Permission::new(resource.to_string(), action.to_string());
        self.has_permission(role, &required)
    }

    /// Explain why an authorization decision was made (or would be made).
    pub fn explain(&self, role: Option<Role>, required: &Permission) -> AccessExplanation {
        let grants = self.grants(role);
        let matched_by = grants.iter().find(|granted| matches(required, granted));
        let effective_permissions = grants.iter().map(|p| p.to_string()).collect();

        let (granted, reason, denial_reason) = match (role, matched_by) {
            (_, Some(grant)) => (
                true,
                if grant.is_wildcard() {
                    format!("Role has wildcard permission '{grant}'")
                } else {
                    format!("Role has permission '{grant}'")
                },
                None,
            ),
            (None, None) => (
                false,
                "Subject has no role assigned".to_string(),
                Some(DenialReason {
                    kind: DenialKind::NoRole,
                    message: "No role is assigned, so no permissions are granted".to_string(),
                }),
            ),
            (Some(role), None) => (
                false,
                format!("Role '{role}' does not grant '{required}'"),
                Some(DenialReason {
                    kind: DenialKind::MissingPermission,
                    message: format!("Missing required permission: '{required}'"),
                }),
            ),
        };

        AccessExplanation {
            required_permission: required.to_string(),
            role,
            granted,
            reason,
            matched_by: matched_by.map(|p| p.to_string()),
            effective_permissions,
            denial_reason,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
#[derive(Debug, Clone, Serialize)]
pub struct AccessExplanation {
    /// The permission that was being checked.
    pub required_permission: String,

    /// Role the decision was made for, if any.
    pub role: Option<Role>,

    /// Whether the authorization was granted.
    pub granted: bool,

    /// Human-readable reason for the decision.
    pub reason: String,

    /// First grant that covered the requirement.
    pub matched_by: Option<String>,

    /// Everything the role is granted, in grant order.
    pub effective_permissions: Vec<String>,

    /// If denied, this explains what was missing.
    pub denial_reason: Option<DenialReason>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    NoRole,
    MissingPermission,
}
