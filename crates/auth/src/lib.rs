//! `gatekeeper-auth` — credentials and role-based authorization.
//!
//! This crate is intentionally decoupled from HTTP and storage: it works on
//! subjects, roles and time only.

pub mod access;
pub mod authorize;
pub mod claims;
pub mod config;
pub mod credential;
pub mod permissions;
pub mod policy;
pub mod roles;
pub mod store;
pub mod subject;

pub use access::{AccessControl, AccessError};
pub use authorize::{AccessExplanation, DenialKind, DenialReason, PermissionMatcher, matches};
pub use claims::{CredentialClaims, TokenValidationError, validate_claims};
pub use config::{AuthConfig, ConfigError, SecretKey};
pub use credential::{Credential, CredentialAuthority, CredentialError};
pub use permissions::{ParsePermissionError, Permission, WILDCARD};
pub use policy::{RoleCapabilitySet, RoleCapabilitySetBuilder, RoleDefinition};
pub use roles::{ParseRoleError, Role};
pub use store::{InMemoryRoleStore, RoleAssignments};
pub use subject::Subject;
