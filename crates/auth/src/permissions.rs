use std::borrow::Cow;

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field value meaning "any value of this field".
pub const WILDCARD: &str = "*";

/// A grantable capability: an action on a resource.
///
/// Either field may be [`WILDCARD`]. Permissions have no identity and are
/// compared by value. Textual form is `resource:action` (e.g. `posts:read`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    resource: Cow<'static, str>,
    action: Cow<'static, str>,
}

impl Permission {
    pub fn new(
        resource: impl Into<Cow<'static, str>>,
        action: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
        }
    }

    /// `*:*`, i.e. every action on every resource.
    pub fn all() -> Self {
        Self::new(WILDCARD, WILDCARD)
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn is_wildcard(&self) -> bool {
        self.resource() == WILDCARD && self.action() == WILDCARD
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.resource, self.action)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid permission '{0}' (expected 'resource:action')")]
pub struct ParsePermissionError(pub String);

impl FromStr for Permission {
    type Err = ParsePermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (resource, action) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| ParsePermissionError(s.to_string()))?;
        let (resource, action) = (resource.trim(), action.trim());

        if resource.is_empty() || action.is_empty() || action.contains(':') {
            return Err(ParsePermissionError(s.to_string()));
        }

        Ok(Self::new(resource.to_string(), action.to_string()))
    }
}
