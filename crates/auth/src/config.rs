//! Credential configuration.
//!
//! Secret material is required: there is no built-in fallback key, so a
//! missing or empty secret stops initialization instead of producing tokens
//! anyone could forge.

use chrono::Duration;
use thiserror::Error;

/// Primary environment variable holding the signing secret.
pub const SECRET_ENV: &str = "GATEKEEPER_SECRET";

/// Accepted when [`SECRET_ENV`] is unset.
pub const LEGACY_SECRET_ENV: &str = "JWT_SECRET";

/// Optional validity window override, in whole seconds.
pub const TOKEN_TTL_ENV: &str = "GATEKEEPER_TOKEN_TTL_SECS";

/// Validity window applied when none is configured.
pub const DEFAULT_VALIDITY_SECS: i64 = 60 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("signing secret is missing or empty")]
    MissingSecret,

    #[error("invalid validity window: {0}")]
    InvalidValidityWindow(String),

    #[error("invalid value for {name}: {reason}")]
    InvalidVariable { name: String, reason: String },
}

/// Symmetric signing key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

/// Everything a [`CredentialAuthority`](crate::CredentialAuthority) needs.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    secret: SecretKey,
    validity_window: Duration,
}

impl AuthConfig {
    /// Config with the default one hour validity window.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        Ok(Self {
            secret: SecretKey::new(secret)?,
            validity_window: Duration::seconds(DEFAULT_VALIDITY_SECS),
        })
    }

    /// Timestamps are encoded in whole seconds, so the window must be a
    /// whole number of seconds and at least one second long.
    pub fn with_validity_window(mut self, window: Duration) -> Result<Self, ConfigError> {
        if window < Duration::seconds(1) {
            return Err(ConfigError::InvalidValidityWindow(format!(
                "must be at least 1s, got {}ms",
                window.num_milliseconds()
            )));
        }
        if window.subsec_nanos() != 0 {
            return Err(ConfigError::InvalidValidityWindow(format!(
                "must be whole seconds, got {}ms",
                window.num_milliseconds()
            )));
        }
        self.validity_window = window;
        Ok(self)
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) with an injectable variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = [SECRET_ENV, LEGACY_SECRET_ENV]
            .into_iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.is_empty())
            .ok_or(ConfigError::MissingSecret)?;

        let config = Self::new(secret)?;

        match lookup(TOKEN_TTL_ENV) {
            None => Ok(config),
            Some(raw) => {
                let secs: i64 = raw.trim().parse().map_err(|e| ConfigError::InvalidVariable {
                    name: TOKEN_TTL_ENV.to_string(),
                    reason: format!("{e}"),
                })?;
                let window = Duration::try_seconds(secs).ok_or_else(|| {
                    ConfigError::InvalidValidityWindow(format!("{secs}s is out of range"))
                })?;
                config.with_validity_window(window)
            }
        }
    }

    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }

    pub fn validity_window(&self) -> Duration {
        self.validity_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert_eq!(AuthConfig::new("").unwrap_err(), ConfigError::MissingSecret);
        assert_eq!(SecretKey::new(Vec::new()).unwrap_err(), ConfigError::MissingSecret);
    }

    #[test]
    fn defaults_to_one_hour() {
        let config = AuthConfig::new("s3cret").unwrap();
        assert_eq!(config.validity_window(), Duration::hours(1));
    }

    #[test]
    fn non_positive_window_is_rejected() {
        let config = AuthConfig::new("s3cret").unwrap();
        assert!(matches!(
            config.clone().with_validity_window(Duration::zero()),
            Err(ConfigError::InvalidValidityWindow(_))
        ));
        assert!(config.with_validity_window(Duration::seconds(-5)).is_err());
    }

    #[test]
    fn sub_second_and_fractional_windows_are_rejected() {
        let config = AuthConfig::new("s3cret").unwrap();
        for window in [Duration::milliseconds(500), Duration::milliseconds(1500)] {
            assert!(
                matches!(
                    config.clone().with_validity_window(window),
                    Err(ConfigError::InvalidValidityWindow(_))
                ),
                "accepted {window:?}"
            );
        }

        let config = config.with_validity_window(Duration::seconds(1)).unwrap();
        assert_eq!(config.validity_window(), Duration::seconds(1));
    }

    #[test]
    fn secret_is_redacted_in_debug() {
        let config = AuthConfig::new("hunter2").unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("REDACTED"));
    }

    #[test]
    fn from_lookup_requires_a_secret() {
        assert_eq!(
            AuthConfig::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::MissingSecret
        );
        assert_eq!(
            AuthConfig::from_lookup(lookup(&[(SECRET_ENV, "")])).unwrap_err(),
            ConfigError::MissingSecret
        );
    }

    #[test]
    fn from_lookup_prefers_primary_secret() {
        let config = AuthConfig::from_lookup(lookup(&[
            (SECRET_ENV, "primary"),
            (LEGACY_SECRET_ENV, "legacy"),
        ]))
        .unwrap();
        assert_eq!(config.secret().as_bytes(), b"primary");

        let config = AuthConfig::from_lookup(lookup(&[(LEGACY_SECRET_ENV, "legacy")])).unwrap();
        assert_eq!(config.secret().as_bytes(), b"legacy");
    }

    #[test]
    fn from_lookup_reads_ttl() {
        let config =
            AuthConfig::from_lookup(lookup(&[(SECRET_ENV, "s"), (TOKEN_TTL_ENV, "90")])).unwrap();
        assert_eq!(config.validity_window(), Duration::seconds(90));

        let err = AuthConfig::from_lookup(lookup(&[(SECRET_ENV, "s"), (TOKEN_TTL_ENV, "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVariable { .. }));

        let err = AuthConfig::from_lookup(lookup(&[(SECRET_ENV, "s"), (TOKEN_TTL_ENV, "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValidityWindow(_)));
    }
}
