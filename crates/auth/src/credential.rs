//! Credential issuance and verification (HS256 JWT).
//!
//! Stateless: nothing about issued credentials is remembered, so verification
//! is a pure function of the token, the secret and the clock.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use tracing::{debug, warn};

use crate::claims::{CredentialClaims, TokenValidationError, validate_claims};
use crate::config::{AuthConfig, ConfigError};
use crate::Subject;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// Tampered, signed with another key, or not a credential at all.
    #[error("invalid credential signature")]
    InvalidSignature,

    #[error("credential has expired")]
    Expired,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to encode credential: {0}")]
    Encoding(String),
}

impl From<TokenValidationError> for CredentialError {
    // Properly signed tokens from this issuer always have `iat < exp`, and a
    // future `iat` means the token was not minted under this clock.
    fn from(value: TokenValidationError) -> Self {
        match value {
            TokenValidationError::Expired => Self::Expired,
            TokenValidationError::NotYetValid | TokenValidationError::InvalidTimeWindow => {
                Self::InvalidSignature
            }
        }
    }
}

/// A freshly issued credential.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    claims: CredentialClaims,
}

impl Credential {
    /// The opaque signed token to hand to the client.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn into_token(self) -> String {
        self.token
    }

    pub fn subject(&self) -> &Subject {
        &self.claims.sub
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.claims.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at
    }

    pub fn claims(&self) -> &CredentialClaims {
        &self.claims
    }
}

impl core::fmt::Debug for Credential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("claims", &self.claims)
            .finish()
    }
}

/// Issues and verifies credentials with a symmetric secret.
#[derive(Clone)]
pub struct CredentialAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    validity_window: Duration,
}

impl core::fmt::Debug for CredentialAuthority {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CredentialAuthority")
            .field("algorithm", &Algorithm::HS256)
            .field("validity_window", &self.validity_window)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl CredentialAuthority {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the caller's clock in `validate_claims`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "iat", "exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            validity_window: config.validity_window(),
        }
    }

    /// Shorthand for `new(&AuthConfig::new(secret)?)`.
    pub fn from_secret(secret: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        Ok(Self::new(&AuthConfig::new(secret)?))
    }

    pub fn validity_window(&self) -> Duration {
        self.validity_window
    }

    pub fn issue(&self, subject: impl Into<Subject>) -> Result<Credential, CredentialError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a credential valid from `now` (truncated to whole seconds) for
    /// one validity window.
    pub fn issue_at(
        &self,
        subject: impl Into<Subject>,
        now: DateTime<Utc>,
    ) -> Result<Credential, CredentialError> {
        let issued_at = now.trunc_subsecs(0);
        let expires_at = issued_at
            .checked_add_signed(self.validity_window)
            .ok_or_else(|| {
                ConfigError::InvalidValidityWindow("expiry overflows the calendar".to_string())
            })?;

        let claims = CredentialClaims {
            sub: subject.into(),
            issued_at,
            expires_at,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| CredentialError::Encoding(e.to_string()))?;

        debug!(subject = %claims.sub, %expires_at, "issued credential");
        Ok(Credential { token, claims })
    }

    /// Verify `token` now and return its subject.
    pub fn verify(&self, token: &str) -> Result<Subject, CredentialError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Subject, CredentialError> {
        self.decode_at(token, now).map(|claims| claims.sub)
    }

    /// Check the signature, then the validity window at `now`.
    pub fn decode_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<CredentialClaims, CredentialError> {
        let data = decode::<CredentialClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                warn!(error = %e, "credential signature rejected");
                CredentialError::InvalidSignature
            })?;

        let claims = data.claims;
        validate_claims(&claims, now).map_err(|e| {
            warn!(subject = %claims.sub, error = %e, "credential rejected");
            CredentialError::from(e)
        })?;

        debug!(subject = %claims.sub, "credential verified");
        Ok(claims)
    }
}
