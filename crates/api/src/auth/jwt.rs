//! Signed, time-limited access and refresh tokens.
//!
//! Both token kinds are HS256 JWTs signed with the same shared secret. They
//! differ only in lifetime and in whether a `role` claim is present. Tokens
//! are stateless: there is no server-side session or revocation list, so a
//! token stays valid until its `exp`.

use std::fmt;

use chrono::{TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use userauth_core::error::CoreError;
use userauth_core::roles::Role;
use userauth_core::types::DbId;

/// Default access token lifetime in minutes.
pub const DEFAULT_ACCESS_LIFETIME_MINS: i64 = 15;
/// Default refresh token lifetime in days.
pub const DEFAULT_REFRESH_LIFETIME_DAYS: i64 = 7;
/// Longest accepted access token lifetime (one year) in minutes.
pub const MAX_ACCESS_LIFETIME_MINS: i64 = 365 * 24 * 60;
/// Longest accepted refresh token lifetime (ten years) in days.
pub const MAX_REFRESH_LIFETIME_DAYS: i64 = 10 * 365;

/// Claims carried by both token kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject -- the user's email.
    pub sub: String,
    /// The user's internal database id.
    pub id: DbId,
    /// Present on access tokens only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

/// Configuration for token signing and lifetimes.
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Access token lifetime in minutes (default: 15).
    pub access_token_lifetime_mins: i64,
    /// Refresh token lifetime in days (default: 7).
    pub refresh_token_lifetime_days: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_token_lifetime_mins", &self.access_token_lifetime_mins)
            .field("refresh_token_lifetime_days", &self.refresh_token_lifetime_days)
            .finish()
    }
}

/// Issues and decodes tokens. Keys are derived once at construction.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_lifetime_mins: i64,
    refresh_lifetime_days: i64,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact: a token is rejected the second after `exp`.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            access_lifetime_mins: config.access_token_lifetime_mins,
            refresh_lifetime_days: config.refresh_token_lifetime_days,
        }
    }

    /// Configured access token lifetime in minutes.
    pub fn access_lifetime_mins(&self) -> i64 {
        self.access_lifetime_mins
    }

    /// Configured refresh token lifetime in days.
    pub fn refresh_lifetime_days(&self) -> i64 {
        self.refresh_lifetime_days
    }

    /// Issue an access token with claims `{sub, id, role, exp = now + ttl}`.
    pub fn issue_access_token(
        &self,
        subject_email: &str,
        user_id: DbId,
        role: Role,
        ttl_minutes: i64,
    ) -> Result<String, CoreError> {
        self.issue(subject_email, user_id, Some(role), TimeDelta::try_minutes(ttl_minutes))
    }

    /// Issue a refresh token with claims `{sub, id, exp = now + ttl}` and no role.
    pub fn issue_refresh_token(
        &self,
        subject_email: &str,
        user_id: DbId,
        ttl_days: i64,
    ) -> Result<String, CoreError> {
        self.issue(subject_email, user_id, None, TimeDelta::try_days(ttl_days))
    }

    fn issue(
        &self,
        subject_email: &str,
        user_id: DbId,
        role: Option<Role>,
        ttl: Option<TimeDelta>,
    ) -> Result<String, CoreError> {
        let ttl = ttl.ok_or_else(|| CoreError::Internal("token lifetime out of range".into()))?;
        if ttl <= TimeDelta::zero() {
            return Err(CoreError::Internal(
                "token lifetime must be positive".into(),
            ));
        }
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| CoreError::Internal("token expiry out of range".into()))?;

        let claims = Claims {
            sub: subject_email.to_string(),
            id: user_id,
            role,
            exp: expires_at.timestamp(),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, CoreError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| CoreError::Internal(format!("Token generation error: {e}")))
    }

    /// Verify signature and expiry and return the embedded [`Claims`].
    ///
    /// No other claim is checked; callers decide what the role means.
    pub fn decode(&self, token: &str) -> Result<Claims, CoreError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => CoreError::ExpiredToken,
                _ => CoreError::InvalidToken,
            })
    }
}
