use std::fmt;
use std::str::FromStr;

use axum::http::HeaderValue;
use userauth_db::repositories::user_repo::is_valid_table_name;

use crate::auth::jwt::{
    JwtConfig, DEFAULT_ACCESS_LIFETIME_MINS, DEFAULT_REFRESH_LIFETIME_DAYS,
    MAX_ACCESS_LIFETIME_MINS, MAX_REFRESH_LIFETIME_DAYS,
};
use crate::auth::password::BCRYPT_MAX_INPUT_BYTES;

/// Default table holding user records.
pub const DEFAULT_USER_TABLE: &str = "users";

/// Errors raised while reading configuration at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Password hashing parameters.
#[derive(Clone)]
pub struct PepperConfig {
    /// Server-side secret prepended to every password before hashing.
    pub pepper: String,
    /// bcrypt work factor (default: `bcrypt::DEFAULT_COST`).
    pub cost: u32,
}

impl fmt::Debug for PepperConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PepperConfig")
            .field("pepper", &"<redacted>")
            .field("cost", &self.cost)
            .finish()
    }
}

/// Credentials for the administrator created at first start.
#[derive(Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Server configuration loaded from environment variables.
///
/// Built once at startup and handed to the components that need it; nothing
/// reads the environment after this.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Connection string for the user database.
    pub database_url: String,
    /// Table holding user records (default: `users`).
    pub user_table_name: String,
    /// JWT token configuration (secret, lifetimes).
    pub jwt: JwtConfig,
    /// Password hashing configuration (pepper, cost).
    pub hasher: PepperConfig,
    /// Bootstrap administrator, if all three `ADMIN_*` variables are set.
    pub admin: Option<AdminBootstrap>,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                  | Required | Default                 |
    /// |--------------------------|----------|-------------------------|
    /// | `JWT_SECRET`             | **yes**  | --                      |
    /// | `BCRYPT_PEPPER`          | **yes**  | --                      |
    /// | `USER_DB_URL`            | **yes**  | falls back to `DATABASE_URL` |
    /// | `ACCESS_TOKEN_LIFETIME`  | no       | `15` (minutes)          |
    /// | `REFRESH_TOKEN_LIFETIME` | no       | `7` (days)              |
    /// | `BCRYPT_COST`            | no       | `12`                    |
    /// | `USER_TABLE_NAME`        | no       | `users`                 |
    /// | `ADMIN_EMAIL`            | no       | --                      |
    /// | `ADMIN_USERNAME`         | no       | --                      |
    /// | `ADMIN_PASSWORD`         | no       | --                      |
    /// | `HOST`                   | no       | `0.0.0.0`               |
    /// | `PORT`                   | no       | `8000`                  |
    /// | `CORS_ORIGINS`           | no       | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`   | no       | `30`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or(&lookup, "PORT", 8000)?;

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|e| ConfigError::Invalid {
                    key: "CORS_ORIGINS",
                    value: origin.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let request_timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;

        let database_url = lookup("USER_DB_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .ok_or(ConfigError::Missing("USER_DB_URL"))?;

        let user_table_name =
            lookup("USER_TABLE_NAME").unwrap_or_else(|| DEFAULT_USER_TABLE.into());
        if !is_valid_table_name(&user_table_name) {
            return Err(ConfigError::Invalid {
                key: "USER_TABLE_NAME",
                value: user_table_name,
                reason: "must be a plain SQL identifier".into(),
            });
        }
        let user_table_name = user_table_name.to_ascii_lowercase();

        let jwt = JwtConfig {
            secret: required(&lookup, "JWT_SECRET")?,
            access_token_lifetime_mins: lifetime(
                &lookup,
                "ACCESS_TOKEN_LIFETIME",
                DEFAULT_ACCESS_LIFETIME_MINS,
                MAX_ACCESS_LIFETIME_MINS,
            )?,
            refresh_token_lifetime_days: lifetime(
                &lookup,
                "REFRESH_TOKEN_LIFETIME",
                DEFAULT_REFRESH_LIFETIME_DAYS,
                MAX_REFRESH_LIFETIME_DAYS,
            )?,
        };

        let hasher = PepperConfig {
            pepper: required(&lookup, "BCRYPT_PEPPER")?,
            cost: parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        };
        if !(4..=31).contains(&hasher.cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: hasher.cost.to_string(),
                reason: "must be between 4 and 31".into(),
            });
        }
        if hasher.pepper.len() >= BCRYPT_MAX_INPUT_BYTES {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_PEPPER",
                value: "<redacted>".into(),
                reason: format!("must be shorter than {BCRYPT_MAX_INPUT_BYTES} bytes"),
            });
        }

        let admin = match (
            lookup("ADMIN_EMAIL"),
            lookup("ADMIN_USERNAME"),
            lookup("ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(username), Some(password))
                if !email.is_empty() && !username.is_empty() && !password.is_empty() =>
            {
                Some(AdminBootstrap {
                    email,
                    username,
                    password,
                })
            }
            _ => None,
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            user_table_name,
            jwt,
            hasher,
            admin,
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).ok_or(ConfigError::Missing(key))?;
    if value.is_empty() {
        return Err(ConfigError::Empty(key));
    }
    Ok(value)
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn lifetime<F>(lookup: &F, key: &'static str, default: i64, max: i64) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or(lookup, key, default)?;
    if !(1..=max).contains(&value) {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: format!("must be between 1 and {max}"),
        });
    }
    Ok(value)
}
