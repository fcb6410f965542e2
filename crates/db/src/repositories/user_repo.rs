//! PostgreSQL-backed [`UserStore`].
//!
//! The table name is configurable, so queries are assembled with `format!`
//! after the name has been checked by [`is_valid_table_name`]. All values are
//! still bound as parameters.

use async_trait::async_trait;
use sqlx::PgPool;
use userauth_core::roles::Role;
use userauth_core::types::DbId;

use crate::error::StoreError;
use crate::models::user::{NewUser, User};
use crate::store::UserStore;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, password, role, created_ts";

/// PostgreSQL truncates identifiers at 63 bytes; constraint names add up to 15.
const MAX_TABLE_NAME_LEN: usize = 48;

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Check that `name` is a plain, unquoted SQL identifier.
pub fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= MAX_TABLE_NAME_LEN && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// User store over a single PostgreSQL table.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
    table: String,
}

impl PgUserStore {
    /// Create a store over `table`, rejecting names that are not plain identifiers.
    ///
    /// The name is folded to lowercase, as PostgreSQL does for unquoted
    /// identifiers, so derived constraint names match what the server reports.
    pub fn new(pool: PgPool, table: impl Into<String>) -> Result<Self, StoreError> {
        let table = table.into();
        if !is_valid_table_name(&table) {
            return Err(StoreError::InvalidTableName(table));
        }
        Ok(Self {
            pool,
            table: table.to_ascii_lowercase(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn email_constraint(&self) -> String {
        format!("uq_{}_email", self.table)
    }

    fn username_constraint(&self) -> String {
        format!("uq_{}_username", self.table)
    }

    /// Create the user table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let table = &self.table;
        let query = format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id BIGSERIAL PRIMARY KEY,
                username VARCHAR(30) NOT NULL,
                email VARCHAR(120) NOT NULL,
                password TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT '{basic}',
                created_ts TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT {uq_username} UNIQUE (username),
                CONSTRAINT {uq_email} UNIQUE (email),
                CONSTRAINT ck_{table}_role CHECK (role IN ('{admin}', '{basic}'))
            )",
            basic = Role::Basic.as_str(),
            admin = Role::Admin.as_str(),
            uq_username = self.username_constraint(),
            uq_email = self.email_constraint(),
        );
        sqlx::query(&query).execute(&self.pool).await?;
        tracing::debug!(table = %table, "User table ensured");
        Ok(())
    }

    /// Translate a unique violation on one of our constraints into the
    /// matching duplicate error.
    fn classify_insert_error(&self, err: sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                let constraint = db_err.constraint().unwrap_or_default();
                if constraint == self.email_constraint() {
                    return StoreError::DuplicateEmail;
                }
                if constraint == self.username_constraint() {
                    return StoreError::DuplicateUsername;
                }
            }
        }
        StoreError::Database(err)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM {} WHERE id = $1", self.table);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM {} WHERE email = $1", self.table);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM {} WHERE username = $1", self.table);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email_or_username(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, StoreError> {
        let query = format!(
            "SELECT {COLUMNS} FROM {}
             WHERE email = $1 OR username = $1
             ORDER BY (email = $1) DESC, id
             LIMIT 1",
            self.table
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM {} ORDER BY id", self.table);
        let users = sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn insert(&self, input: &NewUser) -> Result<User, StoreError> {
        let query = format!(
            "INSERT INTO {} (username, email, password, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}",
            self.table
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| self.classify_insert_error(e))
    }

    async fn update_password(&self, id: DbId, password_hash: &str) -> Result<bool, StoreError> {
        let query = format!("UPDATE {} SET password = $2 WHERE id = $1", self.table);
        let result = sqlx::query(&query)
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        let query = format!("DELETE FROM {} WHERE id = $1", self.table);
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }
}
