//! User accounts.

use async_trait::async_trait;
use sqlx::PgPool;

use coledzh_shop_core::{Email, Login, Role, UserId};

use super::RepositoryError;
use crate::models::User;

/// Durable user records. Login and email are each globally unique.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert an unverified ordinary user.
    ///
    /// Returns `RepositoryError::Conflict` when the login or email is taken.
    async fn save_user(
        &self,
        login: &Login,
        email: &Email,
        password_hash: &str,
    ) -> Result<UserId, RepositoryError>;

    /// Insert a pre-verified admin.
    ///
    /// Returns `RepositoryError::Conflict` when the login or email is taken.
    async fn save_admin(
        &self,
        login: &Login,
        email: &Email,
        password_hash: &str,
    ) -> Result<(), RepositoryError>;

    /// Look up a user together with their password hash.
    async fn user_by_email(&self, email: &Email)
    -> Result<Option<(User, String)>, RepositoryError>;

    /// Set the verified flag. Succeeds for already verified users.
    ///
    /// Returns `RepositoryError::NotFound` when no such user exists.
    async fn verify_email(&self, id: UserId) -> Result<(), RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    login: String,
    email: String,
    password_hash: String,
    role: Role,
    email_verified: bool,
}

impl UserRow {
    fn into_user(self) -> Result<(User, String), RepositoryError> {
        let login = Login::parse(&self.login).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid login in database: {e}"))
        })?;
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok((
            User {
                id: self.id,
                login,
                email,
                role: self.role,
                email_verified: self.email_verified,
            },
            self.password_hash,
        ))
    }
}

/// `PostgreSQL` implementation of [`UserStore`].
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new user store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(
        &self,
        login: &Login,
        email: &Email,
        password_hash: &str,
        role: Role,
        email_verified: bool,
    ) -> Result<UserId, RepositoryError> {
        let id = UserId::generate();

        sqlx::query(
            r"
            INSERT INTO users (id, login, email, password_hash, role, email_verified)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(id)
        .bind(login.as_str())
        .bind(email.as_str())
        .bind(password_hash)
        .bind(role)
        .bind(email_verified)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "user"))?;

        Ok(id)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn save_user(
        &self,
        login: &Login,
        email: &Email,
        password_hash: &str,
    ) -> Result<UserId, RepositoryError> {
        self.insert(login, email, password_hash, Role::User, false)
            .await
    }

    async fn save_admin(
        &self,
        login: &Login,
        email: &Email,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        self.insert(login, email, password_hash, Role::Admin, true)
            .await
            .map(|_| ())
    }

    async fn user_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT id, login, email, password_hash, role, email_verified
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn verify_email(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET email_verified = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
