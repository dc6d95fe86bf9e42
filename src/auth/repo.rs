use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::repo_types::{NewUser, User};
use crate::error::AppError;

pub const EMAIL_TAKEN: &str = "E-mail já cadastrado";

/// Credential store.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Find a user by (normalised) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Insert a user; `AppError::Conflict` if the email is already present.
    async fn create(&self, new: NewUser) -> Result<User, AppError>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, nome, email, password_hash, created_at
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(&self, new: NewUser) -> Result<User, AppError> {
        let res = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (nome, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, nome, email, password_hash, created_at
            "#,
        )
        .bind(&new.nome)
        .bind(&new.email)
        .bind(&new.password_hash)
        .fetch_one(&self.db)
        .await;

        match res {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AppError::conflict(EMAIL_TAKEN))
            }
            Err(e) => Err(e.into()),
        }
    }
}
