use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Filme, NewFilme};
use crate::error::AppError;

/// Movie store. Every write is a single-row statement; no transactions.
#[async_trait]
pub trait FilmeRepo: Send + Sync {
    /// All movies owned by `owner`, oldest first.
    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Filme>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Filme>, AppError>;

    async fn create(&self, owner: Uuid, new: NewFilme) -> Result<Filme, AppError>;

    /// Persists the editable fields of `filme`, matched on both id and owner.
    /// `None` if no such row exists anymore.
    async fn update(&self, filme: &Filme) -> Result<Option<Filme>, AppError>;

    /// Deletes the movie if it exists and belongs to `owner`.
    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgFilmeRepo {
    db: PgPool,
}

impl PgFilmeRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const COLUMNS: &str =
    "id, user_id, nome_filme, imagem_filme, data_assistir, descricao, created_at, updated_at";

#[async_trait]
impl FilmeRepo for PgFilmeRepo {
    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Filme>, AppError> {
        let rows = sqlx::query_as::<_, Filme>(&format!(
            "SELECT {COLUMNS} FROM filmes WHERE user_id = $1 ORDER BY created_at ASC"
        ))
        .bind(owner)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Filme>, AppError> {
        let row = sqlx::query_as::<_, Filme>(&format!("SELECT {COLUMNS} FROM filmes WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn create(&self, owner: Uuid, new: NewFilme) -> Result<Filme, AppError> {
        let row = sqlx::query_as::<_, Filme>(&format!(
            r#"
            INSERT INTO filmes (user_id, nome_filme, imagem_filme, data_assistir, descricao)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(owner)
        .bind(&new.nome_filme)
        .bind(&new.imagem_filme)
        .bind(new.data_assistir)
        .bind(&new.descricao)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn update(&self, filme: &Filme) -> Result<Option<Filme>, AppError> {
        let row = sqlx::query_as::<_, Filme>(&format!(
            r#"
            UPDATE filmes
               SET nome_filme = $3,
                   imagem_filme = $4,
                   data_assistir = $5,
                   descricao = $6,
                   updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING {COLUMNS}
            "#
        ))
        .bind(filme.id)
        .bind(filme.user_id)
        .bind(&filme.nome_filme)
        .bind(&filme.imagem_filme)
        .bind(filme.data_assistir)
        .bind(&filme.descricao)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<bool, AppError> {
        let res = sqlx::query("DELETE FROM filmes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
