use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// A movie on a user's watch list. Serialized exactly as the API returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Filme {
    pub id: Uuid,
    pub nome_filme: String,
    pub imagem_filme: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub data_assistir: Option<OffsetDateTime>,
    pub descricao: Option<String>,
    #[serde(rename = "usuario")]
    pub user_id: Uuid, // owner
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Validated fields for a movie about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFilme {
    pub nome_filme: String,
    pub imagem_filme: Option<String>,
    pub data_assistir: Option<OffsetDateTime>,
    pub descricao: Option<String>,
}
