//! In-process store implementing both repositories. Each operation takes a
//! single lock, which gives the same per-record atomicity the database does.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::repo::{UserRepo, EMAIL_TAKEN};
use crate::auth::repo_types::{NewUser, User};
use crate::error::AppError;
use crate::filmes::repo::FilmeRepo;
use crate::filmes::repo_types::{Filme, NewFilme};

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>, // keyed by lowercased email
    filmes: RwLock<HashMap<Uuid, Filme>>,
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&email.to_lowercase()).cloned())
    }

    async fn create(&self, new: NewUser) -> Result<User, AppError> {
        let key = new.email.to_lowercase();
        let mut users = self.users.write().await;
        if users.contains_key(&key) {
            return Err(AppError::conflict(EMAIL_TAKEN));
        }
        let user = User {
            id: Uuid::new_v4(),
            nome: new.nome,
            email: new.email,
            password_hash: new.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(key, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl FilmeRepo for MemoryStore {
    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Filme>, AppError> {
        let mut rows: Vec<Filme> = self
            .filmes
            .read()
            .await
            .values()
            .filter(|f| f.user_id == owner)
            .cloned()
            .collect();
        rows.sort_by_key(|f| f.created_at);
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Filme>, AppError> {
        Ok(self.filmes.read().await.get(&id).cloned())
    }

    async fn create(&self, owner: Uuid, new: NewFilme) -> Result<Filme, AppError> {
        let now = OffsetDateTime::now_utc();
        let filme = Filme {
            id: Uuid::new_v4(),
            nome_filme: new.nome_filme,
            imagem_filme: new.imagem_filme,
            data_assistir: new.data_assistir,
            descricao: new.descricao,
            user_id: owner,
            created_at: now,
            updated_at: now,
        };
        self.filmes.write().await.insert(filme.id, filme.clone());
        Ok(filme)
    }

    async fn update(&self, filme: &Filme) -> Result<Option<Filme>, AppError> {
        let mut filmes = self.filmes.write().await;
        let Some(stored) = filmes
            .get_mut(&filme.id)
            .filter(|stored| stored.user_id == filme.user_id)
        else {
            return Ok(None);
        };
        stored.nome_filme = filme.nome_filme.clone();
        stored.imagem_filme = filme.imagem_filme.clone();
        stored.data_assistir = filme.data_assistir;
        stored.descricao = filme.descricao.clone();
        stored.updated_at = OffsetDateTime::now_utc();
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<bool, AppError> {
        let mut filmes = self.filmes.write().await;
        let owned = filmes.get(&id).is_some_and(|f| f.user_id == owner);
        if owned {
            filmes.remove(&id);
        }
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            nome: "Ana".into(),
            email: email.into(),
            password_hash: "hash".into(),
        }
    }

    fn new_filme(nome: &str) -> NewFilme {
        NewFilme {
            nome_filme: nome.into(),
            imagem_filme: None,
            data_assistir: None,
            descricao: None,
        }
    }

    #[tokio::test]
    async fn user_emails_are_unique_case_insensitively() {
        let store = MemoryStore::default();
        UserRepo::create(&store, new_user("a@a.com")).await.unwrap();

        let err = UserRepo::create(&store, new_user("A@A.COM")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(store.find_by_email("A@a.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn filmes_are_scoped_to_their_owner() {
        let store = MemoryStore::default();
        let ana = Uuid::new_v4();
        let bia = Uuid::new_v4();

        let f = FilmeRepo::create(&store, ana, new_filme("Duna")).await.unwrap();
        FilmeRepo::create(&store, bia, new_filme("Alien")).await.unwrap();

        let mine = store.list_by_owner(ana).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, f.id);

        assert!(!store.delete(f.id, bia).await.unwrap());
        let mut stolen = f.clone();
        stolen.user_id = bia;
        assert!(store.update(&stolen).await.unwrap().is_none());

        assert!(store.delete(f.id, ana).await.unwrap());
        assert!(store.find_by_id(f.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_touches_editable_fields_only() {
        let store = MemoryStore::default();
        let owner = Uuid::new_v4();
        let f = FilmeRepo::create(&store, owner, new_filme("Duna")).await.unwrap();

        let mut edited = f.clone();
        edited.nome_filme = "Duna 2".into();
        edited.created_at = OffsetDateTime::UNIX_EPOCH;
        let saved = store.update(&edited).await.unwrap().unwrap();

        assert_eq!(saved.nome_filme, "Duna 2");
        assert_eq!(saved.created_at, f.created_at);
        assert!(saved.updated_at >= f.updated_at);
    }
}
