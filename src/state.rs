use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::jwt::JwtKeys;
use crate::auth::repo::{PgUserRepo, UserRepo};
use crate::clock::{Clock, SystemClock};
use crate::config::{AppConfig, StoreBackend};
use crate::db;
use crate::filmes::repo::{FilmeRepo, PgFilmeRepo};
use crate::memory::MemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub users: Arc<dyn UserRepo>,
    pub filmes: Arc<dyn FilmeRepo>,
}

impl AppState {
    /// Builds the production state from the environment, connecting and migrating the store.
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        match config.store {
            StoreBackend::Postgres => {
                let pool = db::connect(&config).await?;
                db::migrate(&pool).await?;
                let users = Arc::new(PgUserRepo::new(pool.clone())) as Arc<dyn UserRepo>;
                let filmes = Arc::new(PgFilmeRepo::new(pool)) as Arc<dyn FilmeRepo>;
                Ok(Self::from_parts(config, clock, users, filmes))
            }
            StoreBackend::Memory => {
                tracing::warn!("using the in-memory store; data is lost on restart");
                Ok(Self::in_memory(config, clock))
            }
        }
    }

    pub fn from_parts(
        config: AppConfig,
        clock: Arc<dyn Clock>,
        users: Arc<dyn UserRepo>,
        filmes: Arc<dyn FilmeRepo>,
    ) -> Self {
        let jwt = JwtKeys::new(&config.jwt, clock);
        Self {
            config: Arc::new(config),
            jwt,
            users,
            filmes,
        }
    }

    /// State backed by a fresh [`MemoryStore`].
    pub fn in_memory(config: AppConfig, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(MemoryStore::default());
        let users = store.clone() as Arc<dyn UserRepo>;
        let filmes = store as Arc<dyn FilmeRepo>;
        Self::from_parts(config, clock, users, filmes)
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}
